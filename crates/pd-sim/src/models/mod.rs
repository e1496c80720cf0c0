//! Concrete compartmental models.

pub mod logistic;
pub mod sir;

pub use logistic::{LogisticDiagnostics, LogisticGrowth, LogisticParams, LogisticState};
pub use sir::{Sir, SirDiagnostics, SirParams, SirState};
