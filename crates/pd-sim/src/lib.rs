//! Discrete-time compartmental simulation for popdyn.
//!
//! Provides:
//! - Typed parameter sets with per-run overrides merged onto immutable defaults
//! - Time grid construction (uniform or explicit points)
//! - Fixed-step explicit Euler integration with non-negativity clamping
//! - Trajectory recording with final-state access and scalar reductions
//! - Logistic growth and SIR epidemic models

/// Crate version, reported by environment checks.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod grid;
pub mod integrator;
pub mod model;
pub mod models;
pub mod params;
pub mod sim;
pub mod trajectory;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use grid::{DEFAULT_MAX_POINTS, GridSpec, TimeGrid};
pub use integrator::{ForwardEuler, Integrator};
pub use model::{CompartmentModel, Compartments};
pub use models::{
    LogisticDiagnostics, LogisticGrowth, LogisticParams, LogisticState, Sir, SirDiagnostics,
    SirParams, SirState,
};
pub use params::{NamedValues, Overrides, ParameterSet};
pub use sim::{RunRequest, SimOptions, SimProgress, run_sim, run_sim_with_progress};
pub use trajectory::{Peak, Record, Trajectory};
