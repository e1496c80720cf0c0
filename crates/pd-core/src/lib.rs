//! pd-core: shared foundation for popdyn.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - timing (wall-clock timers for run reporting)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod timing;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use timing::{Timer, TimingSamples};
