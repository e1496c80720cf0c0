//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while setting up a simulation run.
///
/// A run either completes with a full trajectory or fails with one of these
/// before any record is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: String },

    #[error("Unknown parameter '{name}' for model {model}")]
    UnknownParameter { name: String, model: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        SimError::InvalidParameter { what: what.into() }
    }
}

impl From<pd_core::CoreError> for SimError {
    fn from(e: pd_core::CoreError) -> Self {
        SimError::InvalidParameter {
            what: e.to_string(),
        }
    }
}
