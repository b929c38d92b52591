//! Error types for simulation runs.

use eb_network::{NetworkError, NetworkState};
use thiserror::Error;

/// Errors encountered during a simulation run.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// The network failed while computing step `step`. `state` is the last
    /// state that was computed successfully.
    #[error("Step {step} failed: {source}")]
    Step {
        step: u64,
        state: Box<NetworkState>,
        #[source]
        source: NetworkError,
    },

    #[error("Controller failed: {what}")]
    Control { what: String },
}

pub type SimResult<T> = Result<T, SimError>;
