//! Error types for control operations.

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Controller state error.
    #[error("Controller state error: {what}")]
    StateError { what: String },

    /// State machine transition table error.
    #[error("Transition table error: {what}")]
    TopologyError { what: String },
}
