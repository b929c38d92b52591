//! Error types for appliance simulation.

use eb_core::error::EbError;
use thiserror::Error;

/// Errors that can occur while simulating one appliance for one step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplianceError {
    #[error("Tank fill of {fill} l is outside of [0, {capacity}] l")]
    TankFull { fill: f64, capacity: f64 },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Appliance kind mismatch: {what} does not belong to a {expected}")]
    KindMismatch {
        expected: &'static str,
        what: &'static str,
    },

    #[error("Schedule error: {0}")]
    Schedule(#[from] EbError),
}

pub type ApplianceResult<T> = Result<T, ApplianceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ApplianceError::TankFull {
            fill: 1200.0,
            capacity: 1000.0,
        };
        assert!(err.to_string().contains("1200"));
    }

    #[test]
    fn schedule_errors_convert() {
        let err: ApplianceError = EbError::InvalidArg { what: "values" }.into();
        assert!(matches!(err, ApplianceError::Schedule(_)));
    }
}
