use chrono::{DateTime, Utc};
use thiserror::Error;

pub type EbResult<T> = Result<T, EbError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EbError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },

    #[error("Time {at} is outside of schedule [{start}, {end}]")]
    ScheduleOutOfRange {
        at: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}
