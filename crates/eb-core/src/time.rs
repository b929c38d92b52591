//! Discrete simulation clock.

use chrono::{DateTime, TimeDelta, Utc};

use crate::units::Second;

/// Position of one step on a fixed-step timeline.
///
/// Every appliance and controller receives this explicitly; nothing in the
/// engine reads a system clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationTime {
    pub step_size: TimeDelta,
    pub step: u64,
    pub start: DateTime<Utc>,
}

impl SimulationTime {
    /// Timeline starting at step 0.
    pub fn new(step_size: TimeDelta, start: DateTime<Utc>) -> Self {
        Self {
            step_size,
            step: 0,
            start,
        }
    }

    /// Wall-clock instant of the current step.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let millis = self
            .step_size
            .num_milliseconds()
            .saturating_mul(i64::try_from(self.step).unwrap_or(i64::MAX));
        self.start + TimeDelta::milliseconds(millis)
    }

    /// Length of one step in seconds.
    pub fn step_seconds(&self) -> Second {
        self.step_size.num_milliseconds() as f64 / 1000.0
    }

    /// The following step on the same timeline.
    pub fn next(&self) -> Self {
        Self {
            step: self.step + 1,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn timestamp_advances_by_step_size() {
        let time = SimulationTime::new(TimeDelta::seconds(30), start());
        assert_eq!(time.timestamp(), start());
        let later = time.next().next().next();
        assert_eq!(later.step, 3);
        assert_eq!(later.timestamp(), start() + TimeDelta::seconds(90));
    }

    #[test]
    fn step_seconds_supports_fractions() {
        let time = SimulationTime::new(TimeDelta::milliseconds(250), start());
        assert_eq!(time.step_seconds(), 0.25);
    }
}
