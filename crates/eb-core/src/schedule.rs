//! Time-indexed parameter values (weather, demand profiles).

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{EbError, EbResult};
use crate::time::SimulationTime;

/// A value that may change over the simulated timeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Schedule {
    /// Same value at every instant.
    Const(f64),
    /// `values` spread evenly over `period`, repeating from `start`.
    Periodic {
        start: DateTime<Utc>,
        period: TimeDelta,
        values: Vec<f64>,
    },
    /// `values` spread evenly over the open interval `(start, end)`.
    ///
    /// Reading outside the interval is an error rather than an extrapolation.
    Given {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        values: Vec<f64>,
    },
}

impl Schedule {
    pub fn at(&self, time: &SimulationTime) -> EbResult<f64> {
        self.at_instant(time.timestamp())
    }

    pub fn at_instant(&self, at: DateTime<Utc>) -> EbResult<f64> {
        match self {
            Schedule::Const(value) => Ok(*value),
            Schedule::Periodic {
                start,
                period,
                values,
            } => pick(values, at - *start, *period),
            Schedule::Given { start, end, values } => {
                if !(*start < at && at < *end) {
                    return Err(EbError::ScheduleOutOfRange {
                        at,
                        start: *start,
                        end: *end,
                    });
                }
                pick(values, at - *start, *end - *start)
            }
        }
    }
}

impl From<f64> for Schedule {
    fn from(value: f64) -> Self {
        Schedule::Const(value)
    }
}

fn pick(values: &[f64], elapsed: TimeDelta, span: TimeDelta) -> EbResult<f64> {
    let span_ms = span.num_milliseconds();
    if values.is_empty() || span_ms <= 0 {
        return Err(EbError::InvalidArg {
            what: "schedule needs values and a positive span",
        });
    }
    let fraction = (elapsed.num_milliseconds() as f64 / span_ms as f64).rem_euclid(1.0);
    let index = ((fraction * values.len() as f64).floor() as usize).min(values.len() - 1);
    Ok(values[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn midnight() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn periodic_wraps_around() {
        let schedule = Schedule::Periodic {
            start: midnight(),
            period: TimeDelta::hours(24),
            values: vec![1.0, 2.0, 3.0, 4.0],
        };
        assert_eq!(schedule.at_instant(midnight()).unwrap(), 1.0);
        assert_eq!(
            schedule
                .at_instant(midnight() + TimeDelta::hours(13))
                .unwrap(),
            3.0
        );
        assert_eq!(
            schedule
                .at_instant(midnight() + TimeDelta::hours(24 + 19))
                .unwrap(),
            4.0
        );
    }

    #[test]
    fn periodic_before_start_counts_backwards() {
        let schedule = Schedule::Periodic {
            start: midnight(),
            period: TimeDelta::hours(2),
            values: vec![10.0, 20.0],
        };
        assert_eq!(
            schedule
                .at_instant(midnight() - TimeDelta::minutes(30))
                .unwrap(),
            20.0
        );
    }

    #[test]
    fn given_rejects_instants_outside_interval() {
        let schedule = Schedule::Given {
            start: midnight(),
            end: midnight() + TimeDelta::hours(2),
            values: vec![5.0, 6.0],
        };
        assert_eq!(
            schedule
                .at_instant(midnight() + TimeDelta::minutes(90))
                .unwrap(),
            6.0
        );
        assert!(matches!(
            schedule.at_instant(midnight()),
            Err(EbError::ScheduleOutOfRange { .. })
        ));
    }

    #[test]
    fn const_ignores_time() {
        let time = SimulationTime::new(TimeDelta::seconds(1), midnight());
        assert_eq!(Schedule::from(7.5).at(&time.next()).unwrap(), 7.5);
    }
}
