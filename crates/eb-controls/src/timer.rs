//! Rate limiting for expensive or chatty control outputs.

use chrono::{DateTime, TimeDelta, Utc};

/// Recomputes a value at most once per `interval` and replays it otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Timer<T> {
    pub interval: TimeDelta,
    pub last_run: Option<DateTime<Utc>>,
    pub last_value: Option<T>,
}

impl<T: Clone> Timer<T> {
    pub fn new(interval: TimeDelta) -> Self {
        Self {
            interval,
            last_run: None,
            last_value: None,
        }
    }

    pub fn run(&self, compute: impl FnOnce() -> T, now: DateTime<Utc>) -> (Timer<T>, T) {
        if let (Some(last_run), Some(value)) = (self.last_run, &self.last_value)
            && now - last_run < self.interval
        {
            return (self.clone(), value.clone());
        }
        let value = compute();
        (
            Timer {
                interval: self.interval,
                last_run: Some(now),
                last_value: Some(value.clone()),
            },
            value,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn replays_within_interval() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timer = Timer::new(TimeDelta::seconds(60));
        let mut calls = 0;

        let (timer, first) = timer.run(
            || {
                calls += 1;
                calls
            },
            start,
        );
        let (timer, second) = timer.run(
            || {
                calls += 1;
                calls
            },
            start + TimeDelta::seconds(30),
        );
        let (timer, third) = timer.run(
            || {
                calls += 1;
                calls
            },
            start + TimeDelta::seconds(60),
        );
        let (_, fourth) = timer.run(
            || {
                calls += 1;
                calls
            },
            start + TimeDelta::seconds(150),
        );

        assert_eq!((first, second, third, fourth), (1, 1, 2, 3));
        assert_eq!(calls, 3);
    }
}
