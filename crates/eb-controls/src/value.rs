//! Named accessors over control state and sensors.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::predicate::{CompareOp, Predicate};

type Fetch<C, S, T> = Arc<dyn Fn(&C, &S, DateTime<Utc>) -> T + Send + Sync>;

/// A value read at evaluation time.
///
/// Comparisons between values build predicates; nothing is read until the
/// predicate is resolved.
pub struct Value<C, S, T = f64> {
    name: String,
    fetch: Fetch<C, S, T>,
}

impl<C: 'static, S: 'static, T: 'static> Value<C, S, T> {
    /// Read from the control state.
    pub fn state(
        name: impl Into<String>,
        read: impl Fn(&C) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            fetch: Arc::new(move |control: &C, _: &S, _: DateTime<Utc>| read(control)),
        }
    }

    /// Read from the sensors.
    pub fn sensor(
        name: impl Into<String>,
        read: impl Fn(&S) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            fetch: Arc::new(move |_: &C, sensors: &S, _: DateTime<Utc>| read(sensors)),
        }
    }

}

impl<C, S, T> Value<C, S, T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, control: &C, sensors: &S, time: DateTime<Utc>) -> T {
        (self.fetch)(control, sensors, time)
    }
}

impl<C: 'static, S: 'static, T: Clone + fmt::Debug + Send + Sync + 'static> Value<C, S, T> {
    pub fn constant(value: T) -> Self {
        Self {
            name: format!("{value:?}"),
            fetch: Arc::new(move |_: &C, _: &S, _: DateTime<Utc>| value.clone()),
        }
    }
}

impl<C: 'static, S: 'static> Value<C, S, f64> {
    fn compare(self, op: CompareOp, other: impl Into<Value<C, S>>) -> Predicate<C, S> {
        Predicate::Compare {
            left: self,
            op,
            right: other.into(),
        }
    }

    pub fn lt(self, other: impl Into<Value<C, S>>) -> Predicate<C, S> {
        self.compare(CompareOp::Lt, other)
    }

    pub fn le(self, other: impl Into<Value<C, S>>) -> Predicate<C, S> {
        self.compare(CompareOp::Le, other)
    }

    pub fn gt(self, other: impl Into<Value<C, S>>) -> Predicate<C, S> {
        self.compare(CompareOp::Gt, other)
    }

    pub fn ge(self, other: impl Into<Value<C, S>>) -> Predicate<C, S> {
        self.compare(CompareOp::Ge, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, other: impl Into<Value<C, S>>) -> Predicate<C, S> {
        self.compare(CompareOp::Eq, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn ne(self, other: impl Into<Value<C, S>>) -> Predicate<C, S> {
        self.compare(CompareOp::Ne, other)
    }
}

impl<C, S> Value<C, S, Option<DateTime<Utc>>> {
    /// True when the instant lies within `duration` of the evaluation time.
    pub fn within(self, duration: TimeDelta) -> Predicate<C, S> {
        Predicate::Within {
            value: self,
            duration,
        }
    }
}

impl<C: 'static, S: 'static> From<f64> for Value<C, S> {
    fn from(value: f64) -> Self {
        Value::constant(value)
    }
}

impl<C, S, T> Clone for Value<C, S, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            fetch: Arc::clone(&self.fetch),
        }
    }
}

impl<C, S, T> fmt::Debug for Value<C, S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;
    use chrono::TimeZone;

    struct Control {
        setpoint: f64,
    }

    struct Sensors {
        temperature: f64,
        last_press: Option<DateTime<Utc>>,
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn values_read_their_source() {
        let setpoint = Value::<Control, Sensors>::state("setpoint", |c| c.setpoint);
        let temperature = Value::<Control, Sensors>::sensor("temperature", |s| s.temperature);
        let control = Control { setpoint: 40.0 };
        let sensors = Sensors {
            temperature: 35.0,
            last_press: None,
        };
        assert_eq!(setpoint.get(&control, &sensors, now()), 40.0);
        assert_eq!(temperature.get(&control, &sensors, now()), 35.0);
        assert_eq!(temperature.name(), "temperature");
    }

    #[test]
    fn comparisons_are_lazy() {
        let cold = Value::<Control, Sensors>::sensor("temperature", |s| s.temperature)
            .lt(Value::<Control, Sensors>::state("setpoint", |c| c.setpoint));
        let control = Control { setpoint: 40.0 };
        let mut context = Context::default();

        let warm = Sensors {
            temperature: 45.0,
            last_press: None,
        };
        assert!(!cold.resolve(&control, &warm, &mut context, now()));
        let chilly = Sensors {
            temperature: 30.0,
            last_press: None,
        };
        assert!(cold.resolve(&control, &chilly, &mut context, now()));
    }

    #[test]
    fn within_checks_distance_to_now() {
        let pressed = Value::<Control, Sensors, Option<DateTime<Utc>>>::sensor("press", |s| s.last_press)
            .within(TimeDelta::seconds(5));
        let control = Control { setpoint: 0.0 };
        let mut context = Context::default();

        let recent = Sensors {
            temperature: 0.0,
            last_press: Some(now() - TimeDelta::seconds(3)),
        };
        let old = Sensors {
            temperature: 0.0,
            last_press: Some(now() - TimeDelta::seconds(30)),
        };
        let never = Sensors {
            temperature: 0.0,
            last_press: None,
        };
        assert!(pressed.resolve(&control, &recent, &mut context, now()));
        assert!(!pressed.resolve(&control, &old, &mut context, now()));
        assert!(!pressed.resolve(&control, &never, &mut context, now()));
    }
}
