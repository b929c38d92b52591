//! Composable conditions over control state, sensors and time.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::context::{Context, Marker};
use crate::value::Value;

type Check<C, S> = Arc<dyn Fn(&C, &S, DateTime<Utc>) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn apply(self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        }
    }
}

/// A condition resolved against control state `C` and sensors `S`.
///
/// `&`, `|` and `!` compose predicates. Both sides of `&` and `|` are always
/// resolved so every [`Predicate::Timed`] below them refreshes its marker.
pub enum Predicate<C, S> {
    Const(bool),
    Compare {
        left: Value<C, S>,
        op: CompareOp,
        right: Value<C, S>,
    },
    Within {
        value: Value<C, S, Option<DateTime<Utc>>>,
        duration: TimeDelta,
    },
    Fn {
        name: String,
        check: Check<C, S>,
    },
    And(Box<Predicate<C, S>>, Box<Predicate<C, S>>),
    Or(Box<Predicate<C, S>>, Box<Predicate<C, S>>),
    Not(Box<Predicate<C, S>>),
    /// Holds once `inner` has held continuously for `duration`.
    Timed {
        marker: Marker,
        inner: Box<Predicate<C, S>>,
        duration: TimeDelta,
    },
}

impl<C: 'static, S: 'static> Predicate<C, S> {
    pub fn from_fn(
        name: impl Into<String>,
        check: impl Fn(&C, &S) -> bool + Send + Sync + 'static,
    ) -> Self {
        Predicate::Fn {
            name: name.into(),
            check: Arc::new(move |control: &C, sensors: &S, _: DateTime<Utc>| {
                check(control, sensors)
            }),
        }
    }

    /// Like [`Predicate::from_fn`] with access to the evaluation time.
    pub fn from_time_fn(
        name: impl Into<String>,
        check: impl Fn(&C, &S, DateTime<Utc>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Predicate::Fn {
            name: name.into(),
            check: Arc::new(check),
        }
    }
}

impl<C, S> Predicate<C, S> {
    pub fn constant(value: bool) -> Self {
        Predicate::Const(value)
    }

    /// Debounce: true once `self` has held for `duration` under `marker`.
    pub fn holds_true(self, marker: impl Into<Marker>, duration: TimeDelta) -> Self {
        Predicate::Timed {
            marker: marker.into(),
            inner: Box::new(self),
            duration,
        }
    }

    pub fn resolve(
        &self,
        control: &C,
        sensors: &S,
        context: &mut Context,
        time: DateTime<Utc>,
    ) -> bool {
        match self {
            Predicate::Const(value) => *value,
            Predicate::Compare { left, op, right } => op.apply(
                left.get(control, sensors, time),
                right.get(control, sensors, time),
            ),
            Predicate::Within { value, duration } => value
                .get(control, sensors, time)
                .is_some_and(|at| (time - at).abs() <= *duration),
            Predicate::Fn { check, .. } => check(control, sensors, time),
            Predicate::And(left, right) => {
                let left = left.resolve(control, sensors, context, time);
                let right = right.resolve(control, sensors, context, time);
                left && right
            }
            Predicate::Or(left, right) => {
                let left = left.resolve(control, sensors, context, time);
                let right = right.resolve(control, sensors, context, time);
                left || right
            }
            Predicate::Not(inner) => !inner.resolve(control, sensors, context, time),
            Predicate::Timed {
                marker,
                inner,
                duration,
            } => {
                if !inner.resolve(control, sensors, context, time) {
                    return false;
                }
                match context.previous(marker) {
                    Some(mark) => {
                        context.next(marker, mark);
                        time - mark >= *duration
                    }
                    None => {
                        context.next(marker, time);
                        false
                    }
                }
            }
        }
    }
}

impl<C, S> BitAnd for Predicate<C, S> {
    type Output = Predicate<C, S>;

    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::And(Box::new(self), Box::new(rhs))
    }
}

impl<C, S> BitOr for Predicate<C, S> {
    type Output = Predicate<C, S>;

    fn bitor(self, rhs: Self) -> Self::Output {
        Predicate::Or(Box::new(self), Box::new(rhs))
    }
}

impl<C, S> Not for Predicate<C, S> {
    type Output = Predicate<C, S>;

    fn not(self) -> Self::Output {
        Predicate::Not(Box::new(self))
    }
}

impl<C, S> Clone for Predicate<C, S> {
    fn clone(&self) -> Self {
        match self {
            Predicate::Const(value) => Predicate::Const(*value),
            Predicate::Compare { left, op, right } => Predicate::Compare {
                left: left.clone(),
                op: *op,
                right: right.clone(),
            },
            Predicate::Within { value, duration } => Predicate::Within {
                value: value.clone(),
                duration: *duration,
            },
            Predicate::Fn { name, check } => Predicate::Fn {
                name: name.clone(),
                check: Arc::clone(check),
            },
            Predicate::And(left, right) => Predicate::And(left.clone(), right.clone()),
            Predicate::Or(left, right) => Predicate::Or(left.clone(), right.clone()),
            Predicate::Not(inner) => Predicate::Not(inner.clone()),
            Predicate::Timed {
                marker,
                inner,
                duration,
            } => Predicate::Timed {
                marker: marker.clone(),
                inner: inner.clone(),
                duration: *duration,
            },
        }
    }
}

impl<C, S> fmt::Debug for Predicate<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Const(value) => write!(f, "{value}"),
            Predicate::Compare { left, op, right } => {
                write!(f, "{} {} {}", left.name(), op.symbol(), right.name())
            }
            Predicate::Within { value, duration } => {
                write!(f, "{} within {}s", value.name(), duration.num_seconds())
            }
            Predicate::Fn { name, .. } => f.write_str(name),
            Predicate::And(left, right) => write!(f, "({left:?} & {right:?})"),
            Predicate::Or(left, right) => write!(f, "({left:?} | {right:?})"),
            Predicate::Not(inner) => write!(f, "!{inner:?}"),
            Predicate::Timed {
                marker,
                inner,
                duration,
            } => write!(
                f,
                "{inner:?} for {}s [{marker}]",
                duration.num_seconds()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    type P = Predicate<bool, f64>;

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::seconds(seconds)
    }

    fn hot() -> P {
        Value::sensor("reading", |s: &f64| *s).gt(50.0)
    }

    #[test]
    fn debounce_needs_the_full_duration() {
        let debounced = hot().holds_true("hot", TimeDelta::seconds(10));
        let mut context = Context::default();

        assert!(!debounced.resolve(&false, &60.0, &mut context, t(0)));
        context = context.flip();
        assert!(!debounced.resolve(&false, &60.0, &mut context, t(5)));
        context = context.flip();
        assert!(debounced.resolve(&false, &60.0, &mut context, t(10)));
    }

    #[test]
    fn debounce_resets_when_condition_drops() {
        let debounced = hot().holds_true("hot", TimeDelta::seconds(10));
        let mut context = Context::default();

        assert!(!debounced.resolve(&false, &60.0, &mut context, t(0)));
        context = context.flip();
        assert!(!debounced.resolve(&false, &40.0, &mut context, t(5)));
        context = context.flip();
        assert!(!debounced.resolve(&false, &60.0, &mut context, t(10)));
        context = context.flip();
        assert!(debounced.resolve(&false, &60.0, &mut context, t(20)));
    }

    #[test]
    fn operators_do_not_short_circuit() {
        // the timed side must be marked even though the left side is false
        let both = P::constant(false) & hot().holds_true("hot", TimeDelta::seconds(1));
        let mut context = Context::default();
        assert!(!both.resolve(&false, &60.0, &mut context, t(0)));
        assert_eq!(context.flip().previous(&Marker::from("hot")), Some(t(0)));

        let either = P::constant(true) | hot().holds_true("hot", TimeDelta::seconds(1));
        let mut context = Context::default();
        assert!(either.resolve(&false, &60.0, &mut context, t(0)));
        assert_eq!(context.flip().previous(&Marker::from("hot")), Some(t(0)));
    }

    #[test]
    fn closures_and_negation() {
        let enabled = P::from_fn("enabled", |c, _| *c);
        let disabled = !enabled.clone();
        let mut context = Context::default();
        assert!(enabled.resolve(&true, &0.0, &mut context, t(0)));
        assert!(!disabled.resolve(&true, &0.0, &mut context, t(0)));
        assert_eq!(format!("{disabled:?}"), "!enabled");
    }
}
