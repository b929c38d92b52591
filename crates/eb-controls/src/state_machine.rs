//! First-match state machines over predicates.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::context::Context;
use crate::error::{ControlError, ControlResult};
use crate::predicate::Predicate;

/// Move from `from` to `to` when `when` resolves true.
pub struct Transition<M, C, S> {
    pub from: M,
    pub to: M,
    pub when: Predicate<C, S>,
}

impl<M, C, S> Transition<M, C, S> {
    pub fn new(from: M, to: M, when: Predicate<C, S>) -> Self {
        Self { from, to, when }
    }
}

impl<M: fmt::Debug, C, S> fmt::Debug for Transition<M, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} -> {:?} when {:?}", self.from, self.to, self.when)
    }
}

/// Ordered transition table.
///
/// At most one transition fires per run. Markers written by predicates
/// survive only while the machine stays in the same mode.
pub struct StateMachine<M, C, S> {
    transitions: Vec<Transition<M, C, S>>,
}

impl<M: Copy + PartialEq + fmt::Debug, C, S> StateMachine<M, C, S> {
    pub fn new(transitions: Vec<Transition<M, C, S>>) -> Self {
        Self { transitions }
    }

    pub fn transitions(&self) -> &[Transition<M, C, S>] {
        &self.transitions
    }

    /// Reject empty tables, self-loops and repeated `(from, to)` pairs.
    pub fn validate(&self) -> ControlResult<()> {
        if self.transitions.is_empty() {
            return Err(ControlError::TopologyError {
                what: "state machine has no transitions".into(),
            });
        }
        for (i, transition) in self.transitions.iter().enumerate() {
            if transition.from == transition.to {
                return Err(ControlError::TopologyError {
                    what: format!("self-loop on {:?}", transition.from),
                });
            }
            let repeated = self.transitions[..i]
                .iter()
                .any(|earlier| earlier.from == transition.from && earlier.to == transition.to);
            if repeated {
                return Err(ControlError::TopologyError {
                    what: format!(
                        "transition {:?} -> {:?} is declared twice",
                        transition.from, transition.to
                    ),
                });
            }
        }
        Ok(())
    }

    /// Evaluate the transitions leaving `current`, in declaration order.
    pub fn run(
        &self,
        current: M,
        context: &Context,
        control: &C,
        sensors: &S,
        time: DateTime<Utc>,
    ) -> (M, Context) {
        let mut context = context.clone();
        for transition in self.transitions.iter().filter(|t| t.from == current) {
            if transition.when.resolve(control, sensors, &mut context, time) {
                return (transition.to, Context::default());
            }
        }
        (current, context.flip())
    }
}

impl<M: fmt::Debug, C, S> fmt::Debug for StateMachine<M, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.transitions).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Idle,
        Heating,
        Alarm,
    }

    type Machine = StateMachine<Mode, (), f64>;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn machine() -> Machine {
        StateMachine::new(vec![
            Transition::new(Mode::Idle, Mode::Alarm, Predicate::from_fn("too cold", |_, t: &f64| *t < 0.0)),
            Transition::new(Mode::Idle, Mode::Heating, Predicate::from_fn("cold", |_, t: &f64| *t < 20.0)),
            Transition::new(Mode::Heating, Mode::Idle, Predicate::from_fn("warm", |_, t: &f64| *t > 25.0)),
        ])
    }

    #[test]
    fn first_matching_transition_wins() {
        let (mode, _) = machine().run(Mode::Idle, &Context::default(), &(), &-5.0, now());
        assert_eq!(mode, Mode::Alarm);
    }

    #[test]
    fn only_one_hop_per_run() {
        // Idle -> Heating fires; Heating -> Idle is not evaluated in the same run
        let (mode, _) = machine().run(Mode::Idle, &Context::default(), &(), &10.0, now());
        assert_eq!(mode, Mode::Heating);
    }

    #[test]
    fn staying_flips_the_context() {
        let debounced: Machine = StateMachine::new(vec![Transition::new(
            Mode::Idle,
            Mode::Heating,
            Predicate::from_fn("cold", |_, t: &f64| *t < 20.0).holds_true("cold", TimeDelta::seconds(60)),
        )]);
        let (mode, context) = debounced.run(Mode::Idle, &Context::default(), &(), &10.0, now());
        assert_eq!(mode, Mode::Idle);
        let (mode, context) = debounced.run(mode, &context, &(), &10.0, now() + TimeDelta::seconds(60));
        assert_eq!(mode, Mode::Heating);
        assert!(context.is_empty());
    }

    #[test]
    fn validate_rejects_bad_tables() {
        assert!(machine().validate().is_ok());
        assert!(Machine::new(vec![]).validate().is_err());
        let looped: Machine = StateMachine::new(vec![Transition::new(Mode::Idle, Mode::Idle, Predicate::constant(true))]);
        assert!(looped.validate().is_err());
        let repeated: Machine = StateMachine::new(vec![
            Transition::new(Mode::Idle, Mode::Heating, Predicate::constant(true)),
            Transition::new(Mode::Idle, Mode::Heating, Predicate::constant(false)),
        ]);
        assert!(repeated.validate().is_err());
    }
}
