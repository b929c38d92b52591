//! Control primitives for plant supervisory logic.
//!
//! This crate provides the building blocks the plant controllers are written
//! in. Everything is a pure function of its inputs: controllers receive the
//! previous control state, the current sensor readings and the evaluation
//! time, and return new values instead of mutating.
//!
//! # Architecture
//!
//! - [`Value`] reads a number (or instant) from the control state or sensors
//! - [`Predicate`] composes comparisons, closures and debounced conditions
//! - [`Context`] carries debounce markers from one evaluation to the next
//! - [`StateMachine`] picks the first transition whose predicate holds
//! - [`Pid`] and [`Timer`] are the stateful helpers used inside modes

pub mod context;
pub mod error;
pub mod pid;
pub mod predicate;
pub mod state_machine;
pub mod timer;
pub mod value;

pub use context::{Context, Marker};
pub use error::{ControlError, ControlResult};
pub use pid::{Pid, PidConfig};
pub use predicate::{CompareOp, Predicate};
pub use state_machine::{StateMachine, Transition};
pub use timer::Timer;
pub use value::Value;
