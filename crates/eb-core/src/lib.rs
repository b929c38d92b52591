//! eb-core: shared foundation for the energy box workspace.
//!
//! Contains:
//! - units (plain `f64` aliases with documented units)
//! - numeric (finiteness check + weighted mean)
//! - ids (stable compact IDs for appliances)
//! - time (discrete simulation clock)
//! - schedule (time-indexed parameter values)
//! - linearize (round-based dependency ordering)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod linearize;
pub mod numeric;
pub mod schedule;
pub mod time;
pub mod units;

pub use error::{EbError, EbResult};
pub use ids::*;
pub use linearize::{LinearizeError, linearize};
pub use numeric::*;
pub use schedule::Schedule;
pub use time::SimulationTime;
pub use units::*;
