//! Fixed-step simulation harness for appliance networks.
//!
//! Provides:
//! - A step loop alternating controller and network
//! - The `Controller` seam plus trivial controllers
//! - Decimated state recording
//! - Step-tagged failures carrying the last good state

pub mod controller;
pub mod error;
pub mod sim;

// Re-exports for public API
pub use controller::{Controller, FixedControl, NoControl};
pub use error::{SimError, SimResult};
pub use sim::{SimOptions, SimRecord, run_sim};
