//! eb-powerhub: the power hub plant and its supervisory control.
//!
//! Provides:
//! - Plant constants and appliance parameters
//! - The plant network with typed handles and its initial state
//! - Sensor snapshots, from JSON or from a simulated state
//! - Operator setpoints with validation
//! - Control modules for heat, chill, waste heat and water, plus a survival override
//! - The JSON control record codec
//! - Simulation config files and a harness controller

pub mod codec;
pub mod components;
pub mod config;
pub mod control;
pub mod controller;
pub mod error;
pub mod network;
pub mod sensors;
pub mod setpoints;

pub use codec::{decode_control, encode_control};
pub use config::{SimulationConfig, load_config, load_json, load_yaml};
pub use control::{
    ControlModes, PowerHubControlState, control_power_hub, initial_control_all_off,
    initial_control_state, no_control, survival_control,
};
pub use controller::PowerHubController;
pub use error::{PowerHubError, PowerHubResult};
pub use network::{PowerHub, PowerHubSchedules};
pub use sensors::PowerHubSensors;
pub use setpoints::Setpoints;
