//! Error types for the plant crate.

use eb_appliances::ApplianceError;
use eb_controls::ControlError;
use eb_core::EbError;
use eb_network::NetworkError;
use eb_sim::SimError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PowerHubError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Appliance error: {0}")]
    Appliance(#[from] ApplianceError),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] EbError),

    #[error("Cannot read sensors: {what}")]
    Sensors { what: String },

    #[error("Invalid setpoints: {what}")]
    Setpoints { what: String },

    #[error("Invalid config: {what}")]
    Config { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PowerHubResult<T> = Result<T, PowerHubError>;
