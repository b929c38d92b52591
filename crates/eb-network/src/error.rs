//! Network construction and stepping errors.

use eb_appliances::ApplianceError;
use eb_core::ApplianceId;

use crate::state::NetworkState;

/// Errors raised while wiring, seeding or stepping a network.
///
/// Construction errors (everything except `Appliance`) mean the network or
/// its initial state is unusable. `Appliance` is a per-step physical failure
/// and carries whatever was computed before it.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Two appliances were registered under the same name.
    DuplicateName { name: String },

    /// A port receives more than one connection.
    DuplicateInput {
        appliance: String,
        port: &'static str,
    },

    /// The forward connections contain a cycle.
    Linearize { remaining: Vec<String> },

    /// A stateful appliance has no initial state.
    MissingState { appliance: String },

    /// A feedback edge has no seed value for the first step.
    MissingFeedbackSeed {
        appliance: String,
        port: &'static str,
    },

    /// A handle or name does not belong to this network.
    UnknownAppliance { name: String },

    /// Two different commands for the same appliance.
    ConflictingControl {
        appliance: ApplianceId,
        kind: &'static str,
    },

    /// An appliance failed during a step.
    Appliance {
        name: String,
        source: ApplianceError,
        partial: Box<NetworkState>,
    },

    /// A serialized command could not be decoded for its appliance.
    Decode { appliance: String, message: String },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::DuplicateName { name } => {
                write!(f, "Appliance name {} is used more than once", name)
            }
            NetworkError::DuplicateInput { appliance, port } => {
                write!(f, "Port {}.{} has more than one input", appliance, port)
            }
            NetworkError::Linearize { remaining } => {
                write!(
                    f,
                    "Forward connections contain a cycle through: {}",
                    remaining.join(", ")
                )
            }
            NetworkError::MissingState { appliance } => {
                write!(f, "No initial state defined for {}", appliance)
            }
            NetworkError::MissingFeedbackSeed { appliance, port } => {
                write!(f, "No seed defined for feedback from {}.{}", appliance, port)
            }
            NetworkError::UnknownAppliance { name } => {
                write!(f, "Appliance {} is not part of this network", name)
            }
            NetworkError::ConflictingControl { appliance, kind } => {
                write!(
                    f,
                    "Conflicting controls for {} appliance {}",
                    kind, appliance
                )
            }
            NetworkError::Appliance { name, source, .. } => {
                write!(f, "Appliance {} failed: {}", name, source)
            }
            NetworkError::Decode { appliance, message } => {
                write!(f, "Cannot decode control for {}: {}", appliance, message)
            }
        }
    }
}

impl std::error::Error for NetworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetworkError::Appliance { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type NetworkResult<T> = Result<T, NetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_port() {
        let err = NetworkError::DuplicateInput {
            appliance: "mix".into(),
            port: "a",
        };
        assert_eq!(err.to_string(), "Port mix.a has more than one input");
    }

    #[test]
    fn appliance_errors_expose_their_source() {
        use chrono::{TimeDelta, TimeZone, Utc};
        use eb_core::SimulationTime;
        use std::error::Error;

        let err = NetworkError::Appliance {
            name: "tank".into(),
            source: ApplianceError::TankFull {
                fill: 2.0,
                capacity: 1.0,
            },
            partial: Box::new(NetworkState::empty(SimulationTime::new(
                TimeDelta::seconds(1),
                Utc.timestamp_opt(0, 0).unwrap(),
            ))),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Appliance tank failed"));
    }
}
