//! Closed-loop plant control for the simulation harness.

use eb_core::units::Ratio;
use eb_network::{Network, NetworkControl, NetworkState};
use eb_sim::{Controller, SimError, SimResult};

use crate::control::{PowerHubControlState, control_power_hub, initial_control_state};
use crate::network::PowerHub;
use crate::sensors::PowerHubSensors;
use crate::setpoints::Setpoints;

/// Reads sensors off each simulated state and runs the plant controllers.
///
/// The battery is not simulated; its state of charge stays at the value
/// given at construction.
#[derive(Debug)]
pub struct PowerHubController<'h> {
    hub: &'h PowerHub,
    state: PowerHubControlState,
    battery_soc: Ratio,
}

impl<'h> PowerHubController<'h> {
    pub fn new(hub: &'h PowerHub, setpoints: Setpoints, battery_soc: Ratio) -> Self {
        Self {
            hub,
            state: PowerHubControlState {
                setpoints,
                ..initial_control_state()
            },
            battery_soc,
        }
    }

    pub fn control_state(&self) -> &PowerHubControlState {
        &self.state
    }
}

impl Controller for PowerHubController<'_> {
    fn control(&mut self, _network: &Network, state: &NetworkState) -> SimResult<NetworkControl> {
        let sensors = PowerHubSensors::from_state(self.hub, state, self.battery_soc)
            .map_err(|err| SimError::Control {
                what: err.to_string(),
            })?;
        let (next, control) =
            control_power_hub(self.hub, &self.state, &sensors, state.time().timestamp())
                .map_err(|err| SimError::Control {
                    what: err.to_string(),
                })?;
        self.state = next;
        Ok(control)
    }
}
