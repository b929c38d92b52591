//! Control seam between the harness and plant logic.

use eb_network::{Network, NetworkControl, NetworkState};

use crate::error::SimResult;

/// Decides the commands for the next step from the current state.
///
/// Implementations may keep their own state between calls; the harness
/// calls `control` exactly once per step, in order.
pub trait Controller {
    fn control(&mut self, network: &Network, state: &NetworkState) -> SimResult<NetworkControl>;
}

/// Issues no commands; every appliance runs on its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoControl;

impl Controller for NoControl {
    fn control(&mut self, _network: &Network, _state: &NetworkState) -> SimResult<NetworkControl> {
        Ok(NetworkControl::default())
    }
}

/// Replays the same commands every step.
#[derive(Debug, Clone, Default)]
pub struct FixedControl(pub NetworkControl);

impl Controller for FixedControl {
    fn control(&mut self, _network: &Network, _state: &NetworkState) -> SimResult<NetworkControl> {
        Ok(self.0.clone())
    }
}
