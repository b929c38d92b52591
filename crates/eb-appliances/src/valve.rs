//! Three-way valve splitting AB into A and B.

use eb_core::SimulationTime;
use eb_core::units::Ratio;
use serde::{Deserialize, Serialize};

use crate::error::ApplianceResult;
use crate::traits::{Appliance, ConnectionState, PortMap, ports};

ports!(ValvePort {
    A => "a",
    B => "b",
    Ab => "ab",
});

/// Valve position: 0.0 sends everything to A, 1.0 everything to B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValveState {
    pub position: Ratio,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValveControl {
    pub position: Ratio,
}

impl ValveControl {
    /// Position routing all flow to port A.
    pub const A_POSITION: Ratio = 0.0;
    /// Position routing all flow to port B.
    pub const B_POSITION: Ratio = 1.0;

    pub fn new(position: Ratio) -> Self {
        Self { position }
    }

    pub fn a_position() -> Self {
        Self::new(Self::A_POSITION)
    }

    pub fn b_position() -> Self {
        Self::new(Self::B_POSITION)
    }
}

/// Splits the inbound AB flow into `((1 - p) * f, p * f)` on A and B.
///
/// Without a control the valve holds its previous position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Valve;

impl Appliance for Valve {
    type State = ValveState;
    type Control = ValveControl;
    type Port = ValvePort;

    fn simulate(
        &self,
        inputs: &PortMap<ValvePort>,
        previous: &ValveState,
        control: Option<&ValveControl>,
        _time: &SimulationTime,
    ) -> ApplianceResult<(ValveState, PortMap<ValvePort>)> {
        let position = control
            .map_or(previous.position, |c| c.position)
            .clamp(0.0, 1.0);
        let state = ValveState { position };

        let Some(inlet) = inputs.get(&ValvePort::Ab) else {
            return Ok((state, PortMap::new()));
        };

        Ok((
            state,
            PortMap::from([
                (ValvePort::A, inlet.with_flow((1.0 - position) * inlet.flow)),
                (ValvePort::B, inlet.with_flow(position * inlet.flow)),
            ]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn time() -> SimulationTime {
        SimulationTime::new(TimeDelta::seconds(1), Utc.timestamp_opt(0, 0).unwrap())
    }

    #[test]
    fn splits_by_position() {
        let inputs = PortMap::from([(ValvePort::Ab, ConnectionState::new(2.0, 60.0))]);
        let (state, out) = Valve
            .simulate(
                &inputs,
                &ValveState { position: 0.0 },
                Some(&ValveControl::new(0.25)),
                &time(),
            )
            .unwrap();
        assert_eq!(state.position, 0.25);
        assert_eq!(out[&ValvePort::A], ConnectionState::new(1.5, 60.0));
        assert_eq!(out[&ValvePort::B], ConnectionState::new(0.5, 60.0));
    }

    #[test]
    fn keeps_previous_position_without_control() {
        let inputs = PortMap::from([(ValvePort::Ab, ConnectionState::new(1.0, 20.0))]);
        let (state, out) = Valve
            .simulate(&inputs, &ValveState { position: 1.0 }, None, &time())
            .unwrap();
        assert_eq!(state.position, 1.0);
        assert_eq!(out[&ValvePort::A].flow, 0.0);
        assert_eq!(out[&ValvePort::B].flow, 1.0);
    }
}
