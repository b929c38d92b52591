//! Level-only water tank.

use eb_core::SimulationTime;
use eb_core::units::{Liter, Ratio};
use serde::{Deserialize, Serialize};

use crate::common::check_positive;
use crate::error::{ApplianceError, ApplianceResult};
use crate::traits::{Appliance, NoControl, PortMap, ports};

ports!(WaterTankPort {
    In0 => "in_0",
    In1 => "in_1",
    Consumption => "consumption",
    Out => "out",
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterTankState {
    pub fill_ratio: Ratio,
}

/// Tracks the volume balance of two inlets against one consumption line.
///
/// Whatever is drawn on CONSUMPTION leaves again on OUT. Temperatures are
/// not modelled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterTank {
    pub capacity: Liter,
}

impl WaterTank {
    pub fn new(capacity: Liter) -> ApplianceResult<Self> {
        check_positive(capacity, "tank capacity")?;
        Ok(Self { capacity })
    }
}

impl Appliance for WaterTank {
    type State = WaterTankState;
    type Control = NoControl;
    type Port = WaterTankPort;

    fn simulate(
        &self,
        inputs: &PortMap<WaterTankPort>,
        previous: &WaterTankState,
        _control: Option<&NoControl>,
        time: &SimulationTime,
    ) -> ApplianceResult<(WaterTankState, PortMap<WaterTankPort>)> {
        let flow = |port: WaterTankPort| inputs.get(&port).map_or(0.0, |c| c.flow);
        let delta = (flow(WaterTankPort::In0) + flow(WaterTankPort::In1)
            - flow(WaterTankPort::Consumption))
            * time.step_seconds();
        let fill = previous.fill_ratio * self.capacity + delta;

        if !(0.0..=self.capacity).contains(&fill) {
            return Err(ApplianceError::TankFull {
                fill,
                capacity: self.capacity,
            });
        }

        let mut outputs = PortMap::new();
        if let Some(consumed) = inputs.get(&WaterTankPort::Consumption) {
            outputs.insert(WaterTankPort::Out, *consumed);
        }
        Ok((
            WaterTankState {
                fill_ratio: fill / self.capacity,
            },
            outputs,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ConnectionState;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn time() -> SimulationTime {
        SimulationTime::new(TimeDelta::seconds(10), Utc.timestamp_opt(0, 0).unwrap())
    }

    #[test]
    fn balances_inflow_and_consumption() {
        let tank = WaterTank::new(1000.0).unwrap();
        let inputs = PortMap::from([
            (WaterTankPort::In0, ConnectionState::new(2.0, 20.0)),
            (WaterTankPort::In1, ConnectionState::new(1.0, 20.0)),
            (WaterTankPort::Consumption, ConnectionState::new(1.0, 25.0)),
        ]);
        let (state, out) = tank
            .simulate(&inputs, &WaterTankState { fill_ratio: 0.5 }, None, &time())
            .unwrap();
        assert_relative_eq!(state.fill_ratio, 0.52);
        assert_eq!(out[&WaterTankPort::Out], ConnectionState::new(1.0, 25.0));
    }

    #[test]
    fn overflow_is_an_error() {
        let tank = WaterTank::new(100.0).unwrap();
        let inputs = PortMap::from([(WaterTankPort::In0, ConnectionState::new(2.0, 20.0))]);
        let err = tank
            .simulate(&inputs, &WaterTankState { fill_ratio: 0.9 }, None, &time())
            .unwrap_err();
        assert!(matches!(err, ApplianceError::TankFull { .. }));
    }

    #[test]
    fn running_dry_is_an_error() {
        let tank = WaterTank::new(100.0).unwrap();
        let inputs = PortMap::from([(WaterTankPort::Consumption, ConnectionState::new(2.0, 20.0))]);
        assert!(tank
            .simulate(&inputs, &WaterTankState { fill_ratio: 0.1 }, None, &time())
            .is_err());
    }

    #[test]
    fn exactly_full_is_allowed() {
        let tank = WaterTank::new(100.0).unwrap();
        let inputs = PortMap::from([(WaterTankPort::In0, ConnectionState::new(1.0, 20.0))]);
        let (state, out) = tank
            .simulate(&inputs, &WaterTankState { fill_ratio: 0.9 }, None, &time())
            .unwrap();
        assert_relative_eq!(state.fill_ratio, 1.0);
        assert!(out.is_empty());
    }
}
