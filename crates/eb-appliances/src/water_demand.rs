//! Scheduled water consumption of the building.

use eb_core::{Schedule, SimulationTime};

use crate::error::ApplianceResult;
use crate::traits::{Appliance, ConnectionState, NoControl, NoState, PortMap, ports};

ports!(WaterDemandPort {
    DemandOut => "demand_out",
    GreyWaterOut => "grey_water_out",
});

/// Draws the scheduled flow from the supply side and returns it as grey water.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterDemand {
    pub flow: Schedule,
    pub temperature: Schedule,
}

impl Appliance for WaterDemand {
    type State = NoState;
    type Control = NoControl;
    type Port = WaterDemandPort;

    fn simulate(
        &self,
        _inputs: &PortMap<WaterDemandPort>,
        _previous: &NoState,
        _control: Option<&NoControl>,
        time: &SimulationTime,
    ) -> ApplianceResult<(NoState, PortMap<WaterDemandPort>)> {
        let demand = ConnectionState::new(self.flow.at(time)?, self.temperature.at(time)?);
        Ok((
            NoState,
            PortMap::from([
                (WaterDemandPort::DemandOut, demand),
                (WaterDemandPort::GreyWaterOut, demand),
            ]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    #[test]
    fn follows_the_schedule() {
        let start = Utc.timestamp_opt(0, 0).unwrap();
        let demand = WaterDemand {
            flow: Schedule::Periodic {
                start,
                period: TimeDelta::seconds(2),
                values: vec![0.1, 0.3],
            },
            temperature: Schedule::Const(20.0),
        };
        let time = SimulationTime::new(TimeDelta::seconds(1), start).next();
        let (_, out) = demand.simulate(&PortMap::new(), &NoState, None, &time).unwrap();
        assert_eq!(out[&WaterDemandPort::DemandOut], ConnectionState::new(0.3, 20.0));
        assert_eq!(out[&WaterDemandPort::GreyWaterOut], ConnectionState::new(0.3, 20.0));
    }
}
