//! Reverse-osmosis water maker.

use eb_core::SimulationTime;
use eb_core::units::Ratio;

use crate::error::ApplianceResult;
use crate::traits::{Appliance, NoControl, NoState, PortMap, ports};

ports!(WaterMakerPort {
    In => "in",
    DesalinatedOut => "desalinated_out",
    BrineOut => "brine_out",
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterMaker {
    pub efficiency: Ratio,
}

impl Appliance for WaterMaker {
    type State = NoState;
    type Control = NoControl;
    type Port = WaterMakerPort;

    fn simulate(
        &self,
        inputs: &PortMap<WaterMakerPort>,
        _previous: &NoState,
        _control: Option<&NoControl>,
        _time: &SimulationTime,
    ) -> ApplianceResult<(NoState, PortMap<WaterMakerPort>)> {
        let Some(inlet) = inputs.get(&WaterMakerPort::In) else {
            return Ok((NoState, PortMap::new()));
        };
        Ok((
            NoState,
            PortMap::from([
                (
                    WaterMakerPort::DesalinatedOut,
                    inlet.with_flow(inlet.flow * self.efficiency),
                ),
                (
                    WaterMakerPort::BrineOut,
                    inlet.with_flow(inlet.flow * (1.0 - self.efficiency)),
                ),
            ]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ConnectionState;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, TimeZone, Utc};

    #[test]
    fn splits_seawater() {
        let maker = WaterMaker { efficiency: 0.25 };
        let time = SimulationTime::new(TimeDelta::seconds(1), Utc.timestamp_opt(0, 0).unwrap());
        let inputs = PortMap::from([(WaterMakerPort::In, ConnectionState::new(2.0, 24.0))]);
        let (_, out) = maker.simulate(&inputs, &NoState, None, &time).unwrap();
        assert_relative_eq!(out[&WaterMakerPort::DesalinatedOut].flow, 0.5);
        assert_relative_eq!(out[&WaterMakerPort::BrineOut].flow, 1.5);
        assert_eq!(out[&WaterMakerPort::BrineOut].temperature, 24.0);
    }
}
