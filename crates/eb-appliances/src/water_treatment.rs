//! Grey water treatment unit.

use eb_core::SimulationTime;
use eb_core::units::Ratio;
use serde::{Deserialize, Serialize};

use crate::error::ApplianceResult;
use crate::traits::{Appliance, NoState, PortMap, ports};

ports!(WaterTreatmentPort {
    In => "in",
    Out => "out",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterTreatmentControl {
    pub on: bool,
}

/// Delivers `efficiency` of its inlet flow while on; nothing otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterTreatment {
    pub efficiency: Ratio,
}

impl Appliance for WaterTreatment {
    type State = NoState;
    type Control = WaterTreatmentControl;
    type Port = WaterTreatmentPort;

    fn simulate(
        &self,
        inputs: &PortMap<WaterTreatmentPort>,
        _previous: &NoState,
        control: Option<&WaterTreatmentControl>,
        _time: &SimulationTime,
    ) -> ApplianceResult<(NoState, PortMap<WaterTreatmentPort>)> {
        let Some(inlet) = inputs.get(&WaterTreatmentPort::In) else {
            return Ok((NoState, PortMap::new()));
        };
        let on = control.is_some_and(|c| c.on);
        let flow = if on { inlet.flow * self.efficiency } else { 0.0 };
        Ok((
            NoState,
            PortMap::from([(WaterTreatmentPort::Out, inlet.with_flow(flow))]),
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
    fn only_treats_while_on() {
        let unit = WaterTreatment { efficiency: 0.5 };
        let time = SimulationTime::new(TimeDelta::seconds(1), Utc.timestamp_opt(0, 0).unwrap());
        let inputs = PortMap::from([(WaterTreatmentPort::In, ConnectionState::new(0.4, 20.0))]);

        let on = WaterTreatmentControl { on: true };
        let (_, out) = unit.simulate(&inputs, &NoState, Some(&on), &time).unwrap();
        assert_relative_eq!(out[&WaterTreatmentPort::Out].flow, 0.2);

        let (_, out) = unit.simulate(&inputs, &NoState, None, &time).unwrap();
        assert_eq!(out[&WaterTreatmentPort::Out].flow, 0.0);
    }
}
