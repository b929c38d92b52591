//! Electric compression chiller with fixed cooling capacity.

use eb_core::SimulationTime;
use eb_core::units::{JoulePerLiterKelvin, Watt};
use serde::{Deserialize, Serialize};

use crate::common::is_flowing;
use crate::error::ApplianceResult;
use crate::traits::{Appliance, NoState, PortMap, ports};

ports!(ChillerPort {
    ChilledIn => "chilled_in",
    ChilledOut => "chilled_out",
    CoolingIn => "cooling_in",
    CoolingOut => "cooling_out",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChillerControl {
    pub on: bool,
}

/// Moves `cooling_capacity` watts from the chilled circuit to the cooling circuit.
///
/// Runs only while switched on and both circuits are flowing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chiller {
    pub cooling_capacity: Watt,
    pub specific_heat_chilled: JoulePerLiterKelvin,
    pub specific_heat_cooling: JoulePerLiterKelvin,
}

impl Chiller {
    pub fn new(
        cooling_capacity: Watt,
        specific_heat_chilled: JoulePerLiterKelvin,
        specific_heat_cooling: JoulePerLiterKelvin,
    ) -> Self {
        Self {
            cooling_capacity,
            specific_heat_chilled,
            specific_heat_cooling,
        }
    }
}

impl Appliance for Chiller {
    type State = NoState;
    type Control = ChillerControl;
    type Port = ChillerPort;

    fn simulate(
        &self,
        inputs: &PortMap<ChillerPort>,
        _previous: &NoState,
        control: Option<&ChillerControl>,
        _time: &SimulationTime,
    ) -> ApplianceResult<(NoState, PortMap<ChillerPort>)> {
        let chilled = inputs.get(&ChillerPort::ChilledIn).copied();
        let cooling = inputs.get(&ChillerPort::CoolingIn).copied();
        let on = control.is_some_and(|c| c.on);

        let mut outputs = PortMap::new();
        match (chilled, cooling) {
            (Some(chilled), Some(cooling))
                if on && is_flowing(chilled.flow) && is_flowing(cooling.flow) =>
            {
                let chilled_drop =
                    self.cooling_capacity / (chilled.flow * self.specific_heat_chilled);
                let cooling_rise =
                    self.cooling_capacity / (cooling.flow * self.specific_heat_cooling);
                outputs.insert(
                    ChillerPort::ChilledOut,
                    chilled.with_temperature(chilled.temperature - chilled_drop),
                );
                outputs.insert(
                    ChillerPort::CoolingOut,
                    cooling.with_temperature(cooling.temperature + cooling_rise),
                );
            }
            _ => {
                if let Some(chilled) = chilled {
                    outputs.insert(ChillerPort::ChilledOut, chilled);
                }
                if let Some(cooling) = cooling {
                    outputs.insert(ChillerPort::CoolingOut, cooling);
                }
            }
        }
        Ok((NoState, outputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ConnectionState;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn run(on: bool, chilled_flow: f64) -> PortMap<ChillerPort> {
        let time = SimulationTime::new(TimeDelta::seconds(1), Utc.timestamp_opt(0, 0).unwrap());
        let chiller = Chiller::new(1000.0, 100.0, 200.0);
        let inputs = PortMap::from([
            (ChillerPort::ChilledIn, ConnectionState::new(chilled_flow, 15.0)),
            (ChillerPort::CoolingIn, ConnectionState::new(1.0, 25.0)),
        ]);
        chiller
            .simulate(&inputs, &NoState, Some(&ChillerControl { on }), &time)
            .unwrap()
            .1
    }

    #[test]
    fn moves_heat_when_running() {
        let out = run(true, 2.0);
        assert_relative_eq!(out[&ChillerPort::ChilledOut].temperature, 10.0);
        assert_relative_eq!(out[&ChillerPort::CoolingOut].temperature, 30.0);
    }

    #[test]
    fn passes_through_when_off_or_stagnant() {
        for out in [run(false, 2.0), run(true, 0.0)] {
            assert_eq!(out[&ChillerPort::ChilledOut].temperature, 15.0);
            assert_eq!(out[&ChillerPort::CoolingOut].temperature, 25.0);
        }
    }
}
