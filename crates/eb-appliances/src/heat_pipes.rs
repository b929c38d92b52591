//! Evacuated-tube solar collector field.

use eb_core::units::{Celsius, JoulePerLiterKelvin, MeterSquared, Watt};
use eb_core::{Schedule, SimulationTime};
use serde::{Deserialize, Serialize};

use crate::common::is_flowing;
use crate::error::ApplianceResult;
use crate::traits::{Appliance, NoControl, PortMap, ports};

ports!(HeatPipesPort {
    In => "in",
    Out => "out",
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPipesState {
    pub mean_temperature: Celsius,
}

/// Collector with the quadratic efficiency curve
/// `P = area * (neta0 * G - a1 * dT - a2 * dT^2)`, where `dT` is the mean
/// collector temperature above ambient.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatPipes {
    pub neta0: f64,
    pub a1: f64,
    pub a2: f64,
    pub area: MeterSquared,
    pub specific_heat: JoulePerLiterKelvin,
    /// Global irradiance on the collector plane (W/m2)
    pub irradiance: Schedule,
    pub ambient_temperature: Schedule,
}

impl HeatPipes {
    pub fn power(&self, mean_temperature: Celsius, irradiance: f64, ambient: Celsius) -> Watt {
        let dt = mean_temperature - ambient;
        self.area * (self.neta0 * irradiance - self.a1 * dt - self.a2 * dt * dt)
    }
}

impl Appliance for HeatPipes {
    type State = HeatPipesState;
    type Control = NoControl;
    type Port = HeatPipesPort;

    /// Stagnant collectors keep their mean temperature and emit no flow.
    fn simulate(
        &self,
        inputs: &PortMap<HeatPipesPort>,
        previous: &HeatPipesState,
        _control: Option<&NoControl>,
        time: &SimulationTime,
    ) -> ApplianceResult<(HeatPipesState, PortMap<HeatPipesPort>)> {
        let Some(inlet) = inputs.get(&HeatPipesPort::In).copied() else {
            return Ok((*previous, PortMap::new()));
        };
        if !is_flowing(inlet.flow) {
            return Ok((
                *previous,
                PortMap::from([(HeatPipesPort::Out, inlet.with_flow(0.0))]),
            ));
        }

        let power = self.power(
            previous.mean_temperature,
            self.irradiance.at(time)?,
            self.ambient_temperature.at(time)?,
        );
        let out = inlet.temperature + power / (inlet.flow * self.specific_heat);

        Ok((
            HeatPipesState {
                mean_temperature: (inlet.temperature + out) / 2.0,
            },
            PortMap::from([(HeatPipesPort::Out, inlet.with_temperature(out))]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ConnectionState;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn pipes(ambient: f64) -> HeatPipes {
        HeatPipes {
            neta0: 0.5,
            a1: 0.1,
            a2: 0.1,
            area: 1.0,
            specific_heat: 1.0,
            irradiance: Schedule::Const(1.0),
            ambient_temperature: Schedule::Const(ambient),
        }
    }

    fn time() -> SimulationTime {
        SimulationTime::new(TimeDelta::seconds(1), Utc.timestamp_opt(0, 0).unwrap())
    }

    #[test]
    fn at_ambient_all_irradiance_is_gained() {
        let inputs = PortMap::from([(HeatPipesPort::In, ConnectionState::new(1.0, 10.0))]);
        let (state, out) = pipes(10.0)
            .simulate(&inputs, &HeatPipesState { mean_temperature: 10.0 }, None, &time())
            .unwrap();
        assert_relative_eq!(out[&HeatPipesPort::Out].temperature, 10.5);
        assert_relative_eq!(state.mean_temperature, 10.25);
    }

    #[test]
    fn losses_grow_above_ambient() {
        let inputs = PortMap::from([(HeatPipesPort::In, ConnectionState::new(1.0, 10.0))]);
        let (state, out) = pipes(9.0)
            .simulate(&inputs, &HeatPipesState { mean_temperature: 10.0 }, None, &time())
            .unwrap();
        assert_relative_eq!(out[&HeatPipesPort::Out].temperature, 10.3);
        assert_relative_eq!(state.mean_temperature, 10.15);
    }

    #[test]
    fn stagnation_keeps_state() {
        let inputs = PortMap::from([(HeatPipesPort::In, ConnectionState::new(0.0, 30.0))]);
        let previous = HeatPipesState { mean_temperature: 55.0 };
        let (state, out) = pipes(20.0).simulate(&inputs, &previous, None, &time()).unwrap();
        assert_eq!(state, previous);
        assert_eq!(out[&HeatPipesPort::Out], ConnectionState::new(0.0, 30.0));
    }
}
