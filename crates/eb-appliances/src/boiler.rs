//! Stratification-free storage tank with heater, heat exchanger coil and fill line.

use eb_core::SimulationTime;
use eb_core::units::{Celsius, JoulePerLiterKelvin, Liter, Watt};
use serde::{Deserialize, Serialize};

use crate::common::{check_finite, check_positive};
use crate::error::{ApplianceError, ApplianceResult};
use crate::traits::{Appliance, PortMap, ports};

ports!(BoilerPort {
    HeatExchangeIn => "heat_exchange_in",
    HeatExchangeOut => "heat_exchange_out",
    FillIn => "fill_in",
    FillOut => "fill_out",
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoilerState {
    pub temperature: Celsius,
    pub ambient_temperature: Celsius,
}

impl BoilerState {
    pub fn new(temperature: Celsius, ambient_temperature: Celsius) -> Self {
        Self {
            temperature,
            ambient_temperature,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoilerControl {
    pub heater_on: bool,
}

/// Well-mixed tank.
///
/// Each step the tank content, the electric element, and whatever flows
/// through the exchange coil and the fill line settle to one equilibrium
/// temperature. Heat loss applies only while the tank is above ambient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boiler {
    pub volume: Liter,
    pub heater_power: Watt,
    /// Loss to the surroundings while above ambient (W)
    pub heat_loss: Watt,
    pub specific_heat_exchange: JoulePerLiterKelvin,
    pub specific_heat_fill: JoulePerLiterKelvin,
}

impl Boiler {
    pub fn new(
        volume: Liter,
        heater_power: Watt,
        heat_loss: Watt,
        specific_heat_exchange: JoulePerLiterKelvin,
        specific_heat_fill: JoulePerLiterKelvin,
    ) -> ApplianceResult<Self> {
        if volume < 0.0 || heater_power < 0.0 || heat_loss < 0.0 {
            return Err(ApplianceError::InvalidArg {
                what: "boiler volume, heater power and heat loss must be non-negative",
            });
        }
        check_positive(specific_heat_exchange, "boiler exchange specific heat")?;
        check_positive(specific_heat_fill, "boiler fill specific heat")?;
        Ok(Self {
            volume,
            heater_power,
            heat_loss,
            specific_heat_exchange,
            specific_heat_fill,
        })
    }
}

impl Appliance for Boiler {
    type State = BoilerState;
    type Control = BoilerControl;
    type Port = BoilerPort;

    fn simulate(
        &self,
        inputs: &PortMap<BoilerPort>,
        previous: &BoilerState,
        control: Option<&BoilerControl>,
        time: &SimulationTime,
    ) -> ApplianceResult<(BoilerState, PortMap<BoilerPort>)> {
        let dt = time.step_seconds();
        let heater_on = control.is_some_and(|c| c.heater_on);

        let tank_capacity = self.volume * self.specific_heat_fill;
        let element = if heater_on { self.heater_power * dt } else { 0.0 };
        let loss = if previous.temperature > previous.ambient_temperature {
            self.heat_loss * dt
        } else {
            0.0
        };

        let exchange = inputs.get(&BoilerPort::HeatExchangeIn);
        let fill = inputs.get(&BoilerPort::FillIn);
        let exchange_capacity = exchange.map_or(0.0, |c| c.flow * dt * self.specific_heat_exchange);
        let fill_capacity = fill.map_or(0.0, |c| c.flow * dt * self.specific_heat_fill);

        let total_capacity = tank_capacity + exchange_capacity + fill_capacity;
        if total_capacity <= 0.0 {
            return Err(ApplianceError::NonPhysical {
                what: "boiler has no heat capacity this step",
            });
        }

        let energy = element + tank_capacity * previous.temperature
            + exchange.map_or(0.0, |c| exchange_capacity * c.temperature)
            + fill.map_or(0.0, |c| fill_capacity * c.temperature)
            - loss;
        let equilibrium = check_finite(energy / total_capacity, "boiler temperature")?;

        let mut outputs = PortMap::new();
        if let Some(inlet) = exchange {
            outputs.insert(BoilerPort::HeatExchangeOut, inlet.with_temperature(equilibrium));
        }
        if let Some(inlet) = fill {
            outputs.insert(BoilerPort::FillOut, inlet.with_temperature(equilibrium));
        }

        Ok((
            BoilerState::new(equilibrium, previous.ambient_temperature),
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
        SimulationTime::new(TimeDelta::seconds(1), Utc.timestamp_opt(0, 0).unwrap())
    }

    #[test]
    fn heater_raises_temperature() {
        let boiler = Boiler::new(1.0, 10.0, 0.0, 1.0, 1.0).unwrap();
        let on = BoilerControl { heater_on: true };
        let (state, outputs) = boiler
            .simulate(&PortMap::new(), &BoilerState::new(20.0, 20.0), Some(&on), &time())
            .unwrap();
        assert_relative_eq!(state.temperature, 30.0);
        assert!(outputs.is_empty());
    }

    #[test]
    fn heat_loss_only_above_ambient() {
        let boiler = Boiler::new(10.0, 0.0, 5.0, 1.0, 1.0).unwrap();
        let (warm, _) = boiler
            .simulate(&PortMap::new(), &BoilerState::new(30.0, 20.0), None, &time())
            .unwrap();
        assert_relative_eq!(warm.temperature, 29.5);

        let (cold, _) = boiler
            .simulate(&PortMap::new(), &BoilerState::new(10.0, 20.0), None, &time())
            .unwrap();
        assert_relative_eq!(cold.temperature, 10.0);
    }

    #[test]
    fn exchange_and_fill_leave_at_equilibrium() {
        let boiler = Boiler::new(2.0, 0.0, 0.0, 1.0, 1.0).unwrap();
        let inputs = PortMap::from([
            (BoilerPort::HeatExchangeIn, ConnectionState::new(1.0, 80.0)),
            (BoilerPort::FillIn, ConnectionState::new(1.0, 20.0)),
        ]);
        let (state, outputs) = boiler
            .simulate(&inputs, &BoilerState::new(50.0, 20.0), None, &time())
            .unwrap();
        assert_relative_eq!(state.temperature, 50.0);
        assert_eq!(outputs[&BoilerPort::HeatExchangeOut], ConnectionState::new(1.0, 50.0));
        assert_eq!(outputs[&BoilerPort::FillOut], ConnectionState::new(1.0, 50.0));
    }

    #[test]
    fn empty_boiler_without_flow_is_rejected() {
        let boiler = Boiler::new(0.0, 0.0, 0.0, 1.0, 1.0).unwrap();
        let err = boiler
            .simulate(&PortMap::new(), &BoilerState::new(20.0, 20.0), None, &time())
            .unwrap_err();
        assert!(matches!(err, ApplianceError::NonPhysical { .. }));
    }
}
