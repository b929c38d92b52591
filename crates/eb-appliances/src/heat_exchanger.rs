//! Ideal two-circuit heat exchanger.

use eb_core::SimulationTime;
use eb_core::numeric::weighted_mean;
use eb_core::units::JoulePerLiterKelvin;

use crate::error::ApplianceResult;
use crate::traits::{Appliance, NoControl, NoState, PortMap, ports};

ports!(HeatExchangerPort {
    AIn => "a_in",
    AOut => "a_out",
    BIn => "b_in",
    BOut => "b_out",
});

/// Both circuits leave at their common equilibrium temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatExchanger {
    pub specific_heat_a: JoulePerLiterKelvin,
    pub specific_heat_b: JoulePerLiterKelvin,
}

impl HeatExchanger {
    pub fn new(specific_heat_a: JoulePerLiterKelvin, specific_heat_b: JoulePerLiterKelvin) -> Self {
        Self {
            specific_heat_a,
            specific_heat_b,
        }
    }
}

impl Appliance for HeatExchanger {
    type State = NoState;
    type Control = NoControl;
    type Port = HeatExchangerPort;

    fn simulate(
        &self,
        inputs: &PortMap<HeatExchangerPort>,
        _previous: &NoState,
        _control: Option<&NoControl>,
        _time: &SimulationTime,
    ) -> ApplianceResult<(NoState, PortMap<HeatExchangerPort>)> {
        let a = inputs.get(&HeatExchangerPort::AIn);
        let b = inputs.get(&HeatExchangerPort::BIn);

        let mut pairs = Vec::with_capacity(2);
        if let Some(a) = a {
            pairs.push((a.flow * self.specific_heat_a, a.temperature));
        }
        if let Some(b) = b {
            pairs.push((b.flow * self.specific_heat_b, b.temperature));
        }
        let equilibrium = weighted_mean(&pairs);

        let mut outputs = PortMap::new();
        if let Some(a) = a {
            let t = equilibrium.unwrap_or(a.temperature);
            outputs.insert(HeatExchangerPort::AOut, a.with_temperature(t));
        }
        if let Some(b) = b {
            let t = equilibrium.unwrap_or(b.temperature);
            outputs.insert(HeatExchangerPort::BOut, b.with_temperature(t));
        }
        Ok((NoState, outputs))
    }
}
