//! Building-side cooling load.

use eb_core::units::JoulePerLiterKelvin;
use eb_core::{Schedule, SimulationTime};

use crate::common::is_flowing;
use crate::error::ApplianceResult;
use crate::traits::{Appliance, NoControl, NoState, PortMap, ports};

ports!(CoolingSinkPort {
    In => "in",
    Out => "out",
});

/// Adds the scheduled demand (W) to whatever flows through it.
#[derive(Debug, Clone, PartialEq)]
pub struct CoolingSink {
    pub demand: Schedule,
    pub specific_heat: JoulePerLiterKelvin,
}

impl Appliance for CoolingSink {
    type State = NoState;
    type Control = NoControl;
    type Port = CoolingSinkPort;

    fn simulate(
        &self,
        inputs: &PortMap<CoolingSinkPort>,
        _previous: &NoState,
        _control: Option<&NoControl>,
        time: &SimulationTime,
    ) -> ApplianceResult<(NoState, PortMap<CoolingSinkPort>)> {
        let Some(inlet) = inputs.get(&CoolingSinkPort::In).copied() else {
            return Ok((NoState, PortMap::new()));
        };
        let out = if is_flowing(inlet.flow) {
            let demand = self.demand.at(time)?;
            inlet.with_temperature(inlet.temperature + demand / (inlet.flow * self.specific_heat))
        } else {
            inlet
        };
        Ok((NoState, PortMap::from([(CoolingSinkPort::Out, out)])))
    }
}
