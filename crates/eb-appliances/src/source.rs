//! Constant-flow source with a scheduled temperature.

use eb_core::units::LiterPerSecond;
use eb_core::{Schedule, SimulationTime};

use crate::error::ApplianceResult;
use crate::traits::{Appliance, ConnectionState, NoControl, NoState, PortMap, ports};

ports!(SourcePort { Out => "out" });

#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub flow: LiterPerSecond,
    pub temperature: Schedule,
}

impl Source {
    pub fn new(flow: LiterPerSecond, temperature: impl Into<Schedule>) -> Self {
        Self {
            flow,
            temperature: temperature.into(),
        }
    }
}

impl Appliance for Source {
    type State = NoState;
    type Control = NoControl;
    type Port = SourcePort;

    fn simulate(
        &self,
        _inputs: &PortMap<SourcePort>,
        _previous: &NoState,
        _control: Option<&NoControl>,
        time: &SimulationTime,
    ) -> ApplianceResult<(NoState, PortMap<SourcePort>)> {
        let temperature = self.temperature.at(time)?;
        Ok((
            NoState,
            PortMap::from([(SourcePort::Out, ConnectionState::new(self.flow, temperature))]),
        ))
    }
}
