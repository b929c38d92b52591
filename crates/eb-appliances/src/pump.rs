//! On/off and frequency-controlled pumps.

use eb_core::SimulationTime;
use eb_core::units::{LiterPerSecond, Ratio};
use serde::{Deserialize, Serialize};

use crate::error::ApplianceResult;
use crate::traits::{Appliance, ConnectionState, NoState, PortMap, ports};

ports!(PumpPort {
    In => "in",
    Out => "out",
});

/// Fixed-speed pump: rated flow when on, nothing when off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchPump {
    pub rated_flow: LiterPerSecond,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchPumpControl {
    pub on: bool,
    /// Overrides the rated flow while on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<LiterPerSecond>,
}

impl SwitchPumpControl {
    pub fn on() -> Self {
        Self {
            on: true,
            flow: None,
        }
    }

    pub fn off() -> Self {
        Self::default()
    }

    pub fn running(on: bool) -> Self {
        Self { on, flow: None }
    }
}

impl SwitchPump {
    pub fn new(rated_flow: LiterPerSecond) -> Self {
        Self { rated_flow }
    }
}

impl Appliance for SwitchPump {
    type State = NoState;
    type Control = SwitchPumpControl;
    type Port = PumpPort;

    /// Missing control means the pump is off.
    fn simulate(
        &self,
        inputs: &PortMap<PumpPort>,
        _previous: &NoState,
        control: Option<&SwitchPumpControl>,
        _time: &SimulationTime,
    ) -> ApplianceResult<(NoState, PortMap<PumpPort>)> {
        let flow = match control {
            Some(c) if c.on => c.flow.unwrap_or(self.rated_flow),
            _ => 0.0,
        };
        Ok((NoState, pumped(inputs, flow)))
    }
}

/// Variable-speed pump driven by a frequency ratio of its maximum flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyPump {
    pub max_flow: LiterPerSecond,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyPumpControl {
    pub on: bool,
    pub frequency_ratio: Ratio,
}

impl FrequencyPumpControl {
    pub fn new(on: bool, frequency_ratio: Ratio) -> Self {
        Self {
            on,
            frequency_ratio,
        }
    }
}

impl FrequencyPump {
    pub fn new(max_flow: LiterPerSecond) -> Self {
        Self { max_flow }
    }
}

impl Appliance for FrequencyPump {
    type State = NoState;
    type Control = FrequencyPumpControl;
    type Port = PumpPort;

    fn simulate(
        &self,
        inputs: &PortMap<PumpPort>,
        _previous: &NoState,
        control: Option<&FrequencyPumpControl>,
        _time: &SimulationTime,
    ) -> ApplianceResult<(NoState, PortMap<PumpPort>)> {
        let flow = match control {
            Some(c) if c.on => self.max_flow * c.frequency_ratio.clamp(0.0, 1.0),
            _ => 0.0,
        };
        Ok((NoState, pumped(inputs, flow)))
    }
}

fn pumped(inputs: &PortMap<PumpPort>, flow: LiterPerSecond) -> PortMap<PumpPort> {
    inputs
        .get(&PumpPort::In)
        .map(|inlet| PortMap::from([(PumpPort::Out, ConnectionState::new(flow, inlet.temperature))]))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn run<A: Appliance<State = NoState, Port = PumpPort>>(
        pump: &A,
        control: Option<&A::Control>,
    ) -> ConnectionState {
        let time = SimulationTime::new(TimeDelta::seconds(1), Utc.timestamp_opt(0, 0).unwrap());
        let inputs = PortMap::from([(PumpPort::In, ConnectionState::new(0.0, 42.0))]);
        let (_, out) = pump.simulate(&inputs, &NoState, control, &time).unwrap();
        out[&PumpPort::Out]
    }

    #[test]
    fn switch_pump_gates_flow() {
        let pump = SwitchPump::new(2.5);
        assert_eq!(run(&pump, Some(&SwitchPumpControl::on())), ConnectionState::new(2.5, 42.0));
        assert_eq!(run(&pump, Some(&SwitchPumpControl::off())), ConnectionState::new(0.0, 42.0));
        assert_eq!(run(&pump, None).flow, 0.0);
    }

    #[test]
    fn switch_pump_flow_override() {
        let pump = SwitchPump::new(2.5);
        let control = SwitchPumpControl {
            on: true,
            flow: Some(1.0),
        };
        assert_eq!(run(&pump, Some(&control)).flow, 1.0);
    }

    #[test]
    fn frequency_pump_scales_max_flow() {
        let pump = FrequencyPump::new(5.0);
        assert_eq!(run(&pump, Some(&FrequencyPumpControl::new(true, 0.5))).flow, 2.5);
        assert_eq!(run(&pump, Some(&FrequencyPumpControl::new(false, 0.5))).flow, 0.0);
        assert_eq!(run(&pump, Some(&FrequencyPumpControl::new(true, 1.5))).flow, 5.0);
    }
}
