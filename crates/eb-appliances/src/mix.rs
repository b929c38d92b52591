//! Two-into-one mixer.

use eb_core::SimulationTime;
use eb_core::numeric::weighted_mean;

use crate::error::ApplianceResult;
use crate::traits::{Appliance, ConnectionState, NoControl, NoState, PortMap, ports};

ports!(MixPort {
    A => "a",
    B => "b",
    Ab => "ab",
});

/// Combines A and B into AB with a flow-weighted temperature.
///
/// With zero total flow the output temperature is the plain mean of the
/// inputs, so stagnant loops keep a meaningful temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mix;

impl Appliance for Mix {
    type State = NoState;
    type Control = NoControl;
    type Port = MixPort;

    fn simulate(
        &self,
        inputs: &PortMap<MixPort>,
        _previous: &NoState,
        _control: Option<&NoControl>,
        _time: &SimulationTime,
    ) -> ApplianceResult<(NoState, PortMap<MixPort>)> {
        let present: Vec<ConnectionState> = [MixPort::A, MixPort::B]
            .iter()
            .filter_map(|port| inputs.get(port).copied())
            .collect();
        if present.is_empty() {
            return Ok((NoState, PortMap::new()));
        }

        let flow: f64 = present.iter().map(|c| c.flow).sum();
        let pairs: Vec<(f64, f64)> = present.iter().map(|c| (c.flow, c.temperature)).collect();
        let temperature = weighted_mean(&pairs).unwrap_or_else(|| {
            present.iter().map(|c| c.temperature).sum::<f64>() / present.len() as f64
        });

        Ok((
            NoState,
            PortMap::from([(MixPort::Ab, ConnectionState::new(flow, temperature))]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};

    fn mix(a: ConnectionState, b: ConnectionState) -> ConnectionState {
        let time = SimulationTime::new(TimeDelta::seconds(1), Utc::now());
        let inputs = PortMap::from([(MixPort::A, a), (MixPort::B, b)]);
        let (_, out) = Mix.simulate(&inputs, &NoState, None, &time).unwrap();
        out[&MixPort::Ab]
    }

    #[test]
    fn weights_by_flow() {
        let out = mix(ConnectionState::new(1.0, 10.0), ConnectionState::new(3.0, 30.0));
        assert_eq!(out.flow, 4.0);
        assert_eq!(out.temperature, 25.0);
    }

    #[test]
    fn zero_flow_takes_arithmetic_mean() {
        let out = mix(ConnectionState::new(0.0, 10.0), ConnectionState::new(0.0, 40.0));
        assert_eq!(out.flow, 0.0);
        assert_eq!(out.temperature, 25.0);
    }
}
