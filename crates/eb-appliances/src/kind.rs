//! Closed set of appliance kinds.
//!
//! A network stores heterogeneous appliances, states, controls and ports. The
//! [`appliance_kinds!`] table below generates one tagged union per concern and
//! the [`ApplianceKind`] conversions that let typed handles get their concrete
//! values back out.

use std::collections::BTreeMap;
use std::fmt;

use eb_core::SimulationTime;

use crate::boiler::{Boiler, BoilerControl, BoilerPort, BoilerState};
use crate::chiller::{Chiller, ChillerControl, ChillerPort};
use crate::cooling_sink::{CoolingSink, CoolingSinkPort};
use crate::error::{ApplianceError, ApplianceResult};
use crate::heat_exchanger::{HeatExchanger, HeatExchangerPort};
use crate::heat_pipes::{HeatPipes, HeatPipesPort, HeatPipesState};
use crate::mix::{Mix, MixPort};
use crate::pcm::{Pcm, PcmPort, PcmState};
use crate::pump::{FrequencyPump, FrequencyPumpControl, PumpPort, SwitchPump, SwitchPumpControl};
use crate::source::{Source, SourcePort};
use crate::traits::{Appliance, ConnectionState, NoControl, NoState, Port, PortMap};
use crate::valve::{Valve, ValveControl, ValvePort, ValveState};
use crate::water_demand::{WaterDemand, WaterDemandPort};
use crate::water_maker::{WaterMaker, WaterMakerPort};
use crate::water_tank::{WaterTank, WaterTankPort, WaterTankState};
use crate::water_treatment::{WaterTreatment, WaterTreatmentControl, WaterTreatmentPort};
use crate::yazaki::{Yazaki, YazakiControl, YazakiPort};

/// Connection values keyed by type-erased port.
pub type AnyPortMap = BTreeMap<AnyPort, ConnectionState>;

/// An appliance type that belongs to the closed set of kinds.
pub trait ApplianceKind: Appliance + Sized {
    /// Stable snake_case kind name.
    const KIND: &'static str;

    fn into_any(self) -> AnyAppliance;
    fn from_any(any: &AnyAppliance) -> Option<&Self>;
    fn state_into_any(state: Self::State) -> AnyState;
    fn state_from_any(state: &AnyState) -> Option<&Self::State>;
    fn control_into_any(control: Self::Control) -> AnyControl;
    fn control_from_any(control: &AnyControl) -> Option<&Self::Control>;
    fn port_into_any(port: Self::Port) -> AnyPort;
    fn port_from_any(port: AnyPort) -> Option<Self::Port>;
}

trait Implicit: Sized {
    fn implicit() -> Option<Self> {
        None
    }
}

impl Implicit for NoState {
    fn implicit() -> Option<Self> {
        Some(NoState)
    }
}

impl Implicit for ValveState {}
impl Implicit for BoilerState {}
impl Implicit for HeatPipesState {}
impl Implicit for PcmState {}
impl Implicit for WaterTankState {}

macro_rules! appliance_kinds {
    ($($kind:ident => $name:literal { state: $state:ty, control: $control:ty, port: $port:ty }),+ $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum AnyAppliance {
            $($kind($kind)),+
        }

        #[derive(Debug, Clone, PartialEq)]
        pub enum AnyState {
            $($kind($state)),+
        }

        #[derive(Debug, Clone, PartialEq)]
        pub enum AnyControl {
            $($kind($control)),+
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum AnyPort {
            $($kind($port)),+
        }

        $(
            impl ApplianceKind for $kind {
                const KIND: &'static str = $name;

                fn into_any(self) -> AnyAppliance {
                    AnyAppliance::$kind(self)
                }

                fn from_any(any: &AnyAppliance) -> Option<&Self> {
                    match any {
                        AnyAppliance::$kind(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }

                fn state_into_any(state: $state) -> AnyState {
                    AnyState::$kind(state)
                }

                fn state_from_any(state: &AnyState) -> Option<&$state> {
                    match state {
                        AnyState::$kind(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }

                fn control_into_any(control: $control) -> AnyControl {
                    AnyControl::$kind(control)
                }

                fn control_from_any(control: &AnyControl) -> Option<&$control> {
                    match control {
                        AnyControl::$kind(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }

                fn port_into_any(port: $port) -> AnyPort {
                    AnyPort::$kind(port)
                }

                fn port_from_any(port: AnyPort) -> Option<$port> {
                    match port {
                        AnyPort::$kind(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )+

        impl AnyAppliance {
            pub fn kind(&self) -> &'static str {
                match self {
                    $(Self::$kind(_) => $name),+
                }
            }

            /// State filled in when none is defined, for appliances that
            /// carry nothing between steps.
            pub fn implicit_state(&self) -> Option<AnyState> {
                match self {
                    $(Self::$kind(_) => <$state as Implicit>::implicit().map(AnyState::$kind)),+
                }
            }

            /// Every port of the wrapped appliance.
            pub fn ports(&self) -> Vec<AnyPort> {
                match self {
                    $(Self::$kind(_) => <$port as Port>::all().iter().map(|p| AnyPort::$kind(*p)).collect()),+
                }
            }

            pub fn simulate(
                &self,
                inputs: &AnyPortMap,
                previous: &AnyState,
                control: Option<&AnyControl>,
                time: &SimulationTime,
            ) -> ApplianceResult<(AnyState, AnyPortMap)> {
                match self {
                    $(Self::$kind(appliance) => simulate_erased(appliance, inputs, previous, control, time)),+
                }
            }

            /// Decode a command for this appliance from its JSON form.
            pub fn decode_control(&self, value: serde_json::Value) -> serde_json::Result<AnyControl> {
                match self {
                    $(Self::$kind(_) => serde_json::from_value::<$control>(value).map(AnyControl::$kind)),+
                }
            }
        }

        impl AnyState {
            pub fn kind(&self) -> &'static str {
                match self {
                    $(Self::$kind(_) => $name),+
                }
            }

            pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
                match self {
                    $(Self::$kind(state) => serde_json::to_value(state)),+
                }
            }
        }

        impl AnyControl {
            pub fn kind(&self) -> &'static str {
                match self {
                    $(Self::$kind(_) => $name),+
                }
            }

            pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
                match self {
                    $(Self::$kind(control) => serde_json::to_value(control)),+
                }
            }
        }

        impl AnyPort {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$kind(port) => port.as_str()),+
                }
            }
        }
    };
}

appliance_kinds! {
    Source => "source" { state: NoState, control: NoControl, port: SourcePort },
    Mix => "mix" { state: NoState, control: NoControl, port: MixPort },
    Valve => "valve" { state: ValveState, control: ValveControl, port: ValvePort },
    SwitchPump => "switch_pump" { state: NoState, control: SwitchPumpControl, port: PumpPort },
    FrequencyPump => "frequency_pump" { state: NoState, control: FrequencyPumpControl, port: PumpPort },
    Boiler => "boiler" { state: BoilerState, control: BoilerControl, port: BoilerPort },
    HeatExchanger => "heat_exchanger" { state: NoState, control: NoControl, port: HeatExchangerPort },
    Chiller => "chiller" { state: NoState, control: ChillerControl, port: ChillerPort },
    Yazaki => "yazaki" { state: NoState, control: YazakiControl, port: YazakiPort },
    HeatPipes => "heat_pipes" { state: HeatPipesState, control: NoControl, port: HeatPipesPort },
    Pcm => "pcm" { state: PcmState, control: NoControl, port: PcmPort },
    CoolingSink => "cooling_sink" { state: NoState, control: NoControl, port: CoolingSinkPort },
    WaterTank => "water_tank" { state: WaterTankState, control: NoControl, port: WaterTankPort },
    WaterTreatment => "water_treatment" { state: NoState, control: WaterTreatmentControl, port: WaterTreatmentPort },
    WaterMaker => "water_maker" { state: NoState, control: NoControl, port: WaterMakerPort },
    WaterDemand => "water_demand" { state: NoState, control: NoControl, port: WaterDemandPort },
}

impl fmt::Display for AnyPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn simulate_erased<A: ApplianceKind>(
    appliance: &A,
    inputs: &AnyPortMap,
    previous: &AnyState,
    control: Option<&AnyControl>,
    time: &SimulationTime,
) -> ApplianceResult<(AnyState, AnyPortMap)> {
    let mismatch = |what| ApplianceError::KindMismatch {
        expected: A::KIND,
        what,
    };

    let mut typed_inputs = PortMap::new();
    for (port, conn) in inputs {
        let port = A::port_from_any(*port).ok_or_else(|| mismatch("port"))?;
        typed_inputs.insert(port, *conn);
    }
    let previous = A::state_from_any(previous).ok_or_else(|| mismatch("state"))?;
    let control = control
        .map(|c| A::control_from_any(c).ok_or_else(|| mismatch("control")))
        .transpose()?;

    let (state, outputs) = appliance.simulate(&typed_inputs, previous, control, time)?;
    Ok((
        A::state_into_any(state),
        outputs
            .into_iter()
            .map(|(port, conn)| (A::port_into_any(port), conn))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn time() -> SimulationTime {
        SimulationTime::new(TimeDelta::seconds(1), Utc.timestamp_opt(0, 0).unwrap())
    }

    #[test]
    fn dispatches_to_the_wrapped_appliance() {
        let valve = Valve.into_any();
        let inputs = AnyPortMap::from([(
            AnyPort::Valve(ValvePort::Ab),
            ConnectionState::new(2.0, 30.0),
        )]);
        let control = Valve::control_into_any(ValveControl::new(0.25));
        let (state, out) = valve
            .simulate(
                &inputs,
                &AnyState::Valve(ValveState { position: 0.0 }),
                Some(&control),
                &time(),
            )
            .unwrap();
        assert_eq!(state, AnyState::Valve(ValveState { position: 0.25 }));
        assert_eq!(out[&AnyPort::Valve(ValvePort::B)].flow, 0.5);
    }

    #[test]
    fn foreign_state_is_a_kind_mismatch() {
        let err = Mix
            .into_any()
            .simulate(&AnyPortMap::new(), &AnyState::Valve(ValveState { position: 0.0 }), None, &time())
            .unwrap_err();
        assert_eq!(
            err,
            ApplianceError::KindMismatch {
                expected: "mix",
                what: "state"
            }
        );
    }

    #[test]
    fn pumps_share_ports_but_not_kinds() {
        let port = SwitchPump::port_into_any(PumpPort::Out);
        assert_eq!(SwitchPump::port_from_any(port), Some(PumpPort::Out));
        assert_eq!(FrequencyPump::port_from_any(port), None);
        assert_eq!(port.to_string(), "out");
    }

    #[test]
    fn controls_round_trip_through_json() {
        let boiler = Boiler::new(100.0, 1000.0, 0.0, 1.0, 1.0).unwrap().into_any();
        let control = Boiler::control_into_any(BoilerControl { heater_on: true });
        let json = control.to_json().unwrap();
        assert_eq!(json, serde_json::json!({ "heater_on": true }));
        assert_eq!(boiler.decode_control(json).unwrap(), control);
        assert!(boiler.decode_control(serde_json::json!({ "position": 1.0 })).is_err());
    }

    #[test]
    fn only_stateless_kinds_have_implicit_state() {
        assert_eq!(Mix.into_any().implicit_state(), Some(AnyState::Mix(NoState)));
        assert_eq!(Valve.into_any().implicit_state(), None);
    }

    #[test]
    fn lists_ports() {
        let ports = Mix.into_any().ports();
        assert_eq!(ports.len(), 3);
        assert!(ports.contains(&AnyPort::Mix(MixPort::Ab)));
    }
}
