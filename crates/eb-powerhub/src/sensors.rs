//! Sensor snapshot of the plant.
//!
//! The same structs are decoded from the live JSON feed and derived from a
//! simulated [`NetworkState`]. Every field defaults to NaN so partial payloads
//! decode; comparisons against NaN are false, which keeps guards from firing
//! on missing readings.

use chrono::{DateTime, Utc};
use eb_appliances::{
    ApplianceKind, Boiler, BoilerPort, ChillerPort, ConnectionState, HeatExchangerPort,
    HeatPipesPort, PcmPort, Valve, ValveState, WaterMakerPort, WaterTank, YazakiPort,
};
use eb_appliances::yazaki::HOT_INPUT_RANGE;
use eb_core::units::{Celsius, Ratio, Watt};
use eb_network::{Handle, NetworkState};
use serde::{Deserialize, Deserializer, Serialize};

use crate::components::{GLYCOL_SPECIFIC_HEAT, WATER_SPECIFIC_HEAT};
use crate::error::{PowerHubError, PowerHubResult};
use crate::network::PowerHub;

/// JSON has no NaN; a missing reading is written as `null` and read back as NaN.
fn nan_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Declare a sensor struct whose fields all default to NaN.
macro_rules! nan_sensors {
    ($(#[$meta:meta])* $name:ident { $($field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            $(
                #[serde(deserialize_with = "nan_if_null")]
                pub $field: f64
            ),+
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $($field: f64::NAN),+
                }
            }
        }
    };
}

nan_sensors!(HeatPipesSensors {
    flow,
    input_temperature,
    output_temperature,
});

impl HeatPipesSensors {
    pub fn power(&self) -> Watt {
        self.flow * (self.output_temperature - self.input_temperature) * GLYCOL_SPECIFIC_HEAT
    }
}

nan_sensors!(PcmSensors {
    temperature,
    state_of_charge,
    charge_flow,
    charge_input_temperature,
    charge_output_temperature,
    discharge_flow,
    discharge_input_temperature,
    discharge_output_temperature,
});

nan_sensors!(YazakiSensors {
    hot_flow,
    hot_input_temperature,
    hot_output_temperature,
    waste_flow,
    waste_input_temperature,
    waste_output_temperature,
    chilled_flow,
    chilled_input_temperature,
    chilled_output_temperature,
});

impl YazakiSensors {
    /// Heat taken out of the chilled circuit.
    pub fn chill_power(&self) -> Watt {
        self.chilled_flow
            * (self.chilled_input_temperature - self.chilled_output_temperature)
            * WATER_SPECIFIC_HEAT
    }

    /// Inputs inside the machine's operating envelope.
    pub fn within_bounds(&self) -> bool {
        let (hot_low, hot_high) = HOT_INPUT_RANGE;
        (hot_low..=hot_high).contains(&self.hot_input_temperature)
            && (15.0..=35.0).contains(&self.waste_input_temperature)
            && (5.0..=30.0).contains(&self.chilled_input_temperature)
            && self.hot_flow > 0.0
            && self.waste_flow > 0.0
            && self.chilled_flow > 0.0
    }
}

nan_sensors!(ChillerSensors {
    chilled_flow,
    chilled_input_temperature,
    chilled_output_temperature,
    waste_flow,
    waste_input_temperature,
    waste_output_temperature,
});

nan_sensors!(BoilerSensors {
    temperature,
    exchange_flow,
    exchange_input_temperature,
    exchange_output_temperature,
});

nan_sensors!(ValveSensors { position });

impl ValveSensors {
    pub const TOLERANCE: Ratio = 0.05;

    pub fn in_position(&self, target: Ratio) -> bool {
        (self.position - target).abs() < Self::TOLERANCE
    }
}

nan_sensors!(TankSensors { fill_ratio });

nan_sensors!(
    /// Waste circuit at the outboard exchanger, seen from the plant side.
    HeatDumpSensors {
        flow,
        hot_temperature,
        cold_temperature,
    }
);

impl HeatDumpSensors {
    pub fn average_temperature(&self) -> Celsius {
        (self.hot_temperature + self.cold_temperature) / 2.0
    }
}

nan_sensors!(
    /// Sea water side of the outboard exchanger.
    OutboardSensors {
        flow,
        input_temperature,
        output_temperature,
    }
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterMakerStatus {
    #[default]
    Standby,
    WaterProduction,
    Flushing,
    Stopping,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterMakerSensors {
    pub status: WaterMakerStatus,
}

impl WaterMakerSensors {
    pub fn producing(&self) -> bool {
        self.status == WaterMakerStatus::WaterProduction
    }
}

nan_sensors!(WeatherSensors {
    ambient_temperature,
    global_irradiance,
});

nan_sensors!(ElectricalSensors { battery_soc });

/// Everything the controllers read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerHubSensors {
    pub time: DateTime<Utc>,
    pub heat_pipes: HeatPipesSensors,
    pub pcm: PcmSensors,
    pub yazaki: YazakiSensors,
    pub chiller: ChillerSensors,
    pub hot_reservoir: BoilerSensors,
    pub cold_reservoir: BoilerSensors,
    pub preheat_reservoir: BoilerSensors,
    pub heat_pipes_valve: ValveSensors,
    pub hot_switch_valve: ValveSensors,
    pub chiller_switch_valve: ValveSensors,
    pub waste_switch_valve: ValveSensors,
    pub yazaki_hot_bypass_valve: ValveSensors,
    pub waste_bypass_valve: ValveSensors,
    pub preheat_bypass_valve: ValveSensors,
    pub water_filter_bypass_valve: ValveSensors,
    pub technical_water_regulator: ValveSensors,
    pub fresh_water_tank: TankSensors,
    pub technical_water_tank: TankSensors,
    pub grey_water_tank: TankSensors,
    pub heat_dump: HeatDumpSensors,
    pub outboard: OutboardSensors,
    pub water_maker: WaterMakerSensors,
    pub weather: WeatherSensors,
    pub electrical: ElectricalSensors,
}

impl PowerHubSensors {
    pub fn from_json(json: &str) -> PowerHubResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read sensors off a simulated state.
    ///
    /// The battery is not part of the plant model, so its state of charge is
    /// passed in.
    pub fn from_state(
        hub: &PowerHub,
        state: &NetworkState,
        battery_soc: Ratio,
    ) -> PowerHubResult<Self> {
        let reader = Reader { hub, state };
        let time = state.time().timestamp();
        let schedules = hub.schedules();

        let heat_pipes_in = reader.port(hub.heat_pipes, HeatPipesPort::In);
        let pcm_state = reader.appliance(hub.pcm)?;
        let charge_in = reader.port(hub.pcm, PcmPort::ChargeIn);
        let discharge_in = reader.port(hub.pcm, PcmPort::DischargeIn);
        let hot_in = reader.port(hub.yazaki, YazakiPort::HotIn);
        let waste_in = reader.port(hub.yazaki, YazakiPort::CoolingIn);
        let chilled_in = reader.port(hub.yazaki, YazakiPort::ChilledIn);
        let chiller_chilled_in = reader.port(hub.chiller, ChillerPort::ChilledIn);
        let chiller_waste_in = reader.port(hub.chiller, ChillerPort::CoolingIn);
        let dump_in = reader.port(hub.outboard_exchange, HeatExchangerPort::AIn);
        let sea_in = reader.port(hub.outboard_exchange, HeatExchangerPort::BIn);
        let desalinated = reader.port(hub.water_maker, WaterMakerPort::DesalinatedOut);

        Ok(Self {
            time,
            heat_pipes: HeatPipesSensors {
                flow: heat_pipes_in.flow,
                input_temperature: heat_pipes_in.temperature,
                output_temperature: reader
                    .port(hub.heat_pipes, HeatPipesPort::Out)
                    .temperature,
            },
            pcm: PcmSensors {
                temperature: pcm_state.temperature,
                state_of_charge: pcm_state.state_of_charge,
                charge_flow: charge_in.flow,
                charge_input_temperature: charge_in.temperature,
                charge_output_temperature: reader.port(hub.pcm, PcmPort::ChargeOut).temperature,
                discharge_flow: discharge_in.flow,
                discharge_input_temperature: discharge_in.temperature,
                discharge_output_temperature: reader
                    .port(hub.pcm, PcmPort::DischargeOut)
                    .temperature,
            },
            yazaki: YazakiSensors {
                hot_flow: hot_in.flow,
                hot_input_temperature: hot_in.temperature,
                hot_output_temperature: reader.port(hub.yazaki, YazakiPort::HotOut).temperature,
                waste_flow: waste_in.flow,
                waste_input_temperature: waste_in.temperature,
                waste_output_temperature: reader
                    .port(hub.yazaki, YazakiPort::CoolingOut)
                    .temperature,
                chilled_flow: chilled_in.flow,
                chilled_input_temperature: chilled_in.temperature,
                chilled_output_temperature: reader
                    .port(hub.yazaki, YazakiPort::ChilledOut)
                    .temperature,
            },
            chiller: ChillerSensors {
                chilled_flow: chiller_chilled_in.flow,
                chilled_input_temperature: chiller_chilled_in.temperature,
                chilled_output_temperature: reader
                    .port(hub.chiller, ChillerPort::ChilledOut)
                    .temperature,
                waste_flow: chiller_waste_in.flow,
                waste_input_temperature: chiller_waste_in.temperature,
                waste_output_temperature: reader
                    .port(hub.chiller, ChillerPort::CoolingOut)
                    .temperature,
            },
            hot_reservoir: reader.boiler(hub.hot_reservoir)?,
            cold_reservoir: reader.boiler(hub.cold_reservoir)?,
            preheat_reservoir: reader.boiler(hub.preheat_reservoir)?,
            heat_pipes_valve: reader.valve(hub.heat_pipes_valve)?,
            hot_switch_valve: reader.valve(hub.hot_switch_valve)?,
            chiller_switch_valve: reader.valve(hub.chiller_switch_valve)?,
            waste_switch_valve: reader.valve(hub.waste_switch_valve)?,
            yazaki_hot_bypass_valve: reader.valve(hub.yazaki_hot_bypass_valve)?,
            waste_bypass_valve: reader.valve(hub.waste_bypass_valve)?,
            preheat_bypass_valve: reader.valve(hub.preheat_bypass_valve)?,
            water_filter_bypass_valve: reader.valve(hub.water_filter_bypass_valve)?,
            technical_water_regulator: reader.valve(hub.technical_water_regulator)?,
            fresh_water_tank: reader.tank(hub.fresh_water_tank)?,
            technical_water_tank: reader.tank(hub.technical_water_tank)?,
            grey_water_tank: reader.tank(hub.grey_water_tank)?,
            heat_dump: HeatDumpSensors {
                flow: dump_in.flow,
                hot_temperature: dump_in.temperature,
                cold_temperature: reader
                    .port(hub.outboard_exchange, HeatExchangerPort::AOut)
                    .temperature,
            },
            outboard: OutboardSensors {
                flow: sea_in.flow,
                input_temperature: sea_in.temperature,
                output_temperature: reader
                    .port(hub.outboard_exchange, HeatExchangerPort::BOut)
                    .temperature,
            },
            water_maker: WaterMakerSensors {
                status: if desalinated.flow > 0.0 {
                    WaterMakerStatus::WaterProduction
                } else {
                    WaterMakerStatus::Standby
                },
            },
            weather: WeatherSensors {
                ambient_temperature: schedules.ambient_temperature.at(state.time())?,
                global_irradiance: schedules.global_irradiance.at(state.time())?,
            },
            electrical: ElectricalSensors { battery_soc },
        })
    }
}

struct Reader<'a> {
    hub: &'a PowerHub,
    state: &'a NetworkState,
}

impl Reader<'_> {
    /// Value seen at a port; an unwired or silent port reads as no flow.
    fn port<A: ApplianceKind>(&self, handle: Handle<A>, port: A::Port) -> ConnectionState {
        self.state
            .connection(handle, port)
            .copied()
            .unwrap_or(ConnectionState::new(0.0, f64::NAN))
    }

    fn appliance<A: ApplianceKind>(&self, handle: Handle<A>) -> PowerHubResult<&A::State> {
        self.state
            .appliance(handle)
            .ok_or_else(|| PowerHubError::Sensors {
                what: format!(
                    "no state for {}",
                    self.hub.network().name(handle.id())
                ),
            })
    }

    fn boiler(&self, handle: Handle<Boiler>) -> PowerHubResult<BoilerSensors> {
        let state = self.appliance(handle)?;
        let exchange_in = self.port(handle, BoilerPort::HeatExchangeIn);
        Ok(BoilerSensors {
            temperature: state.temperature,
            exchange_flow: exchange_in.flow,
            exchange_input_temperature: exchange_in.temperature,
            exchange_output_temperature: self.port(handle, BoilerPort::HeatExchangeOut).temperature,
        })
    }

    fn valve(&self, handle: Handle<Valve>) -> PowerHubResult<ValveSensors> {
        let ValveState { position } = *self.appliance(handle)?;
        Ok(ValveSensors { position })
    }

    fn tank(&self, handle: Handle<WaterTank>) -> PowerHubResult<TankSensors> {
        Ok(TankSensors {
            fill_ratio: self.appliance(handle)?.fill_ratio,
        })
    }
}
