//! Supervisory control of the power hub.
//!
//! Each module owns a slice of the plant's actuators and runs its own state
//! machine. [`control_power_hub`] evaluates them all and merges their
//! commands; no two modules command the same appliance.

mod chill;
mod cooling_supply;
mod fresh_water;
mod hot;
pub mod state;
mod survival;
mod technical_water;
mod waste;
mod water_treatment;

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use eb_appliances::{
    ChillerControl, FrequencyPumpControl, SwitchPumpControl, ValveControl, WaterTreatmentControl,
    YazakiControl,
};
use eb_controls::{Predicate, StateMachine, Value};
use eb_network::NetworkControl;
use tracing::{info, warn};

use crate::components as phc;
use crate::error::PowerHubResult;
use crate::network::PowerHub;
use crate::sensors::PowerHubSensors;
use crate::setpoints::Setpoints;

pub use chill::chill_control;
pub use cooling_supply::cooling_supply_control;
pub use fresh_water::fresh_water_control;
pub use hot::hot_control;
pub use state::{
    ChillControlMode, ChillControlState, ControlModes, CoolingSupplyControlMode,
    FreshWaterControlMode, HotControlMode, HotControlState, ModeState, PowerHubControlState,
    TechnicalWaterControlMode, WasteControlMode, WasteControlState, WaterTreatmentControlMode,
    initial_control_state,
};
pub use survival::{survival_control, survival_control_state};
pub use technical_water::technical_water_control;
pub use waste::waste_control;
pub use water_treatment::water_treatment_control;

type Pred = Predicate<PowerHubControlState, PowerHubSensors>;
type Machine<M> = StateMachine<M, PowerHubControlState, PowerHubSensors>;

fn setpoint(name: &str, read: fn(&Setpoints) -> f64) -> Value<PowerHubControlState, PowerHubSensors> {
    Value::state(name, move |state: &PowerHubControlState| read(&state.setpoints))
}

fn sensor(name: &str, read: fn(&PowerHubSensors) -> f64) -> Value<PowerHubControlState, PowerHubSensors> {
    Value::sensor(name, read)
}

/// True once the machine has stayed in its current mode for `duration`.
fn in_mode_for(marker: &str, duration: TimeDelta) -> Pred {
    Pred::constant(true).holds_true(marker, duration)
}

fn log_mode<M: fmt::Debug + PartialEq>(module: &str, previous: M, next: M) {
    if previous != next {
        info!(module, from = ?previous, to = ?next, "Control mode change");
    }
}

/// Evaluate every control module for one step.
///
/// In survival mode the modules are skipped and the plant is held in its
/// fail-safe configuration.
pub fn control_power_hub(
    hub: &PowerHub,
    state: &PowerHubControlState,
    sensors: &PowerHubSensors,
    time: DateTime<Utc>,
) -> PowerHubResult<(PowerHubControlState, NetworkControl)> {
    if state.setpoints.survival_mode {
        warn!(%time, "Survival mode active");
        return Ok((
            survival_control_state(state),
            survival_control(hub, sensors),
        ));
    }

    let (hot, hot_commands) = hot_control(hub, state, sensors, time);
    let (chill, chill_commands) = chill_control(hub, state, sensors, time);
    let (waste, waste_commands) = waste_control(hub, state, sensors, time);
    let (fresh_water, fresh_water_commands) = fresh_water_control(hub, state, sensors, time);
    let (technical_water, technical_water_commands) =
        technical_water_control(hub, state, sensors, time);
    let (water_treatment, water_treatment_commands) =
        water_treatment_control(hub, state, sensors, time);
    let (cooling_supply, cooling_supply_commands) =
        cooling_supply_control(hub, state, sensors, time);

    let control = hot_commands
        .combine(chill_commands)?
        .combine(waste_commands)?
        .combine(fresh_water_commands)?
        .combine(technical_water_commands)?
        .combine(water_treatment_commands)?
        .combine(cooling_supply_commands)?;

    Ok((
        PowerHubControlState {
            hot,
            chill,
            waste,
            fresh_water,
            technical_water,
            water_treatment,
            cooling_supply,
            setpoints: state.setpoints.clone(),
        },
        control,
    ))
}

/// Everything stopped and every valve at its initial position.
pub fn initial_control_all_off(hub: &PowerHub) -> NetworkControl {
    let off = SwitchPumpControl::off();
    NetworkControl::builder()
        .control(hub.heat_pipes_pump)
        .value(off)
        .control(hub.pcm_to_yazaki_pump)
        .value(off)
        .control(hub.chilled_loop_pump)
        .value(off)
        .control(hub.cooling_demand_pump)
        .value(off)
        .control(hub.waste_pump)
        .value(off)
        .control(hub.outboard_pump)
        .value(FrequencyPumpControl::new(false, 0.5))
        .control(hub.yazaki)
        .value(YazakiControl { on: false })
        .control(hub.chiller)
        .value(ChillerControl { on: false })
        .control(hub.water_treatment)
        .value(WaterTreatmentControl { on: false })
        .control(hub.heat_pipes_valve)
        .value(ValveControl::new(phc::HEAT_PIPES_BYPASS_OPEN_POSITION))
        .control(hub.hot_switch_valve)
        .value(ValveControl::new(phc::HOT_SWITCH_VALVE_PCM_POSITION))
        .control(hub.yazaki_hot_bypass_valve)
        .value(ValveControl::new(phc::YAZAKI_HOT_BYPASS_VALVE_CLOSED_POSITION))
        .control(hub.chiller_switch_valve)
        .value(ValveControl::new(phc::CHILLER_SWITCH_VALVE_YAZAKI_POSITION))
        .control(hub.waste_switch_valve)
        .value(ValveControl::new(phc::WASTE_SWITCH_VALVE_YAZAKI_POSITION))
        .control(hub.yazaki_waste_bypass_valve)
        .value(ValveControl::new(phc::YAZAKI_WASTE_BYPASS_VALVE_CLOSED_POSITION))
        .control(hub.waste_bypass_valve)
        .value(ValveControl::new(phc::WASTE_BYPASS_VALVE_CLOSED_POSITION))
        .control(hub.preheat_bypass_valve)
        .value(ValveControl::new(phc::PREHEAT_BYPASS_VALVE_BYPASS_POSITION))
        .control(hub.water_filter_bypass_valve)
        .value(ValveControl::new(
            phc::WATER_FILTER_BYPASS_VALVE_CONSUMPTION_POSITION,
        ))
        .control(hub.technical_water_regulator)
        .value(ValveControl::new(
            phc::TECHNICAL_WATER_REGULATOR_CLOSED_POSITION,
        ))
        .build()
}

/// No commands: pumps stop and valves hold.
pub fn no_control() -> NetworkControl {
    NetworkControl::default()
}
