//! Fail-safe configuration used while survival mode is set.
//!
//! Only the compression chiller chills, waste heat goes straight overboard
//! and every optional consumer is stopped.

use eb_appliances::{
    ChillerControl, FrequencyPumpControl, SwitchPumpControl, ValveControl, WaterTreatmentControl,
    YazakiControl,
};
use eb_controls::Context;
use eb_network::NetworkControl;

use super::state::{
    ChillControlMode, ChillControlState, HotControlMode, HotControlState, PowerHubControlState,
    WasteControlMode, WasteControlState, initial_control_state,
};
use crate::components::{
    CHILLER_SWITCH_VALVE_CHILLER_POSITION, HEAT_PIPES_BYPASS_OPEN_POSITION,
    PREHEAT_BYPASS_VALVE_BYPASS_POSITION, TECHNICAL_WATER_REGULATOR_CLOSED_POSITION,
    WASTE_BYPASS_VALVE_CLOSED_POSITION, WASTE_SWITCH_VALVE_CHILLER_POSITION,
    WATER_FILTER_BYPASS_VALVE_FILTER_POSITION, YAZAKI_HOT_BYPASS_VALVE_CLOSED_POSITION,
};
use crate::network::PowerHub;
use crate::sensors::PowerHubSensors;

const SURVIVAL_FREQUENCY_RATIO: f64 = 0.5;

/// Control state matching the survival configuration, so normal control
/// resumes from the chiller path once survival mode is cleared.
pub fn survival_control_state(state: &PowerHubControlState) -> PowerHubControlState {
    let initial = initial_control_state();
    PowerHubControlState {
        hot: HotControlState {
            context: Context::default(),
            mode: HotControlMode::Idle,
            ..state.hot.clone()
        },
        chill: ChillControlState {
            context: Context::default(),
            mode: ChillControlMode::ChillChiller,
            chiller_switch_valve_position: CHILLER_SWITCH_VALVE_CHILLER_POSITION,
            waste_switch_valve_position: WASTE_SWITCH_VALVE_CHILLER_POSITION,
            ..state.chill.clone()
        },
        waste: WasteControlState {
            context: Context::default(),
            mode: WasteControlMode::RunOutboard,
            ..state.waste.clone()
        },
        fresh_water: initial.fresh_water,
        technical_water: initial.technical_water,
        water_treatment: initial.water_treatment,
        cooling_supply: initial.cooling_supply,
        setpoints: state.setpoints.clone(),
    }
}

pub fn survival_control(hub: &PowerHub, sensors: &PowerHubSensors) -> NetworkControl {
    let valves_ready = sensors
        .chiller_switch_valve
        .in_position(CHILLER_SWITCH_VALVE_CHILLER_POSITION)
        && sensors
            .waste_switch_valve
            .in_position(WASTE_SWITCH_VALVE_CHILLER_POSITION)
        && sensors
            .waste_bypass_valve
            .in_position(WASTE_BYPASS_VALVE_CLOSED_POSITION);
    let pumps = SwitchPumpControl::running(valves_ready);

    NetworkControl::builder()
        .control(hub.heat_pipes_pump)
        .value(SwitchPumpControl::off())
        .control(hub.heat_pipes_valve)
        .value(ValveControl::new(HEAT_PIPES_BYPASS_OPEN_POSITION))
        .control(hub.chiller_switch_valve)
        .value(ValveControl::new(CHILLER_SWITCH_VALVE_CHILLER_POSITION))
        .control(hub.waste_switch_valve)
        .value(ValveControl::new(WASTE_SWITCH_VALVE_CHILLER_POSITION))
        .control(hub.yazaki_hot_bypass_valve)
        .value(ValveControl::new(YAZAKI_HOT_BYPASS_VALVE_CLOSED_POSITION))
        .control(hub.waste_bypass_valve)
        .value(ValveControl::new(WASTE_BYPASS_VALVE_CLOSED_POSITION))
        .control(hub.pcm_to_yazaki_pump)
        .value(SwitchPumpControl::off())
        .control(hub.yazaki)
        .value(YazakiControl { on: false })
        .control(hub.chiller)
        .value(ChillerControl { on: valves_ready })
        .control(hub.chilled_loop_pump)
        .value(pumps)
        .control(hub.waste_pump)
        .value(pumps)
        .control(hub.cooling_demand_pump)
        .value(pumps)
        .control(hub.outboard_pump)
        .value(FrequencyPumpControl::new(
            valves_ready,
            SURVIVAL_FREQUENCY_RATIO,
        ))
        .control(hub.preheat_bypass_valve)
        .value(ValveControl::new(PREHEAT_BYPASS_VALVE_BYPASS_POSITION))
        .control(hub.water_filter_bypass_valve)
        .value(ValveControl::new(WATER_FILTER_BYPASS_VALVE_FILTER_POSITION))
        .control(hub.water_treatment)
        .value(WaterTreatmentControl { on: false })
        .control(hub.technical_water_regulator)
        .value(ValveControl::new(TECHNICAL_WATER_REGULATOR_CLOSED_POSITION))
        .build()
}
