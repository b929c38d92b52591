//! Chilling the cold reservoir with the Yazaki or the compression chiller.
//!
//! The Yazaki runs on PCM heat and is preferred while the PCM is charged.
//! The chiller draws on the battery and is avoided when it is low.

use std::sync::LazyLock;

use chrono::{DateTime, TimeDelta, Utc};
use eb_appliances::{ChillerControl, SwitchPumpControl, ValveControl, YazakiControl};
use eb_controls::Transition;
use eb_network::NetworkControl;

use super::state::{ChillControlMode, ChillControlState, PowerHubControlState};
use super::{Machine, Pred, in_mode_for, log_mode, sensor, setpoint};
use crate::components::{
    CHILLER_SWITCH_VALVE_CHILLER_POSITION, CHILLER_SWITCH_VALVE_YAZAKI_POSITION,
    WASTE_BYPASS_VALVE_CLOSED_POSITION, WASTE_SWITCH_VALVE_CHILLER_POSITION,
    WASTE_SWITCH_VALVE_YAZAKI_POSITION, YAZAKI_HOT_BYPASS_VALVE_CLOSED_POSITION,
};
use crate::network::PowerHub;
use crate::sensors::PowerHubSensors;

fn cold_reservoir_temperature() -> eb_controls::Value<PowerHubControlState, PowerHubSensors> {
    sensor("cold reservoir temperature", |s| s.cold_reservoir.temperature)
}

fn pcm_temperature() -> eb_controls::Value<PowerHubControlState, PowerHubSensors> {
    sensor("pcm temperature", |s| s.pcm.temperature)
}

fn should_chill() -> Pred {
    cold_reservoir_temperature().gt(setpoint("cold reservoir max temperature", |sp| {
        sp.cold_reservoir_max_temperature
    }))
}

fn stop_chill() -> Pred {
    cold_reservoir_temperature().lt(setpoint("cold reservoir min temperature", |sp| {
        sp.cold_reservoir_min_temperature
    }))
}

fn pcm_charged() -> Pred {
    pcm_temperature().gt(setpoint("pcm charged", |sp| sp.pcm_charged))
}

fn pcm_discharged() -> Pred {
    pcm_temperature().lt(setpoint("pcm discharged", |sp| sp.pcm_discharged))
}

fn low_battery() -> Pred {
    sensor("battery soc", |s| s.electrical.battery_soc)
        .lt(setpoint("low battery", |sp| sp.low_battery))
}

fn yazaki_valves_ready() -> Pred {
    Pred::from_fn("switch valves at yazaki", |_, s| {
        s.waste_switch_valve
            .in_position(WASTE_SWITCH_VALVE_YAZAKI_POSITION)
            && s.chiller_switch_valve
                .in_position(CHILLER_SWITCH_VALVE_YAZAKI_POSITION)
    })
}

fn chiller_valves_ready() -> Pred {
    Pred::from_fn("switch valves at chiller", |_, s| {
        s.waste_switch_valve
            .in_position(WASTE_SWITCH_VALVE_CHILLER_POSITION)
            && s.chiller_switch_valve
                .in_position(CHILLER_SWITCH_VALVE_CHILLER_POSITION)
    })
}

fn within_yazaki_bounds() -> Pred {
    Pred::from_fn("yazaki within bounds", |_, s| s.yazaki.within_bounds())
}

fn low_yazaki_chill_power() -> Pred {
    sensor("yazaki chill power", |s| s.yazaki.chill_power()).lt(setpoint(
        "yazaki minimum chill power",
        |sp| sp.yazaki_minimum_chill_power,
    ))
}

static CHILL_MACHINE: LazyLock<Machine<ChillControlMode>> = LazyLock::new(|| {
    use ChillControlMode::*;
    Machine::new(vec![
        Transition::new(NoChill, PrepareChillYazaki, should_chill() & pcm_charged()),
        Transition::new(PrepareChillYazaki, CheckYazakiBounds, yazaki_valves_ready()),
        Transition::new(CheckYazakiBounds, ChillYazaki, within_yazaki_bounds()),
        Transition::new(
            CheckYazakiBounds,
            PrepareChillChiller,
            (!within_yazaki_bounds())
                .holds_true("Outside Yazaki conditions", TimeDelta::minutes(10)),
        ),
        Transition::new(
            NoChill,
            PrepareChillChiller,
            should_chill() & !pcm_charged() & !low_battery(),
        ),
        Transition::new(PrepareChillChiller, ChillChiller, chiller_valves_ready()),
        Transition::new(
            ChillYazaki,
            PrepareChillChiller,
            should_chill()
                & (pcm_discharged()
                    | low_yazaki_chill_power()
                        .holds_true("Yazaki chill power too low", TimeDelta::minutes(5)))
                & !low_battery(),
        ),
        Transition::new(
            ChillChiller,
            PrepareChillYazaki,
            should_chill() & in_mode_for("Chiller runs", TimeDelta::minutes(10)) & pcm_charged(),
        ),
        Transition::new(ChillYazaki, NoChill, stop_chill()),
        Transition::new(ChillChiller, NoChill, stop_chill() | low_battery()),
    ])
});

/// Which machines run in a mode.
#[derive(Debug, Clone, Copy)]
struct Running {
    yazaki_pumps: bool,
    yazaki: bool,
    chiller: bool,
}

impl Running {
    const NOTHING: Running = Running {
        yazaki_pumps: false,
        yazaki: false,
        chiller: false,
    };

    fn waste_and_chilled(&self) -> bool {
        self.yazaki_pumps || self.chiller
    }
}

pub fn chill_control(
    hub: &PowerHub,
    state: &PowerHubControlState,
    sensors: &PowerHubSensors,
    time: DateTime<Utc>,
) -> (ChillControlState, NetworkControl) {
    let previous = &state.chill;
    let (mode, context) =
        CHILL_MACHINE.run(previous.mode, &previous.context, state, sensors, time);
    log_mode("chill", previous.mode, mode);

    let mut yazaki_hot_feedback_valve_controller = previous.yazaki_hot_feedback_valve_controller;
    let mut yazaki_feedback_valve_position = YAZAKI_HOT_BYPASS_VALVE_CLOSED_POSITION;
    let mut run_yazaki_bypass_pid = || {
        (yazaki_hot_feedback_valve_controller, yazaki_feedback_valve_position) =
            previous.yazaki_hot_feedback_valve_controller.run(
                state.setpoints.yazaki_inlet_target_temperature,
                sensors.yazaki.hot_input_temperature,
            );
    };

    let yazaki_valves = (
        CHILLER_SWITCH_VALVE_YAZAKI_POSITION,
        WASTE_SWITCH_VALVE_YAZAKI_POSITION,
    );
    let chiller_valves = (
        CHILLER_SWITCH_VALVE_CHILLER_POSITION,
        WASTE_SWITCH_VALVE_CHILLER_POSITION,
    );
    let ((chiller_switch_valve_position, waste_switch_valve_position), running) = match mode {
        ChillControlMode::NoChill => (
            (
                previous.chiller_switch_valve_position,
                previous.waste_switch_valve_position,
            ),
            Running::NOTHING,
        ),
        ChillControlMode::PrepareChillYazaki => (yazaki_valves, Running::NOTHING),
        ChillControlMode::CheckYazakiBounds => {
            run_yazaki_bypass_pid();
            (
                yazaki_valves,
                Running {
                    yazaki_pumps: true,
                    ..Running::NOTHING
                },
            )
        }
        ChillControlMode::ChillYazaki => {
            run_yazaki_bypass_pid();
            (
                yazaki_valves,
                Running {
                    yazaki_pumps: true,
                    yazaki: true,
                    chiller: false,
                },
            )
        }
        ChillControlMode::PrepareChillChiller => (chiller_valves, Running::NOTHING),
        ChillControlMode::ChillChiller => (
            chiller_valves,
            Running {
                chiller: true,
                ..Running::NOTHING
            },
        ),
    };

    let control = NetworkControl::builder()
        .control(hub.chiller_switch_valve)
        .value(ValveControl::new(chiller_switch_valve_position))
        .control(hub.waste_switch_valve)
        .value(ValveControl::new(waste_switch_valve_position))
        .control(hub.yazaki_hot_bypass_valve)
        .value(ValveControl::new(yazaki_feedback_valve_position))
        .control(hub.waste_bypass_valve)
        .value(ValveControl::new(WASTE_BYPASS_VALVE_CLOSED_POSITION))
        .control(hub.pcm_to_yazaki_pump)
        .value(SwitchPumpControl::running(running.yazaki_pumps))
        .control(hub.chilled_loop_pump)
        .value(SwitchPumpControl::running(running.waste_and_chilled()))
        .control(hub.waste_pump)
        .value(SwitchPumpControl::running(running.waste_and_chilled()))
        .control(hub.yazaki)
        .value(YazakiControl { on: running.yazaki })
        .control(hub.chiller)
        .value(ChillerControl {
            on: running.chiller,
        })
        .build();

    (
        ChillControlState {
            context,
            mode,
            yazaki_hot_feedback_valve_controller,
            chiller_switch_valve_position,
            waste_switch_valve_position,
        },
        control,
    )
}
