//! Heat pipes charging the PCM.

use std::sync::LazyLock;

use chrono::{DateTime, TimeDelta, Utc};
use eb_appliances::{SwitchPumpControl, ValveControl};
use eb_controls::Transition;
use eb_network::NetworkControl;

use super::state::{HotControlMode, HotControlState, PowerHubControlState};
use super::{Machine, Pred, log_mode, sensor, setpoint};
use crate::components::{HEAT_PIPES_BYPASS_OPEN_POSITION, HOT_SWITCH_VALVE_PCM_POSITION};
use crate::network::PowerHub;
use crate::sensors::PowerHubSensors;

fn should_heat_pcm() -> Pred {
    sensor("pcm temperature", |s| s.pcm.temperature)
        .lt(setpoint("pcm min temperature", |sp| sp.pcm_min_temperature))
}

fn stop_heat_pcm() -> Pred {
    sensor("pcm temperature", |s| s.pcm.temperature)
        .gt(setpoint("pcm max temperature", |sp| sp.pcm_max_temperature))
}

fn can_heat_pcm() -> Pred {
    Pred::from_fn("heat pipes hotter than pcm", |c, s| {
        s.heat_pipes.output_temperature
            > s.pcm.temperature + c.setpoints.minimum_charging_temperature_offset
    })
}

fn ready_for_pcm() -> Pred {
    Pred::from_fn("hot switch valve at pcm", |_, s| {
        s.hot_switch_valve.in_position(HOT_SWITCH_VALVE_PCM_POSITION)
    })
}

fn sufficient_sunlight() -> Pred {
    sensor("global irradiance", |s| s.weather.global_irradiance).gt(setpoint(
        "minimum global irradiance",
        |sp| sp.minimum_global_irradiance,
    ))
}

static HOT_MACHINE: LazyLock<Machine<HotControlMode>> = LazyLock::new(|| {
    use HotControlMode::*;
    Machine::new(vec![
        Transition::new(PrepareHeatPcm, HeatPcm, ready_for_pcm()),
        Transition::new(
            HeatPcm,
            Idle,
            stop_heat_pcm()
                | (!can_heat_pcm()).holds_true(
                    "Heat pipes output temperature not high enough",
                    TimeDelta::minutes(1),
                ),
        ),
        Transition::new(
            Idle,
            WaitingForSun,
            (!sufficient_sunlight())
                .holds_true("Global irradiance below threshold", TimeDelta::minutes(10)),
        ),
        Transition::new(
            Idle,
            PrepareHeatPcm,
            should_heat_pcm()
                & can_heat_pcm().holds_true(
                    "Heat pipes output temperature high enough for pcm",
                    TimeDelta::minutes(5),
                ),
        ),
        Transition::new(
            WaitingForSun,
            Idle,
            sufficient_sunlight()
                .holds_true("Global irradiance above threshold", TimeDelta::minutes(10))
                & should_heat_pcm(),
        ),
    ])
});

pub fn hot_control(
    hub: &PowerHub,
    state: &PowerHubControlState,
    sensors: &PowerHubSensors,
    time: DateTime<Utc>,
) -> (HotControlState, NetworkControl) {
    let previous = &state.hot;
    let (mode, context) = HOT_MACHINE.run(previous.mode, &previous.context, state, sensors, time);
    log_mode("hot", previous.mode, mode);

    let mut feedback_valve_controller = previous.feedback_valve_controller;
    let mut feedback_valve_position = HEAT_PIPES_BYPASS_OPEN_POSITION;
    let (hot_switch_valve_position, run_heat_pipes_pump) = match mode {
        HotControlMode::PrepareHeatPcm => (HOT_SWITCH_VALVE_PCM_POSITION, true),
        HotControlMode::HeatPcm => {
            let target =
                sensors.pcm.temperature + state.setpoints.target_charging_temperature_offset;
            (feedback_valve_controller, feedback_valve_position) = previous
                .feedback_valve_controller
                .run(target, sensors.heat_pipes.output_temperature);
            (HOT_SWITCH_VALVE_PCM_POSITION, true)
        }
        HotControlMode::Idle => (previous.hot_switch_valve_position, true),
        HotControlMode::WaitingForSun => (previous.hot_switch_valve_position, false),
    };

    let control = NetworkControl::builder()
        .control(hub.heat_pipes_pump)
        .value(SwitchPumpControl::running(run_heat_pipes_pump))
        .control(hub.heat_pipes_valve)
        .value(ValveControl::new(feedback_valve_position))
        .control(hub.hot_switch_valve)
        .value(ValveControl::new(hot_switch_valve_position))
        .build();

    (
        HotControlState {
            context,
            mode,
            feedback_valve_controller,
            hot_switch_valve_position,
        },
        control,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_is_valid() {
        HOT_MACHINE.validate().unwrap();
    }
}
