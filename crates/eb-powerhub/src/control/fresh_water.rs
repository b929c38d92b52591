//! Filtering the fresh water tank on operator request.

use std::sync::LazyLock;

use chrono::{DateTime, TimeDelta, Utc};
use eb_appliances::ValveControl;
use eb_controls::{Transition, Value};
use eb_network::NetworkControl;

use super::state::{FreshWaterControlMode, ModeState, PowerHubControlState};
use super::{Machine, in_mode_for, log_mode};
use crate::components::{
    WATER_FILTER_BYPASS_VALVE_CONSUMPTION_POSITION, WATER_FILTER_BYPASS_VALVE_FILTER_POSITION,
};
use crate::network::PowerHub;
use crate::sensors::PowerHubSensors;

type Instant = Value<PowerHubControlState, PowerHubSensors, Option<DateTime<Utc>>>;

static FRESH_WATER_MACHINE: LazyLock<Machine<FreshWaterControlMode>> = LazyLock::new(|| {
    use FreshWaterControlMode::*;
    let trigger = Instant::state("trigger filter water tank", |c| {
        Some(c.setpoints.trigger_filter_water_tank)
    });
    let stop = Instant::state("stop filter water tank", |c| {
        Some(c.setpoints.stop_filter_water_tank)
    });
    Machine::new(vec![
        Transition::new(Ready, FilterTank, trigger.within(TimeDelta::seconds(5))),
        Transition::new(
            FilterTank,
            Ready,
            // 35 l/min through the filter
            in_mode_for("Filter tank", TimeDelta::minutes(30))
                | stop.within(TimeDelta::seconds(5)),
        ),
    ])
});

pub fn fresh_water_control(
    hub: &PowerHub,
    state: &PowerHubControlState,
    sensors: &PowerHubSensors,
    time: DateTime<Utc>,
) -> (ModeState<FreshWaterControlMode>, NetworkControl) {
    let previous = &state.fresh_water;
    let (mode, context) =
        FRESH_WATER_MACHINE.run(previous.mode, &previous.context, state, sensors, time);
    log_mode("fresh_water", previous.mode, mode);

    let position = match mode {
        FreshWaterControlMode::FilterTank => WATER_FILTER_BYPASS_VALVE_FILTER_POSITION,
        FreshWaterControlMode::Ready => WATER_FILTER_BYPASS_VALVE_CONSUMPTION_POSITION,
    };
    let control = NetworkControl::builder()
        .control(hub.water_filter_bypass_valve)
        .value(ValveControl::new(position))
        .build();

    (ModeState { context, mode }, control)
}
