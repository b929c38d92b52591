//! Topping up technical water from the fresh water tank.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use eb_appliances::ValveControl;
use eb_controls::Transition;
use eb_network::NetworkControl;

use super::state::{ModeState, PowerHubControlState, TechnicalWaterControlMode};
use super::{Machine, Pred, log_mode, sensor, setpoint};
use crate::components::{
    TECHNICAL_WATER_REGULATOR_CLOSED_POSITION, TECHNICAL_WATER_REGULATOR_OPEN_POSITION,
};
use crate::network::PowerHub;
use crate::sensors::PowerHubSensors;

fn fresh_water_available() -> Pred {
    sensor("fresh water fill ratio", |s| s.fresh_water_tank.fill_ratio).gt(setpoint(
        "fresh water min fill ratio",
        |sp| sp.fresh_water_min_fill_ratio,
    ))
}

fn technical_fill_ratio() -> eb_controls::Value<PowerHubControlState, PowerHubSensors> {
    sensor("technical water fill ratio", |s| {
        s.technical_water_tank.fill_ratio
    })
}

static TECHNICAL_WATER_MACHINE: LazyLock<Machine<TechnicalWaterControlMode>> =
    LazyLock::new(|| {
        use TechnicalWaterControlMode::*;
        Machine::new(vec![
            Transition::new(
                NoFill,
                Fill,
                technical_fill_ratio().lt(setpoint("technical water min fill ratio", |sp| {
                    sp.technical_water_min_fill_ratio
                })) & fresh_water_available(),
            ),
            Transition::new(
                Fill,
                NoFill,
                technical_fill_ratio().gt(setpoint("technical water max fill ratio", |sp| {
                    sp.technical_water_max_fill_ratio
                })) | !fresh_water_available(),
            ),
        ])
    });

pub fn technical_water_control(
    hub: &PowerHub,
    state: &PowerHubControlState,
    sensors: &PowerHubSensors,
    time: DateTime<Utc>,
) -> (ModeState<TechnicalWaterControlMode>, NetworkControl) {
    let previous = &state.technical_water;
    let (mode, context) =
        TECHNICAL_WATER_MACHINE.run(previous.mode, &previous.context, state, sensors, time);
    log_mode("technical_water", previous.mode, mode);

    let position = match mode {
        TechnicalWaterControlMode::Fill => TECHNICAL_WATER_REGULATOR_OPEN_POSITION,
        TechnicalWaterControlMode::NoFill => TECHNICAL_WATER_REGULATOR_CLOSED_POSITION,
    };
    let control = NetworkControl::builder()
        .control(hub.technical_water_regulator)
        .value(ValveControl::new(position))
        .build();

    (ModeState { context, mode }, control)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_is_valid() {
        TECHNICAL_WATER_MACHINE.validate().unwrap();
    }
}
