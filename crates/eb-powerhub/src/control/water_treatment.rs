//! Treating grey water into technical water.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use eb_appliances::WaterTreatmentControl;
use eb_controls::Transition;
use eb_network::NetworkControl;

use super::state::{ModeState, PowerHubControlState, WaterTreatmentControlMode};
use super::{Machine, log_mode, sensor, setpoint};
use crate::network::PowerHub;
use crate::sensors::PowerHubSensors;

/// Treated water goes to the technical tank; no point running when it is full.
const TECHNICAL_WATER_ACCEPTS_BELOW: f64 = 0.8;

static WATER_TREATMENT_MACHINE: LazyLock<Machine<WaterTreatmentControlMode>> =
    LazyLock::new(|| {
        use WaterTreatmentControlMode::*;
        let grey = || sensor("grey water fill ratio", |s| s.grey_water_tank.fill_ratio);
        Machine::new(vec![
            Transition::new(
                NoRun,
                Run,
                grey().gt(setpoint("water treatment max fill ratio", |sp| {
                    sp.water_treatment_max_fill_ratio
                })) & sensor("technical water fill ratio", |s| {
                    s.technical_water_tank.fill_ratio
                })
                .lt(TECHNICAL_WATER_ACCEPTS_BELOW),
            ),
            Transition::new(
                Run,
                NoRun,
                grey().lt(setpoint("water treatment min fill ratio", |sp| {
                    sp.water_treatment_min_fill_ratio
                })),
            ),
        ])
    });

pub fn water_treatment_control(
    hub: &PowerHub,
    state: &PowerHubControlState,
    sensors: &PowerHubSensors,
    time: DateTime<Utc>,
) -> (ModeState<WaterTreatmentControlMode>, NetworkControl) {
    let previous = &state.water_treatment;
    let (mode, context) =
        WATER_TREATMENT_MACHINE.run(previous.mode, &previous.context, state, sensors, time);
    log_mode("water_treatment", previous.mode, mode);

    let control = NetworkControl::builder()
        .control(hub.water_treatment)
        .value(WaterTreatmentControl {
            on: mode == WaterTreatmentControlMode::Run,
        })
        .build();

    (ModeState { context, mode }, control)
}
