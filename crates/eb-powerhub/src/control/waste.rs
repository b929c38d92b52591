//! Dumping waste heat overboard.

use std::sync::LazyLock;

use chrono::{DateTime, TimeDelta, Utc};
use eb_appliances::FrequencyPumpControl;
use eb_controls::Transition;
use eb_network::NetworkControl;

use super::state::{ChillControlMode, PowerHubControlState, WasteControlMode, WasteControlState};
use super::{Machine, Pred, in_mode_for, log_mode};
use crate::network::PowerHub;
use crate::sensors::PowerHubSensors;

const IDLE_FREQUENCY_RATIO: f64 = 0.5;

fn water_maker_on() -> Pred {
    Pred::from_fn("water maker producing", |_, s| s.water_maker.producing())
}

/// The chill module has a machine running that dumps heat here.
fn chiller_on() -> Pred {
    Pred::from_fn("chiller running", |c, _| {
        matches!(
            c.chill.mode,
            ChillControlMode::ChillChiller | ChillControlMode::ChillYazaki
        )
    })
}

fn manual_on() -> Pred {
    Pred::from_fn("manual outboard on", |c, _| c.setpoints.manual_outboard_on)
}

/// Hot heat dump that the outboard side does not follow.
fn heat_dump_diverges() -> Pred {
    Pred::from_fn("heat dump diverges from outboard", |c, s| {
        let dump = s.heat_dump.average_temperature();
        dump > c.setpoints.high_heat_dump_temperature
            && dump - s.outboard.output_temperature
                > c.setpoints.heat_dump_outboard_divergence_temperature
    })
}

static WASTE_MACHINE: LazyLock<Machine<WasteControlMode>> = LazyLock::new(|| {
    use WasteControlMode::*;
    Machine::new(vec![
        Transition::new(NoOutboard, ManualRunOutboard, manual_on()),
        Transition::new(ManualRunOutboard, NoOutboard, !manual_on()),
        Transition::new(
            NoOutboard,
            RunOutboard,
            in_mode_for("Prevent outboard pump from flip-flopping", TimeDelta::minutes(2))
                & (water_maker_on() | chiller_on()),
        ),
        Transition::new(
            RunOutboard,
            NoOutboard,
            !water_maker_on()
                & in_mode_for("Prevent outboard pump from flip-flopping", TimeDelta::minutes(5))
                & !chiller_on(),
        ),
        Transition::new(RunOutboard, ToggleOutboard, heat_dump_diverges()),
        Transition::new(
            ToggleOutboard,
            RunOutboardAfterToggle,
            in_mode_for("Keep outboard pump low", TimeDelta::seconds(1)),
        ),
        Transition::new(
            RunOutboardAfterToggle,
            RunOutboard,
            in_mode_for("Run outboard until temperatures stabilize", TimeDelta::minutes(10)),
        ),
    ])
});

pub fn waste_control(
    hub: &PowerHub,
    state: &PowerHubControlState,
    sensors: &PowerHubSensors,
    time: DateTime<Utc>,
) -> (WasteControlState, NetworkControl) {
    let previous = &state.waste;
    let (mode, context) =
        WASTE_MACHINE.run(previous.mode, &previous.context, state, sensors, time);
    log_mode("waste", previous.mode, mode);

    let (frequency_controller, frequency_ratio) = match mode {
        WasteControlMode::RunOutboard | WasteControlMode::RunOutboardAfterToggle => {
            previous.frequency_controller.run(
                state.setpoints.waste_target_temperature,
                sensors.heat_dump.cold_temperature,
            )
        }
        _ => (previous.frequency_controller, IDLE_FREQUENCY_RATIO),
    };
    let on = matches!(
        mode,
        WasteControlMode::RunOutboard
            | WasteControlMode::RunOutboardAfterToggle
            | WasteControlMode::ManualRunOutboard
    );

    let control = NetworkControl::builder()
        .control(hub.outboard_pump)
        .value(FrequencyPumpControl::new(on, frequency_ratio))
        .build();

    (
        WasteControlState {
            context,
            mode,
            frequency_controller,
        },
        control,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_is_valid() {
        WASTE_MACHINE.validate().unwrap();
    }
}
