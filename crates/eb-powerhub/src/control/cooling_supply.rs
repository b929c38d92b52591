//! Supplying cooling to the demand side during the day.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveTime, Utc};
use eb_appliances::SwitchPumpControl;
use eb_controls::Transition;
use eb_network::NetworkControl;

use super::state::{CoolingSupplyControlMode, ModeState, PowerHubControlState};
use super::{Machine, Pred, log_mode, sensor, setpoint};
use crate::network::PowerHub;
use crate::sensors::PowerHubSensors;

/// `[enabled, disabled)` as a time-of-day window that may wrap midnight.
fn in_window(enabled: NaiveTime, disabled: NaiveTime, now: NaiveTime) -> bool {
    if enabled <= disabled {
        enabled <= now && now < disabled
    } else {
        now >= enabled || now < disabled
    }
}

fn supply_enabled() -> Pred {
    Pred::from_time_fn("cooling supply window", |c, _, time| {
        in_window(
            c.setpoints.cooling_supply_enabled_time,
            c.setpoints.cooling_supply_disabled_time,
            time.time(),
        )
    })
}

static COOLING_SUPPLY_MACHINE: LazyLock<Machine<CoolingSupplyControlMode>> =
    LazyLock::new(|| {
        use CoolingSupplyControlMode::*;
        let cold = || sensor("cold reservoir temperature", |s| s.cold_reservoir.temperature);
        Machine::new(vec![
            Transition::new(Disabled, EnabledNoSupply, supply_enabled()),
            Transition::new(EnabledNoSupply, Disabled, !supply_enabled()),
            Transition::new(Supply, Disabled, !supply_enabled()),
            Transition::new(
                EnabledNoSupply,
                Supply,
                cold().lt(setpoint("chill min supply temperature", |sp| {
                    sp.chill_min_supply_temperature
                })),
            ),
            Transition::new(
                Supply,
                EnabledNoSupply,
                cold().gt(setpoint("cold supply max temperature", |sp| {
                    sp.cold_supply_max_temperature
                })),
            ),
        ])
    });

pub fn cooling_supply_control(
    hub: &PowerHub,
    state: &PowerHubControlState,
    sensors: &PowerHubSensors,
    time: DateTime<Utc>,
) -> (ModeState<CoolingSupplyControlMode>, NetworkControl) {
    let previous = &state.cooling_supply;
    let (mode, context) =
        COOLING_SUPPLY_MACHINE.run(previous.mode, &previous.context, state, sensors, time);
    log_mode("cooling_supply", previous.mode, mode);

    let control = NetworkControl::builder()
        .control(hub.cooling_demand_pump)
        .value(SwitchPumpControl::running(
            mode == CoolingSupplyControlMode::Supply,
        ))
        .build();

    (ModeState { context, mode }, control)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn machine_is_valid() {
        COOLING_SUPPLY_MACHINE.validate().unwrap();
    }

    #[test]
    fn day_window() {
        assert!(in_window(at(8, 0), at(22, 0), at(8, 0)));
        assert!(in_window(at(8, 0), at(22, 0), at(21, 59)));
        assert!(!in_window(at(8, 0), at(22, 0), at(22, 0)));
        assert!(!in_window(at(8, 0), at(22, 0), at(3, 0)));
    }

    #[test]
    fn window_wrapping_midnight() {
        assert!(in_window(at(22, 0), at(6, 0), at(23, 30)));
        assert!(in_window(at(22, 0), at(6, 0), at(2, 0)));
        assert!(!in_window(at(22, 0), at(6, 0), at(6, 0)));
        assert!(!in_window(at(22, 0), at(6, 0), at(12, 0)));
    }
}
