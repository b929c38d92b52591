//! Phase-change material store with separate charge and discharge circuits.
//!
//! The store has three regions: solid below the phase-change temperature
//! (state of charge 0), melting at exactly the phase-change temperature
//! (state of charge in `[0, 1]`), and liquid above it (state of charge 1).
//! Each connected port in turn exchanges heat with the store. The heat moved
//! is what would bring the fluid and the store to equilibrium, capped at the
//! transfer power over one step.

use eb_core::SimulationTime;
use eb_core::units::{Celsius, Joule, JoulePerKelvin, JoulePerLiterKelvin, Ratio, Watt};
use serde::{Deserialize, Serialize};

use crate::common::{check_positive, is_flowing};
use crate::error::{ApplianceError, ApplianceResult};
use crate::traits::{Appliance, ConnectionState, NoControl, PortMap, ports};

ports!(PcmPort {
    ChargeIn => "charge_in",
    ChargeOut => "charge_out",
    DischargeIn => "discharge_in",
    DischargeOut => "discharge_out",
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PcmState {
    pub state_of_charge: Ratio,
    pub temperature: Celsius,
}

impl PcmState {
    pub fn new(state_of_charge: Ratio, temperature: Celsius) -> Self {
        Self {
            state_of_charge,
            temperature,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pcm {
    pub latent_heat: Joule,
    pub phase_change_temperature: Celsius,
    pub sensible_capacity: JoulePerKelvin,
    pub transfer_power: Watt,
    pub specific_heat_charge: JoulePerLiterKelvin,
    pub specific_heat_discharge: JoulePerLiterKelvin,
}

impl Pcm {
    pub fn new(
        latent_heat: Joule,
        phase_change_temperature: Celsius,
        sensible_capacity: JoulePerKelvin,
        transfer_power: Watt,
        specific_heat_charge: JoulePerLiterKelvin,
        specific_heat_discharge: JoulePerLiterKelvin,
    ) -> ApplianceResult<Self> {
        check_positive(latent_heat, "pcm latent heat")?;
        check_positive(sensible_capacity, "pcm sensible capacity")?;
        check_positive(specific_heat_charge, "pcm charge specific heat")?;
        check_positive(specific_heat_discharge, "pcm discharge specific heat")?;
        if transfer_power < 0.0 {
            return Err(ApplianceError::InvalidArg {
                what: "pcm transfer power must be non-negative",
            });
        }
        Ok(Self {
            latent_heat,
            phase_change_temperature,
            sensible_capacity,
            transfer_power,
            specific_heat_charge,
            specific_heat_discharge,
        })
    }

    /// Heat (J) a fluid parcel of capacity `fluid` at `inlet` would hand to
    /// the store before both reach one temperature. Negative when the store
    /// heats the fluid.
    pub fn equilibrium_heat(&self, state: &PcmState, inlet: Celsius, fluid: JoulePerKelvin) -> Joule {
        let tp = self.phase_change_temperature;
        let c = self.sensible_capacity;
        let mut heat = 0.0;
        let mut fluid_temperature = inlet;
        let mut t = state.temperature;
        let settle = |fluid_temperature: f64, t: f64| (fluid * fluid_temperature + c * t) / (fluid + c);

        if inlet > t {
            if t < tp {
                let teq = settle(fluid_temperature, t);
                if teq <= tp {
                    return c * (teq - t);
                }
                let sensible = c * (tp - t);
                heat += sensible;
                fluid_temperature -= sensible / fluid;
                t = tp;
            }
            if t <= tp && state.state_of_charge < 1.0 {
                if fluid_temperature <= tp {
                    return heat;
                }
                let available = fluid * (fluid_temperature - tp);
                let latent = self.latent_heat * (1.0 - state.state_of_charge);
                if available <= latent {
                    return heat + available;
                }
                heat += latent;
                fluid_temperature -= latent / fluid;
            }
            heat + c * (settle(fluid_temperature, t) - t)
        } else if inlet < t {
            if t > tp {
                let teq = settle(fluid_temperature, t);
                if teq >= tp {
                    return c * (teq - t);
                }
                let sensible = c * (tp - t);
                heat += sensible;
                fluid_temperature -= sensible / fluid;
                t = tp;
            }
            if t >= tp && state.state_of_charge > 0.0 {
                if fluid_temperature >= tp {
                    return heat;
                }
                let available = fluid * (tp - fluid_temperature);
                let latent = self.latent_heat * state.state_of_charge;
                if available <= latent {
                    return heat - available;
                }
                heat -= latent;
                fluid_temperature += latent / fluid;
            }
            heat + c * (settle(fluid_temperature, t) - t)
        } else {
            0.0
        }
    }

    /// Store state after absorbing `heat` (J), walking through the regions.
    pub fn apply_heat(&self, state: &PcmState, heat: Joule) -> PcmState {
        let tp = self.phase_change_temperature;
        let c = self.sensible_capacity;
        let mut remaining = heat;
        let PcmState {
            state_of_charge: mut soc,
            temperature: mut t,
        } = *state;

        if remaining > 0.0 {
            if t < tp {
                let needed = c * (tp - t);
                if remaining <= needed {
                    return PcmState::new(soc, t + remaining / c);
                }
                remaining -= needed;
                t = tp;
            }
            if soc < 1.0 {
                let latent = self.latent_heat * (1.0 - soc);
                if remaining <= latent {
                    return PcmState::new((soc + remaining / self.latent_heat).clamp(0.0, 1.0), t);
                }
                remaining -= latent;
                soc = 1.0;
            }
            PcmState::new(soc, t + remaining / c)
        } else if remaining < 0.0 {
            if t > tp {
                let needed = c * (t - tp);
                if -remaining <= needed {
                    return PcmState::new(soc, t + remaining / c);
                }
                remaining += needed;
                t = tp;
            }
            if soc > 0.0 {
                let latent = self.latent_heat * soc;
                if -remaining <= latent {
                    return PcmState::new((soc + remaining / self.latent_heat).clamp(0.0, 1.0), t);
                }
                remaining += latent;
                soc = 0.0;
            }
            PcmState::new(soc, t + remaining / c)
        } else {
            *state
        }
    }

    fn exchange(
        &self,
        state: PcmState,
        inlet: ConnectionState,
        specific_heat: JoulePerLiterKelvin,
        step: f64,
    ) -> (PcmState, ConnectionState) {
        if !is_flowing(inlet.flow) {
            return (state, inlet.with_flow(0.0));
        }
        let fluid = inlet.flow * step * specific_heat;
        let cap = self.transfer_power * step;
        let heat = self.equilibrium_heat(&state, inlet.temperature, fluid).clamp(-cap, cap);
        (
            self.apply_heat(&state, heat),
            inlet.with_temperature(inlet.temperature - heat / fluid),
        )
    }
}

impl Appliance for Pcm {
    type State = PcmState;
    type Control = NoControl;
    type Port = PcmPort;

    fn simulate(
        &self,
        inputs: &PortMap<PcmPort>,
        previous: &PcmState,
        _control: Option<&NoControl>,
        time: &SimulationTime,
    ) -> ApplianceResult<(PcmState, PortMap<PcmPort>)> {
        let step = time.step_seconds();
        let mut state = *previous;
        let mut outputs = PortMap::new();

        if let Some(inlet) = inputs.get(&PcmPort::ChargeIn) {
            let (next, out) = self.exchange(state, *inlet, self.specific_heat_charge, step);
            state = next;
            outputs.insert(PcmPort::ChargeOut, out);
        }
        if let Some(inlet) = inputs.get(&PcmPort::DischargeIn) {
            let (next, out) = self.exchange(state, *inlet, self.specific_heat_discharge, step);
            state = next;
            outputs.insert(PcmPort::DischargeOut, out);
        }

        Ok((state, outputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn pcm(transfer_power: f64) -> Pcm {
        Pcm::new(100.0, 50.0, 1.0, transfer_power, 1.0, 1.0).unwrap()
    }

    fn time(seconds: i64) -> SimulationTime {
        SimulationTime::new(TimeDelta::seconds(seconds), Utc.timestamp_opt(0, 0).unwrap())
    }

    fn charge(pcm: &Pcm, state: PcmState, flow: f64, temperature: f64, seconds: i64) -> (PcmState, ConnectionState) {
        let inputs = PortMap::from([(PcmPort::ChargeIn, ConnectionState::new(flow, temperature))]);
        let (state, out) = pcm.simulate(&inputs, &state, None, &time(seconds)).unwrap();
        (state, out[&PcmPort::ChargeOut])
    }

    #[test]
    fn nothing_connected() {
        let initial = PcmState::new(0.0, 10.0);
        let (state, out) = pcm(10.0).simulate(&PortMap::new(), &initial, None, &time(1)).unwrap();
        assert_eq!(state, initial);
        assert!(out.is_empty());
    }

    #[test]
    fn zero_flow() {
        let initial = PcmState::new(0.0, 0.0);
        let (state, out) = charge(&pcm(10.0), initial, 0.0, 0.0, 1);
        assert_eq!(state, initial);
        assert_eq!(out.flow, 0.0);
    }

    #[test]
    fn charge_pre_phase() {
        let (state, out) = charge(&pcm(10.0), PcmState::new(0.0, 0.0), 1.0, 10.0, 1);
        assert_relative_eq!(state.temperature, 5.0);
        assert_relative_eq!(out.temperature, 5.0);
        assert_eq!(out.flow, 1.0);
    }

    #[test]
    fn charge_transfer_limit() {
        let (state, out) = charge(&pcm(10.0), PcmState::new(0.0, 0.0), 1.0, 40.0, 1);
        assert_relative_eq!(state.temperature, 10.0);
        assert_relative_eq!(out.temperature, 30.0);
    }

    #[test]
    fn charge_in_phase() {
        let (state, out) = charge(&pcm(10.0), PcmState::new(0.0, 50.0), 1.0, 60.0, 1);
        assert_relative_eq!(state.temperature, 50.0);
        assert_relative_eq!(state.state_of_charge, 0.1);
        assert_relative_eq!(out.temperature, 50.0);

        let (state, out) = charge(&pcm(10.0), PcmState::new(0.0, 50.0), 1.0, 60.0, 2);
        assert_relative_eq!(state.state_of_charge, 0.2);
        assert_relative_eq!(out.temperature, 50.0);
    }

    #[test]
    fn charge_post_phase() {
        let (state, out) = charge(&pcm(10.0), PcmState::new(1.0, 50.0), 1.0, 60.0, 1);
        assert_relative_eq!(state.temperature, 55.0);
        assert_relative_eq!(out.temperature, 55.0);

        let (state, out) = charge(&pcm(10.0), PcmState::new(1.0, 50.0), 1.0, 80.0, 2);
        assert_relative_eq!(state.temperature, 70.0);
        assert_relative_eq!(out.temperature, 70.0);
    }

    #[test]
    fn charge_through_all_regions() {
        // 50 K to reach the phase, 100 J latent, then 150 and 50 settle at 100
        let (state, out) = charge(&pcm(10_000.0), PcmState::new(0.0, 0.0), 1.0, 300.0, 1);
        assert_relative_eq!(state.temperature, 100.0);
        assert_relative_eq!(state.state_of_charge, 1.0);
        assert_relative_eq!(out.temperature, 100.0);
    }

    #[test]
    fn discharge_regions() {
        let (state, out) = charge(&pcm(10.0), PcmState::new(0.0, 50.0), 1.0, 40.0, 1);
        assert_relative_eq!(state.temperature, 45.0);
        assert_relative_eq!(out.temperature, 45.0);

        let (state, out) = charge(&pcm(10_000.0), PcmState::new(1.0, 50.0), 10.0, 40.0, 1);
        assert_relative_eq!(state.state_of_charge, 0.0);
        assert_relative_eq!(state.temperature, 50.0);
        assert_relative_eq!(out.temperature, 50.0);
        assert_eq!(out.flow, 10.0);

        let (state, out) = charge(&pcm(10.0), PcmState::new(1.0, 70.0), 1.0, 60.0, 1);
        assert_relative_eq!(state.temperature, 65.0);
        assert_relative_eq!(out.temperature, 65.0);
    }

    #[test]
    fn charge_and_discharge_together() {
        let inputs = PortMap::from([
            (PcmPort::ChargeIn, ConnectionState::new(1.0, 40.0)),
            (PcmPort::DischargeIn, ConnectionState::new(1.0, 60.0)),
        ]);
        let (state, out) = pcm(10.0)
            .simulate(&inputs, &PcmState::new(0.5, 50.0), None, &time(1))
            .unwrap();
        assert_relative_eq!(state.temperature, 50.0);
        assert_relative_eq!(state.state_of_charge, 0.5, epsilon = 1e-12);
        assert_relative_eq!(out[&PcmPort::ChargeOut].temperature, 50.0);
        assert_relative_eq!(out[&PcmPort::DischargeOut].temperature, 50.0);
    }

    #[test]
    fn transfer_power_caps_both_ports() {
        let inputs = PortMap::from([
            (PcmPort::ChargeIn, ConnectionState::new(10.0, 40.0)),
            (PcmPort::DischargeIn, ConnectionState::new(10.0, 60.0)),
        ]);
        let (state, out) = pcm(10.0)
            .simulate(&inputs, &PcmState::new(0.5, 50.0), None, &time(1))
            .unwrap();
        assert_relative_eq!(state.temperature, 50.0);
        assert_relative_eq!(state.state_of_charge, 0.5, epsilon = 1e-12);
        assert_relative_eq!(out[&PcmPort::ChargeOut].temperature, 41.0);
        assert_relative_eq!(out[&PcmPort::DischargeOut].temperature, 59.0);
        assert_eq!(out[&PcmPort::DischargeOut].flow, 10.0);
    }

    #[test]
    fn rejects_non_positive_capacity() {
        assert!(Pcm::new(100.0, 50.0, 0.0, 10.0, 1.0, 1.0).is_err());
    }
}
