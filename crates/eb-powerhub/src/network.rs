//! The power hub plant: appliances, piping and initial state.

use chrono::{DateTime, TimeDelta, Utc};
use eb_appliances::{
    Boiler, BoilerPort, BoilerState, Chiller, ChillerPort, ConnectionState, CoolingSink,
    CoolingSinkPort, FrequencyPump, HeatExchanger, HeatExchangerPort, HeatPipes, HeatPipesPort,
    HeatPipesState, Mix, MixPort, Pcm, PcmPort, PcmState, PumpPort, Source, SourcePort, SwitchPump,
    Valve, ValvePort, ValveState, WaterDemand, WaterDemandPort, WaterMaker, WaterMakerPort,
    WaterTank, WaterTankPort, WaterTankState, WaterTreatment, WaterTreatmentPort, Yazaki,
    YazakiPort,
};
use eb_core::{Schedule, SimulationTime};
use eb_network::{Handle, Network, NetworkBuilder, NetworkState};

use crate::components::{self as phc, AMBIENT_TEMPERATURE};
use crate::error::PowerHubResult;

/// Weather and demand profiles driving the plant.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerHubSchedules {
    pub global_irradiance: Schedule,
    pub ambient_temperature: Schedule,
    pub cooling_demand: Schedule,
    pub sea_water_temperature: Schedule,
    pub fresh_water_temperature: Schedule,
    pub water_demand: Schedule,
}

impl PowerHubSchedules {
    pub fn const_schedules() -> Self {
        Self {
            global_irradiance: phc::GLOBAL_IRRADIANCE.into(),
            ambient_temperature: AMBIENT_TEMPERATURE.into(),
            cooling_demand: phc::COOLING_DEMAND.into(),
            sea_water_temperature: phc::SEAWATER_TEMPERATURE.into(),
            fresh_water_temperature: phc::FRESHWATER_TEMPERATURE.into(),
            water_demand: phc::WATER_DEMAND.into(),
        }
    }
}

impl Default for PowerHubSchedules {
    fn default() -> Self {
        Self::const_schedules()
    }
}

/// The plant network together with a typed handle for every appliance.
#[derive(Debug)]
pub struct PowerHub {
    network: Network,
    schedules: PowerHubSchedules,

    pub heat_pipes: Handle<HeatPipes>,
    pub heat_pipes_valve: Handle<Valve>,
    pub heat_pipes_pump: Handle<SwitchPump>,
    pub heat_pipes_mix: Handle<Mix>,
    pub hot_reservoir: Handle<Boiler>,
    pub hot_switch_valve: Handle<Valve>,
    pub hot_mix: Handle<Mix>,
    pub pcm: Handle<Pcm>,

    pub yazaki: Handle<Yazaki>,
    pub pcm_to_yazaki_pump: Handle<SwitchPump>,
    pub yazaki_hot_bypass_valve: Handle<Valve>,
    pub yazaki_bypass_mix: Handle<Mix>,

    pub chiller_switch_valve: Handle<Valve>,
    pub chiller: Handle<Chiller>,
    pub chill_mix: Handle<Mix>,
    pub cold_reservoir: Handle<Boiler>,
    pub chilled_loop_pump: Handle<SwitchPump>,
    pub cooling_demand_pump: Handle<SwitchPump>,
    pub cooling_demand: Handle<CoolingSink>,

    pub waste_switch_valve: Handle<Valve>,
    pub yazaki_waste_bypass_valve: Handle<Valve>,
    pub yazaki_waste_mix: Handle<Mix>,
    pub waste_bypass_valve: Handle<Valve>,
    pub chiller_waste_mix: Handle<Mix>,
    pub waste_mix: Handle<Mix>,
    pub preheat_bypass_valve: Handle<Valve>,
    pub preheat_reservoir: Handle<Boiler>,
    pub preheat_mix: Handle<Mix>,
    pub waste_pump: Handle<SwitchPump>,
    pub outboard_exchange: Handle<HeatExchanger>,
    pub outboard_source: Handle<Source>,
    pub outboard_pump: Handle<FrequencyPump>,
    pub fresh_water_source: Handle<Source>,

    pub water_maker_source: Handle<Source>,
    pub water_maker: Handle<WaterMaker>,
    pub fresh_water_tank: Handle<WaterTank>,
    pub technical_fill_source: Handle<Source>,
    pub technical_water_regulator: Handle<Valve>,
    pub water_filter_bypass_valve: Handle<Valve>,
    pub technical_water_tank: Handle<WaterTank>,
    pub water_demand: Handle<WaterDemand>,
    pub grey_water_tank: Handle<WaterTank>,
    pub water_treatment_source: Handle<Source>,
    pub water_treatment: Handle<WaterTreatment>,
}

impl PowerHub {
    /// Assemble the plant.
    ///
    /// Physical loops are closed with feedback edges at the pump (or heat
    /// exchanger) outlets, so every loop sees its return flow one step late.
    pub fn power_hub(schedules: PowerHubSchedules) -> PowerHubResult<Self> {
        let mut b = NetworkBuilder::new();
        let s = &schedules;

        let heat_pipes = b.add(
            "heat_pipes",
            phc::heat_pipes(s.global_irradiance.clone(), s.ambient_temperature.clone()),
        );
        let heat_pipes_valve = b.add("heat_pipes_valve", Valve);
        let heat_pipes_pump = b.add(
            "heat_pipes_pump",
            SwitchPump::new(phc::HEAT_PIPES_PUMP_FLOW),
        );
        let heat_pipes_mix = b.add("heat_pipes_mix", Mix);
        let hot_reservoir = b.add("hot_reservoir", phc::hot_reservoir()?);
        let hot_switch_valve = b.add("hot_switch_valve", Valve);
        let hot_mix = b.add("hot_mix", Mix);
        let pcm = b.add("pcm", phc::pcm()?);

        let yazaki = b.add("yazaki", phc::yazaki());
        let pcm_to_yazaki_pump = b.add(
            "pcm_to_yazaki_pump",
            SwitchPump::new(phc::PCM_TO_YAZAKI_PUMP_FLOW),
        );
        let yazaki_hot_bypass_valve = b.add("yazaki_hot_bypass_valve", Valve);
        let yazaki_bypass_mix = b.add("yazaki_bypass_mix", Mix);

        let chiller_switch_valve = b.add("chiller_switch_valve", Valve);
        let chiller = b.add("chiller", phc::chiller());
        let chill_mix = b.add("chill_mix", Mix);
        let cold_reservoir = b.add("cold_reservoir", phc::cold_reservoir()?);
        let chilled_loop_pump = b.add(
            "chilled_loop_pump",
            SwitchPump::new(phc::CHILLED_LOOP_PUMP_FLOW),
        );
        let cooling_demand_pump = b.add(
            "cooling_demand_pump",
            SwitchPump::new(phc::COOLING_DEMAND_PUMP_FLOW),
        );
        let cooling_demand = b.add(
            "cooling_demand",
            phc::cooling_demand(s.cooling_demand.clone()),
        );

        let waste_switch_valve = b.add("waste_switch_valve", Valve);
        let yazaki_waste_bypass_valve = b.add("yazaki_waste_bypass_valve", Valve);
        let yazaki_waste_mix = b.add("yazaki_waste_mix", Mix);
        let waste_bypass_valve = b.add("waste_bypass_valve", Valve);
        let chiller_waste_mix = b.add("chiller_waste_mix", Mix);
        let waste_mix = b.add("waste_mix", Mix);
        let preheat_bypass_valve = b.add("preheat_bypass_valve", Valve);
        let preheat_reservoir = b.add("preheat_reservoir", phc::preheat_reservoir()?);
        let preheat_mix = b.add("preheat_mix", Mix);
        let waste_pump = b.add("waste_pump", SwitchPump::new(phc::WASTE_PUMP_FLOW));
        let outboard_exchange = b.add("outboard_exchange", phc::outboard_exchange());
        // flow is set by the outboard pump
        let outboard_source = b.add(
            "outboard_source",
            Source::new(0.0, s.sea_water_temperature.clone()),
        );
        let outboard_pump = b.add("outboard_pump", phc::outboard_pump());
        let fresh_water_source = b.add(
            "fresh_water_source",
            Source::new(0.0, s.fresh_water_temperature.clone()),
        );

        let water_maker_source = b.add(
            "water_maker_source",
            Source::new(phc::WATER_MAKER_FEED, s.sea_water_temperature.clone()),
        );
        let water_maker = b.add("water_maker", phc::water_maker());
        let fresh_water_tank = b.add("fresh_water_tank", phc::water_tank()?);
        let technical_fill_source = b.add(
            "technical_fill_source",
            Source::new(phc::TECHNICAL_FILL_FLOW, s.fresh_water_temperature.clone()),
        );
        let technical_water_regulator = b.add("technical_water_regulator", Valve);
        let water_filter_bypass_valve = b.add("water_filter_bypass_valve", Valve);
        let technical_water_tank = b.add("technical_water_tank", phc::water_tank()?);
        let water_demand = b.add(
            "water_demand",
            phc::water_demand(s.water_demand.clone(), s.fresh_water_temperature.clone()),
        );
        let grey_water_tank = b.add("grey_water_tank", phc::water_tank()?);
        let water_treatment_source = b.add(
            "water_treatment_source",
            Source::new(phc::WATER_TREATMENT_FEED, s.fresh_water_temperature.clone()),
        );
        let water_treatment = b.add("water_treatment", phc::water_treatment());

        // Hot loop: heat pipes charge the PCM or the hot reservoir
        b.connect(heat_pipes)
            .at(HeatPipesPort::Out)
            .to(heat_pipes_valve)
            .at(ValvePort::Ab)
            .connect(heat_pipes_valve)
            .at(ValvePort::A)
            .to(hot_switch_valve)
            .at(ValvePort::Ab)
            .connect(heat_pipes_valve)
            .at(ValvePort::B)
            .to(heat_pipes_mix)
            .at(MixPort::B)
            .connect(hot_switch_valve)
            .at(ValvePort::A)
            .to(pcm)
            .at(PcmPort::ChargeIn)
            .connect(hot_switch_valve)
            .at(ValvePort::B)
            .to(hot_reservoir)
            .at(BoilerPort::HeatExchangeIn)
            .connect(pcm)
            .at(PcmPort::ChargeOut)
            .to(hot_mix)
            .at(MixPort::A)
            .connect(hot_reservoir)
            .at(BoilerPort::HeatExchangeOut)
            .to(hot_mix)
            .at(MixPort::B)
            .connect(hot_mix)
            .at(MixPort::Ab)
            .to(heat_pipes_mix)
            .at(MixPort::A)
            .connect(heat_pipes_mix)
            .at(MixPort::Ab)
            .to(heat_pipes_pump)
            .at(PumpPort::In)
            .feedback(heat_pipes_pump)
            .at(PumpPort::Out)
            .to(heat_pipes)
            .at(HeatPipesPort::In);

        // PCM discharge into the Yazaki
        b.connect(pcm)
            .at(PcmPort::DischargeOut)
            .to(yazaki_bypass_mix)
            .at(MixPort::B)
            .connect(yazaki_bypass_mix)
            .at(MixPort::Ab)
            .to(pcm_to_yazaki_pump)
            .at(PumpPort::In)
            .feedback(pcm_to_yazaki_pump)
            .at(PumpPort::Out)
            .to(yazaki)
            .at(YazakiPort::HotIn)
            .connect(yazaki)
            .at(YazakiPort::HotOut)
            .to(yazaki_hot_bypass_valve)
            .at(ValvePort::Ab)
            .connect(yazaki_hot_bypass_valve)
            .at(ValvePort::A)
            .to(yazaki_bypass_mix)
            .at(MixPort::A)
            .connect(yazaki_hot_bypass_valve)
            .at(ValvePort::B)
            .to(pcm)
            .at(PcmPort::DischargeIn);

        // Chilled side
        b.feedback(chilled_loop_pump)
            .at(PumpPort::Out)
            .to(chiller_switch_valve)
            .at(ValvePort::Ab)
            .connect(chiller_switch_valve)
            .at(ValvePort::A)
            .to(yazaki)
            .at(YazakiPort::ChilledIn)
            .connect(chiller_switch_valve)
            .at(ValvePort::B)
            .to(chiller)
            .at(ChillerPort::ChilledIn)
            .connect(yazaki)
            .at(YazakiPort::ChilledOut)
            .to(chill_mix)
            .at(MixPort::A)
            .connect(chiller)
            .at(ChillerPort::ChilledOut)
            .to(chill_mix)
            .at(MixPort::B)
            .connect(chill_mix)
            .at(MixPort::Ab)
            .to(cold_reservoir)
            .at(BoilerPort::HeatExchangeIn)
            .connect(cold_reservoir)
            .at(BoilerPort::HeatExchangeOut)
            .to(chilled_loop_pump)
            .at(PumpPort::In);

        // Cooling demand loop
        b.connect(cold_reservoir)
            .at(BoilerPort::FillOut)
            .to(cooling_demand_pump)
            .at(PumpPort::In)
            .connect(cooling_demand_pump)
            .at(PumpPort::Out)
            .to(cooling_demand)
            .at(CoolingSinkPort::In)
            .feedback(cooling_demand)
            .at(CoolingSinkPort::Out)
            .to(cold_reservoir)
            .at(BoilerPort::FillIn);

        // Waste heat to the outboard exchanger
        b.feedback(outboard_exchange)
            .at(HeatExchangerPort::AOut)
            .to(waste_switch_valve)
            .at(ValvePort::Ab)
            .connect(waste_switch_valve)
            .at(ValvePort::A)
            .to(yazaki_waste_bypass_valve)
            .at(ValvePort::Ab)
            .connect(yazaki_waste_bypass_valve)
            .at(ValvePort::A)
            .to(yazaki)
            .at(YazakiPort::CoolingIn)
            .connect(yazaki_waste_bypass_valve)
            .at(ValvePort::B)
            .to(yazaki_waste_mix)
            .at(MixPort::B)
            .connect(yazaki)
            .at(YazakiPort::CoolingOut)
            .to(yazaki_waste_mix)
            .at(MixPort::A)
            .connect(waste_switch_valve)
            .at(ValvePort::B)
            .to(waste_bypass_valve)
            .at(ValvePort::Ab)
            .connect(waste_bypass_valve)
            .at(ValvePort::A)
            .to(chiller_waste_mix)
            .at(MixPort::B)
            .connect(waste_bypass_valve)
            .at(ValvePort::B)
            .to(chiller)
            .at(ChillerPort::CoolingIn)
            .connect(chiller)
            .at(ChillerPort::CoolingOut)
            .to(chiller_waste_mix)
            .at(MixPort::A)
            .connect(yazaki_waste_mix)
            .at(MixPort::Ab)
            .to(waste_mix)
            .at(MixPort::A)
            .connect(chiller_waste_mix)
            .at(MixPort::Ab)
            .to(waste_mix)
            .at(MixPort::B)
            .connect(waste_mix)
            .at(MixPort::Ab)
            .to(preheat_bypass_valve)
            .at(ValvePort::Ab)
            .connect(preheat_bypass_valve)
            .at(ValvePort::A)
            .to(preheat_reservoir)
            .at(BoilerPort::HeatExchangeIn)
            .connect(preheat_bypass_valve)
            .at(ValvePort::B)
            .to(preheat_mix)
            .at(MixPort::B)
            .connect(preheat_reservoir)
            .at(BoilerPort::HeatExchangeOut)
            .to(preheat_mix)
            .at(MixPort::A)
            .connect(preheat_mix)
            .at(MixPort::Ab)
            .to(waste_pump)
            .at(PumpPort::In)
            .connect(waste_pump)
            .at(PumpPort::Out)
            .to(outboard_exchange)
            .at(HeatExchangerPort::AIn);

        // Sea water side of the outboard exchanger
        b.connect(outboard_source)
            .at(SourcePort::Out)
            .to(outboard_pump)
            .at(PumpPort::In)
            .connect(outboard_pump)
            .at(PumpPort::Out)
            .to(outboard_exchange)
            .at(HeatExchangerPort::BIn);

        // Fresh water heating
        b.connect(fresh_water_source)
            .at(SourcePort::Out)
            .to(preheat_reservoir)
            .at(BoilerPort::FillIn)
            .connect(preheat_reservoir)
            .at(BoilerPort::FillOut)
            .to(hot_reservoir)
            .at(BoilerPort::FillIn);

        // Water side
        b.connect(water_maker_source)
            .at(SourcePort::Out)
            .to(water_maker)
            .at(WaterMakerPort::In)
            .connect(water_maker)
            .at(WaterMakerPort::DesalinatedOut)
            .to(fresh_water_tank)
            .at(WaterTankPort::In0)
            .connect(technical_fill_source)
            .at(SourcePort::Out)
            .to(technical_water_regulator)
            .at(ValvePort::Ab)
            .connect(technical_water_regulator)
            .at(ValvePort::B)
            .to(fresh_water_tank)
            .at(WaterTankPort::Consumption)
            .connect(fresh_water_tank)
            .at(WaterTankPort::Out)
            .to(water_filter_bypass_valve)
            .at(ValvePort::Ab)
            .connect(water_filter_bypass_valve)
            .at(ValvePort::A)
            .to(technical_water_tank)
            .at(WaterTankPort::In0)
            .feedback(water_filter_bypass_valve)
            .at(ValvePort::B)
            .to(fresh_water_tank)
            .at(WaterTankPort::In1)
            .connect(water_demand)
            .at(WaterDemandPort::DemandOut)
            .to(technical_water_tank)
            .at(WaterTankPort::Consumption)
            .connect(water_demand)
            .at(WaterDemandPort::GreyWaterOut)
            .to(grey_water_tank)
            .at(WaterTankPort::In0)
            .connect(water_treatment_source)
            .at(SourcePort::Out)
            .to(water_treatment)
            .at(WaterTreatmentPort::In)
            .connect(water_treatment)
            .at(WaterTreatmentPort::Out)
            .to(grey_water_tank)
            .at(WaterTankPort::Consumption)
            .connect(grey_water_tank)
            .at(WaterTankPort::Out)
            .to(technical_water_tank)
            .at(WaterTankPort::In1);

        let network = b.build()?;

        Ok(Self {
            network,
            schedules,
            heat_pipes,
            heat_pipes_valve,
            heat_pipes_pump,
            heat_pipes_mix,
            hot_reservoir,
            hot_switch_valve,
            hot_mix,
            pcm,
            yazaki,
            pcm_to_yazaki_pump,
            yazaki_hot_bypass_valve,
            yazaki_bypass_mix,
            chiller_switch_valve,
            chiller,
            chill_mix,
            cold_reservoir,
            chilled_loop_pump,
            cooling_demand_pump,
            cooling_demand,
            waste_switch_valve,
            yazaki_waste_bypass_valve,
            yazaki_waste_mix,
            waste_bypass_valve,
            chiller_waste_mix,
            waste_mix,
            preheat_bypass_valve,
            preheat_reservoir,
            preheat_mix,
            waste_pump,
            outboard_exchange,
            outboard_source,
            outboard_pump,
            fresh_water_source,
            water_maker_source,
            water_maker,
            fresh_water_tank,
            technical_fill_source,
            technical_water_regulator,
            water_filter_bypass_valve,
            technical_water_tank,
            water_demand,
            grey_water_tank,
            water_treatment_source,
            water_treatment,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn schedules(&self) -> &PowerHubSchedules {
        &self.schedules
    }

    /// Initial state with one-second steps starting at `start`.
    pub fn simple_initial_state(&self, start: DateTime<Utc>) -> PowerHubResult<NetworkState> {
        self.initial_state(SimulationTime::new(TimeDelta::seconds(1), start))
    }

    /// Everything at ambient temperature, tanks half full, the PCM empty and
    /// the hot side feeding the PCM. Preheating is bypassed and the chilled
    /// and waste circuits point at the Yazaki.
    pub fn initial_state(&self, time: SimulationTime) -> PowerHubResult<NetworkState> {
        let ambient = BoilerState::new(AMBIENT_TEMPERATURE, AMBIENT_TEMPERATURE);
        let seed = ConnectionState::new(0.0, AMBIENT_TEMPERATURE);
        let half_full = WaterTankState { fill_ratio: 0.5 };
        let at = |position| ValveState { position };

        let state = self
            .network
            .define_state(self.heat_pipes)
            .value(HeatPipesState {
                mean_temperature: AMBIENT_TEMPERATURE,
            })
            .define_state(self.heat_pipes_valve)
            .value(at(0.0))
            .define_state(self.hot_switch_valve)
            .value(at(phc::HOT_SWITCH_VALVE_PCM_POSITION))
            .define_state(self.hot_reservoir)
            .value(ambient)
            .define_state(self.pcm)
            .value(PcmState::new(0.0, AMBIENT_TEMPERATURE))
            .define_state(self.yazaki_hot_bypass_valve)
            .value(at(phc::YAZAKI_HOT_BYPASS_VALVE_CLOSED_POSITION))
            .define_state(self.chiller_switch_valve)
            .value(at(phc::CHILLER_SWITCH_VALVE_YAZAKI_POSITION))
            .define_state(self.cold_reservoir)
            .value(ambient)
            .define_state(self.waste_switch_valve)
            .value(at(phc::WASTE_SWITCH_VALVE_YAZAKI_POSITION))
            .define_state(self.yazaki_waste_bypass_valve)
            .value(at(phc::YAZAKI_WASTE_BYPASS_VALVE_CLOSED_POSITION))
            .define_state(self.waste_bypass_valve)
            .value(at(phc::WASTE_BYPASS_VALVE_CLOSED_POSITION))
            .define_state(self.preheat_bypass_valve)
            .value(at(phc::PREHEAT_BYPASS_VALVE_BYPASS_POSITION))
            .define_state(self.preheat_reservoir)
            .value(ambient)
            .define_state(self.technical_water_regulator)
            .value(at(phc::TECHNICAL_WATER_REGULATOR_CLOSED_POSITION))
            .define_state(self.water_filter_bypass_valve)
            .value(at(phc::WATER_FILTER_BYPASS_VALVE_CONSUMPTION_POSITION))
            .define_state(self.fresh_water_tank)
            .value(half_full)
            .define_state(self.technical_water_tank)
            .value(half_full)
            .define_state(self.grey_water_tank)
            .value(half_full)
            .define_state(self.heat_pipes_pump)
            .at(PumpPort::Out)
            .value(seed)
            .define_state(self.pcm_to_yazaki_pump)
            .at(PumpPort::Out)
            .value(seed)
            .define_state(self.chilled_loop_pump)
            .at(PumpPort::Out)
            .value(seed)
            .define_state(self.cooling_demand)
            .at(CoolingSinkPort::Out)
            .value(seed)
            .define_state(self.outboard_exchange)
            .at(HeatExchangerPort::AOut)
            .value(seed)
            .define_state(self.water_filter_bypass_valve)
            .at(ValvePort::B)
            .value(seed)
            .build(time)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use eb_network::NetworkControl;

    #[test]
    fn plant_builds_and_orders_every_appliance() {
        let hub = PowerHub::power_hub(PowerHubSchedules::const_schedules()).unwrap();
        assert_eq!(hub.network().execution_order().len(), hub.network().len());
        assert_eq!(hub.network().feedback().len(), 6);
    }

    #[test]
    fn initial_state_simulates_without_control() {
        let hub = PowerHub::power_hub(PowerHubSchedules::default()).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let state = hub.simple_initial_state(start).unwrap();
        let next = hub
            .network()
            .simulate(&state, &NetworkControl::default())
            .unwrap();
        assert_eq!(next.time().step, 1);
        // valves hold their initial positions without commands
        assert_eq!(
            next.appliance(hub.preheat_bypass_valve),
            Some(&ValveState {
                position: phc::PREHEAT_BYPASS_VALVE_BYPASS_POSITION
            })
        );
    }
}
