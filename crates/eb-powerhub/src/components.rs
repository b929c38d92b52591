//! Plant constants and appliance parameters.

use eb_appliances::{
    ApplianceResult, Boiler, Chiller, CoolingSink, FrequencyPump, HeatExchanger, HeatPipes, Pcm,
    ValveControl, WaterDemand, WaterMaker, WaterTank, WaterTreatment, Yazaki,
};
use eb_core::Schedule;
use eb_core::units::{
    Celsius, JoulePerLiterKelvin, Liter, LiterPerSecond, Ratio, Watt, WattPerMeterSquared,
};

pub const WATER_SPECIFIC_HEAT: JoulePerLiterKelvin = 4186.0 * 0.997;
// Tyfocor LS at 80 C
pub const GLYCOL_SPECIFIC_HEAT: JoulePerLiterKelvin = 3840.0 * 0.993;
pub const SEAWATER_SPECIFIC_HEAT: JoulePerLiterKelvin = 4007.0 * 1.025;

pub const SEAWATER_TEMPERATURE: Celsius = 24.0;
pub const FRESHWATER_TEMPERATURE: Celsius = 24.0;
pub const AMBIENT_TEMPERATURE: Celsius = 20.0;
pub const GLOBAL_IRRADIANCE: WattPerMeterSquared = 800.0;
/// 100 kWh per day.
pub const COOLING_DEMAND: Watt = 100.0 * 1000.0 / 24.0;

pub const WATER_DEMAND: LiterPerSecond = 0.01;
pub const WATER_MAKER_FEED: LiterPerSecond = 0.02;
pub const TECHNICAL_FILL_FLOW: LiterPerSecond = 35.0 / 60.0;
pub const WATER_TREATMENT_FEED: LiterPerSecond = 0.05;

pub const HOT_SWITCH_VALVE_PCM_POSITION: Ratio = ValveControl::A_POSITION;
pub const HOT_SWITCH_VALVE_RESERVOIR_POSITION: Ratio = ValveControl::B_POSITION;
pub const HEAT_PIPES_BYPASS_OPEN_POSITION: Ratio = ValveControl::B_POSITION;
pub const CHILLER_SWITCH_VALVE_YAZAKI_POSITION: Ratio = ValveControl::A_POSITION;
pub const CHILLER_SWITCH_VALVE_CHILLER_POSITION: Ratio = ValveControl::B_POSITION;
pub const WASTE_SWITCH_VALVE_YAZAKI_POSITION: Ratio = ValveControl::A_POSITION;
pub const WASTE_SWITCH_VALVE_CHILLER_POSITION: Ratio = ValveControl::B_POSITION;
pub const WASTE_BYPASS_VALVE_CLOSED_POSITION: Ratio = ValveControl::B_POSITION;
pub const YAZAKI_HOT_BYPASS_VALVE_OPEN_POSITION: Ratio = ValveControl::A_POSITION;
pub const YAZAKI_HOT_BYPASS_VALVE_CLOSED_POSITION: Ratio = ValveControl::B_POSITION;
pub const YAZAKI_WASTE_BYPASS_VALVE_CLOSED_POSITION: Ratio = ValveControl::A_POSITION;
pub const PREHEAT_BYPASS_VALVE_PREHEAT_POSITION: Ratio = ValveControl::A_POSITION;
pub const PREHEAT_BYPASS_VALVE_BYPASS_POSITION: Ratio = ValveControl::B_POSITION;
pub const WATER_FILTER_BYPASS_VALVE_FILTER_POSITION: Ratio = ValveControl::B_POSITION;
pub const WATER_FILTER_BYPASS_VALVE_CONSUMPTION_POSITION: Ratio = ValveControl::A_POSITION;
pub const TECHNICAL_WATER_REGULATOR_OPEN_POSITION: Ratio = ValveControl::B_POSITION;
pub const TECHNICAL_WATER_REGULATOR_CLOSED_POSITION: Ratio = ValveControl::A_POSITION;

pub const HEAT_PIPES_PUMP_FLOW: LiterPerSecond = 15.0 / 60.0;
pub const PCM_TO_YAZAKI_PUMP_FLOW: LiterPerSecond = 72.0 / 60.0;
// 42 - 100 l/min
pub const CHILLED_LOOP_PUMP_FLOW: LiterPerSecond = 70.0 / 60.0;
// 50 - 170 l/min
pub const WASTE_PUMP_FLOW: LiterPerSecond = 100.0 / 60.0;
pub const OUTBOARD_PUMP_FLOW: LiterPerSecond = 300.0 / 60.0;
pub const COOLING_DEMAND_PUMP_FLOW: LiterPerSecond = 70.0 / 60.0;

pub const HOT_RESERVOIR_VOLUME: Liter = 130.0;
pub const COLD_RESERVOIR_VOLUME: Liter = 800.0;
pub const PREHEAT_RESERVOIR_VOLUME: Liter = 100.0;
pub const WATER_TANK_CAPACITY: Liter = 1000.0;

pub fn heat_pipes(irradiance: Schedule, ambient_temperature: Schedule) -> HeatPipes {
    HeatPipes {
        neta0: 0.767,
        a1: 1.649,
        a2: 0.006,
        area: 16.3,
        specific_heat: GLYCOL_SPECIFIC_HEAT,
        irradiance,
        ambient_temperature,
    }
}

pub fn pcm() -> ApplianceResult<Pcm> {
    Pcm::new(
        // 610 kg at 242 kJ/kg
        242_000.0 * 610.0,
        78.0,
        // 610 kg at 1.59 kJ/kg K, liquid at 82 C
        1590.0 * 610.0,
        40_000.0,
        GLYCOL_SPECIFIC_HEAT,
        WATER_SPECIFIC_HEAT,
    )
}

pub fn hot_reservoir() -> ApplianceResult<Boiler> {
    Boiler::new(
        HOT_RESERVOIR_VOLUME,
        6.0,
        40.0,
        GLYCOL_SPECIFIC_HEAT,
        WATER_SPECIFIC_HEAT,
    )
}

pub fn cold_reservoir() -> ApplianceResult<Boiler> {
    Boiler::new(
        COLD_RESERVOIR_VOLUME,
        0.0,
        0.0,
        WATER_SPECIFIC_HEAT,
        WATER_SPECIFIC_HEAT,
    )
}

pub fn preheat_reservoir() -> ApplianceResult<Boiler> {
    Boiler::new(
        PREHEAT_RESERVOIR_VOLUME,
        0.0,
        36.0,
        WATER_SPECIFIC_HEAT,
        WATER_SPECIFIC_HEAT,
    )
}

pub fn yazaki() -> Yazaki {
    Yazaki::new(WATER_SPECIFIC_HEAT, WATER_SPECIFIC_HEAT, WATER_SPECIFIC_HEAT)
}

pub fn chiller() -> Chiller {
    // 2.5 - 18.7 kW cooling capacity
    Chiller::new(10_000.0, WATER_SPECIFIC_HEAT, WATER_SPECIFIC_HEAT)
}

pub fn outboard_exchange() -> HeatExchanger {
    HeatExchanger::new(SEAWATER_SPECIFIC_HEAT, WATER_SPECIFIC_HEAT)
}

pub fn cooling_demand(demand: Schedule) -> CoolingSink {
    CoolingSink {
        demand,
        specific_heat: WATER_SPECIFIC_HEAT,
    }
}

pub fn water_maker() -> WaterMaker {
    WaterMaker { efficiency: 0.9 }
}

pub fn water_treatment() -> WaterTreatment {
    WaterTreatment { efficiency: 1.0 }
}

pub fn water_tank() -> ApplianceResult<WaterTank> {
    WaterTank::new(WATER_TANK_CAPACITY)
}

pub fn water_demand(flow: Schedule, temperature: Schedule) -> WaterDemand {
    WaterDemand { flow, temperature }
}

pub fn outboard_pump() -> FrequencyPump {
    FrequencyPump::new(OUTBOARD_PUMP_FLOW)
}
