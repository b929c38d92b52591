//! Control state threaded from one evaluation to the next.

use eb_controls::{Context, Pid, PidConfig};
use eb_core::units::Ratio;
use serde::{Deserialize, Serialize};

use crate::components::{
    CHILLER_SWITCH_VALVE_YAZAKI_POSITION, HOT_SWITCH_VALVE_PCM_POSITION,
    WASTE_SWITCH_VALVE_YAZAKI_POSITION,
};
use crate::setpoints::Setpoints;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotControlMode {
    Idle,
    WaitingForSun,
    PrepareHeatPcm,
    HeatPcm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HotControlState {
    pub context: Context,
    pub mode: HotControlMode,
    pub feedback_valve_controller: Pid,
    pub hot_switch_valve_position: Ratio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChillControlMode {
    NoChill,
    PrepareChillYazaki,
    CheckYazakiBounds,
    ChillYazaki,
    PrepareChillChiller,
    ChillChiller,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChillControlState {
    pub context: Context,
    pub mode: ChillControlMode,
    pub yazaki_hot_feedback_valve_controller: Pid,
    pub chiller_switch_valve_position: Ratio,
    pub waste_switch_valve_position: Ratio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteControlMode {
    NoOutboard,
    RunOutboard,
    /// Outboard pump briefly stopped to clear a diverging heat dump reading.
    ToggleOutboard,
    RunOutboardAfterToggle,
    ManualRunOutboard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WasteControlState {
    pub context: Context,
    pub mode: WasteControlMode,
    pub frequency_controller: Pid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshWaterControlMode {
    Ready,
    FilterTank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicalWaterControlMode {
    NoFill,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterTreatmentControlMode {
    NoRun,
    Run,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoolingSupplyControlMode {
    Disabled,
    EnabledNoSupply,
    Supply,
}

/// State of a module that only tracks its mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeState<M> {
    pub context: Context,
    pub mode: M,
}

impl<M> ModeState<M> {
    pub fn new(mode: M) -> Self {
        Self {
            context: Context::default(),
            mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerHubControlState {
    pub hot: HotControlState,
    pub chill: ChillControlState,
    pub waste: WasteControlState,
    pub fresh_water: ModeState<FreshWaterControlMode>,
    pub technical_water: ModeState<TechnicalWaterControlMode>,
    pub water_treatment: ModeState<WaterTreatmentControlMode>,
    pub cooling_supply: ModeState<CoolingSupplyControlMode>,
    pub setpoints: Setpoints,
}

/// Current mode of every module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlModes {
    pub hot: HotControlMode,
    pub chill: ChillControlMode,
    pub waste: WasteControlMode,
    pub fresh_water: FreshWaterControlMode,
    pub technical_water: TechnicalWaterControlMode,
    pub water_treatment: WaterTreatmentControlMode,
    pub cooling_supply: CoolingSupplyControlMode,
}

impl PowerHubControlState {
    pub fn modes(&self) -> ControlModes {
        ControlModes {
            hot: self.hot.mode,
            chill: self.chill.mode,
            waste: self.waste.mode,
            fresh_water: self.fresh_water.mode,
            technical_water: self.technical_water.mode,
            water_treatment: self.water_treatment.mode,
            cooling_supply: self.cooling_supply.mode,
        }
    }
}

pub fn initial_control_state() -> PowerHubControlState {
    PowerHubControlState {
        hot: HotControlState {
            context: Context::default(),
            mode: HotControlMode::Idle,
            // can't fully bypass or the temperature sensor sees no difference
            feedback_valve_controller: Pid::new(
                PidConfig::new(0.0, 0.005, 0.0).with_limits(0.0, 0.52),
            ),
            hot_switch_valve_position: HOT_SWITCH_VALVE_PCM_POSITION,
        },
        chill: ChillControlState {
            context: Context::default(),
            mode: ChillControlMode::NoChill,
            yazaki_hot_feedback_valve_controller: Pid::new(
                PidConfig::new(0.0, 0.01, 0.0).with_limits(0.5, 1.0),
            ),
            chiller_switch_valve_position: CHILLER_SWITCH_VALVE_YAZAKI_POSITION,
            waste_switch_valve_position: WASTE_SWITCH_VALVE_YAZAKI_POSITION,
        },
        waste: WasteControlState {
            context: Context::default(),
            mode: WasteControlMode::NoOutboard,
            frequency_controller: Pid::new(
                PidConfig::new(0.0, 0.01, 0.0)
                    .with_limits(0.7, 1.0)
                    .reversed(),
            ),
        },
        fresh_water: ModeState::new(FreshWaterControlMode::Ready),
        technical_water: ModeState::new(TechnicalWaterControlMode::NoFill),
        water_treatment: ModeState::new(WaterTreatmentControlMode::NoRun),
        cooling_supply: ModeState::new(CoolingSupplyControlMode::Disabled),
        setpoints: Setpoints::default(),
    }
}
