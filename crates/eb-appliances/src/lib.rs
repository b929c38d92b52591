//! eb-appliances: physical component library for energy plant networks.
//!
//! Provides models for:
//! - Sources, mixers, valves and pumps
//! - Thermal storage (boilers, phase-change material)
//! - Heat exchangers, solar heat pipes, compression and absorption chillers
//! - Water handling (tanks, treatment, desalination, demand)
//!
//! Every appliance implements the [`Appliance`] trait: a pure function from
//! port inputs, previous state, optional control and simulation time to a new
//! state and port outputs. Runtime state lives outside the appliance.
//!
//! [`kind`] erases the per-appliance types into tagged unions so a network can
//! hold heterogeneous appliances.

pub mod boiler;
pub mod chiller;
pub mod common;
pub mod cooling_sink;
pub mod error;
pub mod heat_exchanger;
pub mod heat_pipes;
pub mod kind;
pub mod mix;
pub mod pcm;
pub mod pump;
pub mod source;
pub mod traits;
pub mod valve;
pub mod water_demand;
pub mod water_maker;
pub mod water_tank;
pub mod water_treatment;
pub mod yazaki;

// Re-exports
pub use boiler::{Boiler, BoilerControl, BoilerPort, BoilerState};
pub use chiller::{Chiller, ChillerControl, ChillerPort};
pub use cooling_sink::{CoolingSink, CoolingSinkPort};
pub use error::{ApplianceError, ApplianceResult};
pub use heat_exchanger::{HeatExchanger, HeatExchangerPort};
pub use heat_pipes::{HeatPipes, HeatPipesPort, HeatPipesState};
pub use kind::{AnyAppliance, AnyControl, AnyPort, AnyPortMap, AnyState, ApplianceKind};
pub use mix::{Mix, MixPort};
pub use pcm::{Pcm, PcmPort, PcmState};
pub use pump::{FrequencyPump, FrequencyPumpControl, PumpPort, SwitchPump, SwitchPumpControl};
pub use source::{Source, SourcePort};
pub use traits::{Appliance, ConnectionState, NoControl, NoState, Port, PortMap};
pub use valve::{Valve, ValveControl, ValvePort, ValveState};
pub use water_demand::{WaterDemand, WaterDemandPort};
pub use water_maker::{WaterMaker, WaterMakerPort};
pub use water_tank::{WaterTank, WaterTankPort, WaterTankState};
pub use water_treatment::{WaterTreatment, WaterTreatmentControl, WaterTreatmentPort};
pub use yazaki::{Yazaki, YazakiControl, YazakiPort};
