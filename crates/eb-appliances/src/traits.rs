//! Core traits and values shared by every appliance.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use eb_core::SimulationTime;
use eb_core::units::{Celsius, LiterPerSecond};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApplianceResult;

/// Value carried across one connection during one step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub flow: LiterPerSecond,
    pub temperature: Celsius,
}

impl ConnectionState {
    pub fn new(flow: LiterPerSecond, temperature: Celsius) -> Self {
        Self { flow, temperature }
    }

    /// Same temperature, different flow.
    pub fn with_flow(self, flow: LiterPerSecond) -> Self {
        Self { flow, ..self }
    }

    /// Same flow, different temperature.
    pub fn with_temperature(self, temperature: Celsius) -> Self {
        Self {
            temperature,
            ..self
        }
    }
}

/// Port-keyed connection values, ordered for deterministic iteration.
pub type PortMap<P> = BTreeMap<P, ConnectionState>;

/// Named attachment point of one appliance type.
pub trait Port: Copy + Ord + Hash + fmt::Debug + fmt::Display + 'static {
    /// Stable snake_case name.
    fn as_str(&self) -> &'static str;

    /// Every port of this appliance type.
    fn all() -> &'static [Self];
}

/// State of appliances that carry nothing between steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoState;

/// Control of appliances that accept no commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoControl;

/// A physical component with a pure per-step behaviour.
///
/// The appliance value holds parameters only. State, control and port types
/// are tied to the appliance through the associated types, so a boiler state
/// can never be handed to a valve.
pub trait Appliance {
    type State: Clone + fmt::Debug + PartialEq;
    type Control: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned;
    type Port: Port;

    /// Advance one step.
    ///
    /// Ports that are not wired are absent from `inputs`. `control` is `None`
    /// when no command was issued this step; each appliance documents its
    /// default in that case.
    fn simulate(
        &self,
        inputs: &PortMap<Self::Port>,
        previous: &Self::State,
        control: Option<&Self::Control>,
        time: &SimulationTime,
    ) -> ApplianceResult<(Self::State, PortMap<Self::Port>)>;
}

/// Declare a port enum with stable names.
macro_rules! ports {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $crate::traits::Port for $name {
            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::traits::Port::as_str(self))
            }
        }
    };
}

pub(crate) use ports;
