//! Commands issued to appliances for one step.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use eb_appliances::{AnyControl, ApplianceKind};
use eb_core::ApplianceId;

use crate::error::{NetworkError, NetworkResult};
use crate::handle::Handle;

/// Per-appliance commands. Appliances without an entry use their default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkControl {
    commands: BTreeMap<ApplianceId, AnyControl>,
}

impl NetworkControl {
    pub fn builder() -> ControlBuilder {
        ControlBuilder::default()
    }

    pub(crate) fn from_commands(commands: BTreeMap<ApplianceId, AnyControl>) -> Self {
        Self { commands }
    }

    /// Typed command for the appliance behind `handle`.
    pub fn get<A: ApplianceKind>(&self, handle: Handle<A>) -> Option<&A::Control> {
        self.commands
            .get(&handle.id())
            .and_then(|command| A::control_from_any(command))
    }

    pub fn get_any(&self, id: ApplianceId) -> Option<&AnyControl> {
        self.commands.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ApplianceId, &AnyControl)> {
        self.commands.iter().map(|(id, command)| (*id, command))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Merge two command sets.
    ///
    /// The same command issued twice is kept once. Two different commands for
    /// one appliance are an error.
    pub fn combine(mut self, other: NetworkControl) -> NetworkResult<NetworkControl> {
        for (id, command) in other.commands {
            match self.commands.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(command);
                }
                Entry::Occupied(slot) if *slot.get() == command => {}
                Entry::Occupied(_) => {
                    return Err(NetworkError::ConflictingControl {
                        appliance: id,
                        kind: command.kind(),
                    });
                }
            }
        }
        Ok(self)
    }
}

/// Builds a [`NetworkControl`] one appliance at a time.
#[derive(Debug, Clone, Default)]
pub struct ControlBuilder {
    commands: BTreeMap<ApplianceId, AnyControl>,
}

impl ControlBuilder {
    pub fn control<A: ApplianceKind>(self, handle: Handle<A>) -> ControlDefinition<A> {
        ControlDefinition {
            builder: self,
            handle,
        }
    }

    pub fn build(self) -> NetworkControl {
        NetworkControl {
            commands: self.commands,
        }
    }
}

pub struct ControlDefinition<A> {
    builder: ControlBuilder,
    handle: Handle<A>,
}

impl<A: ApplianceKind> ControlDefinition<A> {
    /// Set the command, replacing one given earlier for the same appliance.
    pub fn value(mut self, control: A::Control) -> ControlBuilder {
        self.builder
            .commands
            .insert(self.handle.id(), A::control_into_any(control));
        self.builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetworkBuilder;
    use eb_appliances::{SwitchPump, SwitchPumpControl, Valve, ValveControl};

    #[test]
    fn combine_merges_and_detects_conflicts() {
        let mut builder = NetworkBuilder::new();
        let pump = builder.add("pump", SwitchPump::new(1.0));
        let valve = builder.add("valve", Valve);

        let pumps = NetworkControl::builder()
            .control(pump)
            .value(SwitchPumpControl::on())
            .build();
        let valves = NetworkControl::builder()
            .control(valve)
            .value(ValveControl::b_position())
            .build();

        let merged = pumps.clone().combine(valves.clone()).unwrap();
        assert_eq!(merged.get(pump), Some(&SwitchPumpControl::on()));
        assert_eq!(merged.get(valve), Some(&ValveControl::b_position()));

        // identical duplicates are fine
        assert_eq!(merged.clone().combine(pumps).unwrap(), merged);

        let other = NetworkControl::builder()
            .control(valve)
            .value(ValveControl::a_position())
            .build();
        assert!(matches!(
            merged.combine(other),
            Err(NetworkError::ConflictingControl { kind: "valve", .. })
        ));
    }
}
