//! Snapshot of a network at one step.

use std::collections::BTreeMap;

use eb_appliances::{AnyState, ApplianceKind, ConnectionState};
use eb_core::{ApplianceId, SimulationTime};

use crate::error::{NetworkError, NetworkResult};
use crate::handle::{Endpoint, Handle};
use crate::network::Network;

/// Appliance states and connection values of one step.
///
/// Connections hold every output an appliance produced and every input it
/// received, keyed by the port they were seen at.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkState {
    pub(crate) time: SimulationTime,
    pub(crate) appliances: BTreeMap<ApplianceId, AnyState>,
    pub(crate) connections: BTreeMap<Endpoint, ConnectionState>,
}

impl NetworkState {
    pub(crate) fn empty(time: SimulationTime) -> Self {
        Self {
            time,
            appliances: BTreeMap::new(),
            connections: BTreeMap::new(),
        }
    }

    pub fn time(&self) -> &SimulationTime {
        &self.time
    }

    /// Typed state of the appliance behind `handle`.
    pub fn appliance<A: ApplianceKind>(&self, handle: Handle<A>) -> Option<&A::State> {
        self.appliances
            .get(&handle.id())
            .and_then(|state| A::state_from_any(state))
    }

    /// Value seen at `port` of the appliance behind `handle`.
    pub fn connection<A: ApplianceKind>(
        &self,
        handle: Handle<A>,
        port: A::Port,
    ) -> Option<&ConnectionState> {
        self.connections.get(&handle.endpoint(port))
    }

    pub fn any_appliance(&self, id: ApplianceId) -> Option<&AnyState> {
        self.appliances.get(&id)
    }

    pub fn any_connection(&self, endpoint: &Endpoint) -> Option<&ConnectionState> {
        self.connections.get(endpoint)
    }

    pub fn appliances(&self) -> impl Iterator<Item = (ApplianceId, &AnyState)> {
        self.appliances.iter().map(|(id, state)| (*id, state))
    }

    pub fn connections(&self) -> impl Iterator<Item = (&Endpoint, &ConnectionState)> {
        self.connections.iter()
    }
}

/// Collects initial appliance states and feedback seeds.
///
/// ```ignore
/// let state = network
///     .define_state(boiler).value(BoilerState::new(20.0, 20.0))
///     .define_state(pump).at(PumpPort::Out).value(ConnectionState::new(0.0, 20.0))
///     .build(time)?;
/// ```
#[derive(Debug)]
pub struct NetworkStateBuilder<'n> {
    network: &'n Network,
    appliances: BTreeMap<ApplianceId, AnyState>,
    connections: BTreeMap<Endpoint, ConnectionState>,
}

impl<'n> NetworkStateBuilder<'n> {
    pub(crate) fn new(network: &'n Network) -> Self {
        Self {
            network,
            appliances: BTreeMap::new(),
            connections: BTreeMap::new(),
        }
    }

    pub fn define_state<A: ApplianceKind>(self, handle: Handle<A>) -> StateDefinition<'n, A> {
        StateDefinition {
            builder: self,
            handle,
        }
    }

    /// Validate and freeze the state at `time`.
    ///
    /// Stateless appliances are filled in. Every other appliance needs a
    /// state and every feedback edge needs a seed at its source port.
    pub fn build(self, time: SimulationTime) -> NetworkResult<NetworkState> {
        let Self {
            network,
            mut appliances,
            connections,
        } = self;

        for id in network.ids() {
            if appliances.contains_key(&id) {
                continue;
            }
            let implicit = network
                .any_appliance(id)
                .and_then(|appliance| appliance.implicit_state());
            match implicit {
                Some(state) => {
                    appliances.insert(id, state);
                }
                None => {
                    return Err(NetworkError::MissingState {
                        appliance: network.name(id).to_owned(),
                    });
                }
            }
        }

        for edge in network.feedback() {
            if !connections.contains_key(&edge.from) {
                return Err(NetworkError::MissingFeedbackSeed {
                    appliance: network.name(edge.from.appliance).to_owned(),
                    port: edge.from.port.as_str(),
                });
            }
        }

        Ok(NetworkState {
            time,
            appliances,
            connections,
        })
    }
}

pub struct StateDefinition<'n, A> {
    builder: NetworkStateBuilder<'n>,
    handle: Handle<A>,
}

impl<'n, A: ApplianceKind> StateDefinition<'n, A> {
    pub fn value(mut self, state: A::State) -> NetworkStateBuilder<'n> {
        self.builder
            .appliances
            .insert(self.handle.id(), A::state_into_any(state));
        self.builder
    }

    /// Seed a connection value at `port`.
    pub fn at(self, port: A::Port) -> SeedDefinition<'n> {
        SeedDefinition {
            endpoint: self.handle.endpoint(port),
            builder: self.builder,
        }
    }
}

pub struct SeedDefinition<'n> {
    builder: NetworkStateBuilder<'n>,
    endpoint: Endpoint,
}

impl<'n> SeedDefinition<'n> {
    pub fn value(mut self, connection: ConnectionState) -> NetworkStateBuilder<'n> {
        self.builder.connections.insert(self.endpoint, connection);
        self.builder
    }
}
