//! Incremental network builder.

use std::collections::{HashMap, HashSet};

use eb_appliances::{AnyAppliance, ApplianceKind};
use eb_core::{ApplianceId, linearize};

use crate::error::{NetworkError, NetworkResult};
use crate::handle::{Connection, Endpoint, Handle};
use crate::network::Network;

/// Builder for constructing a network incrementally.
///
/// Use `add` to register appliances, `connect` and `feedback` to wire them,
/// then call `build()` to validate and freeze the network.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    names: Vec<String>,
    appliances: Vec<AnyAppliance>,
    connections: Vec<Connection>,
    feedback: Vec<Connection>,
}

#[derive(Debug, Clone, Copy)]
enum EdgeKind {
    Forward,
    Feedback,
}

impl NetworkBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an appliance and return its handle.
    pub fn add<A: ApplianceKind>(&mut self, name: impl Into<String>, appliance: A) -> Handle<A> {
        let index = u32::try_from(self.appliances.len()).unwrap_or(u32::MAX);
        self.names.push(name.into());
        self.appliances.push(appliance.into_any());
        Handle::new(ApplianceId::from_index(index))
    }

    /// Start a connection evaluated within the same step.
    pub fn connect<A: ApplianceKind>(&mut self, from: Handle<A>) -> EdgeStart<'_, A> {
        EdgeStart {
            builder: self,
            kind: EdgeKind::Forward,
            from,
        }
    }

    /// Start a connection whose value arrives one step late.
    ///
    /// Feedback edges close loops; they are excluded from the execution
    /// order and need a seed value in the initial state.
    pub fn feedback<A: ApplianceKind>(&mut self, from: Handle<A>) -> EdgeStart<'_, A> {
        EdgeStart {
            builder: self,
            kind: EdgeKind::Feedback,
            from,
        }
    }

    /// Validate and freeze the network.
    pub fn build(self) -> NetworkResult<Network> {
        let mut seen = HashSet::new();
        for name in &self.names {
            if !seen.insert(name.as_str()) {
                return Err(NetworkError::DuplicateName { name: name.clone() });
            }
        }

        let name_of = |id: ApplianceId| -> NetworkResult<&str> {
            self.names
                .get(id.index() as usize)
                .map(String::as_str)
                .ok_or_else(|| NetworkError::UnknownAppliance {
                    name: id.to_string(),
                })
        };

        let mut inputs = HashSet::new();
        for edge in self.connections.iter().chain(&self.feedback) {
            name_of(edge.from.appliance)?;
            let to = name_of(edge.to.appliance)?;
            if !inputs.insert(edge.to) {
                return Err(NetworkError::DuplicateInput {
                    appliance: to.to_owned(),
                    port: edge.to.port.as_str(),
                });
            }
        }

        let mut upstream: HashMap<ApplianceId, Vec<ApplianceId>> = HashMap::new();
        for edge in &self.connections {
            upstream
                .entry(edge.to.appliance)
                .or_default()
                .push(edge.from.appliance);
        }

        let ids = (0..self.appliances.len()).map(|i| ApplianceId::from_index(i as u32));
        let order = linearize(
            ids,
            |id| upstream.get(id).cloned().unwrap_or_default(),
            |id| [*id],
        )
        .map_err(|err| NetworkError::Linearize {
            remaining: err
                .remaining
                .iter()
                .map(|id| self.names[id.index() as usize].clone())
                .collect(),
        })?;

        tracing::debug!(
            appliances = self.appliances.len(),
            connections = self.connections.len(),
            feedback = self.feedback.len(),
            "network built"
        );

        Ok(Network::new(
            self.names,
            self.appliances,
            self.connections,
            self.feedback,
            order,
        ))
    }

    fn push(&mut self, kind: EdgeKind, from: Endpoint, to: Endpoint) {
        let edge = Connection { from, to };
        match kind {
            EdgeKind::Forward => self.connections.push(edge),
            EdgeKind::Feedback => self.feedback.push(edge),
        }
    }
}

pub struct EdgeStart<'b, A> {
    builder: &'b mut NetworkBuilder,
    kind: EdgeKind,
    from: Handle<A>,
}

impl<'b, A: ApplianceKind> EdgeStart<'b, A> {
    pub fn at(self, port: A::Port) -> EdgeFrom<'b> {
        EdgeFrom {
            builder: self.builder,
            kind: self.kind,
            from: self.from.endpoint(port),
        }
    }
}

pub struct EdgeFrom<'b> {
    builder: &'b mut NetworkBuilder,
    kind: EdgeKind,
    from: Endpoint,
}

impl<'b> EdgeFrom<'b> {
    pub fn to<B: ApplianceKind>(self, to: Handle<B>) -> EdgeTo<'b, B> {
        EdgeTo {
            builder: self.builder,
            kind: self.kind,
            from: self.from,
            to,
        }
    }
}

pub struct EdgeTo<'b, B> {
    builder: &'b mut NetworkBuilder,
    kind: EdgeKind,
    from: Endpoint,
    to: Handle<B>,
}

impl<'b, B: ApplianceKind> EdgeTo<'b, B> {
    pub fn at(self, port: B::Port) -> &'b mut NetworkBuilder {
        let to = self.to.endpoint(port);
        self.builder.push(self.kind, self.from, to);
        self.builder
    }
}
