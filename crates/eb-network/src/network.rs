//! Immutable network and one-step simulation.

use std::collections::{BTreeMap, HashMap};

use eb_appliances::{AnyAppliance, AnyControl, AnyPortMap, ApplianceKind, ConnectionState};
use eb_core::ApplianceId;
use serde_json::{Map, Value};

use crate::control::NetworkControl;
use crate::error::{NetworkError, NetworkResult};
use crate::handle::{Connection, Endpoint, Handle};
use crate::state::{NetworkState, NetworkStateBuilder, StateDefinition};

/// A validated network with a fixed execution order.
#[derive(Debug)]
pub struct Network {
    names: Vec<String>,
    appliances: Vec<AnyAppliance>,
    connections: Vec<Connection>,
    feedback: Vec<Connection>,
    order: Vec<ApplianceId>,
    routes: HashMap<Endpoint, Vec<Endpoint>>,
    by_name: HashMap<String, ApplianceId>,
}

impl Network {
    pub(crate) fn new(
        names: Vec<String>,
        appliances: Vec<AnyAppliance>,
        connections: Vec<Connection>,
        feedback: Vec<Connection>,
        order: Vec<ApplianceId>,
    ) -> Self {
        let mut routes: HashMap<Endpoint, Vec<Endpoint>> = HashMap::new();
        for edge in &connections {
            routes.entry(edge.from).or_default().push(edge.to);
        }
        let by_name = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), ApplianceId::from_index(i as u32)))
            .collect();
        Self {
            names,
            appliances,
            connections,
            feedback,
            order,
            routes,
            by_name,
        }
    }

    /// Appliances in the order `simulate` visits them.
    pub fn execution_order(&self) -> &[ApplianceId] {
        &self.order
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn feedback(&self) -> &[Connection] {
        &self.feedback
    }

    pub fn len(&self) -> usize {
        self.appliances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appliances.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ApplianceId> + '_ {
        (0..self.appliances.len()).map(|i| ApplianceId::from_index(i as u32))
    }

    /// Typed parameters of the appliance behind `handle`.
    pub fn appliance<A: ApplianceKind>(&self, handle: Handle<A>) -> Option<&A> {
        self.any_appliance(handle.id()).and_then(A::from_any)
    }

    pub fn any_appliance(&self, id: ApplianceId) -> Option<&AnyAppliance> {
        self.appliances.get(id.index() as usize)
    }

    pub fn name(&self, id: ApplianceId) -> &str {
        self.names
            .get(id.index() as usize)
            .map_or("<unknown>", String::as_str)
    }

    pub fn id_of(&self, name: &str) -> Option<ApplianceId> {
        self.by_name.get(name).copied()
    }

    /// Start an initial state with no appliance defined.
    pub fn state_builder(&self) -> NetworkStateBuilder<'_> {
        NetworkStateBuilder::new(self)
    }

    pub fn define_state<A: ApplianceKind>(&self, handle: Handle<A>) -> StateDefinition<'_, A> {
        self.state_builder().define_state(handle)
    }

    /// Advance every appliance by one step.
    ///
    /// Forward inputs are the outputs produced earlier in this step. Feedback
    /// inputs are read from `state`, the previous step. Appliances without a
    /// command in `control` fall back to their own default.
    pub fn simulate(
        &self,
        state: &NetworkState,
        control: &NetworkControl,
    ) -> NetworkResult<NetworkState> {
        let time = state.time;
        let mut next = NetworkState {
            time: time.next(),
            appliances: state.appliances.clone(),
            connections: BTreeMap::new(),
        };

        let mut pending: HashMap<ApplianceId, AnyPortMap> = HashMap::new();
        for edge in &self.feedback {
            if let Some(value) = state.connections.get(&edge.from) {
                self.deliver(&mut pending, edge.to, *value)?;
                next.connections.insert(edge.to, *value);
            }
        }

        for &id in &self.order {
            let Some(appliance) = self.any_appliance(id) else {
                continue;
            };
            let Some(previous) = state.appliances.get(&id) else {
                return Err(NetworkError::MissingState {
                    appliance: self.name(id).to_owned(),
                });
            };
            let inputs = pending.remove(&id).unwrap_or_default();

            let (new_state, outputs) =
                match appliance.simulate(&inputs, previous, control.get_any(id), &time) {
                    Ok(result) => result,
                    Err(source) => {
                        tracing::debug!(appliance = self.name(id), step = time.step, %source, "appliance failed");
                        return Err(NetworkError::Appliance {
                            name: self.name(id).to_owned(),
                            source,
                            partial: Box::new(next),
                        });
                    }
                };

            next.appliances.insert(id, new_state);
            for (port, value) in outputs {
                let from = Endpoint {
                    appliance: id,
                    port,
                };
                next.connections.insert(from, value);
                for to in self.routes.get(&from).into_iter().flatten() {
                    self.deliver(&mut pending, *to, value)?;
                    next.connections.insert(*to, value);
                }
            }
        }

        Ok(next)
    }

    /// Queue an input for this step; a port takes at most one value.
    fn deliver(
        &self,
        pending: &mut HashMap<ApplianceId, AnyPortMap>,
        to: Endpoint,
        value: ConnectionState,
    ) -> NetworkResult<()> {
        let inputs = pending.entry(to.appliance).or_default();
        if inputs.insert(to.port, value).is_some() {
            return Err(NetworkError::DuplicateInput {
                appliance: self.name(to.appliance).to_owned(),
                port: to.port.as_str(),
            });
        }
        Ok(())
    }

    /// JSON object keyed by appliance name, one entry per command.
    pub fn control_to_json(&self, control: &NetworkControl) -> NetworkResult<Map<String, Value>> {
        control
            .iter()
            .map(|(id, command)| -> NetworkResult<(String, Value)> {
                let value = command.to_json().map_err(|err| NetworkError::Decode {
                    appliance: self.name(id).to_owned(),
                    message: err.to_string(),
                })?;
                Ok((self.name(id).to_owned(), value))
            })
            .collect()
    }

    /// Decode commands keyed by appliance name. Keys listed in `skip` are ignored.
    pub fn control_from_json(
        &self,
        json: &Map<String, Value>,
        skip: &[&str],
    ) -> NetworkResult<NetworkControl> {
        let mut commands: BTreeMap<ApplianceId, AnyControl> = BTreeMap::new();
        for (name, value) in json {
            if skip.contains(&name.as_str()) {
                continue;
            }
            let id = self
                .id_of(name)
                .ok_or_else(|| NetworkError::UnknownAppliance { name: name.clone() })?;
            let appliance = self
                .any_appliance(id)
                .ok_or_else(|| NetworkError::UnknownAppliance { name: name.clone() })?;
            let command = appliance
                .decode_control(value.clone())
                .map_err(|err| NetworkError::Decode {
                    appliance: name.clone(),
                    message: err.to_string(),
                })?;
            commands.insert(id, command);
        }
        Ok(NetworkControl::from_commands(commands))
    }

    /// JSON view of a state: appliance states and connection values by name.
    pub fn state_to_json(&self, state: &NetworkState) -> Value {
        let appliances: Map<String, Value> = state
            .appliances()
            .map(|(id, s)| (self.name(id).to_owned(), s.to_json().unwrap_or(Value::Null)))
            .collect();
        let connections: Map<String, Value> = state
            .connections()
            .map(|(endpoint, value)| {
                (
                    format!("{}.{}", self.name(endpoint.appliance), endpoint.port),
                    serde_json::json!({ "flow": value.flow, "temperature": value.temperature }),
                )
            })
            .collect();
        serde_json::json!({
            "time": state.time().timestamp().to_rfc3339(),
            "step": state.time().step,
            "appliances": appliances,
            "connections": connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use eb_appliances::{Mix, MixPort, Source, SourcePort};
    use eb_core::SimulationTime;

    #[test]
    fn simulate_rejects_two_values_on_one_port() {
        // two sources wired into the same port, bypassing the builder checks
        let ids: Vec<_> = (0..3).map(ApplianceId::from_index).collect();
        let mix = Handle::<Mix>::new(ids[2]);
        let into_mix = |id| Connection {
            from: Handle::<Source>::new(id).endpoint(SourcePort::Out),
            to: mix.endpoint(MixPort::A),
        };
        let network = Network::new(
            vec!["a".into(), "b".into(), "mix".into()],
            vec![
                Source::new(1.0, 20.0).into_any(),
                Source::new(1.0, 30.0).into_any(),
                Mix.into_any(),
            ],
            vec![into_mix(ids[0]), into_mix(ids[1])],
            vec![],
            ids.clone(),
        );
        let time = SimulationTime::new(
            TimeDelta::seconds(1),
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        );
        let state = network.state_builder().build(time).unwrap();

        let err = network
            .simulate(&state, &NetworkControl::default())
            .unwrap_err();
        assert_eq!(
            err,
            NetworkError::DuplicateInput {
                appliance: "mix".into(),
                port: "a",
            }
        );
    }
}
