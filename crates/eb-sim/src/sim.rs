//! Simulation runner and result recording.

use chrono::{DateTime, Utc};
use eb_network::{Network, NetworkState};

use crate::controller::Controller;
use crate::error::{SimError, SimResult};

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Number of steps to run
    pub steps: u64,
    /// Record every N-th step (decimation)
    pub record_every: u64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            steps: 1_000,
            record_every: 1,
        }
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord {
    /// Step index of each snapshot
    pub steps: Vec<u64>,
    /// Timestamp of each snapshot
    pub time: Vec<DateTime<Utc>>,
    /// State snapshots
    pub states: Vec<NetworkState>,
}

impl SimRecord {
    fn push(&mut self, state: &NetworkState) {
        self.steps.push(state.time().step);
        self.time.push(state.time().timestamp());
        self.states.push(state.clone());
    }

    /// The last recorded state.
    pub fn last(&self) -> Option<&NetworkState> {
        self.states.last()
    }
}

/// Run `opts.steps` steps from `initial`, asking `controller` before each one.
///
/// The initial and final states are always recorded.
pub fn run_sim(
    network: &Network,
    initial: NetworkState,
    controller: &mut impl Controller,
    opts: &SimOptions,
) -> SimResult<SimRecord> {
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    tracing::debug!(
        steps = opts.steps,
        order = ?network
            .execution_order()
            .iter()
            .map(|id| network.name(*id))
            .collect::<Vec<_>>(),
        "starting simulation"
    );

    let mut record = SimRecord {
        steps: Vec::new(),
        time: Vec::new(),
        states: Vec::new(),
    };
    record.push(&initial);

    let mut state = initial;
    for step in 0..opts.steps {
        let control = controller.control(network, &state)?;
        state = match network.simulate(&state, &control) {
            Ok(next) => next,
            Err(source) => {
                return Err(SimError::Step {
                    step,
                    state: Box::new(state),
                    source,
                });
            }
        };

        let done = step + 1;
        if done % opts.record_every == 0 {
            record.push(&state);
        } else if done == opts.steps {
            record.push(&state);
        }
        if done % 1_000 == 0 {
            tracing::debug!(step = done, "simulation progress");
        }
    }

    Ok(record)
}
