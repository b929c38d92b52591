//! eb-network: wiring and stepping of appliance networks.
//!
//! Provides:
//! - Typed appliance handles
//! - Network builder with forward connections and delayed feedback edges
//! - Network state and control containers with typed accessors
//! - One-step simulation in a precomputed execution order
//!
//! # Example
//!
//! ```
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use eb_appliances::{ConnectionState, Mix, MixPort, Source, SourcePort};
//! use eb_core::SimulationTime;
//! use eb_network::{NetworkBuilder, NetworkControl};
//!
//! let mut builder = NetworkBuilder::new();
//! let hot = builder.add("hot", Source::new(1.0, 80.0));
//! let cold = builder.add("cold", Source::new(1.0, 20.0));
//! let mix = builder.add("mix", Mix);
//! builder.connect(hot).at(SourcePort::Out).to(mix).at(MixPort::A);
//! builder.connect(cold).at(SourcePort::Out).to(mix).at(MixPort::B);
//! let network = builder.build().unwrap();
//!
//! let time = SimulationTime::new(TimeDelta::seconds(1), Utc.timestamp_opt(0, 0).unwrap());
//! let state = network.state_builder().build(time).unwrap();
//! let next = network.simulate(&state, &NetworkControl::default()).unwrap();
//!
//! assert_eq!(next.connection(mix, MixPort::Ab), Some(&ConnectionState::new(2.0, 50.0)));
//! ```

pub mod builder;
pub mod control;
pub mod error;
pub mod handle;
pub mod network;
pub mod state;

// Re-exports for ergonomics
pub use builder::NetworkBuilder;
pub use control::{ControlBuilder, NetworkControl};
pub use error::{NetworkError, NetworkResult};
pub use handle::{Connection, Endpoint, Handle};
pub use network::Network;
pub use state::{NetworkState, NetworkStateBuilder};
