//! # port-risk-engine
//!
//! Network-aware congestion risk for a graph of container ports.
//!
//! ## Architecture
//!
//! - `topology`: the immutable port/route graph, validated once at startup.
//! - `snapshot`: point-in-time congestion inputs, published by a single writer.
//! - `scoring`: pluggable [RiskScorer] strategies (heuristic blend, layered propagation).
//! - `cascade`: shock one port and attribute the increase by bounded expansion.
//! - `engine`: [RiskEngine], the read-only surface tying the above together.
//! - `server`: the axum HTTP layer over the engine.

pub mod cascade;
pub mod config;
pub mod engine;
#[cfg(test)]
mod engine_test;
pub mod error;
pub mod scoring;
pub mod server;
pub mod snapshot;
pub mod topology;
pub mod topology_io;
#[cfg(test)]
mod topology_test;
pub mod types;

pub use config::EngineConfig;
pub use engine::RiskEngine;
pub use error::{EngineError, Result, TopologyError};
pub use scoring::{HeuristicScorer, LayeredPropagationScorer, RiskScorer};
pub use snapshot::{
  CongestionSnapshot, SnapshotPublisher, SnapshotReader, SnapshotUpdate, snapshot_channel,
};
pub use topology::{PortTopology, TopologyDefinition};
