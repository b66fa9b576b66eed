//! Topology definition save/load (JSON).

use std::path::Path;

use tracing::instrument;

use crate::error::Result;
use crate::topology::{PortTopology, TopologyDefinition};

/// Default filename for a topology definition.
pub const TOPOLOGY_FILENAME: &str = "topology.json";

/// Saves a topology definition to `path` as pretty JSON, creating parent directories.
#[instrument(level = "trace", skip(path, def))]
pub fn save_topology_definition(path: &Path, def: &TopologyDefinition) -> Result<()> {
  let json = serde_json::to_string_pretty(def)?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)?;
  Ok(())
}

/// Loads a topology definition from `path`. Does not validate it.
#[instrument(level = "trace", skip(path))]
pub fn load_topology_definition(path: &Path) -> Result<TopologyDefinition> {
  let bytes = std::fs::read(path)?;
  Ok(serde_json::from_slice(&bytes)?)
}

/// Loads and validates a topology from `path`.
pub fn load_topology(path: &Path) -> Result<PortTopology> {
  let def = load_topology_definition(path)?;
  Ok(PortTopology::from_definition(def)?)
}
