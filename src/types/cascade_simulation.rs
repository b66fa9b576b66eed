//! Output of a cascade simulation from one source port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Impact of a cascade on one port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeEntry {
  pub port_code: String,
  /// Score increase over the unshocked network, floored at 0.
  #[serde(rename = "cascade_risk_increase")]
  pub risk_increase: f64,
  pub is_source: bool,
  /// Congestion before the shock, in percent.
  pub original_congestion: f64,
  /// Congestion after the shock, in percent.
  pub projected_congestion: f64,
  /// Hops from the source; `None` when the expansion never reached the port.
  pub hops: Option<u32>,
}

/// Cascade simulation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeSimulation {
  pub timestamp: DateTime<Utc>,
  pub source_port: String,
  pub severity: f64,
  pub max_hops: u32,
  /// Every port of the network, sorted by impact descending (ties by port code).
  #[serde(rename = "cascade_simulation")]
  pub entries: Vec<CascadeEntry>,
  pub total_impact_score: f64,
  pub affected_ports: usize,
  pub propagation_depth: u32,
}

impl CascadeSimulation {
  pub fn entry(&self, port_code: &str) -> Option<&CascadeEntry> {
    self.entries.iter().find(|e| e.port_code == port_code)
  }

  pub fn source(&self) -> Option<&CascadeEntry> {
    self.entries.iter().find(|e| e.is_source)
  }
}
