//! Per-port and network-wide risk predictions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RiskLevel;

/// Risk prediction for a single port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePrediction {
  pub port_code: String,
  /// Score in [0, 100].
  #[serde(rename = "gnn_risk_score")]
  pub risk_score: f64,
  pub risk_level: RiskLevel,
  /// Congestion input in percent.
  pub congestion_input: f64,
  #[serde(rename = "is_origin_port")]
  pub is_origin: bool,
}

/// Result of scoring the whole network against one congestion snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkPrediction {
  /// `taken_at` of the snapshot the prediction was computed from.
  pub timestamp: DateTime<Utc>,
  /// Name of the scoring strategy that produced the node scores.
  pub model: String,
  /// Capacity-weighted mean of node scores, in [0, 100].
  pub network_risk_score: f64,
  pub total_nodes: usize,
  pub total_edges: usize,
  pub high_risk_nodes: usize,
  /// Sorted by score descending, ties by port code.
  pub node_predictions: Vec<NodePrediction>,
}

impl NetworkPrediction {
  pub fn node(&self, port_code: &str) -> Option<&NodePrediction> {
    self.node_predictions.iter().find(|n| n.port_code == port_code)
  }
}
