//! Graph structure for visualization clients.

use serde::{Deserialize, Serialize};

/// A port as drawn by the network view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
  pub id: String,
  pub label: String,
  pub name: String,
  pub country: String,
  pub capacity_teus: f64,
  pub lat: f64,
  pub lng: f64,
  /// `lng + 180`, so the Pacific sits in one contiguous band.
  pub x: f64,
  /// `90 - lat`, screen coordinates grow downwards.
  pub y: f64,
  /// Current congestion input in [0, 1].
  pub congestion: f64,
  pub is_origin: bool,
  pub size: f64,
}

/// A route as drawn by the network view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
  pub source: String,
  pub target: String,
  pub distance_nm: f64,
  /// Distance in thousands of nautical miles.
  pub weight: f64,
  pub transit_time: f64,
  pub weather_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyView {
  pub nodes: Vec<NetworkNode>,
  pub edges: Vec<NetworkEdge>,
  pub node_count: usize,
  pub edge_count: usize,
}
