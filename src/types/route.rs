//! A shipping route: an undirected edge between two ports.

use serde::{Deserialize, Serialize};

/// A shipping route between two ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
  pub origin: String,
  pub destination: String,
  pub distance_nm: f64,
  pub typical_transit_days: f64,
  /// Weather-driven risk on the lane in [0, 1]; weakens coupling in layered propagation.
  #[serde(default)]
  pub weather_risk: f64,
}

impl Route {
  /// Edge strength used by the heuristic scorer: closer ports couple more strongly.
  pub fn coupling(&self) -> f64 {
    1.0 / self.distance_nm
  }
}
