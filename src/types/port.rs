//! A port: one node of the shipping network.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse region of a port. Asian ports originate cargo; US ports receive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
  Asia,
  Usa,
}

impl fmt::Display for Region {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Region::Asia => write!(f, "asia"),
      Region::Usa => write!(f, "usa"),
    }
  }
}

/// A port in the static topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
  /// UN/LOCODE-style identifier (e.g. `USLAX`).
  pub code: String,
  pub name: String,
  pub country: String,
  pub region: Region,
  /// Static annual throughput capacity.
  pub capacity_teus: f64,
  pub lat: f64,
  pub lng: f64,
  /// Congestion used to seed the first snapshot before any live data arrives.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub baseline_congestion: Option<f64>,
}

impl Port {
  /// Origin ports are the Asian side of the trans-Pacific lanes.
  pub fn is_origin(&self) -> bool {
    self.region == Region::Asia
  }
}
