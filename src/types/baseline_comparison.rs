//! Model scores against the congestion-only baseline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Network effects within this many points of zero count as `similar`.
pub const SIMILAR_EFFECT_BAND: f64 = 5.0;

/// Network effects beyond this many points count as significant in the summary.
pub const SIGNIFICANT_EFFECT: f64 = 10.0;

/// Which way the network moved a port's risk relative to its own congestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectDirection {
  Increase,
  Decrease,
  Similar,
}

impl EffectDirection {
  pub fn classify(network_effect: f64) -> Self {
    if network_effect > SIMILAR_EFFECT_BAND {
      EffectDirection::Increase
    } else if network_effect < -SIMILAR_EFFECT_BAND {
      EffectDirection::Decrease
    } else {
      EffectDirection::Similar
    }
  }
}

impl fmt::Display for EffectDirection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EffectDirection::Increase => write!(f, "increase"),
      EffectDirection::Decrease => write!(f, "decrease"),
      EffectDirection::Similar => write!(f, "similar"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
  pub port_code: String,
  /// `congestion_input * 100`.
  pub baseline_risk: f64,
  #[serde(rename = "gnn_risk")]
  pub model_risk: f64,
  pub network_effect: f64,
  #[serde(rename = "network_effect_direction")]
  pub direction: EffectDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
  pub avg_baseline_risk: f64,
  #[serde(rename = "avg_gnn_risk")]
  pub avg_model_risk: f64,
  pub max_network_effect: f64,
  pub ports_with_significant_network_effects: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineComparison {
  pub timestamp: DateTime<Utc>,
  /// Sorted by absolute network effect, largest first.
  pub comparison: Vec<ComparisonEntry>,
  pub summary: ComparisonSummary,
}

impl ComparisonSummary {
  pub fn from_entries(entries: &[ComparisonEntry]) -> Self {
    if entries.is_empty() {
      return Self {
        avg_baseline_risk: 0.0,
        avg_model_risk: 0.0,
        max_network_effect: 0.0,
        ports_with_significant_network_effects: 0,
      };
    }
    let n = entries.len() as f64;
    Self {
      avg_baseline_risk: entries.iter().map(|e| e.baseline_risk).sum::<f64>() / n,
      avg_model_risk: entries.iter().map(|e| e.model_risk).sum::<f64>() / n,
      max_network_effect: entries
        .iter()
        .map(|e| e.network_effect)
        .fold(f64::NEG_INFINITY, f64::max),
      ports_with_significant_network_effects: entries
        .iter()
        .filter(|e| e.network_effect.abs() > SIGNIFICANT_EFFECT)
        .count(),
    }
  }
}
