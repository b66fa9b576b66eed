//! Description of the active scoring model and its settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::RiskThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
  pub model_name: String,
  pub architecture: String,
  pub version: String,
  /// Scorer name as reported on predictions.
  pub scorer: String,
  /// Numeric parameters of the scorer (e.g. `blend_alpha`, `layers`).
  pub parameters: BTreeMap<String, f64>,
  pub thresholds: RiskThresholds,
  pub default_max_hops: u32,
  pub max_hops_limit: u32,
  pub impact_threshold: f64,
  pub capabilities: Vec<String>,
}
