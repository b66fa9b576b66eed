//! Engine configuration: blend constant, risk thresholds, cascade bounds and scorer choice.
//!
//! Every field has a default, so an empty TOML file (or none at all) yields the
//! reference configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{EngineError, Result};
use crate::types::RiskThresholds;

/// Which scoring strategy the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
  /// Single-step inverse-distance neighbor blend.
  #[default]
  Heuristic,
  /// Multi-round propagation weighted by lane weather.
  Layered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
  pub kind: ScorerKind,
  /// Propagation rounds for the layered scorer.
  pub layers: u32,
  /// Weight a port keeps on its own signal in each layered round.
  pub self_weight: f64,
}

impl Default for ScorerConfig {
  fn default() -> Self {
    Self {
      kind: ScorerKind::Heuristic,
      layers: 3,
      self_weight: 0.6,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
  /// Congestion the source port is forced to when the caller gives no severity.
  pub default_severity: f64,
  pub default_max_hops: u32,
  /// Largest `max_hops` a caller may request.
  pub max_hops_limit: u32,
  /// Score points a port must gain to count as affected and keep the expansion going.
  pub impact_threshold: f64,
  /// Fraction of a port's risk increase reported as extra projected congestion.
  pub congestion_spillover: f64,
}

impl Default for CascadeConfig {
  fn default() -> Self {
    Self {
      default_severity: 1.0,
      default_max_hops: 4,
      max_hops_limit: 16,
      impact_threshold: 1.0,
      congestion_spillover: 0.3,
    }
  }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Share of a port's score taken from its neighbors (heuristic scorer).
  pub blend_alpha: f64,
  pub thresholds: RiskThresholds,
  pub cascade: CascadeConfig,
  pub scorer: ScorerConfig,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      blend_alpha: 0.3,
      thresholds: RiskThresholds::default(),
      cascade: CascadeConfig::default(),
      scorer: ScorerConfig::default(),
    }
  }
}

fn unit(name: &str, value: f64) -> Result<()> {
  if !value.is_finite() || !(0.0..=1.0).contains(&value) {
    return Err(EngineError::Config(format!(
      "{name} must be within [0, 1], got {value}"
    )));
  }
  Ok(())
}

impl EngineConfig {
  /// Parses a TOML document and validates the result.
  pub fn from_toml_str(source: &str) -> Result<Self> {
    let config: EngineConfig = toml::from_str(source)?;
    config.validate()?;
    Ok(config)
  }

  /// Loads and validates a TOML configuration file.
  #[instrument(level = "trace", skip(path))]
  pub fn load(path: &Path) -> Result<Self> {
    let source = std::fs::read_to_string(path)?;
    Self::from_toml_str(&source)
  }

  pub fn validate(&self) -> Result<()> {
    unit("blend_alpha", self.blend_alpha)?;
    self.thresholds.validate().map_err(EngineError::Config)?;

    let cascade = &self.cascade;
    unit("cascade.default_severity", cascade.default_severity)?;
    unit("cascade.congestion_spillover", cascade.congestion_spillover)?;
    if cascade.default_max_hops > cascade.max_hops_limit {
      return Err(EngineError::Config(format!(
        "cascade.default_max_hops ({}) exceeds cascade.max_hops_limit ({})",
        cascade.default_max_hops, cascade.max_hops_limit
      )));
    }
    if !cascade.impact_threshold.is_finite() || cascade.impact_threshold < 0.0 {
      return Err(EngineError::Config(format!(
        "cascade.impact_threshold must be a non-negative number, got {}",
        cascade.impact_threshold
      )));
    }

    if self.scorer.layers == 0 {
      return Err(EngineError::Config(
        "scorer.layers must be at least 1".to_string(),
      ));
    }
    unit("scorer.self_weight", self.scorer.self_weight)?;
    Ok(())
  }
}
