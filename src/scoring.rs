//! Risk-scoring strategies.
//!
//! A [RiskScorer] maps congestion inputs (topology port order, each in [0, 1]) to
//! per-port risk scores in [0, 100]. Any implementation must be deterministic and
//! monotone: raising one port's congestion, all else fixed, never lowers that
//! port's score.
//!
//! - [HeuristicScorer]: `(1 - alpha) * base + alpha * neighbor influence`, with
//!   inverse-distance neighbor weights. The reference strategy.
//! - [LayeredPropagationScorer]: several rounds of self/neighbor mixing weighted by
//!   lane weather, the shape of a message-passing network without learned weights.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ndarray::Array1;
use tracing::{error, instrument};

use crate::config::{EngineConfig, ScorerKind};
use crate::topology::{Neighbor, PortTopology};

/// Pluggable scoring strategy.
pub trait RiskScorer: fmt::Debug + Send + Sync {
  /// Short name reported on predictions (e.g. `heuristic`).
  fn name(&self) -> &str;

  /// Human-readable description of the model.
  fn architecture(&self) -> &str;

  /// Numeric parameters, for model-info reporting.
  fn parameters(&self) -> BTreeMap<String, f64>;

  /// Scores every port. `congestion.len()` equals `topology.len()`; the result has the
  /// same length and order, each score within [0, 100].
  fn score(&self, topology: &PortTopology, congestion: &[f64]) -> Vec<f64>;
}

/// Builds the scorer selected by `config`.
pub fn build_scorer(config: &EngineConfig) -> Arc<dyn RiskScorer> {
  match config.scorer.kind {
    ScorerKind::Heuristic => Arc::new(HeuristicScorer::new(config.blend_alpha)),
    ScorerKind::Layered => Arc::new(LayeredPropagationScorer::new(
      config.scorer.layers,
      config.scorer.self_weight,
    )),
  }
}

/// Replaces a non-finite score with 0 (logged as a bug) and clamps the rest to [0, 100].
pub(crate) fn guard_score(topology: &PortTopology, index: usize, value: f64) -> f64 {
  if !value.is_finite() {
    error!(
      port = %topology.port(index).code,
      value,
      "numeric instability: non-finite risk score, substituting 0"
    );
    return 0.0;
  }
  value.clamp(0.0, 100.0)
}

/// Weighted mean of each port's neighbors in `values`, one sparse pass over the
/// adjacency lists. A port with no positive neighbor weight gets its own value.
pub(crate) fn neighbor_mean<F>(topology: &PortTopology, values: &Array1<f64>, weight: F) -> Array1<f64>
where
  F: Fn(&Neighbor) -> f64,
{
  (0..topology.len())
    .map(|i| {
      let (total, acc) = topology
        .neighbors(i)
        .iter()
        .map(|neighbor| (weight(neighbor), neighbor.index))
        .filter(|(w, _)| w.is_finite() && *w > 0.0)
        .fold((0.0, 0.0), |(total, acc), (w, j)| (total + w, acc + w * values[j]));
      if total > 0.0 { acc / total } else { values[i] }
    })
    .collect()
}

fn congestion_vector(congestion: &[f64]) -> Array1<f64> {
  congestion
    .iter()
    .map(|c| if c.is_finite() { c.clamp(0.0, 1.0) } else { 0.0 })
    .collect()
}

/// Reference scorer: each port blends its own congestion with the inverse-distance
/// weighted mean of its neighbors' congestion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicScorer {
  alpha: f64,
}

impl HeuristicScorer {
  pub fn new(alpha: f64) -> Self {
    Self {
      alpha: alpha.clamp(0.0, 1.0),
    }
  }

  pub fn alpha(&self) -> f64 {
    self.alpha
  }
}

impl Default for HeuristicScorer {
  fn default() -> Self {
    Self::new(EngineConfig::default().blend_alpha)
  }
}

impl RiskScorer for HeuristicScorer {
  fn name(&self) -> &str {
    "heuristic"
  }

  fn architecture(&self) -> &str {
    "Inverse-distance neighbor blend"
  }

  fn parameters(&self) -> BTreeMap<String, f64> {
    BTreeMap::from([("blend_alpha".to_string(), self.alpha)])
  }

  #[instrument(level = "trace", skip_all, fields(ports = topology.len()))]
  fn score(&self, topology: &PortTopology, congestion: &[f64]) -> Vec<f64> {
    let base = congestion_vector(congestion) * 100.0;
    let influence = neighbor_mean(topology, &base, |n| n.coupling);
    let combined = &base * (1.0 - self.alpha) + &influence * self.alpha;
    combined
      .iter()
      .enumerate()
      .map(|(i, v)| guard_score(topology, i, *v))
      .collect()
  }
}

/// Multi-round propagation: each round a port keeps `self_weight` of its own risk and
/// takes the rest from its neighbors, weighted by `1 - weather_risk` of the lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayeredPropagationScorer {
  layers: u32,
  self_weight: f64,
}

impl LayeredPropagationScorer {
  pub fn new(layers: u32, self_weight: f64) -> Self {
    Self {
      layers: layers.max(1),
      self_weight: self_weight.clamp(0.0, 1.0),
    }
  }
}

impl Default for LayeredPropagationScorer {
  fn default() -> Self {
    let scorer = EngineConfig::default().scorer;
    Self::new(scorer.layers, scorer.self_weight)
  }
}

impl RiskScorer for LayeredPropagationScorer {
  fn name(&self) -> &str {
    "layered"
  }

  fn architecture(&self) -> &str {
    "Weather-weighted graph propagation"
  }

  fn parameters(&self) -> BTreeMap<String, f64> {
    BTreeMap::from([
      ("layers".to_string(), f64::from(self.layers)),
      ("self_weight".to_string(), self.self_weight),
    ])
  }

  #[instrument(level = "trace", skip_all, fields(ports = topology.len(), layers = self.layers))]
  fn score(&self, topology: &PortTopology, congestion: &[f64]) -> Vec<f64> {
    let mut risk = congestion_vector(congestion);
    for _ in 0..self.layers {
      let mixed = neighbor_mean(topology, &risk, |n| 1.0 - n.weather_risk);
      risk = &risk * self.self_weight + &mixed * (1.0 - self.self_weight);
    }
    risk
      .iter()
      .enumerate()
      .map(|(i, v)| guard_score(topology, i, v.clamp(0.0, 1.0) * 100.0))
      .collect()
  }
}

/// Capacity-weighted mean of `scores`; a plain mean when no port has capacity.
pub fn network_risk_score(topology: &PortTopology, scores: &[f64]) -> f64 {
  if scores.is_empty() {
    return 0.0;
  }
  let total_capacity: f64 = topology.ports().iter().map(|p| p.capacity_teus).sum();
  let value = if total_capacity > 0.0 {
    topology
      .ports()
      .iter()
      .zip(scores)
      .map(|(p, s)| p.capacity_teus * s)
      .sum::<f64>()
      / total_capacity
  } else {
    scores.iter().sum::<f64>() / scores.len() as f64
  };
  if value.is_finite() {
    value.clamp(0.0, 100.0)
  } else {
    error!(value, "numeric instability: non-finite network risk score, substituting 0");
    0.0
  }
}
