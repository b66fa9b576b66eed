//! Cascade simulation: shock one port and follow the score increase outwards.
//!
//! The source port's congestion is forced to the requested severity and the whole
//! network is rescored. The increase over the unshocked scores is then attributed
//! by a bounded breadth-first expansion from the source: a port is reached at hop
//! `k` through a port at hop `k - 1` that itself gained more than the impact
//! threshold (the source always spreads). Ports never reached report no increase.
//! Nothing here is random, so identical inputs give bit-identical results.

use tracing::{debug, instrument};

use crate::config::CascadeConfig;
use crate::scoring::RiskScorer;
use crate::topology::PortTopology;

/// Per-port outcome of a cascade, in topology port order.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
  /// Score increase, floored at 0; 0 for ports the expansion never reached.
  pub increases: Vec<f64>,
  /// Hops from the source, `None` when unreached.
  pub hops: Vec<Option<u32>>,
  /// Congestion before the shock, in percent.
  pub original_congestion: Vec<f64>,
  /// Congestion after the shock, in percent.
  pub projected_congestion: Vec<f64>,
  /// The source plus every reached port whose increase exceeds the impact threshold.
  pub affected: Vec<bool>,
  pub total_impact_score: f64,
  pub affected_ports: usize,
  /// Largest hop count among affected ports.
  pub propagation_depth: u32,
}

/// Runs the cascade. `source` must be a valid port index, `severity` within [0, 1] and
/// `congestion` in topology order; the engine validates these before calling.
#[instrument(level = "trace", skip(topology, scorer, congestion, settings), fields(source = %topology.port(source).code))]
pub fn simulate(
  topology: &PortTopology,
  scorer: &dyn RiskScorer,
  congestion: &[f64],
  source: usize,
  severity: f64,
  max_hops: u32,
  settings: &CascadeConfig,
) -> CascadeOutcome {
  let n = topology.len();
  let mut shocked = congestion.to_vec();
  shocked[source] = severity;

  let before = scorer.score(topology, congestion);
  let after = scorer.score(topology, &shocked);
  let delta: Vec<f64> = before
    .iter()
    .zip(&after)
    .map(|(b, a)| {
      let d = a - b;
      if d.is_finite() { d.max(0.0) } else { 0.0 }
    })
    .collect();

  let threshold = settings.impact_threshold;
  let hops = expand(topology, source, max_hops, |i| i == source || delta[i] > threshold);

  let increases: Vec<f64> = (0..n)
    .map(|i| if hops[i].is_some() { delta[i] } else { 0.0 })
    .collect();
  let affected: Vec<bool> = (0..n)
    .map(|i| i == source || (hops[i].is_some() && increases[i] > threshold))
    .collect();

  let original_congestion: Vec<f64> = congestion.iter().map(|c| c * 100.0).collect();
  let projected_congestion: Vec<f64> = (0..n)
    .map(|i| {
      if i == source {
        severity * 100.0
      } else {
        (original_congestion[i] + increases[i] * settings.congestion_spillover).min(100.0)
      }
    })
    .collect();

  let total_impact_score: f64 = increases.iter().sum();
  let affected_ports = affected.iter().filter(|a| **a).count();
  let propagation_depth = (0..n)
    .filter(|i| affected[*i])
    .filter_map(|i| hops[i])
    .max()
    .unwrap_or(0);

  debug!(affected_ports, propagation_depth, "cascade simulated");
  CascadeOutcome {
    increases,
    hops,
    original_congestion,
    projected_congestion,
    affected,
    total_impact_score,
    affected_ports,
    propagation_depth,
  }
}

/// Breadth-first hop distances from `source`, at most `max_hops` deep, expanding only
/// through ports for which `spreads` holds. Stops early once a hop adds no spreaders.
pub(crate) fn expand<F>(
  topology: &PortTopology,
  source: usize,
  max_hops: u32,
  spreads: F,
) -> Vec<Option<u32>>
where
  F: Fn(usize) -> bool,
{
  let mut hops: Vec<Option<u32>> = vec![None; topology.len()];
  hops[source] = Some(0);
  let mut frontier = vec![source];
  let mut depth = 0;
  while depth < max_hops {
    let carriers: Vec<usize> = frontier.into_iter().filter(|i| spreads(*i)).collect();
    if carriers.is_empty() {
      break;
    }
    let mut next = Vec::new();
    for i in carriers {
      for neighbor in topology.neighbors(i) {
        if hops[neighbor.index].is_none() {
          hops[neighbor.index] = Some(depth + 1);
          next.push(neighbor.index);
        }
      }
    }
    if next.is_empty() {
      break;
    }
    frontier = next;
    depth += 1;
  }
  hops
}
