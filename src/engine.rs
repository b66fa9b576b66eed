//! The risk engine: scoring, cascade and topology views over a shared snapshot.
//!
//! Every operation reads the current snapshot exactly once and is otherwise a pure
//! function of the immutable topology, the configuration and the scorer. The
//! `*_with` variants take the snapshot explicitly.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::cascade;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result, ensure_unit_interval};
use crate::scoring::{RiskScorer, build_scorer, network_risk_score};
use crate::snapshot::{CongestionSnapshot, SnapshotReader};
use crate::topology::PortTopology;
use crate::types::{
  BaselineComparison, CascadeEntry, CascadeSimulation, ComparisonEntry, ComparisonSummary,
  EffectDirection, ModelInfo, NetworkEdge, NetworkNode, NetworkPrediction, NodePrediction,
  TopologyView,
};

/// Cloneable handle on the engine; clones share topology, config, scorer and snapshot.
#[derive(Debug, Clone)]
pub struct RiskEngine {
  topology: Arc<PortTopology>,
  config: Arc<EngineConfig>,
  scorer: Arc<dyn RiskScorer>,
  snapshots: SnapshotReader,
}

/// Descending by value, then ascending by port code, so ordering is total and stable.
fn by_value_desc(a: (f64, &str), b: (f64, &str)) -> Ordering {
  b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1))
}

impl RiskEngine {
  /// Validates `config` and builds the scorer it selects.
  pub fn new(
    topology: Arc<PortTopology>,
    config: EngineConfig,
    snapshots: SnapshotReader,
  ) -> Result<Self> {
    config.validate()?;
    let scorer = build_scorer(&config);
    info!(
      ports = topology.len(),
      routes = topology.routes().len(),
      scorer = scorer.name(),
      "risk engine ready"
    );
    Ok(Self {
      topology,
      config: Arc::new(config),
      scorer,
      snapshots,
    })
  }

  /// Replaces the configured scorer, e.g. with a trained model.
  pub fn with_scorer(mut self, scorer: Arc<dyn RiskScorer>) -> Self {
    self.scorer = scorer;
    self
  }

  pub fn topology(&self) -> &PortTopology {
    &self.topology
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  pub fn scorer(&self) -> &dyn RiskScorer {
    self.scorer.as_ref()
  }

  pub fn snapshot(&self) -> Arc<CongestionSnapshot> {
    self.snapshots.current()
  }

  /// Scores every port against the current snapshot.
  pub fn predict_network(&self) -> NetworkPrediction {
    self.predict_network_with(&self.snapshots.current())
  }

  #[instrument(level = "trace", skip_all, fields(taken_at = %snapshot.taken_at))]
  pub fn predict_network_with(&self, snapshot: &CongestionSnapshot) -> NetworkPrediction {
    let topology = self.topology.as_ref();
    let congestion = snapshot.resolve(topology);
    let scores = self.scorer.score(topology, &congestion);
    let thresholds = &self.config.thresholds;

    let mut node_predictions: Vec<NodePrediction> = topology
      .ports()
      .iter()
      .zip(scores.iter().zip(&congestion))
      .map(|(port, (score, c))| NodePrediction {
        port_code: port.code.clone(),
        risk_score: *score,
        risk_level: thresholds.classify(*score),
        congestion_input: c * 100.0,
        is_origin: port.is_origin(),
      })
      .collect();
    node_predictions.sort_by(|a, b| {
      by_value_desc(
        (a.risk_score, a.port_code.as_str()),
        (b.risk_score, b.port_code.as_str()),
      )
    });

    NetworkPrediction {
      timestamp: snapshot.taken_at,
      model: self.scorer.name().to_string(),
      network_risk_score: network_risk_score(topology, &scores),
      total_nodes: topology.len(),
      total_edges: topology.routes().len(),
      high_risk_nodes: node_predictions
        .iter()
        .filter(|n| n.risk_level.is_elevated())
        .count(),
      node_predictions,
    }
  }

  /// Simulates a shock at `source_port` against the current snapshot.
  ///
  /// `severity` defaults to `cascade.default_severity`, `max_hops` to
  /// `cascade.default_max_hops`.
  pub fn predict_cascade(
    &self,
    source_port: &str,
    severity: Option<f64>,
    max_hops: Option<u32>,
  ) -> Result<CascadeSimulation> {
    self.predict_cascade_with(&self.snapshots.current(), source_port, severity, max_hops)
  }

  #[instrument(level = "trace", skip(self, snapshot), fields(taken_at = %snapshot.taken_at))]
  pub fn predict_cascade_with(
    &self,
    snapshot: &CongestionSnapshot,
    source_port: &str,
    severity: Option<f64>,
    max_hops: Option<u32>,
  ) -> Result<CascadeSimulation> {
    let topology = self.topology.as_ref();
    let settings = &self.config.cascade;

    let source = topology
      .resolve_code(source_port)
      .ok_or_else(|| EngineError::not_found(source_port))?;
    let severity = severity.unwrap_or(settings.default_severity);
    ensure_unit_interval("severity", severity)?;
    let max_hops = max_hops.unwrap_or(settings.default_max_hops);
    if max_hops > settings.max_hops_limit {
      return Err(EngineError::validation(
        "max_hops",
        format!("must be at most {}, got {max_hops}", settings.max_hops_limit),
      ));
    }

    let congestion = snapshot.resolve(topology);
    let outcome = cascade::simulate(
      topology,
      self.scorer.as_ref(),
      &congestion,
      source,
      severity,
      max_hops,
      settings,
    );

    let mut entries: Vec<CascadeEntry> = topology
      .ports()
      .iter()
      .enumerate()
      .map(|(i, port)| CascadeEntry {
        port_code: port.code.clone(),
        risk_increase: outcome.increases[i],
        is_source: i == source,
        original_congestion: outcome.original_congestion[i],
        projected_congestion: outcome.projected_congestion[i],
        hops: outcome.hops[i],
      })
      .collect();
    entries.sort_by(|a, b| {
      by_value_desc(
        (a.risk_increase, a.port_code.as_str()),
        (b.risk_increase, b.port_code.as_str()),
      )
    });

    Ok(CascadeSimulation {
      timestamp: snapshot.taken_at,
      source_port: topology.port(source).code.clone(),
      severity,
      max_hops,
      entries,
      total_impact_score: outcome.total_impact_score,
      affected_ports: outcome.affected_ports,
      propagation_depth: outcome.propagation_depth,
    })
  }

  /// Nodes and edges for visualization, with current congestion on each node.
  pub fn get_topology(&self) -> TopologyView {
    self.get_topology_with(&self.snapshots.current())
  }

  pub fn get_topology_with(&self, snapshot: &CongestionSnapshot) -> TopologyView {
    let topology = self.topology.as_ref();
    let congestion = snapshot.resolve(topology);
    let nodes: Vec<NetworkNode> = topology
      .ports()
      .iter()
      .zip(&congestion)
      .map(|(port, c)| NetworkNode {
        id: port.code.clone(),
        label: port.code.clone(),
        name: port.name.clone(),
        country: port.country.clone(),
        capacity_teus: port.capacity_teus,
        lat: port.lat,
        lng: port.lng,
        x: port.lng + 180.0,
        y: 90.0 - port.lat,
        congestion: *c,
        is_origin: port.is_origin(),
        size: 10.0 + c * 20.0,
      })
      .collect();
    let edges: Vec<NetworkEdge> = topology
      .routes()
      .iter()
      .map(|route| NetworkEdge {
        source: route.origin.clone(),
        target: route.destination.clone(),
        distance_nm: route.distance_nm,
        weight: route.distance_nm / 1000.0,
        transit_time: route.typical_transit_days,
        weather_risk: route.weather_risk,
      })
      .collect();
    TopologyView {
      node_count: nodes.len(),
      edge_count: edges.len(),
      nodes,
      edges,
    }
  }

  /// Model scores against the congestion-only baseline, largest network effect first.
  pub fn compare_with_baseline(&self) -> BaselineComparison {
    let snapshot = self.snapshots.current();
    let prediction = self.predict_network_with(&snapshot);
    let mut comparison: Vec<ComparisonEntry> = prediction
      .node_predictions
      .iter()
      .map(|node| {
        let network_effect = node.risk_score - node.congestion_input;
        ComparisonEntry {
          port_code: node.port_code.clone(),
          baseline_risk: node.congestion_input,
          model_risk: node.risk_score,
          network_effect,
          direction: EffectDirection::classify(network_effect),
        }
      })
      .collect();
    comparison.sort_by(|a, b| {
      by_value_desc(
        (a.network_effect.abs(), a.port_code.as_str()),
        (b.network_effect.abs(), b.port_code.as_str()),
      )
    });
    BaselineComparison {
      timestamp: prediction.timestamp,
      summary: ComparisonSummary::from_entries(&comparison),
      comparison,
    }
  }

  pub fn model_info(&self) -> ModelInfo {
    let mut parameters = self.scorer.parameters();
    parameters.insert(
      "congestion_spillover".to_string(),
      self.config.cascade.congestion_spillover,
    );
    ModelInfo {
      model_name: "PortNetworkRisk".to_string(),
      architecture: self.scorer.architecture().to_string(),
      version: env!("CARGO_PKG_VERSION").to_string(),
      scorer: self.scorer.name().to_string(),
      parameters,
      thresholds: self.config.thresholds,
      default_max_hops: self.config.cascade.default_max_hops,
      max_hops_limit: self.config.cascade.max_hops_limit,
      impact_threshold: self.config.cascade.impact_threshold,
      capabilities: vec![
        "Network-wide risk prediction".to_string(),
        "Cascading failure simulation".to_string(),
        "Graph visualization data".to_string(),
        "Comparison with congestion-only baseline".to_string(),
      ],
    }
  }
}
