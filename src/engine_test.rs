//! Tests for `RiskEngine`.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use crate::config::{EngineConfig, ScorerKind};
use crate::engine::RiskEngine;
use crate::error::EngineError;
use crate::scoring::RiskScorer;
use crate::snapshot::{CongestionSnapshot, SnapshotReader, snapshot_channel};
use crate::topology::{PortTopology, TopologyDefinition};
use crate::types::{EffectDirection, Port, Region, RiskLevel, Route};

fn port(code: &str, region: Region, capacity_teus: f64) -> Port {
  Port {
    code: code.to_string(),
    name: format!("Port {code}"),
    country: "X".to_string(),
    region,
    capacity_teus,
    lat: 30.0,
    lng: -120.0,
    baseline_congestion: None,
  }
}

fn route(origin: &str, destination: &str, distance_nm: f64) -> Route {
  Route {
    origin: origin.to_string(),
    destination: destination.to_string(),
    distance_nm,
    typical_transit_days: 12.0,
    weather_risk: 0.1,
  }
}

/// A - B linked, C isolated.
fn topology() -> Arc<PortTopology> {
  Arc::new(
    PortTopology::from_definition(TopologyDefinition {
      ports: vec![
        port("A", Region::Asia, 1.0),
        port("B", Region::Usa, 1.0),
        port("C", Region::Usa, 2.0),
      ],
      routes: vec![route("A", "B", 1000.0)],
    })
    .unwrap(),
  )
}

fn snapshot(values: &[(&str, f64)]) -> CongestionSnapshot {
  CongestionSnapshot::new(
    Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
    values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
  )
}

fn engine(values: &[(&str, f64)]) -> RiskEngine {
  RiskEngine::new(
    topology(),
    EngineConfig::default(),
    SnapshotReader::fixed(snapshot(values)),
  )
  .unwrap()
}

#[test]
fn predict_network_two_quiet_ports() {
  let e = engine(&[("A", 0.1), ("B", 0.1), ("C", 0.1)]);
  let p = e.predict_network();
  assert!((p.node("A").unwrap().risk_score - 10.0).abs() < 1e-9);
  assert!((p.node("B").unwrap().risk_score - 10.0).abs() < 1e-9);
  assert_eq!(p.node("A").unwrap().risk_level, RiskLevel::Low);
  assert!(p.node("A").unwrap().is_origin);
  assert!(!p.node("B").unwrap().is_origin);
  assert!((p.network_risk_score - 10.0).abs() < 1e-9);
  assert_eq!(p.total_nodes, 3);
  assert_eq!(p.total_edges, 1);
  assert_eq!(p.model, "heuristic");
  assert_eq!(p.timestamp, snapshot(&[]).taken_at);
}

#[test]
fn predict_network_sorts_and_counts_high_risk() {
  let e = engine(&[("A", 0.9), ("B", 0.2), ("C", 0.6)]);
  let p = e.predict_network();
  let order: Vec<&str> = p
    .node_predictions
    .iter()
    .map(|n| n.port_code.as_str())
    .collect();
  // A: 0.7*90 + 0.3*20 = 69, C: 60, B: 0.7*20 + 0.3*90 = 41
  assert_eq!(order, vec!["A", "C", "B"]);
  assert_eq!(p.high_risk_nodes, 2);
  assert_eq!(p.node("B").unwrap().risk_level, RiskLevel::Medium);
  assert!((p.node("C").unwrap().congestion_input - 60.0).abs() < 1e-9);
}

#[test]
fn predict_network_is_idempotent() {
  let e = engine(&[("A", 0.37), ("B", 0.81), ("C", 0.05)]);
  assert_eq!(e.predict_network(), e.predict_network());
}

#[test]
fn missing_snapshot_entries_default_to_zero() {
  let e = engine(&[("A", 0.5)]);
  let p = e.predict_network();
  assert_eq!(p.node("C").unwrap().congestion_input, 0.0);
  assert_eq!(p.node("C").unwrap().risk_score, 0.0);
}

#[test]
fn cascade_two_port_scenario() {
  let e = engine(&[("A", 0.1), ("B", 0.1), ("C", 0.1)]);
  let sim = e.predict_cascade("A", Some(1.0), None).unwrap();
  let a = sim.entry("A").unwrap();
  let b = sim.entry("B").unwrap();
  assert!(a.is_source);
  assert_eq!(a.projected_congestion, 100.0);
  assert!((a.original_congestion - 10.0).abs() < 1e-9);
  assert!(b.risk_increase > 0.0);
  assert!(sim.affected_ports >= 1);
  assert_eq!(sim.entries.iter().filter(|e| e.is_source).count(), 1);
  assert_eq!(sim.max_hops, 4);
  assert_eq!(sim.severity, 1.0);
  // Sorted by impact.
  assert_eq!(sim.entries[0].port_code, "A");
  assert_eq!(sim.entries[2].port_code, "C");
}

#[test]
fn cascade_leaves_isolated_port_alone() {
  let e = engine(&[("A", 0.1), ("B", 0.1), ("C", 0.1)]);
  let sim = e.predict_cascade("B", None, None).unwrap();
  assert_eq!(sim.entry("C").unwrap().risk_increase, 0.0);
  assert_eq!(sim.entry("C").unwrap().hops, None);
}

#[test]
fn cascade_from_isolated_port() {
  let e = engine(&[("A", 0.1), ("B", 0.1), ("C", 0.1)]);
  let sim = e.predict_cascade("C", None, None).unwrap();
  assert_eq!(sim.affected_ports, 1);
  assert_eq!(sim.propagation_depth, 0);
  assert_eq!(sim.source_port, "C");
}

#[test]
fn cascade_source_code_is_case_insensitive() {
  let e = engine(&[("A", 0.1)]);
  let sim = e.predict_cascade("a", None, None).unwrap();
  assert_eq!(sim.source_port, "A");
}

#[test]
fn cascade_unknown_port_is_not_found() {
  let e = engine(&[]);
  let err = e.predict_cascade("ZZZZZ", None, None).unwrap_err();
  assert!(matches!(err, EngineError::NotFound { ref port_code } if port_code == "ZZZZZ"));
  assert!(err.is_caller_error());
}

#[test]
fn cascade_severity_out_of_range_is_validation_error() {
  let e = engine(&[]);
  for bad in [-0.1, 1.5, f64::NAN] {
    let err = e.predict_cascade("A", Some(bad), None).unwrap_err();
    assert!(matches!(err, EngineError::Validation { ref field, .. } if field == "severity"));
  }
}

#[test]
fn cascade_max_hops_above_limit_is_validation_error() {
  let e = engine(&[]);
  let err = e.predict_cascade("A", None, Some(99)).unwrap_err();
  assert!(matches!(err, EngineError::Validation { ref field, .. } if field == "max_hops"));
}

#[test]
fn cascade_does_not_mutate_snapshot() {
  let (_publisher, reader) = snapshot_channel(snapshot(&[("A", 0.2), ("B", 0.3)]));
  let e = RiskEngine::new(topology(), EngineConfig::default(), reader).unwrap();
  let before = e.snapshot();
  let sim = e.predict_cascade("A", Some(1.0), None).unwrap();
  assert_eq!(*e.snapshot(), *before);
  assert!((sim.source().unwrap().original_congestion - 20.0).abs() < 1e-9);
}

#[test]
fn engine_follows_published_snapshots() {
  let (mut publisher, reader) = snapshot_channel(snapshot(&[("A", 0.1), ("B", 0.1)]));
  let e = RiskEngine::new(topology(), EngineConfig::default(), reader).unwrap();
  let first = e.predict_network();
  publisher
    .publish(snapshot(&[("A", 0.9), ("B", 0.9), ("C", 0.9)]))
    .unwrap();
  let second = e.predict_network();
  assert!(second.network_risk_score > first.network_risk_score);
}

#[test]
fn explicit_snapshot_variants_ignore_current() {
  let e = engine(&[("A", 0.1)]);
  let other = snapshot(&[("A", 0.9), ("B", 0.9)]);
  let p = e.predict_network_with(&other);
  assert!((p.node("A").unwrap().congestion_input - 90.0).abs() < 1e-9);
  let sim = e.predict_cascade_with(&other, "B", None, None).unwrap();
  assert!((sim.source().unwrap().original_congestion - 90.0).abs() < 1e-9);
}

#[test]
fn topology_view_carries_congestion_and_coordinates() {
  let e = engine(&[("A", 0.5)]);
  let view = e.get_topology();
  assert_eq!(view.node_count, 3);
  assert_eq!(view.edge_count, 1);
  let a = view.nodes.iter().find(|n| n.id == "A").unwrap();
  assert_eq!(a.x, 60.0);
  assert_eq!(a.y, 60.0);
  assert_eq!(a.congestion, 0.5);
  assert_eq!(a.size, 20.0);
  assert!(a.is_origin);
  let edge = &view.edges[0];
  assert_eq!(edge.source, "A");
  assert_eq!(edge.target, "B");
  assert_eq!(edge.weight, 1.0);
  assert_eq!(edge.weather_risk, 0.1);
}

#[test]
fn compare_with_baseline_reports_network_effects() {
  let e = engine(&[("A", 0.1), ("B", 0.9), ("C", 0.4)]);
  let cmp = e.compare_with_baseline();
  assert_eq!(cmp.comparison.len(), 3);
  // A: 0.7*10 + 0.3*90 = 34 -> +24; B: 0.7*90 + 0.3*10 = 66 -> -24; C isolated -> 0.
  let a = cmp.comparison.iter().find(|c| c.port_code == "A").unwrap();
  assert!((a.network_effect - 24.0).abs() < 1e-9);
  assert_eq!(a.direction, EffectDirection::Increase);
  let b = cmp.comparison.iter().find(|c| c.port_code == "B").unwrap();
  assert_eq!(b.direction, EffectDirection::Decrease);
  assert_eq!(cmp.comparison[2].port_code, "C");
  assert_eq!(cmp.comparison[2].direction, EffectDirection::Similar);
  assert_eq!(cmp.summary.ports_with_significant_network_effects, 2);
}

#[test]
fn model_info_reflects_config() {
  let mut config = EngineConfig::default();
  config.scorer.kind = ScorerKind::Layered;
  let e = RiskEngine::new(topology(), config, SnapshotReader::fixed(snapshot(&[]))).unwrap();
  let info = e.model_info();
  assert_eq!(info.scorer, "layered");
  assert_eq!(info.default_max_hops, 4);
  assert_eq!(info.parameters["layers"], 3.0);
  assert_eq!(info.parameters["congestion_spillover"], 0.3);
  assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
}

#[test]
fn new_rejects_invalid_config() {
  let config = EngineConfig {
    blend_alpha: 2.0,
    ..EngineConfig::default()
  };
  let r = RiskEngine::new(topology(), config, SnapshotReader::fixed(snapshot(&[])));
  assert!(matches!(r, Err(EngineError::Config(_))));
}

/// Scores every port at its congestion, ignoring the network.
#[derive(Debug)]
struct Isolated;

impl RiskScorer for Isolated {
  fn name(&self) -> &str {
    "isolated"
  }

  fn architecture(&self) -> &str {
    "no network effects"
  }

  fn parameters(&self) -> BTreeMap<String, f64> {
    BTreeMap::new()
  }

  fn score(&self, _topology: &PortTopology, congestion: &[f64]) -> Vec<f64> {
    congestion.iter().map(|c| c * 100.0).collect()
  }
}

#[test]
fn custom_scorer_keeps_serving_contract() {
  let e = engine(&[("A", 0.3), ("B", 0.7)]).with_scorer(Arc::new(Isolated));
  let p = e.predict_network();
  assert_eq!(p.model, "isolated");
  assert!((p.node("B").unwrap().risk_score - 70.0).abs() < 1e-9);
  let sim = e.predict_cascade("A", None, None).unwrap();
  assert_eq!(sim.entry("B").unwrap().risk_increase, 0.0);
  assert_eq!(sim.affected_ports, 1);
}

proptest! {
  #[test]
  fn cascade_increases_are_non_negative_and_depth_bounded(
    c in prop::collection::vec(0.0f64..=1.0, 10),
    source in 0usize..10,
    severity in 0.0f64..=1.0,
    max_hops in 0u32..=16,
  ) {
    let topology = Arc::new(PortTopology::pacific().unwrap());
    let values = topology
      .ports()
      .iter()
      .zip(&c)
      .map(|(p, v)| (p.code.clone(), *v))
      .collect();
    let snap = CongestionSnapshot::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(), values);
    let code = topology.port(source).code.clone();
    let e = RiskEngine::new(topology, EngineConfig::default(), SnapshotReader::fixed(snap)).unwrap();
    let sim = e.predict_cascade(&code, Some(severity), Some(max_hops)).unwrap();
    prop_assert!(sim.entries.iter().all(|x| x.risk_increase >= 0.0));
    prop_assert!(sim.propagation_depth <= max_hops);
    prop_assert!(sim.affected_ports >= 1);
    prop_assert!(sim.entries.iter().all(|x| (0.0..=100.0).contains(&x.projected_congestion)));
    prop_assert_eq!(sim.entries.iter().filter(|x| x.is_source).count(), 1);
  }
}
