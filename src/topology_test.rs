//! Tests for topology validation and indexing.

use crate::error::TopologyError;
use crate::topology::{PortTopology, TopologyDefinition, validate};
use crate::types::{Port, Region, Route};

fn port(code: &str) -> Port {
  Port {
    code: code.to_string(),
    name: code.to_string(),
    country: "X".to_string(),
    region: Region::Usa,
    capacity_teus: 1_000_000.0,
    lat: 10.0,
    lng: 20.0,
    baseline_congestion: None,
  }
}

fn route(origin: &str, destination: &str, distance_nm: f64) -> Route {
  Route {
    origin: origin.to_string(),
    destination: destination.to_string(),
    distance_nm,
    typical_transit_days: 10.0,
    weather_risk: 0.0,
  }
}

fn def(ports: Vec<Port>, routes: Vec<Route>) -> TopologyDefinition {
  TopologyDefinition { ports, routes }
}

#[test]
fn validate_ok() {
  let d = def(vec![port("A"), port("B")], vec![route("A", "B", 1000.0)]);
  assert!(validate(&d).is_ok());
}

#[test]
fn validate_err_empty() {
  assert_eq!(validate(&def(vec![], vec![])), Err(TopologyError::Empty));
}

#[test]
fn validate_err_duplicate_code() {
  let d = def(vec![port("A"), port("A")], vec![]);
  assert_eq!(
    validate(&d),
    Err(TopologyError::DuplicatePort("A".to_string()))
  );
}

#[test]
fn validate_err_empty_code() {
  let d = def(vec![port("A"), port("  ")], vec![]);
  assert_eq!(validate(&d), Err(TopologyError::EmptyCode { index: 1 }));
}

#[test]
fn validate_err_unknown_endpoint() {
  let d = def(vec![port("A")], vec![route("A", "Z", 100.0)]);
  let err = validate(&d).unwrap_err();
  assert!(matches!(err, TopologyError::UnknownPort { ref unknown, .. } if unknown == "Z"));
  assert!(err.to_string().contains("unknown port Z"));
}

#[test]
fn validate_err_self_loop() {
  let d = def(vec![port("A")], vec![route("A", "A", 100.0)]);
  assert_eq!(validate(&d), Err(TopologyError::SelfLoop("A".to_string())));
}

#[test]
fn validate_err_bad_distance() {
  for distance in [0.0, -5.0, f64::NAN, f64::INFINITY] {
    let d = def(vec![port("A"), port("B")], vec![route("A", "B", distance)]);
    assert!(matches!(
      validate(&d),
      Err(TopologyError::InvalidDistance { .. })
    ));
  }
}

#[test]
fn validate_err_bad_weather_risk() {
  let mut r = route("A", "B", 100.0);
  r.weather_risk = 1.5;
  let d = def(vec![port("A"), port("B")], vec![r]);
  assert!(matches!(
    validate(&d),
    Err(TopologyError::InvalidWeatherRisk { .. })
  ));
}

#[test]
fn validate_err_bad_capacity_and_baseline() {
  let mut p = port("A");
  p.capacity_teus = -1.0;
  assert!(matches!(
    validate(&def(vec![p], vec![])),
    Err(TopologyError::InvalidCapacity { .. })
  ));

  let mut p = port("A");
  p.baseline_congestion = Some(1.2);
  assert!(matches!(
    validate(&def(vec![p], vec![])),
    Err(TopologyError::InvalidBaseline { .. })
  ));
}

#[test]
fn from_definition_builds_undirected_adjacency() {
  let t = PortTopology::from_definition(def(
    vec![port("A"), port("B"), port("C")],
    vec![route("A", "B", 1000.0), route("B", "C", 2000.0)],
  ))
  .unwrap();
  assert_eq!(t.len(), 3);
  let a = t.index_of("A").unwrap();
  let b = t.index_of("B").unwrap();
  let c = t.index_of("C").unwrap();
  assert_eq!(t.neighbors(a).len(), 1);
  assert_eq!(t.neighbors(a)[0].index, b);
  assert_eq!(t.neighbors(b).len(), 2);
  assert_eq!(t.neighbors(c)[0].index, b);
  assert_eq!(t.neighbors(c)[0].coupling, 1.0 / 2000.0);
  assert_eq!(t.neighbors(c)[0].route, 1);
}

#[test]
fn from_definition_rejects_invalid() {
  let r = PortTopology::from_definition(def(vec![port("A")], vec![route("A", "B", 10.0)]));
  assert!(r.is_err());
}

#[test]
fn isolated_port_has_no_neighbors() {
  let t = PortTopology::from_definition(def(vec![port("A"), port("C")], vec![])).unwrap();
  assert!(t.neighbors(t.index_of("C").unwrap()).is_empty());
}

#[test]
fn resolve_code_is_case_insensitive() {
  let t = PortTopology::from_definition(def(vec![port("USLAX")], vec![])).unwrap();
  assert_eq!(t.resolve_code("USLAX"), Some(0));
  assert_eq!(t.resolve_code("uslax"), Some(0));
  assert_eq!(t.resolve_code("nope"), None);
}

#[test]
fn resolve_code_trims_before_either_lookup() {
  let t = PortTopology::from_definition(def(vec![port("USLAX"), port("Pier7")], vec![])).unwrap();
  assert_eq!(t.resolve_code(" uslax\t"), Some(0));
  // Mixed-case code only matches exactly, so the exact lookup must see the trimmed input.
  assert_eq!(t.resolve_code("  Pier7 "), Some(1));
}

#[test]
fn definition_round_trips_through_topology() {
  let d = def(vec![port("A"), port("B")], vec![route("A", "B", 1000.0)]);
  let t = PortTopology::from_definition(d.clone()).unwrap();
  assert_eq!(t.definition(), d);
}

#[test]
fn pacific_topology_is_valid() {
  let t = PortTopology::pacific().unwrap();
  assert_eq!(t.len(), 10);
  assert_eq!(t.routes().len(), 8);
  let lax = t.index_of("USLAX").unwrap();
  assert_eq!(t.neighbors(lax).len(), 4);
  let origins = t.ports().iter().filter(|p| p.is_origin()).count();
  assert_eq!(origins, 6);
  assert!(t.ports().iter().all(|p| p.baseline_congestion.is_some()));
}
