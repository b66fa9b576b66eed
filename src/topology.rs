//! Static port graph: definition, load-time validation and the indexed, immutable topology.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::TopologyError;
use crate::types::{Port, Region, Route};

/// Serializable list of ports and routes, as read from a topology file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyDefinition {
  pub ports: Vec<Port>,
  #[serde(default)]
  pub routes: Vec<Route>,
}

/// One adjacency entry: the port at the far end of a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
  /// Index of the neighboring port.
  pub index: usize,
  /// Index of the route that links the two ports.
  pub route: usize,
  /// Inverse-distance coupling of the route.
  pub coupling: f64,
  pub weather_risk: f64,
}

/// Validated port graph. Routes are treated as undirected.
#[derive(Debug, Clone)]
pub struct PortTopology {
  ports: Vec<Port>,
  routes: Vec<Route>,
  index: HashMap<String, usize>,
  adjacency: Vec<Vec<Neighbor>>,
}

/// Validates a topology definition: unique non-empty codes, known route endpoints,
/// no self-loops, positive finite distances, sane capacities and unit-interval inputs.
#[instrument(level = "trace", skip(def))]
pub(crate) fn validate(def: &TopologyDefinition) -> Result<(), TopologyError> {
  if def.ports.is_empty() {
    return Err(TopologyError::Empty);
  }
  let mut seen: HashMap<&str, usize> = HashMap::with_capacity(def.ports.len());
  for (i, port) in def.ports.iter().enumerate() {
    if port.code.trim().is_empty() {
      return Err(TopologyError::EmptyCode { index: i });
    }
    if seen.insert(port.code.as_str(), i).is_some() {
      return Err(TopologyError::DuplicatePort(port.code.clone()));
    }
    if !port.capacity_teus.is_finite() || port.capacity_teus < 0.0 {
      return Err(TopologyError::InvalidCapacity {
        code: port.code.clone(),
        capacity_teus: port.capacity_teus,
      });
    }
    if let Some(value) = port.baseline_congestion {
      if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(TopologyError::InvalidBaseline {
          code: port.code.clone(),
          value,
        });
      }
    }
  }
  for route in &def.routes {
    for endpoint in [&route.origin, &route.destination] {
      if !seen.contains_key(endpoint.as_str()) {
        return Err(TopologyError::UnknownPort {
          origin: route.origin.clone(),
          destination: route.destination.clone(),
          unknown: endpoint.clone(),
        });
      }
    }
    if route.origin == route.destination {
      return Err(TopologyError::SelfLoop(route.origin.clone()));
    }
    if !route.distance_nm.is_finite() || route.distance_nm <= 0.0 {
      return Err(TopologyError::InvalidDistance {
        origin: route.origin.clone(),
        destination: route.destination.clone(),
        distance_nm: route.distance_nm,
      });
    }
    if !route.weather_risk.is_finite() || !(0.0..=1.0).contains(&route.weather_risk) {
      return Err(TopologyError::InvalidWeatherRisk {
        origin: route.origin.clone(),
        destination: route.destination.clone(),
        weather_risk: route.weather_risk,
      });
    }
  }
  Ok(())
}

impl PortTopology {
  /// Validates `def` and builds the indexed graph. Port order is preserved.
  pub fn from_definition(def: TopologyDefinition) -> Result<Self, TopologyError> {
    validate(&def)?;
    let TopologyDefinition { ports, routes } = def;

    let index: HashMap<String, usize> = ports
      .iter()
      .enumerate()
      .map(|(i, p)| (p.code.clone(), i))
      .collect();

    let mut adjacency: Vec<Vec<Neighbor>> = vec![Vec::new(); ports.len()];
    for (r, route) in routes.iter().enumerate() {
      let a = index[&route.origin];
      let b = index[&route.destination];
      let coupling = route.coupling();
      adjacency[a].push(Neighbor {
        index: b,
        route: r,
        coupling,
        weather_risk: route.weather_risk,
      });
      adjacency[b].push(Neighbor {
        index: a,
        route: r,
        coupling,
        weather_risk: route.weather_risk,
      });
    }

    debug!(ports = ports.len(), routes = routes.len(), "topology built");
    Ok(Self {
      ports,
      routes,
      index,
      adjacency,
    })
  }

  /// The built-in trans-Pacific network.
  pub fn pacific() -> Result<Self, TopologyError> {
    Self::from_definition(TopologyDefinition::pacific())
  }

  pub fn ports(&self) -> &[Port] {
    &self.ports
  }

  pub fn routes(&self) -> &[Route] {
    &self.routes
  }

  pub fn len(&self) -> usize {
    self.ports.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ports.is_empty()
  }

  pub fn port(&self, index: usize) -> &Port {
    &self.ports[index]
  }

  pub fn index_of(&self, code: &str) -> Option<usize> {
    self.index.get(code).copied()
  }

  /// Case-insensitive lookup, for codes typed by users (`uslax`).
  pub fn resolve_code(&self, code: &str) -> Option<usize> {
    let code = code.trim();
    self
      .index_of(code)
      .or_else(|| self.index_of(&code.to_ascii_uppercase()))
  }

  pub fn neighbors(&self, index: usize) -> &[Neighbor] {
    &self.adjacency[index]
  }

  /// The definition this topology was built from.
  pub fn definition(&self) -> TopologyDefinition {
    TopologyDefinition {
      ports: self.ports.clone(),
      routes: self.routes.clone(),
    }
  }
}

fn port(
  code: &str,
  name: &str,
  country: &str,
  region: Region,
  (lat, lng): (f64, f64),
  baseline: f64,
  capacity_teus: f64,
) -> Port {
  Port {
    code: code.to_string(),
    name: name.to_string(),
    country: country.to_string(),
    region,
    capacity_teus,
    lat,
    lng,
    baseline_congestion: Some(baseline),
  }
}

fn route(origin: &str, destination: &str, distance_nm: f64, typical_transit_days: f64) -> Route {
  Route {
    origin: origin.to_string(),
    destination: destination.to_string(),
    distance_nm,
    typical_transit_days,
    weather_risk: 0.0,
  }
}

static PACIFIC: Lazy<TopologyDefinition> = Lazy::new(|| TopologyDefinition {
  ports: vec![
    port("TWKHH", "Kaohsiung", "Taiwan", Region::Asia, (22.62, 120.31), 0.45, 10_500_000.0),
    port("TWTPE", "Keelung", "Taiwan", Region::Asia, (25.13, 121.74), 0.35, 2_800_000.0),
    port("USLAX", "Los Angeles", "USA", Region::Usa, (33.74, -118.26), 0.62, 9_500_000.0),
    port("USLGB", "Long Beach", "USA", Region::Usa, (33.77, -118.19), 0.58, 8_600_000.0),
    port("USOAK", "Oakland", "USA", Region::Usa, (37.80, -122.28), 0.48, 2_500_000.0),
    port("USSEA", "Seattle", "USA", Region::Usa, (47.58, -122.35), 0.42, 3_800_000.0),
    port("CNSHA", "Shanghai", "China", Region::Asia, (31.23, 121.47), 0.55, 47_000_000.0),
    port("CNNGB", "Ningbo", "China", Region::Asia, (29.87, 121.55), 0.52, 31_000_000.0),
    port("HKHKG", "Hong Kong", "Hong Kong", Region::Asia, (22.30, 114.17), 0.50, 18_000_000.0),
    port("SGSIN", "Singapore", "Singapore", Region::Asia, (1.29, 103.85), 0.40, 37_000_000.0),
  ],
  routes: vec![
    route("TWKHH", "USLAX", 6150.0, 14.0),
    route("TWKHH", "USLGB", 6150.0, 14.0),
    route("TWTPE", "USOAK", 5950.0, 13.0),
    route("TWKHH", "USSEA", 5200.0, 12.0),
    route("CNSHA", "USLAX", 5900.0, 13.0),
    route("CNNGB", "USLGB", 5850.0, 13.0),
    route("HKHKG", "USLAX", 6400.0, 14.0),
    route("SGSIN", "USLAX", 8000.0, 18.0),
  ],
});

impl TopologyDefinition {
  /// Major trans-Pacific lanes: Asian origin ports to US West Coast destinations.
  pub fn pacific() -> Self {
    PACIFIC.clone()
  }
}
