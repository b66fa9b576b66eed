//! Error types for the risk engine.
//!
//! - [TopologyError]: malformed topology definition; fatal at startup.
//! - [EngineError]: everything an engine call or the loaders can return.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// A topology definition that cannot be turned into a port graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
  #[error("topology has no ports")]
  Empty,

  #[error("port #{index} has an empty code")]
  EmptyCode { index: usize },

  #[error("duplicate port code {0}")]
  DuplicatePort(String),

  #[error("route {origin} -> {destination} references unknown port {unknown}")]
  UnknownPort {
    origin: String,
    destination: String,
    unknown: String,
  },

  #[error("route {0} -> {0} connects a port to itself")]
  SelfLoop(String),

  #[error("route {origin} -> {destination} has invalid distance_nm {distance_nm}")]
  InvalidDistance {
    origin: String,
    destination: String,
    distance_nm: f64,
  },

  #[error("route {origin} -> {destination} has weather_risk {weather_risk} outside [0, 1]")]
  InvalidWeatherRisk {
    origin: String,
    destination: String,
    weather_risk: f64,
  },

  #[error("port {code} has invalid capacity_teus {capacity_teus}")]
  InvalidCapacity { code: String, capacity_teus: f64 },

  #[error("port {code} has baseline_congestion {value} outside [0, 1]")]
  InvalidBaseline { code: String, value: f64 },
}

/// Main error type for engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
  /// Topology failed validation at load time.
  #[error("topology error: {0}")]
  Topology(#[from] TopologyError),

  /// Caller referenced a port the topology does not contain.
  #[error("port {port_code} not found")]
  NotFound { port_code: String },

  /// Caller-supplied value outside its domain.
  #[error("invalid {field}: {message}")]
  Validation { field: String, message: String },

  /// Engine configuration rejected by validation.
  #[error("configuration error: {0}")]
  Config(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("toml error: {0}")]
  Toml(#[from] toml::de::Error),
}

impl EngineError {
  pub fn not_found(port_code: impl Into<String>) -> Self {
    Self::NotFound {
      port_code: port_code.into(),
    }
  }

  pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Validation {
      field: field.into(),
      message: message.into(),
    }
  }

  /// Short machine-readable kind, used in HTTP error bodies.
  pub fn kind(&self) -> &'static str {
    match self {
      EngineError::Topology(_) => "topology_error",
      EngineError::NotFound { .. } => "not_found",
      EngineError::Validation { .. } => "validation_error",
      EngineError::Config(_) => "config_error",
      EngineError::Io(_) => "io_error",
      EngineError::Json(_) => "json_error",
      EngineError::Toml(_) => "toml_error",
    }
  }

  /// True for errors caused by the caller's input rather than the engine.
  pub fn is_caller_error(&self) -> bool {
    matches!(
      self,
      EngineError::NotFound { .. } | EngineError::Validation { .. }
    )
  }
}

/// Checks that `value` is finite and within [0, 1], naming `field` otherwise.
pub(crate) fn ensure_unit_interval(field: &str, value: f64) -> Result<()> {
  if !value.is_finite() || !(0.0..=1.0).contains(&value) {
    return Err(EngineError::validation(
      field,
      format!("must be a finite value within [0, 1], got {value}"),
    ));
  }
  Ok(())
}
