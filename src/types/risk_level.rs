//! Risk buckets and the thresholds that assign them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Categorical risk bucket for a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
  Low,
  Medium,
  High,
  Critical,
}

impl RiskLevel {
  /// High and critical ports count towards `high_risk_nodes`.
  pub fn is_elevated(self) -> bool {
    matches!(self, RiskLevel::High | RiskLevel::Critical)
  }
}

impl fmt::Display for RiskLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RiskLevel::Low => write!(f, "low"),
      RiskLevel::Medium => write!(f, "medium"),
      RiskLevel::High => write!(f, "high"),
      RiskLevel::Critical => write!(f, "critical"),
    }
  }
}

/// Lower bounds of the medium and high buckets, and the bound above which a score is critical.
///
/// `score < medium` is low, `score < high` is medium, `score <= critical` is high,
/// anything above `critical` is critical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
  pub medium: f64,
  pub high: f64,
  pub critical: f64,
}

impl Default for RiskThresholds {
  fn default() -> Self {
    Self {
      medium: 35.0,
      high: 55.0,
      critical: 75.0,
    }
  }
}

impl RiskThresholds {
  pub fn classify(&self, score: f64) -> RiskLevel {
    if score > self.critical {
      RiskLevel::Critical
    } else if score >= self.high {
      RiskLevel::High
    } else if score >= self.medium {
      RiskLevel::Medium
    } else {
      RiskLevel::Low
    }
  }

  /// Thresholds must lie in [0, 100] and be strictly ascending.
  pub fn validate(&self) -> Result<(), String> {
    for (name, value) in [
      ("medium", self.medium),
      ("high", self.high),
      ("critical", self.critical),
    ] {
      if !(0.0..=100.0).contains(&value) {
        return Err(format!("thresholds.{name} must be within [0, 100], got {value}"));
      }
    }
    if !(self.medium < self.high && self.high < self.critical) {
      return Err(format!(
        "thresholds must be ascending (medium < high < critical), got {} / {} / {}",
        self.medium, self.high, self.critical
      ));
    }
    Ok(())
  }
}
