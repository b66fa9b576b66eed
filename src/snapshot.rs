//! Point-in-time congestion inputs and their single-writer publication channel.
//!
//! The external updater owns the only [SnapshotPublisher]; it swaps in a whole new
//! `Arc<CongestionSnapshot>` on every refresh. Engine calls read through a
//! [SnapshotReader], cloning the current `Arc` once, so a call never observes a
//! mix of two refreshes.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{Result, ensure_unit_interval};
use crate::topology::PortTopology;

/// Congestion per port code, each in [0, 1], as of `taken_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionSnapshot {
  pub taken_at: DateTime<Utc>,
  pub congestion: BTreeMap<String, f64>,
}

/// Body of a snapshot push; `taken_at` defaults to the time of receipt.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotUpdate {
  #[serde(default)]
  pub taken_at: Option<DateTime<Utc>>,
  pub congestion: BTreeMap<String, f64>,
}

impl From<SnapshotUpdate> for CongestionSnapshot {
  fn from(update: SnapshotUpdate) -> Self {
    Self {
      taken_at: update.taken_at.unwrap_or_else(Utc::now),
      congestion: update.congestion,
    }
  }
}

impl CongestionSnapshot {
  pub fn new(taken_at: DateTime<Utc>, congestion: BTreeMap<String, f64>) -> Self {
    Self {
      taken_at,
      congestion,
    }
  }

  /// Snapshot seeded from each port's `baseline_congestion` (0 when absent).
  pub fn baseline(topology: &PortTopology, taken_at: DateTime<Utc>) -> Self {
    let congestion = topology
      .ports()
      .iter()
      .map(|p| (p.code.clone(), p.baseline_congestion.unwrap_or(0.0)))
      .collect();
    Self::new(taken_at, congestion)
  }

  pub fn get(&self, code: &str) -> Option<f64> {
    self.congestion.get(code).copied()
  }

  /// Returns a copy with one port's congestion replaced.
  pub fn with_congestion(&self, code: &str, value: f64) -> Self {
    let mut next = self.clone();
    next.congestion.insert(code.to_string(), value);
    next
  }

  /// Every value must be finite and within [0, 1]; the error names `congestion.<code>`.
  pub fn validate(&self) -> Result<()> {
    for (code, value) in &self.congestion {
      ensure_unit_interval(&format!("congestion.{code}"), *value)?;
    }
    Ok(())
  }

  /// Congestion inputs in topology port order.
  ///
  /// Ports missing from the snapshot default to 0 and are logged; values outside
  /// [0, 1] are clamped and non-finite values read as 0.
  pub fn resolve(&self, topology: &PortTopology) -> Vec<f64> {
    let inputs: Vec<f64> = topology
      .ports()
      .iter()
      .map(|port| match self.get(&port.code) {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        Some(v) => {
          warn!(port = %port.code, value = v, "non-finite congestion in snapshot; using 0");
          0.0
        }
        None => {
          warn!(port = %port.code, taken_at = %self.taken_at, "congestion snapshot missing port; using 0");
          0.0
        }
      })
      .collect();
    for code in self.congestion.keys() {
      if topology.index_of(code).is_none() {
        debug!(port = %code, "snapshot entry for port outside topology ignored");
      }
    }
    inputs
  }
}

/// The single writer of congestion snapshots. Not `Clone`.
#[derive(Debug)]
pub struct SnapshotPublisher {
  tx: watch::Sender<Arc<CongestionSnapshot>>,
}

/// Read handle on the latest published snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
  rx: watch::Receiver<Arc<CongestionSnapshot>>,
}

/// Creates the publisher/reader pair, starting from `initial`.
pub fn snapshot_channel(initial: CongestionSnapshot) -> (SnapshotPublisher, SnapshotReader) {
  let (tx, rx) = watch::channel(Arc::new(initial));
  (SnapshotPublisher { tx }, SnapshotReader { rx })
}

impl SnapshotPublisher {
  /// Validates `snapshot` and atomically replaces the current one.
  pub fn publish(&mut self, snapshot: CongestionSnapshot) -> Result<Arc<CongestionSnapshot>> {
    snapshot.validate()?;
    let snapshot = Arc::new(snapshot);
    self.tx.send_replace(Arc::clone(&snapshot));
    info!(
      taken_at = %snapshot.taken_at,
      ports = snapshot.congestion.len(),
      "congestion snapshot published"
    );
    Ok(snapshot)
  }

  pub fn subscribe(&self) -> SnapshotReader {
    SnapshotReader {
      rx: self.tx.subscribe(),
    }
  }

  pub fn current(&self) -> Arc<CongestionSnapshot> {
    Arc::clone(&self.tx.borrow())
  }
}

impl SnapshotReader {
  /// The latest snapshot. Holding the returned `Arc` pins that version.
  pub fn current(&self) -> Arc<CongestionSnapshot> {
    Arc::clone(&self.rx.borrow())
  }

  /// A reader whose snapshot never changes; for one-shot computations.
  pub fn fixed(snapshot: CongestionSnapshot) -> Self {
    snapshot_channel(snapshot).1
  }
}
