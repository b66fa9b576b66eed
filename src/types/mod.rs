//! Plain data types shared by the topology, scoring, cascade and serving layers.
//!
//! Output types serialize with the field names the dashboard expects
//! (`gnn_risk_score`, `cascade_risk_increase`, ...).

mod baseline_comparison;
mod cascade_simulation;
mod model_info;
mod node_prediction;
mod port;
mod risk_level;
mod route;
mod topology_view;

pub use baseline_comparison::{
  BaselineComparison, ComparisonEntry, ComparisonSummary, EffectDirection, SIGNIFICANT_EFFECT,
  SIMILAR_EFFECT_BAND,
};
pub use cascade_simulation::{CascadeEntry, CascadeSimulation};
pub use model_info::ModelInfo;
pub use node_prediction::{NetworkPrediction, NodePrediction};
pub use port::{Port, Region};
pub use risk_level::{RiskLevel, RiskThresholds};
pub use route::Route;
pub use topology_view::{NetworkEdge, NetworkNode, TopologyView};
