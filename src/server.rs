//! HTTP serving layer over [RiskEngine].
//!
//! Handlers are thin: they parse the request, call one engine operation and
//! serialize the result. Engine errors map onto status codes in [ApiError].

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
  Json, Router,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::engine::RiskEngine;
use crate::error::{EngineError, Result};
use crate::snapshot::{CongestionSnapshot, SnapshotPublisher, SnapshotUpdate};
use crate::types::{BaselineComparison, CascadeSimulation, ModelInfo, NetworkPrediction, TopologyView};

/// Shared handler state. The publisher sits behind a mutex so pushes are serialized.
#[derive(Debug, Clone)]
pub struct AppState {
  pub engine: RiskEngine,
  pub publisher: Arc<Mutex<SnapshotPublisher>>,
}

impl AppState {
  pub fn new(engine: RiskEngine, publisher: SnapshotPublisher) -> Self {
    Self {
      engine,
      publisher: Arc::new(Mutex::new(publisher)),
    }
  }
}

/// Query string of `GET /gnn/cascade/:port_code`, parsed per parameter so a bad
/// value is reported against its own name.
#[derive(Debug, Default, PartialEq)]
pub struct CascadeParams {
  pub severity: Option<f64>,
  pub max_hops: Option<u32>,
}

fn parse_param<T>(raw: &HashMap<String, String>, name: &str) -> Result<Option<T>>
where
  T: FromStr,
  T::Err: fmt::Display,
{
  match raw.get(name) {
    None => Ok(None),
    Some(value) => value
      .trim()
      .parse()
      .map(Some)
      .map_err(|e| EngineError::validation(name, format!("cannot parse {value:?}: {e}"))),
  }
}

impl CascadeParams {
  pub fn from_query(raw: &HashMap<String, String>) -> Result<Self> {
    Ok(Self {
      severity: parse_param(raw, "severity")?,
      max_hops: parse_param(raw, "max_hops")?,
    })
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
  pub status: String,
  pub ports: usize,
  pub routes: usize,
}

/// Error body: `{ "error": kind, "field": optional, "message": text }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
  pub error: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
  pub message: String,
}

/// An [EngineError] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
  fn from(err: EngineError) -> Self {
    Self(err)
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self(EngineError::validation("query", rejection.body_text()))
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self(EngineError::validation("body", rejection.body_text()))
  }
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self.0 {
      EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
      EngineError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      warn!(error = %self.0, "request failed");
    }
    let field = match &self.0 {
      EngineError::Validation { field, .. } => Some(field.clone()),
      EngineError::NotFound { .. } => Some("port_code".to_string()),
      _ => None,
    };
    let body = ErrorBody {
      error: self.0.kind().to_string(),
      field,
      message: self.0.to_string(),
    };
    (status, Json(body)).into_response()
  }
}

/// Builds the router with tracing and permissive CORS.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/gnn/predict", get(predict))
    .route("/gnn/cascade/:port_code", get(cascade))
    .route("/gnn/network", get(network))
    .route("/gnn/compare", get(compare))
    .route("/gnn/info", get(model_info))
    .route("/gnn/snapshot", get(current_snapshot).put(publish_snapshot))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Binds `addr` and serves until ctrl-c.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
  let listener = tokio::net::TcpListener::bind(addr).await?;
  info!(addr = %listener.local_addr()?, "port risk server listening");
  axum::serve(listener, router(state))
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!("port risk server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(err) = tokio::signal::ctrl_c().await {
    warn!(error = %err, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
  let topology = state.engine.topology();
  Json(HealthResponse {
    status: "ok".to_string(),
    ports: topology.len(),
    routes: topology.routes().len(),
  })
}

async fn predict(State(state): State<AppState>) -> Json<NetworkPrediction> {
  Json(state.engine.predict_network())
}

async fn cascade(
  State(state): State<AppState>,
  Path(port_code): Path<String>,
  raw: std::result::Result<Query<HashMap<String, String>>, QueryRejection>,
) -> std::result::Result<Json<CascadeSimulation>, ApiError> {
  let Query(raw) = raw?;
  let params = CascadeParams::from_query(&raw)?;
  let simulation = state
    .engine
    .predict_cascade(&port_code, params.severity, params.max_hops)?;
  Ok(Json(simulation))
}

async fn network(State(state): State<AppState>) -> Json<TopologyView> {
  Json(state.engine.get_topology())
}

async fn compare(State(state): State<AppState>) -> Json<BaselineComparison> {
  Json(state.engine.compare_with_baseline())
}

async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
  Json(state.engine.model_info())
}

async fn current_snapshot(State(state): State<AppState>) -> Json<CongestionSnapshot> {
  Json(state.engine.snapshot().as_ref().clone())
}

async fn publish_snapshot(
  State(state): State<AppState>,
  body: std::result::Result<Json<SnapshotUpdate>, JsonRejection>,
) -> std::result::Result<Json<CongestionSnapshot>, ApiError> {
  let Json(update) = body?;
  let published = state.publisher.lock().await.publish(update.into())?;
  Ok(Json(published.as_ref().clone()))
}
