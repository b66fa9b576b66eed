//! CLI: serve the port risk engine over HTTP, or run one engine call and print JSON.
//!
//! Usage: `port_risk [OPTIONS] <COMMAND>`
//! Example: port_risk cascade USLAX --severity 0.9 --max-hops 3
//!
//! Topology and configuration problems are fatal: the process exits with status 1
//! before serving anything.
//!
//! Set RUST_LOG=port_risk_engine=trace for TRACE-level spans on scoring and cascades.

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use port_risk_engine::server::{self, AppState};
use port_risk_engine::topology_io::{load_topology, save_topology_definition};
use port_risk_engine::{
  CongestionSnapshot, EngineConfig, EngineError, PortTopology, RiskEngine, SnapshotUpdate,
  snapshot_channel,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LISTEN: &str = "0.0.0.0:8000";

/// Port network risk engine.
#[derive(Parser, Debug)]
#[command(name = "port_risk")]
#[command(
  after_help = r#"Environment variables (override the matching flags when set):
  PORT_RISK_CONFIG     Engine configuration TOML file.
  PORT_RISK_TOPOLOGY   Topology definition JSON file (default: built-in Pacific network).
  PORT_RISK_LISTEN     Listen address for `serve` (default: 0.0.0.0:8000).

Examples:
  port_risk serve --listen 127.0.0.1:8000
  port_risk predict --snapshot congestion.json
  port_risk cascade USLAX --severity 0.9"#
)]
struct Args {
  /// Engine configuration TOML. Overridden by PORT_RISK_CONFIG if set.
  #[arg(long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Topology definition JSON. Overridden by PORT_RISK_TOPOLOGY if set.
  #[arg(long, global = true, value_name = "FILE")]
  topology: Option<PathBuf>,

  /// Congestion snapshot JSON (`{taken_at?, congestion}`). Default: port baselines.
  #[arg(long, global = true, value_name = "FILE")]
  snapshot: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Serve the HTTP API.
  Serve {
    /// Listen address. Overridden by PORT_RISK_LISTEN if set.
    #[arg(long, value_name = "ADDR", default_value = DEFAULT_LISTEN)]
    listen: String,
  },
  /// Print a network-wide prediction.
  Predict,
  /// Print a cascade simulation from one port.
  Cascade {
    /// Source port code (case-insensitive).
    port_code: String,
    #[arg(long)]
    severity: Option<f64>,
    #[arg(long)]
    max_hops: Option<u32>,
  },
  /// Print the network view, or export the topology definition.
  Topology {
    /// Write the topology definition JSON here instead of printing the view.
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,
  },
  /// Load and validate configuration and topology, then exit.
  Validate,
}

fn env_path(key: &str, flag: &Option<PathBuf>) -> Option<PathBuf> {
  env::var(key).ok().map(PathBuf::from).or_else(|| flag.clone())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, EngineError> {
  match path {
    Some(p) => EngineConfig::load(p),
    None => Ok(EngineConfig::default()),
  }
}

fn load_port_topology(path: Option<&Path>) -> Result<PortTopology, EngineError> {
  match path {
    Some(p) => load_topology(p),
    None => Ok(PortTopology::pacific()?),
  }
}

fn load_snapshot(path: Option<&Path>, topology: &PortTopology) -> Result<CongestionSnapshot, EngineError> {
  match path {
    Some(p) => {
      let bytes = std::fs::read(p)?;
      let update: SnapshotUpdate = serde_json::from_slice(&bytes)?;
      let snapshot = CongestionSnapshot::from(update);
      snapshot.validate()?;
      Ok(snapshot)
    }
    None => Ok(CongestionSnapshot::baseline(topology, Utc::now())),
  }
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
  eprintln!("Error {context}: {err}");
  process::exit(1);
}

fn print_json<T: Serialize>(value: &T) {
  match serde_json::to_string_pretty(value) {
    Ok(s) => println!("{s}"),
    Err(e) => fail("serializing output", e),
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  // Env vars override flags.
  let config_path = env_path("PORT_RISK_CONFIG", &args.config);
  let topology_path = env_path("PORT_RISK_TOPOLOGY", &args.topology);
  info!(config = ?config_path, topology = ?topology_path, "options (env or flags)");

  let config = load_config(config_path.as_deref()).unwrap_or_else(|e| fail("loading config", e));
  let topology = load_port_topology(topology_path.as_deref())
    .unwrap_or_else(|e| fail("loading topology", e));
  let topology = Arc::new(topology);
  let initial = load_snapshot(args.snapshot.as_deref(), &topology)
    .unwrap_or_else(|e| fail("loading snapshot", e));

  let (publisher, reader) = snapshot_channel(initial);
  let engine = RiskEngine::new(Arc::clone(&topology), config, reader)
    .unwrap_or_else(|e| fail("loading config", e));

  match args.command {
    Command::Serve { listen } => {
      let listen = env::var("PORT_RISK_LISTEN").unwrap_or(listen);
      let addr: SocketAddr = listen
        .parse()
        .unwrap_or_else(|e| fail(&format!("parsing listen address {listen}"), e));
      if let Err(e) = server::serve(addr, AppState::new(engine, publisher)).await {
        fail("serving", e);
      }
    }
    Command::Predict => print_json(&engine.predict_network()),
    Command::Cascade {
      port_code,
      severity,
      max_hops,
    } => match engine.predict_cascade(&port_code, severity, max_hops) {
      Ok(sim) => print_json(&sim),
      Err(e) => fail("simulating cascade", e),
    },
    Command::Topology { export: Some(path) } => {
      if let Err(e) = save_topology_definition(&path, &topology.definition()) {
        fail("exporting topology", e);
      }
      println!("Topology written to {}", path.display());
    }
    Command::Topology { export: None } => print_json(&engine.get_topology()),
    Command::Validate => {
      println!(
        "Topology ok: {} ports, {} routes.",
        topology.len(),
        topology.routes().len()
      );
      println!("Config ok: scorer {}.", engine.scorer().name());
    }
  }
}
