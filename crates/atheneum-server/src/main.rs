//! atheneum-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the record-store API over HTTP.
//! The write-attribution actor comes from the config override when set,
//! else from the hosting environment's login name.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use atheneum_core::record::Actor;
use atheneum_store_sqlite::SqliteStore;
use axum::Router;
use clap::Parser;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Atheneum record-store server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Shape of `config.toml`; every field has a default so a missing file
/// still yields a runnable server.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_store_path")]
  store_path: String,
  #[serde(default = "default_host")]
  host:       String,
  #[serde(default = "default_port")]
  port:       u16,
  /// Overrides the environment-derived actor when set.
  #[serde(default)]
  actor:      Option<String>,
}

fn default_store_path() -> String { "atheneum.db".to_owned() }
fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 5280 }

/// Config override, else the OS login name, else a fixed fallback. The
/// result is attribution only, never authentication.
fn resolve_actor(config: &ServerConfig) -> Actor {
  if let Some(actor) = &config.actor {
    return Actor::new(actor.clone());
  }
  std::env::var("USER")
    .or_else(|_| std::env::var("USERNAME"))
    .map(Actor::new)
    .unwrap_or_else(|_| Actor::new("unknown"))
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration: file first, ATHENEUM_* environment on top.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ATHENEUM"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let actor = resolve_actor(&server_cfg);
  tracing::info!(actor = %actor.uid, "stamping writes as");

  let app: Router = Router::new()
    .nest("/api", atheneum_api::api_router(Arc::new(store), actor))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Replace a leading `~` with the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
  if let Some(stripped) = path.strip_prefix("~/") {
    if let Some(home) = std::env::var_os("HOME") {
      return Path::new(&home).join(stripped);
    }
  }
  PathBuf::from(path)
}
