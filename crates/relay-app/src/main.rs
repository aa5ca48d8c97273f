//! # relay-app
//!
//! Account demo server binary — wires the session store, sweeper, and HTTP
//! front end together and serves the bundled demo front end.

#![deny(unsafe_code)]

mod accounts;
mod session;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use relay_server::config::ServerConfig;
use relay_server::server::RelayServer;
use relay_server::sweeper::run_sweeper;
use relay_session::store::SessionStore;

use crate::accounts::AccountDirectory;
use crate::session::AccountSession;

/// Relay account demo server.
#[derive(Parser, Debug)]
#[command(name = "relay-app", about = "Account demo server on the relay dispatch core")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind (0 for auto-assign).
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Tokio worker threads (0 = one per core; overrides env if specified).
    #[arg(long)]
    workers: Option<usize>,

    /// Maximum concurrently admitted requests (overrides env if specified).
    #[arg(long)]
    max_requests: Option<usize>,

    /// Seconds a session may stay idle before eviction (overrides env if specified).
    #[arg(long)]
    session_timeout: Option<u64>,

    /// Seconds between eviction sweeps (overrides env if specified).
    #[arg(long)]
    sweep_interval: Option<u64>,

    /// Directory of static front-end assets to serve.
    #[arg(long)]
    assets: Option<PathBuf>,
}

impl Cli {
    /// Layer CLI flags over env-overridden defaults.
    fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.apply_env_overrides();

        config.host = self.host;
        config.port = self.port;
        if let Some(v) = self.workers {
            config.worker_threads = v;
        }
        if let Some(v) = self.max_requests {
            config.max_concurrent_requests = v;
        }
        if let Some(v) = self.session_timeout {
            config.session_timeout_secs = v;
        }
        if let Some(v) = self.sweep_interval {
            config.sweep_interval_secs = v;
        }
        if let Some(v) = self.assets {
            config.assets_dir = Some(v);
        }
        config
    }
}

fn main() -> Result<()> {
    let config = Cli::parse().into_config();

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if config.worker_threads > 0 {
        let _ = builder.worker_threads(config.worker_threads);
    }
    let runtime = builder
        .enable_all()
        .build()
        .context("failed to build runtime")?;
    runtime.block_on(run(config))
}

async fn run(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let accounts = Arc::new(AccountDirectory::new());
    let directory = accounts.clone();
    let store = Arc::new(SessionStore::new(move || {
        AccountSession::new(directory.clone())
    }));

    let metrics_handle = relay_server::metrics::install_recorder();
    let server = RelayServer::new(config.clone(), store.clone(), metrics_handle);

    let sweeper = tokio::spawn(run_sweeper(
        store,
        Duration::from_secs(config.sweep_interval_secs),
        Duration::from_secs(config.session_timeout_secs),
        server.shutdown().token(),
    ));

    let (addr, server_task) = server.listen().await.context("failed to bind server")?;
    tracing::info!(
        max_requests = config.max_concurrent_requests,
        session_timeout_secs = config.session_timeout_secs,
        "relay listening on http://{addr}"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    tracing::info!("shutting down");
    server
        .shutdown()
        .graceful_shutdown(vec![server_task, sweeper], None)
        .await;
    tracing::info!("shutdown complete");
    Ok(())
}
