//! Server configuration.
//!
//! Defaults → `RELAY_*` environment overrides → CLI flags (applied by the
//! binary). Environment values are parsed strictly; anything invalid or out
//! of range is ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration consumed by the dispatch core and its HTTP front end.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Tokio worker threads (`0` = one per core).
    pub worker_threads: usize,
    /// Maximum concurrently admitted requests.
    pub max_concurrent_requests: usize,
    /// Seconds a session may stay idle before the sweep evicts it.
    pub session_timeout_secs: u64,
    /// Seconds between eviction sweeps.
    pub sweep_interval_secs: u64,
    /// Directory of static front-end assets to serve, if any.
    pub assets_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            worker_threads: 0,
            max_concurrent_requests: 100,
            session_timeout_secs: 300,
            sweep_interval_secs: 30,
            assets_dir: None,
        }
    }
}

impl ServerConfig {
    /// Apply `RELAY_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = read_env("RELAY_HOST") {
            self.host = v;
        }
        if let Some(v) = read_env("RELAY_PORT").and_then(|v| parse_u16_range(&v, 0, 65535)) {
            self.port = v;
        }
        if let Some(v) = read_env("RELAY_WORKERS").and_then(|v| parse_usize_range(&v, 0, 1024)) {
            self.worker_threads = v;
        }
        if let Some(v) =
            read_env("RELAY_MAX_REQUESTS").and_then(|v| parse_usize_range(&v, 1, 1_000_000))
        {
            self.max_concurrent_requests = v;
        }
        if let Some(v) =
            read_env("RELAY_SESSION_TIMEOUT").and_then(|v| parse_u64_range(&v, 1, 86_400))
        {
            self.session_timeout_secs = v;
        }
        if let Some(v) =
            read_env("RELAY_SWEEP_INTERVAL").and_then(|v| parse_u64_range(&v, 1, 86_400))
        {
            self.sweep_interval_secs = v;
        }
        if let Some(v) = read_env("RELAY_ASSETS_DIR") {
            self.assets_dir = Some(PathBuf::from(v));
        }
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}
