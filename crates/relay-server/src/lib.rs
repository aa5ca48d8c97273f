//! # relay-server
//!
//! Axum HTTP front end for the relay dispatch core.
//!
//! - `POST /api` — JSON envelope endpoint behind the admission gate
//! - `GET /health` — liveness with live session counters
//! - `GET /metrics` — Prometheus text exposition
//! - optional static asset serving via `tower-http` `ServeDir`
//! - periodic inactivity sweeper task
//! - graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod admission;
pub mod config;
pub mod health;
pub mod metrics;
mod routes;
pub mod server;
pub mod shutdown;
pub mod sweeper;
