//! `RelayServer` — axum HTTP server over a session store.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use relay_session::store::SessionStore;
use relay_session::table::Operations;

use crate::admission::AdmissionController;
use crate::config::ServerConfig;
use crate::routes;
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from axum handlers.
pub struct AppState<S> {
    /// The session store all requests dispatch through.
    pub store: Arc<SessionStore<S>>,
    /// Admission permit pool.
    pub admission: Arc<AdmissionController>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus render handle for `/metrics`.
    pub metrics: PrometheusHandle,
}

// Manual Clone: `#[derive(Clone)]` would wrongly require `S: Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            admission: self.admission.clone(),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        }
    }
}

/// The relay HTTP server, generic over the configured session type.
pub struct RelayServer<S> {
    config: ServerConfig,
    store: Arc<SessionStore<S>>,
    admission: Arc<AdmissionController>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    metrics: PrometheusHandle,
}

impl<S: Operations> RelayServer<S> {
    /// Create a new server over an existing store.
    pub fn new(
        config: ServerConfig,
        store: Arc<SessionStore<S>>,
        metrics: PrometheusHandle,
    ) -> Self {
        let admission = Arc::new(AdmissionController::new(config.max_concurrent_requests));
        Self {
            config,
            store,
            admission,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
            metrics,
        }
    }

    /// Build the axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            store: self.store.clone(),
            admission: self.admission.clone(),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };

        let mut router = Router::new()
            .route("/api", post(routes::api_post::<S>).get(routes::api_greeting))
            .route("/health", get(routes::health::<S>))
            .route("/metrics", get(routes::metrics::<S>));

        if let Some(assets_dir) = &self.config.assets_dir {
            router = router.fallback_service(ServeDir::new(assets_dir));
        }

        router.layer(TraceLayer::new_for_http()).with_state(state)
    }

    /// Bind and start serving. Returns the bound address and the server task.
    ///
    /// The task runs until the shutdown coordinator's token is cancelled.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener =
            TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            match result {
                Ok(()) => info!("server task finished"),
                Err(err) => error!(error = %err, "server task exited with error"),
            }
        });

        Ok((addr, handle))
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the session store.
    pub fn store(&self) -> &Arc<SessionStore<S>> {
        &self.store
    }

    /// Get the admission controller.
    pub fn admission(&self) -> &Arc<AdmissionController> {
        &self.admission
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }
}
