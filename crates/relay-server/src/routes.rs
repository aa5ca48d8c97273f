//! HTTP handlers: the `/api` envelope endpoint, health, and metrics.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use metrics::{counter, histogram};
use serde_json::{Value, json};
use tracing::debug;

use relay_core::envelope::{Envelope, MethodCall, NEW_SESSION};
use relay_core::errors::DispatchError;
use relay_session::table::Operations;

use crate::health::{HealthResponse, health_check};
use crate::metrics::{
    API_REQUEST_DURATION_SECONDS, API_REQUESTS_REJECTED_TOTAL, API_REQUESTS_TOTAL,
    SESSIONS_CREATED_TOTAL,
};
use crate::server::AppState;

/// Greeting returned by `GET /api`.
const API_GREETING: &str = "relay API: POST JSON envelopes to this endpoint";

/// `POST /api` — admission gate, envelope decode, dispatch.
pub(crate) async fn api_post<S: Operations>(
    State(state): State<AppState<S>>,
    body: String,
) -> (StatusCode, Json<Value>) {
    // The permit guard spans decode and dispatch; dropping it at the end of
    // this function releases the slot on every exit path.
    let Some(_permit) = state.admission.try_admit() else {
        counter!(API_REQUESTS_REJECTED_TOTAL).increment(1);
        debug!("request rejected, no admission permit free");
        return respond(DispatchError::Rejected.into_envelope());
    };

    let started = Instant::now();
    let envelope = handle_call(&state, &body).await;
    histogram!(API_REQUEST_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
    respond(envelope)
}

/// `GET /api` — plain-text liveness greeting.
pub(crate) async fn api_greeting() -> &'static str {
    API_GREETING
}

/// `GET /health`
pub(crate) async fn health<S: Operations>(
    State(state): State<AppState<S>>,
) -> Json<HealthResponse> {
    Json(health_check(state.start_time, state.store.len()))
}

/// `GET /metrics`
pub(crate) async fn metrics<S: Operations>(State(state): State<AppState<S>>) -> String {
    crate::metrics::render(&state.metrics)
}

/// Decode one envelope and route it: `newSession` creates, everything else
/// resolves the session and dispatches to it.
async fn handle_call<S: Operations>(state: &AppState<S>, body: &str) -> Envelope {
    let call: MethodCall = match serde_json::from_str(body) {
        Ok(call) => call,
        Err(err) => {
            return DispatchError::Malformed {
                message: format!("malformed request envelope: {err}"),
            }
            .into_envelope();
        }
    };
    counter!(API_REQUESTS_TOTAL, "method" => call.method_name.clone()).increment(1);

    if call.method_name == NEW_SESSION {
        let id = state.store.create();
        counter!(SESSIONS_CREATED_TOTAL).increment(1);
        return Envelope::ok(json!({ "sessionId": id }));
    }

    let Some(session_id) = call.session_id else {
        return DispatchError::Malformed {
            message: "method name or session id missing".into(),
        }
        .into_envelope();
    };
    let Some(session) = state.store.lookup(&session_id) else {
        return DispatchError::SessionNotFound { session_id }.into_envelope();
    };

    session
        .invoke(&call.method_name, call.data.unwrap_or(Value::Null))
        .await
}

/// Render an envelope as an HTTP response.
fn respond(envelope: Envelope) -> (StatusCode, Json<Value>) {
    let status =
        StatusCode::from_u16(envelope.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope.into_body()))
}
