//! JSON request/response envelope.
//!
//! Every API call carries a [`MethodCall`] in and produces an [`Envelope`] out.
//! On the wire a success is the operation's payload object verbatim; a failure
//! is `{"error": "...", "resetSession": true?}` plus an HTTP status code.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Reserved method name that creates a session instead of dispatching to one.
pub const NEW_SESSION: &str = "newSession";

/// Status codes used by the dispatch layer.
pub mod status {
    /// Request succeeded.
    pub const OK: u16 = 200;
    /// Malformed envelope or unknown operation on a session.
    pub const BAD_REQUEST: u16 = 400;
    /// Unknown session id.
    pub const NOT_FOUND: u16 = 404;
    /// Admission rejected (concurrency cap reached).
    pub const TOO_MANY_REQUESTS: u16 = 429;
    /// Operation execution fault.
    pub const INTERNAL: u16 = 500;
}

/// Incoming request envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCall {
    /// Operation to invoke (e.g. `login`), or [`NEW_SESSION`].
    pub method_name: String,
    /// Session the operation targets. Absent for [`NEW_SESSION`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Structured input handed to the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Outcome of one dispatched request, immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Envelope {
    /// The operation succeeded; `payload` goes out verbatim.
    Success {
        /// Structured result produced by the operation.
        payload: Value,
    },
    /// The request failed somewhere along the dispatch path.
    Failure {
        /// HTTP-ish status code (one of [`status`]).
        status: u16,
        /// Human-readable description.
        message: String,
        /// Whether the client should discard its session id.
        reset_session: bool,
    },
}

impl Envelope {
    /// Build a success envelope.
    pub fn ok(payload: Value) -> Self {
        Self::Success { payload }
    }

    /// Build a failure envelope.
    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self::Failure {
            status,
            message: message.into(),
            reset_session: false,
        }
    }

    /// Build a failure envelope instructing the client to drop its session id.
    pub fn failure_with_reset(status: u16, message: impl Into<String>) -> Self {
        Self::Failure {
            status,
            message: message.into(),
            reset_session: true,
        }
    }

    /// Status code to send with this envelope.
    pub fn status(&self) -> u16 {
        match self {
            Self::Success { .. } => status::OK,
            Self::Failure { status, .. } => *status,
        }
    }

    /// Whether this envelope carries a payload.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Whether the client should discard its session id.
    pub fn reset_session(&self) -> bool {
        match self {
            Self::Success { .. } => false,
            Self::Failure { reset_session, .. } => *reset_session,
        }
    }

    /// Render the wire body.
    pub fn into_body(self) -> Value {
        match self {
            Self::Success { payload } => payload,
            Self::Failure {
                message,
                reset_session,
                ..
            } => {
                let mut body = json!({ "error": message });
                if reset_session {
                    body["resetSession"] = Value::Bool(true);
                }
                body
            }
        }
    }
}
