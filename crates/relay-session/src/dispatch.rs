//! Name-to-operation dispatch.
//!
//! Resolves an operation name against the session type's table and invokes
//! the handler under the session's mutex. Every failure mode becomes an
//! error envelope here; nothing below this boundary may take down the worker.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::Value;
use tracing::{error, warn};

use relay_core::envelope::Envelope;
use relay_core::errors::DispatchError;

use crate::session::Session;
use crate::table::Operations;

impl<S: Operations> Session<S> {
    /// Invoke a named operation with structured input.
    ///
    /// Unknown names produce a 400 envelope naming the operation. Handler
    /// errors and panics produce a 500 envelope with a diagnostic; the fault
    /// is contained to this one request. On success the last-activity
    /// timestamp is refreshed before the payload is returned.
    pub async fn invoke(&self, operation: &str, input: Value) -> Envelope {
        let Some(handler) = self.table.resolve(operation) else {
            warn!(session_id = %self.id, operation, "unknown operation");
            return DispatchError::MethodNotFound {
                method: operation.to_owned(),
            }
            .into_envelope();
        };

        let mut state = self.state.lock().await;
        let outcome = catch_unwind(AssertUnwindSafe(|| handler(&mut state, input)));
        drop(state);

        match outcome {
            Ok(Ok(payload)) => {
                self.touch();
                Envelope::ok(payload)
            }
            Ok(Err(err)) => {
                error!(session_id = %self.id, operation, error = %err, "operation failed");
                DispatchError::Internal {
                    message: format!("error invoking {operation}: {err}"),
                }
                .into_envelope()
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(session_id = %self.id, operation, panic = %message, "operation panicked");
                DispatchError::Internal {
                    message: format!("error invoking {operation}: {message}"),
                }
                .into_envelope()
            }
        }
    }
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "operation panicked".to_owned()
    }
}
