//! Dispatch error taxonomy and its envelope mapping.

use crate::envelope::{Envelope, status};

/// Errors produced along the request dispatch path.
///
/// Each variant maps to exactly one status code; only [`SessionNotFound`]
/// instructs the client to discard its session id.
///
/// [`SessionNotFound`]: DispatchError::SessionNotFound
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The request envelope could not be decoded or is missing fields.
    #[error("{message}")]
    Malformed {
        /// What is wrong with the envelope.
        message: String,
    },

    /// The session's type declares no operation with this name.
    #[error("method '{method}' not found")]
    MethodNotFound {
        /// The operation name that failed to resolve.
        method: String,
    },

    /// No session with this id exists (expired or never created).
    #[error("session '{session_id}' does not exist")]
    SessionNotFound {
        /// The stale or bogus session id.
        session_id: String,
    },

    /// The admission controller has no free permit.
    #[error("too many concurrent requests")]
    Rejected,

    /// An operation failed or panicked while executing.
    #[error("{message}")]
    Internal {
        /// Diagnostic description of the fault.
        message: String,
    },
}

impl DispatchError {
    /// Status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::Malformed { .. } | Self::MethodNotFound { .. } => status::BAD_REQUEST,
            Self::SessionNotFound { .. } => status::NOT_FOUND,
            Self::Rejected => status::TOO_MANY_REQUESTS,
            Self::Internal { .. } => status::INTERNAL,
        }
    }

    /// Whether the client should discard its session id.
    pub fn resets_session(&self) -> bool {
        matches!(self, Self::SessionNotFound { .. })
    }

    /// Convert into the wire-format failure envelope.
    pub fn into_envelope(self) -> Envelope {
        let status = self.status();
        if self.resets_session() {
            Envelope::failure_with_reset(status, self.to_string())
        } else {
            Envelope::failure(status, self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_is_bad_request() {
        let err = DispatchError::Malformed {
            message: "method name or session id missing".into(),
        };
        assert_eq!(err.status(), 400);
        assert!(!err.resets_session());
    }

    #[test]
    fn method_not_found_names_the_method() {
        let err = DispatchError::MethodNotFound {
            method: "doesNotExist".into(),
        };
        assert_eq!(err.status(), 400);
        assert!(err.to_string().contains("doesNotExist"));
    }

    #[test]
    fn session_not_found_resets() {
        let err = DispatchError::SessionNotFound {
            session_id: "bogus".into(),
        };
        assert_eq!(err.status(), 404);
        assert!(err.resets_session());
        let env = err.into_envelope();
        assert!(env.reset_session());
        assert_eq!(env.status(), 404);
    }

    #[test]
    fn rejected_is_429() {
        let err = DispatchError::Rejected;
        assert_eq!(err.status(), 429);
        assert_eq!(err.into_envelope().status(), 429);
    }

    #[test]
    fn internal_is_500_with_diagnostic() {
        let err = DispatchError::Internal {
            message: "error invoking echo: boom".into(),
        };
        assert_eq!(err.status(), 500);
        let body = err.into_envelope().into_body();
        assert!(body["error"].as_str().unwrap().contains("boom"));
    }

    #[test]
    fn only_session_not_found_resets() {
        let errors = [
            DispatchError::Malformed { message: "m".into() },
            DispatchError::MethodNotFound { method: "m".into() },
            DispatchError::Rejected,
            DispatchError::Internal { message: "m".into() },
        ];
        for err in errors {
            assert!(!err.resets_session(), "{err} should not reset");
        }
    }
}
