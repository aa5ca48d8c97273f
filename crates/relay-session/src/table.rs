//! Per-session-type operation tables.
//!
//! Each concrete session type declares its callable operations in an explicit
//! table built at registration time; dispatch resolves names against this
//! table and nothing else. New session types add their own table without
//! touching the dispatch path.

use std::collections::HashMap;

use serde_json::Value;

/// Fault raised by an operation handler. Maps to a 500 envelope.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct OperationError {
    /// Diagnostic description.
    pub message: String,
}

impl OperationError {
    /// Build an error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An operation handler: structured value in, structured value out.
pub type OperationFn<S> = fn(&mut S, Value) -> Result<Value, OperationError>;

/// Contract a concrete session type implements to become dispatchable.
pub trait Operations: Send + Sized + 'static {
    /// Declare the operations this type exposes.
    fn table() -> OperationTable<Self>;
}

/// Mapping from operation names to handlers for one session type.
pub struct OperationTable<S> {
    handlers: HashMap<&'static str, OperationFn<S>>,
}

impl<S> OperationTable<S> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for an operation name.
    pub fn register(&mut self, name: &'static str, handler: OperationFn<S>) {
        let _ = self.handlers.insert(name, handler);
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, name: &'static str, handler: OperationFn<S>) -> Self {
        self.register(name, handler);
        self
    }

    /// Look up the handler for an operation name.
    pub fn resolve(&self, name: &str) -> Option<OperationFn<S>> {
        self.handlers.get(name).copied()
    }

    /// Check whether an operation is declared.
    pub fn has_operation(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// List all declared operation names (sorted).
    pub fn operations(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of declared operations.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the table declares nothing.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<S> Default for OperationTable<S> {
    fn default() -> Self {
        Self::new()
    }
}
