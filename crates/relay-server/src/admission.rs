//! Bounded request admission.
//!
//! A fixed-capacity permit pool gates every inbound request. `try_admit` is
//! non-blocking: when no permit is free the request is rejected immediately
//! with 429 instead of queueing. This is explicit backpressure, not an error
//! the server retries internally.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting permit pool with capacity fixed at startup.
pub struct AdmissionController {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionController {
    /// Create a pool with `capacity` concurrent permits.
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Try to take a permit without waiting.
    ///
    /// Returns `None` when the pool is exhausted. The permit is released
    /// when the returned guard drops, so every exit path of an admitted
    /// request gives its slot back exactly once.
    pub fn try_admit(&self) -> Option<AdmissionPermit> {
        self.permits
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| AdmissionPermit { _permit: permit })
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// Guard held for the duration of one admitted request.
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}
