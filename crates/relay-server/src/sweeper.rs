//! Periodic eviction of inactive sessions.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, gauge};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use relay_session::store::SessionStore;
use relay_session::table::Operations;

use crate::metrics::{SESSIONS_ACTIVE, SESSIONS_EVICTED_TOTAL};

/// Run the eviction sweep on a fixed period until cancelled.
///
/// Each tick removes every session idle longer than `max_inactive`,
/// independent of request traffic. The first tick fires immediately.
pub async fn run_sweeper<S: Operations>(
    store: Arc<SessionStore<S>>,
    period: Duration,
    max_inactive: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let evicted = store.sweep(Instant::now(), max_inactive);
                #[allow(clippy::cast_precision_loss)]
                gauge!(SESSIONS_ACTIVE).set(store.len() as f64);
                if evicted > 0 {
                    counter!(SESSIONS_EVICTED_TOTAL).increment(evicted as u64);
                    debug!(evicted, remaining = store.len(), "inactive sessions evicted");
                }
            }
            () = cancel.cancelled() => return,
        }
    }
}
