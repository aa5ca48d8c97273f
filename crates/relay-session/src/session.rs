//! The per-client session container.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::Mutex;

use relay_core::ids::SessionId;

use crate::table::{OperationTable, Operations};

/// One client's server-side state, reachable by its opaque id.
///
/// Subtype state lives behind a per-session mutex: invocations on the same
/// session serialize, invocations on different sessions proceed independently.
/// The last-activity timestamp is kept outside that mutex so the eviction
/// sweep never contends with a running operation.
pub struct Session<S> {
    pub(crate) id: SessionId,
    pub(crate) state: Mutex<S>,
    pub(crate) table: Arc<OperationTable<S>>,
    last_activity: RwLock<Instant>,
}

impl<S: Operations> Session<S> {
    /// Wrap freshly constructed subtype state.
    pub fn new(id: SessionId, state: S, table: Arc<OperationTable<S>>) -> Self {
        Self {
            id,
            state: Mutex::new(state),
            table,
            last_activity: RwLock::new(Instant::now()),
        }
    }

    /// The session's immutable identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// When the session last completed a successful invocation.
    pub fn last_activity(&self) -> Instant {
        *self.last_activity.read()
    }

    /// How long the session has been idle as of `now`.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_activity.read())
    }

    /// Refresh the last-activity timestamp. The timestamp never moves
    /// backwards.
    pub(crate) fn touch(&self) {
        let now = Instant::now();
        let mut last = self.last_activity.write();
        *last = (*last).max(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::OperationError;
    use serde_json::{Value, json};

    struct Echo;

    impl Echo {
        fn echo(&mut self, input: Value) -> Result<Value, OperationError> {
            Ok(input)
        }
    }

    impl Operations for Echo {
        fn table() -> OperationTable<Self> {
            OperationTable::new().with("echo", Echo::echo)
        }
    }

    fn make_session() -> Session<Echo> {
        Session::new(SessionId::new(), Echo, Arc::new(Echo::table()))
    }

    #[test]
    fn id_is_stable() {
        let session = make_session();
        let id = session.id().clone();
        assert_eq!(session.id(), &id);
    }

    #[test]
    fn fresh_session_is_barely_idle() {
        let session = make_session();
        assert!(session.idle_for(Instant::now()) < Duration::from_secs(1));
    }

    #[test]
    fn touch_advances_last_activity() {
        let session = make_session();
        let before = session.last_activity();
        std::thread::sleep(Duration::from_millis(5));
        session.touch();
        assert!(session.last_activity() > before);
    }

    #[test]
    fn touch_never_moves_backwards() {
        let session = make_session();
        session.touch();
        let after_first = session.last_activity();
        session.touch();
        assert!(session.last_activity() >= after_first);
    }

    #[test]
    fn idle_for_grows_with_now() {
        let session = make_session();
        let now = Instant::now();
        let later = now + Duration::from_secs(10);
        assert!(session.idle_for(later) > session.idle_for(now));
    }

    #[test]
    fn idle_for_saturates_at_zero() {
        let session = make_session();
        session.touch();
        // A `now` taken before the last touch must not underflow.
        let past = Instant::now()
            .checked_sub(Duration::from_secs(60))
            .unwrap();
        assert_eq!(session.idle_for(past), Duration::ZERO);
    }

    #[tokio::test]
    async fn state_is_reachable_under_lock() {
        let session = make_session();
        let mut guard = session.state.lock().await;
        let out = guard.echo(json!({"k": "v"})).unwrap();
        assert_eq!(out["k"], "v");
    }
}
