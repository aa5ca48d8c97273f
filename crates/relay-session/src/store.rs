//! Concurrent session store with sweep-based eviction.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use relay_core::ids::SessionId;

use crate::session::Session;
use crate::table::{OperationTable, Operations};

/// Process-wide mapping from session id to session, shared across all
/// request workers and the eviction sweep.
///
/// The factory closure produces default-initialized subtype state; it is the
/// configured "concrete session type to instantiate per new session". The
/// operation table is built once and shared by every session of the type.
pub struct SessionStore<S> {
    sessions: DashMap<SessionId, Arc<Session<S>>>,
    table: Arc<OperationTable<S>>,
    factory: Box<dyn Fn() -> S + Send + Sync>,
}

impl<S: Operations> SessionStore<S> {
    /// Create an empty store for the session type produced by `factory`.
    pub fn new(factory: impl Fn() -> S + Send + Sync + 'static) -> Self {
        Self {
            sessions: DashMap::new(),
            table: Arc::new(S::table()),
            factory: Box::new(factory),
        }
    }

    /// Create a new session and return its identifier.
    ///
    /// Ids carry enough entropy that duplicates are treated as practically
    /// impossible; the insert is atomic per shard.
    pub fn create(&self) -> SessionId {
        let id = SessionId::new();
        let session = Arc::new(Session::new(id.clone(), (self.factory)(), self.table.clone()));
        let _ = self.sessions.insert(id.clone(), session);
        debug!(session_id = %id, "session created");
        id
    }

    /// Look up a session by id. `None` is an expected outcome for expired or
    /// never-existed ids, not an error.
    pub fn lookup(&self, id: &str) -> Option<Arc<Session<S>>> {
        self.sessions
            .get(&SessionId::from(id))
            .map(|entry| entry.value().clone())
    }

    /// Remove a session explicitly. Returns whether it was present.
    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(&SessionId::from(id)).is_some()
    }

    /// Evict every session idle strictly longer than `max_inactive` as of
    /// `now`. Returns how many were removed.
    ///
    /// Runs shard by shard and is safe against concurrent create/lookup;
    /// a session's timestamp refresh never blocks eviction of other entries.
    pub fn sweep(&self, now: Instant, max_inactive: Duration) -> usize {
        let mut evicted = 0;
        self.sessions.retain(|id, session| {
            if session.idle_for(now) > max_inactive {
                evicted += 1;
                debug!(session_id = %id, "session evicted");
                false
            } else {
                true
            }
        });
        evicted
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::OperationError;
    use serde_json::{Value, json};
    use std::collections::HashSet;

    #[derive(Default)]
    struct Scratch {
        notes: Vec<String>,
    }

    impl Scratch {
        fn note(&mut self, input: Value) -> Result<Value, OperationError> {
            let text = input
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default();
            self.notes.push(text.to_owned());
            Ok(json!({ "count": self.notes.len() }))
        }
    }

    impl Operations for Scratch {
        fn table() -> OperationTable<Self> {
            OperationTable::new().with("note", Scratch::note)
        }
    }

    fn make_store() -> SessionStore<Scratch> {
        SessionStore::new(Scratch::default)
    }

    #[test]
    fn create_returns_distinct_ids() {
        let store = make_store();
        let mut seen = HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(store.create()));
        }
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn create_then_lookup() {
        let store = make_store();
        let id = store.create();
        let session = store.lookup(id.as_str()).unwrap();
        assert_eq!(session.id(), &id);
    }

    #[test]
    fn lookup_unknown_is_none() {
        let store = make_store();
        assert!(store.lookup("bogus").is_none());
    }

    #[test]
    fn remove_session() {
        let store = make_store();
        let id = store.create();
        assert!(store.remove(id.as_str()));
        assert!(store.lookup(id.as_str()).is_none());
        assert!(!store.remove(id.as_str()));
    }

    #[test]
    fn sweep_with_zero_threshold_evicts_fresh_session() {
        let store = make_store();
        let id = store.create();
        std::thread::sleep(Duration::from_millis(2));
        let evicted = store.sweep(Instant::now(), Duration::ZERO);
        assert_eq!(evicted, 1);
        assert!(store.lookup(id.as_str()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn sweep_removes_exactly_the_stale_entries() {
        let store = make_store();
        let stale_a = store.create();
        let stale_b = store.create();
        std::thread::sleep(Duration::from_millis(20));
        let fresh = store.create();

        let evicted = store.sweep(Instant::now(), Duration::from_millis(10));
        assert_eq!(evicted, 2);
        assert!(store.lookup(stale_a.as_str()).is_none());
        assert!(store.lookup(stale_b.as_str()).is_none());
        assert!(store.lookup(fresh.as_str()).is_some());
    }

    #[test]
    fn sweep_leaves_active_sessions_untouched() {
        let store = make_store();
        let id = store.create();
        let evicted = store.sweep(Instant::now(), Duration::from_secs(3600));
        assert_eq!(evicted, 0);
        assert!(store.lookup(id.as_str()).is_some());
    }

    #[tokio::test]
    async fn invocation_refreshes_and_defers_eviction() {
        let store = make_store();
        let id = store.create();
        std::thread::sleep(Duration::from_millis(20));

        // A successful invoke resets the idle clock.
        let session = store.lookup(id.as_str()).unwrap();
        let env = session.invoke("note", json!({"text": "hi"})).await;
        assert!(env.is_success());

        let evicted = store.sweep(Instant::now(), Duration::from_millis(10));
        assert_eq!(evicted, 0);
        assert!(store.lookup(id.as_str()).is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_are_all_retained() {
        let store = Arc::new(make_store());
        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.create() }));
        }
        let mut ids = HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }
        assert_eq!(store.len(), 50);
        for id in &ids {
            assert!(store.lookup(id.as_str()).is_some());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sweep_is_safe_under_concurrent_lookups() {
        let store = Arc::new(make_store());
        let id = store.create();

        let reader = {
            let store = store.clone();
            let id = id.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let _ = store.lookup(id.as_str());
                    tokio::task::yield_now().await;
                }
            })
        };
        let sweeper = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let _ = store.sweep(Instant::now(), Duration::from_secs(3600));
                    tokio::task::yield_now().await;
                }
            })
        };

        reader.await.unwrap();
        sweeper.await.unwrap();
        assert!(store.lookup(id.as_str()).is_some());
    }

    #[test]
    fn per_session_state_is_owned_exclusively() {
        let store = make_store();
        let a = store.create();
        let b = store.create();

        // Mutating one session's state must not leak into another.
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let sa = store.lookup(a.as_str()).unwrap();
            let env = sa.invoke("note", json!({"text": "only-a"})).await;
            assert_eq!(env.into_body()["count"], 1);

            let sb = store.lookup(b.as_str()).unwrap();
            let env = sb.invoke("note", json!({"text": "only-b"})).await;
            assert_eq!(env.into_body()["count"], 1);
        });
    }
}
