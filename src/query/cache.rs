//! Keyed response cache with staleness windows and request coalescing.
//!
//! Each key holds a `watch` channel. A fetch runs as its own task and
//! publishes its result on the channel, so every caller interested in the
//! key waits on the same request. Callers that stop waiting leave the task
//! and the cache untouched.
//!
//! Settled entries are dropped once they have gone unused past the
//! retention window, so keys taken from request parameters do not pile up.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use super::{QueryError, QueryState};

#[derive(Debug, Clone)]
enum Slot<V> {
    Pending,
    Settled {
        result: Result<V, QueryError>,
        at: Instant,
    },
}

struct Entry<V> {
    rx: watch::Receiver<Slot<V>>,
    /// Last good value, served while a refresh is in flight or after it fails
    previous: Option<V>,
}

struct Store<K, V> {
    entries: HashMap<K, Entry<V>>,
    swept_at: Instant,
}

enum Seen<V> {
    Pending {
        rx: watch::Receiver<Slot<V>>,
        previous: Option<V>,
    },
    Abandoned,
    Fresh(V),
    Stale(V),
    Failed,
}

enum Lookup<V> {
    Ready(V),
    Wait(watch::Receiver<Slot<V>>),
}

const DEFAULT_RETENTION: Duration = Duration::from_secs(5 * 60);

/// In-memory cache for one endpoint.
pub struct QueryCache<K, V> {
    name: &'static str,
    stale_after: Duration,
    retention: Duration,
    store: Arc<Mutex<Store<K, V>>>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            stale_after: self.stale_after,
            retention: self.retention,
            store: Arc::clone(&self.store),
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, stale_after: Duration) -> Self {
        Self {
            name,
            stale_after,
            retention: DEFAULT_RETENTION,
            store: Arc::new(Mutex::new(Store {
                entries: HashMap::new(),
                swept_at: Instant::now(),
            })),
        }
    }

    /// Keep settled entries for `retention` after they go stale. Failed
    /// entries are kept for `retention` after they settle.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    fn lock(&self) -> MutexGuard<'_, Store<K, V>> {
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached value for `key`, fetching through `fetch` when there is none.
    ///
    /// A stale value is returned immediately and refreshed in the background.
    /// `fetch` is only called when this caller starts the request.
    pub async fn get<F, Fut>(&self, key: K, fetch: F) -> Result<V, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, QueryError>> + Send + 'static,
    {
        let rx = match self.lookup_or_start(key, fetch) {
            Lookup::Ready(value) => return Ok(value),
            Lookup::Wait(rx) => rx,
        };
        self.wait(rx).await
    }

    /// Start a fetch for `key` if one is needed, without waiting for it.
    pub fn prefetch<F, Fut>(&self, key: K, fetch: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, QueryError>> + Send + 'static,
    {
        let _ = self.lookup_or_start(key, fetch);
    }

    async fn wait(&self, mut rx: watch::Receiver<Slot<V>>) -> Result<V, QueryError> {
        let settled = rx
            .wait_for(|slot| matches!(slot, Slot::Settled { .. }))
            .await;
        let result = match settled.as_deref() {
            Ok(Slot::Settled { result, .. }) => result.clone(),
            _ => Err(QueryError::aborted(self.name)),
        };
        result
    }

    fn lookup_or_start<F, Fut>(&self, key: K, fetch: F) -> Lookup<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, QueryError>> + Send + 'static,
    {
        let mut store = self.lock();
        self.sweep(&mut store);
        let entries = &mut store.entries;

        let seen = match entries.get(&key) {
            None => Seen::Failed,
            Some(entry) => self.inspect(entry),
        };

        match seen {
            Seen::Fresh(value) => {
                debug!(cache = self.name, key = ?key, "cache hit");
                Lookup::Ready(value)
            }
            Seen::Stale(value) => {
                debug!(cache = self.name, key = ?key, "stale, refreshing in background");
                let rx = self.start(key.clone(), fetch);
                entries.insert(
                    key,
                    Entry {
                        rx,
                        previous: Some(value.clone()),
                    },
                );
                Lookup::Ready(value)
            }
            Seen::Pending {
                previous: Some(previous),
                ..
            } => Lookup::Ready(previous),
            Seen::Pending { rx, previous: None } => {
                debug!(cache = self.name, key = ?key, "joining in-flight request");
                Lookup::Wait(rx)
            }
            Seen::Abandoned | Seen::Failed => {
                Lookup::Wait(self.start_entry(entries, key, fetch))
            }
        }
    }

    fn inspect(&self, entry: &Entry<V>) -> Seen<V> {
        let pending = match &*entry.rx.borrow() {
            Slot::Pending => true,
            Slot::Settled { result: Ok(v), at } if at.elapsed() < self.stale_after => {
                return Seen::Fresh(v.clone())
            }
            Slot::Settled { result: Ok(v), .. } => return Seen::Stale(v.clone()),
            Slot::Settled { result: Err(_), .. } => false,
        };
        if !pending {
            // A failed refresh keeps serving the last good value.
            return match &entry.previous {
                Some(previous) => Seen::Stale(previous.clone()),
                None => Seen::Failed,
            };
        }
        // A pending slot whose task is gone will never settle.
        if entry.rx.has_changed().is_err() {
            return Seen::Abandoned;
        }
        Seen::Pending {
            rx: entry.rx.clone(),
            previous: entry.previous.clone(),
        }
    }

    /// Drop settled entries past the retention window, at most once per
    /// window.
    fn sweep(&self, store: &mut Store<K, V>) {
        if store.swept_at.elapsed() < self.retention {
            return;
        }
        store.swept_at = Instant::now();

        let before = store.entries.len();
        let (stale_after, retention) = (self.stale_after, self.retention);
        store.entries.retain(|_, entry| {
            let idle_since = match &*entry.rx.borrow() {
                Slot::Pending => None,
                Slot::Settled { result: Ok(_), at } => Some(*at + stale_after),
                Slot::Settled { result: Err(_), at } => Some(*at),
            };
            match idle_since {
                Some(since) => Instant::now().saturating_duration_since(since) < retention,
                None => entry.rx.has_changed().is_ok(),
            }
        });

        let evicted = before - store.entries.len();
        if evicted > 0 {
            debug!(cache = self.name, evicted, "evicted idle entries");
        }
    }

    fn start_entry<F, Fut>(
        &self,
        entries: &mut HashMap<K, Entry<V>>,
        key: K,
        fetch: F,
    ) -> watch::Receiver<Slot<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, QueryError>> + Send + 'static,
    {
        let rx = self.start(key.clone(), fetch);
        entries.insert(
            key,
            Entry {
                rx: rx.clone(),
                previous: None,
            },
        );
        rx
    }

    fn start<F, Fut>(&self, key: K, fetch: F) -> watch::Receiver<Slot<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, QueryError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(Slot::Pending);
        let name = self.name;
        let request = fetch();
        tokio::spawn(async move {
            let result = request.await;
            if let Err(e) = &result {
                debug!(cache = name, key = ?key, "fetch failed: {}", e);
            }
            tx.send_replace(Slot::Settled {
                result,
                at: Instant::now(),
            });
        });
        rx
    }

    /// Current state for `key` without fetching.
    pub fn peek(&self, key: &K) -> QueryState<V> {
        let store = self.lock();
        let Some(entry) = store.entries.get(key) else {
            return QueryState::Idle;
        };
        let state = match &*entry.rx.borrow() {
            Slot::Pending => match &entry.previous {
                Some(previous) => QueryState::Success(previous.clone()),
                None => QueryState::Loading,
            },
            Slot::Settled { result: Ok(v), .. } => QueryState::Success(v.clone()),
            Slot::Settled { result: Err(e), .. } => match &entry.previous {
                Some(previous) => QueryState::Success(previous.clone()),
                None => QueryState::Error(e.clone()),
            },
        };
        state
    }

    /// Drop `key`; the next request fetches again. In-flight waiters still
    /// receive their result.
    pub fn invalidate(&self, key: &K) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
