//! Request-coalescing read cache
//!
//! ```text
//! get(path) ──► resolve ──► table lookup
//!                             ├─ resolved entry ──► return entry
//!                             ├─ pending entry  ──► queue waiter
//!                             └─ no entry       ──► create + spawn operation
//!
//! operation settles
//!   ├─ out of file handles ──► sleep(retry_delay), run again
//!   ├─ permanent error     ──► evict, fail waiters (FIFO), emit Set
//!   └─ data                ──► store, wake waiters (FIFO), emit Set
//! ```

use crate::cache::entry::{CacheEntry, EntryData, Joined, Outcome};
use crate::cache::events::{CacheEvent, EVENT_CAPACITY};
use crate::path::{normalize, PathResolver};
use crate::retry::retry_transient;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tracing::debug;

struct Shared {
    resolver: Arc<PathResolver>,
    entries: Mutex<FxHashMap<String, Arc<CacheEntry>>>,
    events: broadcast::Sender<CacheEvent>,
    retry_delay: Duration,
}

/// Coalesces concurrent reads per canonical path
///
/// Cloning is cheap; clones share one table.
#[derive(Clone)]
pub struct ReadCache {
    shared: Arc<Shared>,
}

impl ReadCache {
    /// Create an empty cache resolving paths through `resolver`
    pub fn new(resolver: Arc<PathResolver>, retry_delay: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                resolver,
                entries: Mutex::new(FxHashMap::default()),
                events,
                retry_delay,
            }),
        }
    }

    /// Subscribe to set/reset notifications
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.shared.events.subscribe()
    }

    /// Fetch the entry for `path`, running `op` only if no entry exists.
    ///
    /// Every caller that arrives while the operation is in flight receives the
    /// same outcome. The operation runs on its own task and is never
    /// cancelled by callers going away.
    pub(crate) async fn get<F, Fut>(&self, path: &str, op: F) -> Outcome
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = io::Result<EntryData>> + Send + 'static,
    {
        let path = self.shared.resolver.resolve_path(path);
        let (tx, rx) = oneshot::channel();

        let created = {
            let mut entries = self.shared.entries.lock();
            match entries.get(&path) {
                Some(entry) => match entry.join(tx) {
                    Joined::Ready => return Ok(Arc::clone(entry)),
                    Joined::Pending => None,
                },
                None => {
                    let entry = Arc::new(CacheEntry::pending(path.clone(), tx));
                    entries.insert(path, Arc::clone(&entry));
                    Some(entry)
                }
            }
        };

        if let Some(entry) = created {
            tokio::spawn(self.clone().drive(entry, op));
        }

        rx.await
            .unwrap_or_else(|_| Err(Arc::new(io::Error::other("cache operation abandoned"))))
    }

    async fn drive<F, Fut>(self, entry: Arc<CacheEntry>, op: F)
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = io::Result<EntryData>> + Send + 'static,
    {
        let path = entry.path().to_string();
        let result = retry_transient(self.shared.retry_delay, "cached read of", &path, || {
            op(path.clone())
        })
        .await;

        let (waiters, outcome) = match result {
            Ok(data) => (entry.resolve(data), Ok(Arc::clone(&entry))),
            Err(e) => {
                debug!("Evicting {} after failed read: {}", path, e);
                self.evict(&entry);
                (entry.take_pending(), Err(Arc::new(e)))
            }
        };

        for waiter in waiters {
            // A waiter whose caller went away is simply skipped
            let _ = waiter.send(outcome.clone());
        }
        let _ = self.shared.events.send(CacheEvent::Set(path));
    }

    fn evict(&self, entry: &Arc<CacheEntry>) {
        let mut entries = self.shared.entries.lock();
        if entries
            .get(entry.path())
            .is_some_and(|current| Arc::ptr_eq(current, entry))
        {
            entries.remove(entry.path());
        }
    }

    /// Drop the entry for `path`, or every entry when `path` is `None` or empty.
    ///
    /// The reset notification goes out before the table changes. Reads already
    /// in flight for a dropped entry still deliver to their waiters.
    pub fn reset(&self, path: Option<&str>) {
        let path = path.filter(|path| !path.is_empty()).map(normalize);
        debug!("Resetting cache for {}", path.as_deref().unwrap_or("all paths"));
        let _ = self.shared.events.send(CacheEvent::Reset(path.clone()));

        let mut entries = self.shared.entries.lock();
        match path {
            Some(path) => {
                entries.remove(&self.shared.resolver.resolve_path(&path));
            }
            None => entries.clear(),
        }
    }

    /// Live entry for `path`, resolved or not
    pub fn entry(&self, path: &str) -> Option<Arc<CacheEntry>> {
        let path = self.shared.resolver.resolve_path(path);
        self.shared.entries.lock().get(&path).cloned()
    }

    /// Check whether the table holds an entry for `path`
    pub fn contains(&self, path: &str) -> bool {
        self.entry(path).is_some()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.shared.entries.lock().len()
    }

    /// Check whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
