//! Per-path cache entries

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::fmt;
use std::io;
use std::sync::Arc;
use tokio::sync::oneshot;

/// A derived value attached to a cache entry (e.g. a compiled template)
pub type Artifact = Arc<dyn Any + Send + Sync>;

/// What a waiter receives once the entry's operation settles
pub(crate) type Outcome = Result<Arc<CacheEntry>, Arc<io::Error>>;

pub(crate) type Waiter = oneshot::Sender<Outcome>;

/// Resolved contents of a cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryData {
    /// Raw file bytes
    File(Arc<[u8]>),
    /// Directory entry names, in backend order
    Dir(Arc<[String]>),
}

impl EntryData {
    /// File bytes, if this entry holds a file
    pub fn as_bytes(&self) -> Option<&Arc<[u8]>> {
        match self {
            Self::File(bytes) => Some(bytes),
            Self::Dir(_) => None,
        }
    }

    /// Directory listing, if this entry holds one
    pub fn as_listing(&self) -> Option<&Arc<[String]>> {
        match self {
            Self::Dir(names) => Some(names),
            Self::File(_) => None,
        }
    }
}

/// Result of registering interest in an entry
pub(crate) enum Joined {
    /// Data is already present
    Ready,
    /// The waiter was queued behind the in-flight operation
    Pending,
}

struct EntryState {
    pending: Vec<Waiter>,
    data: Option<EntryData>,
    artifacts: FxHashMap<String, Artifact>,
}

/// One canonical path's cached read, its waiters and its artifacts
pub struct CacheEntry {
    path: String,
    state: Mutex<EntryState>,
}

impl CacheEntry {
    pub(crate) fn pending(path: String, first: Waiter) -> Self {
        Self {
            path,
            state: Mutex::new(EntryState {
                pending: vec![first],
                data: None,
                artifacts: FxHashMap::default(),
            }),
        }
    }

    /// Canonical path of this entry
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolved data, if the operation has completed
    pub fn data(&self) -> Option<EntryData> {
        self.state.lock().data.clone()
    }

    /// Look up a named artifact
    pub fn artifact(&self, name: &str) -> Option<Artifact> {
        self.state.lock().artifacts.get(name).cloned()
    }

    /// Attach or replace a named artifact
    pub fn set_artifact(&self, name: &str, value: Artifact) {
        self.state.lock().artifacts.insert(name.to_string(), value);
    }

    pub(crate) fn join(&self, waiter: Waiter) -> Joined {
        let mut state = self.state.lock();
        if state.data.is_some() {
            Joined::Ready
        } else {
            state.pending.push(waiter);
            Joined::Pending
        }
    }

    /// Store the data and hand back the waiters in registration order
    pub(crate) fn resolve(&self, data: EntryData) -> Vec<Waiter> {
        let mut state = self.state.lock();
        state.data = Some(data);
        std::mem::take(&mut state.pending)
    }

    pub(crate) fn take_pending(&self) -> Vec<Waiter> {
        std::mem::take(&mut self.state.lock().pending)
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        let mut artifacts: Vec<&str> = state.artifacts.keys().map(String::as_str).collect();
        artifacts.sort_unstable();
        f.debug_struct("CacheEntry")
            .field("path", &self.path)
            .field("resolved", &state.data.is_some())
            .field("pending", &state.pending.len())
            .field("artifacts", &artifacts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_queues_until_resolved() {
        let (first, _rx1) = oneshot::channel();
        let entry = CacheEntry::pending("/a".to_string(), first);

        let (second, _rx2) = oneshot::channel();
        assert!(matches!(entry.join(second), Joined::Pending));

        let waiters = entry.resolve(EntryData::File(Arc::from(&b"x"[..])));
        assert_eq!(waiters.len(), 2);

        let (third, _rx3) = oneshot::channel();
        assert!(matches!(entry.join(third), Joined::Ready));
        assert_eq!(entry.data().unwrap().as_bytes().unwrap().as_ref(), b"x");
    }

    #[test]
    fn artifacts_replace_by_name() {
        let (first, _rx) = oneshot::channel();
        let entry = CacheEntry::pending("/a".to_string(), first);
        assert!(entry.artifact("template").is_none());

        entry.set_artifact("template", Arc::new(1u32));
        entry.set_artifact("template", Arc::new(2u32));

        let value = entry.artifact("template").unwrap().downcast::<u32>().unwrap();
        assert_eq!(*value, 2);
        assert!(format!("{:?}", entry).contains("template"));
    }
}
