//! In-memory filesystem backend
//!
//! Holds a tree of files and directories keyed by their full path string.
//! Every operation is counted per path, failures can be queued for a specific
//! operation and path, and an optional latency makes each call yield to the
//! scheduler before completing.

use crate::fs::{exhausted_error, FileStat, FileSystem};
use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::time::Duration;

/// Filesystem operations, used to key call counters and injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsOp {
    Read,
    List,
    Stat,
    Write,
    Mkdir,
}

/// A failure queued for one call of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedError {
    /// Out of file handles (transient)
    Exhausted,
    /// Any other error kind
    Kind(io::ErrorKind),
}

impl InjectedError {
    fn to_io(self) -> io::Error {
        match self {
            Self::Exhausted => exhausted_error(),
            Self::Kind(kind) => io::Error::from(kind),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    failures: FxHashMap<(FsOp, String), VecDeque<InjectedError>>,
    calls: FxHashMap<(FsOp, String), usize>,
}

impl State {
    fn is_dir(&self, path: &str) -> bool {
        is_implicit_root(path) || self.dirs.contains(path)
    }

    fn exists(&self, path: &str) -> bool {
        self.is_dir(path) || self.files.contains_key(path)
    }

    fn parent_exists(&self, path: &str) -> bool {
        parent_of(path).is_none_or(|parent| self.is_dir(parent))
    }

    fn add_dir_all(&mut self, path: &str) {
        let mut current = Some(path);
        while let Some(dir) = current {
            if is_implicit_root(dir) || !self.dirs.insert(dir.to_string()) {
                break;
            }
            current = parent_of(dir);
        }
    }
}

/// In-memory [`FileSystem`] implementation
#[derive(Debug, Default)]
pub struct MemoryFs {
    state: Mutex<State>,
    latency: Option<Duration>,
}

impl MemoryFs {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation wait `latency` before completing
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Add a file, creating any missing parent directories
    pub fn insert_file(&self, path: &str, data: impl Into<Vec<u8>>) {
        let path = trim(path);
        let mut state = self.state.lock();
        if let Some(parent) = parent_of(path) {
            state.add_dir_all(parent);
        }
        state.files.insert(path.to_string(), data.into());
    }

    /// Add a directory and any missing parents
    pub fn insert_dir(&self, path: &str) {
        self.state.lock().add_dir_all(trim(path));
    }

    /// Current contents of a file
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().files.get(trim(path)).cloned()
    }

    /// Whether a directory exists
    pub fn has_dir(&self, path: &str) -> bool {
        self.state.lock().is_dir(trim(path))
    }

    /// Queue a failure for the next call of `op` on `path`
    ///
    /// Queued failures are consumed in order, one per call.
    pub fn inject(&self, op: FsOp, path: &str, error: InjectedError) {
        self.state
            .lock()
            .failures
            .entry((op, trim(path).to_string()))
            .or_default()
            .push_back(error);
    }

    /// Number of times `op` was called on `path`
    pub fn calls(&self, op: FsOp, path: &str) -> usize {
        self.state
            .lock()
            .calls
            .get(&(op, trim(path).to_string()))
            .copied()
            .unwrap_or(0)
    }

    async fn enter(&self, op: FsOp, path: &str) -> io::Result<()> {
        let injected = {
            let mut state = self.state.lock();
            let key = (op, path.to_string());
            *state.calls.entry(key.clone()).or_insert(0) += 1;
            state.failures.get_mut(&key).and_then(VecDeque::pop_front)
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match injected {
            Some(error) => Err(error.to_io()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let path = trim(path);
        self.enter(FsOp::Read, path).await?;

        let state = self.state.lock();
        if state.is_dir(path) {
            return Err(io::Error::other(format!("{} is a directory", path)));
        }
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    async fn list(&self, path: &str) -> io::Result<Vec<String>> {
        let path = trim(path);
        self.enter(FsOp::List, path).await?;

        let state = self.state.lock();
        if !state.is_dir(path) {
            return Err(if state.files.contains_key(path) {
                io::Error::other(format!("{} is not a directory", path))
            } else {
                io::Error::from(io::ErrorKind::NotFound)
            });
        }

        let names = state
            .dirs
            .iter()
            .chain(state.files.keys())
            .filter(|child| parent_of(child) == Some(path))
            .filter_map(|child| child.rsplit('/').next())
            .map(str::to_string)
            .collect();
        Ok(names)
    }

    async fn stat(&self, path: &str) -> io::Result<FileStat> {
        let path = trim(path);
        self.enter(FsOp::Stat, path).await?;

        let state = self.state.lock();
        if state.is_dir(path) {
            return Ok(FileStat::dir());
        }
        state
            .files
            .get(path)
            .map(|data| FileStat::file(data.len() as u64))
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    async fn write(&self, path: &str, data: &[u8]) -> io::Result<()> {
        let path = trim(path);
        self.enter(FsOp::Write, path).await?;

        let mut state = self.state.lock();
        if state.is_dir(path) {
            return Err(io::Error::other(format!("{} is a directory", path)));
        }
        if !state.parent_exists(path) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        state.files.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    async fn mkdir(&self, path: &str) -> io::Result<()> {
        let path = trim(path);
        self.enter(FsOp::Mkdir, path).await?;

        let mut state = self.state.lock();
        if state.exists(path) {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists));
        }
        if !state.parent_exists(path) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        state.dirs.insert(path.to_string());
        Ok(())
    }
}

fn trim(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" if path.starts_with('/') => "/",
        trimmed => trimmed,
    }
}

fn is_implicit_root(path: &str) -> bool {
    matches!(path, "/" | "" | ".")
}

fn parent_of(path: &str) -> Option<&str> {
    match path.rfind('/') {
        Some(0) if path.len() > 1 => Some("/"),
        Some(0) | None => None,
        Some(idx) => Some(&path[..idx]),
    }
}
