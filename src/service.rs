//! The file access service
//!
//! [`FileUtil`] owns one lookup root, one read cache and one filesystem
//! backend. Construct one per process (or per test); clones share state.

use crate::cache::{Artifact, ArtifactLookup, CacheEntry, CacheEvent, EntryData, ReadCache};
use crate::config::Config;
use crate::error::{FsError, FsResult};
use crate::fs::{FileStat, FileSystem};
use crate::path::PathResolver;
use crate::retry::{retry_transient, DEFAULT_RETRY_DELAY};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// File names never produced by directory expansion
pub const DEFAULT_IGNORED_NAMES: &[&str] = &["vendor"];

pub(crate) struct Inner {
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) resolver: Arc<PathResolver>,
    pub(crate) cache: ReadCache,
    pub(crate) retry_delay: Duration,
    pub(crate) ignored_names: Vec<String>,
}

/// Cached, retrying access to one filesystem
#[derive(Clone)]
pub struct FileUtil {
    pub(crate) inner: Arc<Inner>,
}

impl FileUtil {
    /// Create a service with default settings and no lookup root
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::build(
            fs,
            None,
            DEFAULT_RETRY_DELAY,
            DEFAULT_IGNORED_NAMES.iter().map(|name| name.to_string()).collect(),
        )
    }

    /// Create a service from configuration
    pub fn from_config(config: &Config, fs: Arc<dyn FileSystem>) -> Self {
        Self::build(
            fs,
            config.paths.lookup_root.as_deref(),
            config.cache.retry_delay(),
            config.expand.ignored_names.clone(),
        )
    }

    fn build(
        fs: Arc<dyn FileSystem>,
        root: Option<&str>,
        retry_delay: Duration,
        ignored_names: Vec<String>,
    ) -> Self {
        let resolver = Arc::new(PathResolver::new());
        if let Some(root) = root {
            resolver.set_lookup_path(root);
        }
        let cache = ReadCache::new(Arc::clone(&resolver), retry_delay);
        Self {
            inner: Arc::new(Inner {
                fs,
                resolver,
                cache,
                retry_delay,
                ignored_names,
            }),
        }
    }

    /// The read cache backing this service
    pub fn cache(&self) -> &ReadCache {
        &self.inner.cache
    }

    /// The filesystem backend
    pub fn backend(&self) -> &Arc<dyn FileSystem> {
        &self.inner.fs
    }

    /// Get the lookup root
    pub fn lookup_path(&self) -> Option<String> {
        self.inner.resolver.lookup_path()
    }

    /// Set the lookup root (an empty string clears it)
    pub fn set_lookup_path(&self, root: &str) {
        self.inner.resolver.set_lookup_path(root);
    }

    /// Qualify a relative path with the lookup root
    pub fn resolve_path(&self, name: &str) -> String {
        self.inner.resolver.resolve_path(name)
    }

    /// Strip the lookup root from a path
    pub fn make_relative(&self, name: &str) -> String {
        self.inner.resolver.make_relative(name)
    }

    /// Subscribe to cache set/reset notifications
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.cache.subscribe()
    }

    /// Drop the cached entry for `path`, or everything when `path` is `None`
    pub fn reset_cache(&self, path: Option<&str>) {
        self.inner.cache.reset(path);
    }

    /// Stat a path, waiting out file-handle exhaustion
    pub async fn stat(&self, path: &str) -> FsResult<FileStat> {
        self.stat_canonical(&self.resolve_path(path)).await
    }

    pub(crate) async fn stat_canonical(&self, path: &str) -> FsResult<FileStat> {
        retry_transient(self.inner.retry_delay, "stat", path, || {
            self.inner.fs.stat(path)
        })
        .await
        .map_err(|e| FsError::io("stat", path, e))
    }

    /// Read a file through the cache
    pub async fn read_file(&self, path: &str) -> FsResult<Arc<[u8]>> {
        let entry = self.cached_read(path).await?;
        file_bytes(&entry)
    }

    /// Read a file through the cache together with one named artifact
    pub async fn read_file_artifact(&self, path: &str, name: &str) -> FsResult<ArtifactLookup> {
        let entry = self.cached_read(path).await?;
        Ok(ArtifactLookup {
            data: file_bytes(&entry)?,
            artifact: entry.artifact(name),
        })
    }

    /// Attach an artifact to the cached entry for `path`.
    ///
    /// Dropped silently when `path` has no live entry.
    pub fn set_file_artifact(&self, path: &str, name: &str, artifact: Artifact) {
        self.inner.cache.set_artifact(path, name, artifact);
    }

    /// List a directory through the cache
    pub async fn read_dir(&self, path: &str) -> FsResult<Arc<[String]>> {
        let fs = Arc::clone(&self.inner.fs);
        let entry = self
            .inner
            .cache
            .get(path, move |dir| {
                let fs = Arc::clone(&fs);
                async move { fs.list(&dir).await.map(|names| EntryData::Dir(names.into())) }
            })
            .await
            .map_err(|e| FsError::shared_io("list", self.resolve_path(path), e))?;

        entry
            .data()
            .and_then(|data| data.as_listing().cloned())
            .ok_or_else(|| wrong_kind("list", &entry, "cached entry is not a directory"))
    }

    async fn cached_read(&self, path: &str) -> FsResult<Arc<CacheEntry>> {
        let fs = Arc::clone(&self.inner.fs);
        self.inner
            .cache
            .get(path, move |file| {
                let fs = Arc::clone(&fs);
                async move { fs.read(&file).await.map(|bytes| EntryData::File(bytes.into())) }
            })
            .await
            .map_err(|e| FsError::shared_io("read", self.resolve_path(path), e))
    }
}

fn file_bytes(entry: &CacheEntry) -> FsResult<Arc<[u8]>> {
    entry
        .data()
        .and_then(|data| data.as_bytes().cloned())
        .ok_or_else(|| wrong_kind("read", entry, "cached entry is not a file"))
}

fn wrong_kind(op: &'static str, entry: &CacheEntry, message: &str) -> FsError {
    FsError::io(op, entry.path(), io::Error::other(message.to_string()))
}
