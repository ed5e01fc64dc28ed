//! Filesystem collaborator abstraction
//!
//! Provides a trait for the raw filesystem operations the service builds on,
//! implemented by different backends:
//! - [`TokioFs`]: the real disk through `tokio::fs`
//! - [`MemoryFs`]: an in-memory tree for tests and virtual content

mod disk;
mod memory;

pub use disk::TokioFs;
pub use memory::{FsOp, InjectedError, MemoryFs};

use async_trait::async_trait;
use std::io;

/// Metadata returned by [`FileSystem::stat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Whether the path is a directory
    pub is_dir: bool,
    /// Size in bytes (0 for directories on some backends)
    pub len: u64,
}

impl FileStat {
    /// Metadata for a regular file of the given size
    pub fn file(len: u64) -> Self {
        Self { is_dir: false, len }
    }

    /// Metadata for a directory
    pub fn dir() -> Self {
        Self { is_dir: true, len: 0 }
    }
}

/// Abstract filesystem interface
///
/// Paths are passed exactly as the service resolved them. Implementations
/// report failures as plain `io::Error`s; callers classify them with
/// [`ErrorClass::of`].
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read the full contents of a file
    async fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    /// List the entry names of a directory
    async fn list(&self, path: &str) -> io::Result<Vec<String>>;

    /// Stat a path
    async fn stat(&self, path: &str) -> io::Result<FileStat>;

    /// Write a file, replacing any previous contents
    async fn write(&self, path: &str, data: &[u8]) -> io::Result<()>;

    /// Create a single directory (the parent must exist)
    async fn mkdir(&self, path: &str) -> io::Result<()>;
}

/// How the service treats a filesystem failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The path does not exist
    NotFound,
    /// Temporarily out of file handles; retried after a delay
    ResourceExhausted,
    /// The path already exists
    AlreadyExists,
    /// Anything else; permanent
    Other,
}

impl ErrorClass {
    /// Classify an IO error
    pub fn of(err: &io::Error) -> Self {
        if matches!(err.raw_os_error(), Some(code) if code == libc::EMFILE || code == libc::ENFILE)
        {
            return Self::ResourceExhausted;
        }
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            _ => Self::Other,
        }
    }

    /// Check if the failure should be retried rather than surfaced
    pub fn is_transient(self) -> bool {
        self == Self::ResourceExhausted
    }
}

/// Build the error a backend reports when it runs out of file handles
pub fn exhausted_error() -> io::Error {
    io::Error::from_raw_os_error(libc::EMFILE)
}
