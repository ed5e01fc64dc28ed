//! Real-disk backend built on `tokio::fs`

use crate::fs::{FileStat, FileSystem};
use async_trait::async_trait;
use std::io;
use tokio::fs;

/// Permissions for directories created by [`TokioFs::mkdir`]
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Filesystem backend that talks to the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl TokioFs {
    /// Create a new disk backend
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for TokioFs {
    async fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(path).await
    }

    async fn list(&self, path: &str) -> io::Result<Vec<String>> {
        let mut entries = fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    async fn stat(&self, path: &str) -> io::Result<FileStat> {
        let meta = fs::metadata(path).await?;
        Ok(FileStat {
            is_dir: meta.is_dir(),
            len: meta.len(),
        })
    }

    async fn write(&self, path: &str, data: &[u8]) -> io::Result<()> {
        fs::write(path, data).await
    }

    async fn mkdir(&self, path: &str) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        #[cfg(unix)]
        builder.mode(DIR_MODE);
        builder.create(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::ErrorClass;
    use tempfile::TempDir;

    fn path_in(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn write_read_and_stat() {
        let dir = TempDir::new().unwrap();
        let backend = TokioFs::new();
        let file = path_in(&dir, "a.txt");

        backend.write(&file, b"hello").await.unwrap();
        assert_eq!(backend.read(&file).await.unwrap(), b"hello");
        assert_eq!(backend.stat(&file).await.unwrap(), FileStat::file(5));
        assert!(backend.stat(&path_in(&dir, "")).await.unwrap().is_dir);
    }

    #[tokio::test]
    async fn list_returns_entry_names() {
        let dir = TempDir::new().unwrap();
        let backend = TokioFs::new();
        backend.write(&path_in(&dir, "b.txt"), b"").await.unwrap();
        backend.mkdir(&path_in(&dir, "sub")).await.unwrap();

        let mut names = backend.list(&path_in(&dir, "")).await.unwrap();
        names.sort();
        assert_eq!(names, vec!["b.txt".to_string(), "sub".to_string()]);
    }

    #[tokio::test]
    async fn mkdir_reports_existing_directory() {
        let dir = TempDir::new().unwrap();
        let backend = TokioFs::new();
        let sub = path_in(&dir, "sub");

        backend.mkdir(&sub).await.unwrap();
        let err = backend.mkdir(&sub).await.unwrap_err();
        assert_eq!(ErrorClass::of(&err), ErrorClass::AlreadyExists);
    }

    #[tokio::test]
    async fn missing_path_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = TokioFs::new()
            .stat(&path_in(&dir, "missing"))
            .await
            .unwrap_err();
        assert_eq!(ErrorClass::of(&err), ErrorClass::NotFound);
    }
}
