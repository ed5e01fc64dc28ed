//! Parent-directory creation and the write path

use crate::error::{FsError, FsResult};
use crate::fs::ErrorClass;
use crate::retry::retry_transient;
use crate::service::FileUtil;
use futures_util::future::BoxFuture;
use std::path::Path;
use tracing::{debug, info};

impl FileUtil {
    /// Create any missing parent directories of `target`.
    ///
    /// Losing a creation race to another writer counts as success.
    pub async fn ensure_dirs(&self, target: &str) -> FsResult<()> {
        let target = self.resolve_path(target);
        self.ensure_parent(&target).await
    }

    /// Write `data` to `path`, creating parent directories first.
    ///
    /// The cached entry for `path` is reset before anything is written.
    pub async fn write_file(&self, path: &str, data: impl AsRef<[u8]>) -> FsResult<()> {
        self.reset_cache(Some(path));

        let target = self.resolve_path(path);
        self.ensure_parent(&target).await?;

        let data = data.as_ref();
        retry_transient(self.inner.retry_delay, "write", &target, || {
            self.inner.fs.write(&target, data)
        })
        .await
        .map_err(|e| FsError::io("write", &target, e))?;

        info!("Wrote {} ({} bytes)", target, data.len());
        Ok(())
    }

    fn ensure_parent<'a>(&'a self, target: &'a str) -> BoxFuture<'a, FsResult<()>> {
        Box::pin(async move {
            let Some(parent) = parent_dir(target) else {
                return Ok(());
            };

            match self.stat_canonical(parent).await {
                Ok(_) => Ok(()),
                Err(e) if e.is_not_found() => {
                    self.ensure_parent(parent).await?;
                    self.create_dir(parent).await
                }
                Err(e) => Err(e),
            }
        })
    }

    async fn create_dir(&self, dir: &str) -> FsResult<()> {
        let result = retry_transient(self.inner.retry_delay, "mkdir", dir, || {
            self.inner.fs.mkdir(dir)
        })
        .await;

        match result {
            Ok(()) => {
                debug!("Created directory {}", dir);
                Ok(())
            }
            Err(e) if ErrorClass::of(&e) == ErrorClass::AlreadyExists => {
                debug!("Directory {} appeared concurrently", dir);
                Ok(())
            }
            Err(e) => Err(FsError::io("mkdir", dir, e)),
        }
    }
}

/// Parent directory of `path`, or `None` when there is nothing to create
fn parent_dir(path: &str) -> Option<&str> {
    let parent = Path::new(path.trim_end_matches('/')).parent()?.to_str()?;
    (!matches!(parent, "" | "." | "/")).then_some(parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileSystem, FsOp, InjectedError, MemoryFs};
    use std::io;
    use std::sync::Arc;

    fn service(fs: &Arc<MemoryFs>) -> FileUtil {
        let files = FileUtil::new(Arc::clone(fs) as Arc<dyn FileSystem>);
        files.set_lookup_path("/site");
        files
    }

    #[test]
    fn parent_dir_of_paths() {
        assert_eq!(parent_dir("/site/a/b.txt"), Some("/site/a"));
        assert_eq!(parent_dir("/site/a/"), Some("/site"));
        assert_eq!(parent_dir("/a.txt"), None);
        assert_eq!(parent_dir("a.txt"), None);
        assert_eq!(parent_dir("out/a.txt"), Some("out"));
    }

    #[tokio::test]
    async fn ensure_dirs_creates_nested_parents() {
        let fs = Arc::new(MemoryFs::new());
        fs.insert_dir("/site");
        let files = service(&fs);

        files.ensure_dirs("out/css/deep/site.css").await.unwrap();

        assert!(fs.has_dir("/site/out"));
        assert!(fs.has_dir("/site/out/css"));
        assert!(fs.has_dir("/site/out/css/deep"));
        assert_eq!(fs.calls(FsOp::Mkdir, "/site/out/css/deep"), 1);
    }

    #[tokio::test]
    async fn ensure_dirs_skips_existing_parent() {
        let fs = Arc::new(MemoryFs::new());
        fs.insert_dir("/site/out");
        let files = service(&fs);

        files.ensure_dirs("out/a.txt").await.unwrap();
        assert_eq!(fs.calls(FsOp::Mkdir, "/site/out"), 0);
    }

    #[tokio::test]
    async fn lost_creation_race_is_success() {
        let fs = Arc::new(MemoryFs::new());
        fs.insert_dir("/site");
        fs.inject(
            FsOp::Mkdir,
            "/site/out",
            InjectedError::Kind(io::ErrorKind::AlreadyExists),
        );
        let files = service(&fs);

        files.ensure_dirs("out/a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn other_mkdir_errors_are_fatal() {
        let fs = Arc::new(MemoryFs::new());
        fs.insert_dir("/site");
        fs.inject(
            FsOp::Mkdir,
            "/site/out",
            InjectedError::Kind(io::ErrorKind::PermissionDenied),
        );
        let files = service(&fs);

        let err = files.write_file("out/a.txt", "x").await.unwrap_err();
        assert!(err.to_string().contains("mkdir failed for /site/out"));
        assert!(fs.contents("/site/out/a.txt").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn write_waits_out_exhaustion() {
        let fs = Arc::new(MemoryFs::new());
        fs.insert_dir("/site");
        fs.inject(FsOp::Mkdir, "/site/out", InjectedError::Exhausted);
        fs.inject(FsOp::Write, "/site/out/a.txt", InjectedError::Exhausted);
        let files = service(&fs);

        files.write_file("out/a.txt", "hello").await.unwrap();

        assert_eq!(fs.contents("/site/out/a.txt"), Some(b"hello".to_vec()));
        assert_eq!(fs.calls(FsOp::Write, "/site/out/a.txt"), 2);
    }

    #[tokio::test]
    async fn write_invalidates_cached_read() {
        let fs = Arc::new(MemoryFs::new());
        fs.insert_file("/site/a.txt", "old");
        let files = service(&fs);

        assert_eq!(files.read_file("a.txt").await.unwrap().as_ref(), b"old");
        files.write_file("a.txt", "new").await.unwrap();
        assert_eq!(files.read_file("a.txt").await.unwrap().as_ref(), b"new");
    }
}
