//! Integration tests for fileutil

use fileutil::cache::CacheEvent;
use fileutil::config::{Config, ConfigManager};
use fileutil::fs::{FileSystem, FsOp, InjectedError, MemoryFs, TokioFs};
use fileutil::template::{TemplateCompiler, TemplateLoader};
use fileutil::{ExtensionFilter, FileUtil, PathSpec, ResourceDescriptor, ResourceSpec};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn disk_service(temp: &TempDir) -> FileUtil {
    let files = FileUtil::new(Arc::new(TokioFs::new()));
    files.set_lookup_path(temp.path().to_str().unwrap());
    files
}

fn sources(list: &[ResourceDescriptor]) -> Vec<&str> {
    list.iter().map(ResourceDescriptor::source).collect()
}

mod disk_tests {
    use super::*;

    fn populate(temp: &TempDir) {
        let root = temp.path();
        std::fs::create_dir_all(root.join("assets/css")).unwrap();
        std::fs::write(root.join("assets/app.js"), "app").unwrap();
        std::fs::write(root.join("assets/Zeta.js"), "zeta").unwrap();
        std::fs::write(root.join("assets/.DS_Store"), "").unwrap();
        std::fs::write(root.join("assets/css/site.css"), "body{}").unwrap();
        std::fs::write(root.join("assets/css/notes.txt"), "").unwrap();
    }

    #[tokio::test]
    async fn expands_real_directory_tree() {
        let temp = TempDir::new().unwrap();
        populate(&temp);
        let files = disk_service(&temp);

        let filter = ExtensionFilter::extensions(["js", "css"]);
        let list = files.file_list("assets", &filter).await.unwrap();

        assert_eq!(
            sources(&list),
            vec![
                "assets",
                "assets/app.js",
                "assets/css",
                "assets/css/site.css",
                "assets/Zeta.js",
            ]
        );
        assert!(list
            .iter()
            .filter(|d| d.dir.is_none())
            .all(|d| d.src_dir.as_deref() == Some("assets")));
    }

    #[tokio::test]
    async fn list_spec_mixes_paths_and_missing_entries() {
        let temp = TempDir::new().unwrap();
        populate(&temp);
        let files = disk_service(&temp);

        let spec = PathSpec::from_json(serde_json::json!([
            "assets/app.js",
            {"src": "assets/missing.js", "async": true},
            "assets/app.js"
        ]))
        .unwrap();
        let list = files.file_list(spec, &ExtensionFilter::any()).await.unwrap();

        assert_eq!(sources(&list), vec!["assets/app.js", "assets/missing.js"]);
        assert!(list[1].enoent);
        assert_eq!(list[1].field("async"), Some(&serde_json::Value::Bool(true)));
    }

    #[tokio::test]
    async fn write_creates_parents_and_refreshes_cache() {
        let temp = TempDir::new().unwrap();
        let files = disk_service(&temp);

        files.write_file("out/js/bundle.js", "one").await.unwrap();
        assert_eq!(files.read_file("out/js/bundle.js").await.unwrap().as_ref(), b"one");

        files.write_file("out/js/bundle.js", "two").await.unwrap();
        assert_eq!(files.read_file("out/js/bundle.js").await.unwrap().as_ref(), b"two");
        assert!(temp.path().join("out/js").is_dir());
    }

    #[tokio::test]
    async fn ensure_dirs_on_disk() {
        let temp = TempDir::new().unwrap();
        let files = disk_service(&temp);

        files.ensure_dirs("a/b/c/file.txt").await.unwrap();
        files.ensure_dirs("a/b/c/file.txt").await.unwrap();
        assert!(temp.path().join("a/b/c").is_dir());
    }

    #[tokio::test]
    async fn missing_file_read_is_not_found() {
        let temp = TempDir::new().unwrap();
        let files = disk_service(&temp);

        let err = files.read_file("nope.txt").await.unwrap_err();
        assert!(err.is_not_found());
    }
}

mod cache_tests {
    use super::*;

    fn memory_service(fs: &Arc<MemoryFs>) -> FileUtil {
        let files = FileUtil::new(Arc::clone(fs) as Arc<dyn FileSystem>);
        files.set_lookup_path("/site");
        files
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_backend_call() {
        let fs = Arc::new(MemoryFs::new().with_latency(Duration::from_millis(5)));
        fs.insert_file("/site/data.json", "{}");
        let files = memory_service(&fs);

        let reads = (0..16).map(|_| {
            let files = files.clone();
            tokio::spawn(async move { files.read_file("data.json").await })
        });
        for result in futures_util::future::join_all(reads).await {
            assert_eq!(result.unwrap().unwrap().as_ref(), b"{}");
        }

        assert_eq!(fs.calls(FsOp::Read, "/site/data.json"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_is_retried_until_success() {
        let fs = Arc::new(MemoryFs::new());
        fs.insert_file("/site/a.txt", "alpha");
        fs.inject(FsOp::Read, "/site/a.txt", InjectedError::Exhausted);
        fs.inject(FsOp::Read, "/site/a.txt", InjectedError::Exhausted);
        let files = memory_service(&fs);

        assert_eq!(files.read_file("a.txt").await.unwrap().as_ref(), b"alpha");
        assert_eq!(fs.calls(FsOp::Read, "/site/a.txt"), 3);
    }

    #[tokio::test]
    async fn events_report_sets_and_resets() {
        let fs = Arc::new(MemoryFs::new());
        fs.insert_file("/site/a.txt", "alpha");
        let files = memory_service(&fs);
        let mut events = files.subscribe();

        files.read_file("a.txt").await.unwrap();
        files.reset_cache(None);

        assert_eq!(events.recv().await.unwrap(), CacheEvent::Set("/site/a.txt".to_string()));
        assert_eq!(events.recv().await.unwrap(), CacheEvent::Reset(None));
    }

    #[tokio::test]
    async fn service_from_config() {
        let fs = Arc::new(MemoryFs::new());
        fs.insert_file("/srv/lib/app.js", "");
        fs.insert_file("/srv/lib/node_modules", "");
        fs.insert_file("/srv/lib/vendor", "");

        let mut config = Config::default();
        config.paths.lookup_root = Some("/srv".to_string());
        config.expand.ignored_names = vec!["node_modules".to_string()];
        let files = FileUtil::from_config(&config, Arc::clone(&fs) as Arc<dyn FileSystem>);

        let list = files
            .file_list(ResourceSpec::new("lib"), &ExtensionFilter::any())
            .await
            .unwrap();
        assert_eq!(sources(&list), vec!["lib", "lib/app.js", "lib/vendor"]);
    }
}

mod template_tests {
    use super::*;

    #[derive(Default)]
    struct UpperCompiler {
        compiles: AtomicUsize,
    }

    impl TemplateCompiler for UpperCompiler {
        type Template = String;
        type Error = std::convert::Infallible;

        fn compile(&self, source: &str) -> Result<String, Self::Error> {
            self.compiles.fetch_add(1, Ordering::SeqCst);
            Ok(source.to_uppercase())
        }
    }

    #[tokio::test]
    async fn template_recompiled_after_write() {
        let temp = TempDir::new().unwrap();
        let files = disk_service(&temp);
        files.write_file("views/page.handlebars", "hello").await.unwrap();
        let loader = TemplateLoader::new(files.clone(), UpperCompiler::default());

        let first = loader.load("views/page.handlebars", None).await.unwrap();
        let again = loader.load("views/page.handlebars", None).await.unwrap();
        assert_eq!(first.as_single().map(String::as_str), Some("HELLO"));
        assert!(Arc::ptr_eq(&first, &again));

        files.write_file("views/page.handlebars", "bye").await.unwrap();
        let updated = loader.load("views/page.handlebars", None).await.unwrap();
        assert_eq!(updated.as_single().map(String::as_str), Some("BYE"));
    }
}

mod config_tests {
    use super::*;

    #[tokio::test]
    async fn config_roundtrip_through_toml() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        let mut config = Config::default();
        config.general.log_format = "json".to_string();
        config.cache.retry_delay_ms = 50;
        manager.save(&config).await.unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.general.log_format, "json");
        assert_eq!(loaded.cache.retry_delay(), Duration::from_millis(50));
    }
}
