//! Recursive expansion of path specs into descriptor lists

use crate::error::FsResult;
use crate::resource::descriptor::{compare_sources, ResourceDescriptor};
use crate::resource::filter::ExtensionFilter;
use crate::resource::spec::{PathSpec, ResourceSpec};
use crate::service::FileUtil;
use futures_util::future::{try_join_all, BoxFuture};
use serde_json::{Map, Value};
use tracing::debug;

/// Where a path was reached from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Named directly by the caller (or a list element)
    Direct,
    /// Found while listing a directory
    DirectoryChild,
}

impl FileUtil {
    /// Expand `spec` into a flat list of resource descriptors.
    ///
    /// Directories are walked recursively and their output sorted by source;
    /// lists keep their (de-duplicated) order. Missing paths produce an
    /// `enoent` descriptor instead of an error. Any other failure aborts the
    /// whole expansion.
    pub async fn file_list(
        &self,
        spec: impl Into<PathSpec>,
        filter: &ExtensionFilter,
    ) -> FsResult<Vec<ResourceDescriptor>> {
        self.expand_spec(spec.into(), filter).await
    }

    fn expand_spec<'a>(
        &'a self,
        spec: PathSpec,
        filter: &'a ExtensionFilter,
    ) -> BoxFuture<'a, FsResult<Vec<ResourceDescriptor>>> {
        Box::pin(async move {
            match spec {
                PathSpec::List(items) => {
                    let expanded = try_join_all(
                        dedup(items)
                            .into_iter()
                            .map(|item| self.expand_spec(item, filter)),
                    )
                    .await?;
                    Ok(expanded.into_iter().flatten().collect())
                }
                PathSpec::Descriptor(descriptor) => Ok(vec![descriptor]),
                PathSpec::Resource(ResourceSpec { src, mut template }) => {
                    template.remove("src");
                    let path = self.resolve_path(&src);
                    self.expand_path(path, &template, None, Origin::Direct, filter)
                        .await
                }
                PathSpec::Path(path) => {
                    let path = self.resolve_path(&path);
                    self.expand_path(path, &Map::new(), None, Origin::Direct, filter)
                        .await
                }
            }
        })
    }

    fn expand_path<'a>(
        &'a self,
        path: String,
        template: &'a Map<String, Value>,
        src_dir: Option<String>,
        origin: Origin,
        filter: &'a ExtensionFilter,
    ) -> BoxFuture<'a, FsResult<Vec<ResourceDescriptor>>> {
        Box::pin(async move {
            let stat = match self.stat_canonical(&path).await {
                Ok(stat) => stat,
                Err(e) if e.is_not_found() => {
                    let missing = ResourceDescriptor::missing(self.make_relative(&path));
                    return Ok(vec![missing.with_template(template)]);
                }
                Err(e) => return Err(e),
            };

            if stat.is_dir {
                self.expand_dir(path, template, src_dir, filter).await
            } else {
                Ok(self
                    .expand_file(&path, template, src_dir, origin, filter)
                    .into_iter()
                    .collect())
            }
        })
    }

    async fn expand_dir(
        &self,
        path: String,
        template: &Map<String, Value>,
        src_dir: Option<String>,
        filter: &ExtensionFilter,
    ) -> FsResult<Vec<ResourceDescriptor>> {
        let names = self.read_dir(&path).await?;
        let relative = self.make_relative(&path);
        let src_dir = src_dir.or_else(|| (!relative.is_empty()).then(|| relative.clone()));
        let prefix = format!("{}/", path.trim_end_matches('/'));

        let children = try_join_all(names.iter().map(|name| {
            self.expand_path(
                format!("{}{}", prefix, name),
                template,
                src_dir.clone(),
                Origin::DirectoryChild,
                filter,
            )
        }))
        .await?;

        let mut descriptors: Vec<ResourceDescriptor> = children.into_iter().flatten().collect();
        if let Some(src_dir) = &src_dir {
            for descriptor in &mut descriptors {
                descriptor.src_dir = Some(src_dir.clone());
            }
        }
        // The lookup root itself has no relative name to report
        if !relative.is_empty() {
            descriptors.push(ResourceDescriptor::directory(relative).with_template(template));
        }
        descriptors.sort_by(compare_sources);
        Ok(descriptors)
    }

    fn expand_file(
        &self,
        path: &str,
        template: &Map<String, Value>,
        src_dir: Option<String>,
        origin: Origin,
        filter: &ExtensionFilter,
    ) -> Option<ResourceDescriptor> {
        let relative = self.make_relative(path);
        let basename = relative.rsplit('/').next().unwrap_or_default();

        let rejected = basename.starts_with('.')
            || self.inner.ignored_names.iter().any(|name| name == basename)
            || (origin == Origin::DirectoryChild && !filter.matches(basename));
        if rejected {
            debug!("Skipping {}", relative);
            return None;
        }

        Some(ResourceDescriptor::file(relative.clone(), src_dir).with_template(template))
    }
}

/// Drop repeated specs, keeping the first occurrence of each
fn dedup(items: Vec<PathSpec>) -> Vec<PathSpec> {
    let mut unique: Vec<PathSpec> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}
