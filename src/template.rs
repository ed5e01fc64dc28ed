//! Template loading with compiled-artifact memoization
//!
//! File-backed templates are compiled once per cache generation: the compiled
//! form is stored as the `"template"` artifact on the file's cache entry, so
//! resetting the entry (or writing the file) forces a fresh compile.

use crate::config::TemplatesConfig;
use crate::error::{FsError, FsResult};
use crate::service::FileUtil;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Artifact name compiled templates are stored under
pub const TEMPLATE_ARTIFACT: &str = "template";

/// Suffix marking a template argument as a file path
pub const DEFAULT_TEMPLATE_SUFFIX: &str = ".handlebars";

/// Label used in errors for templates passed inline
const INLINE_NAME: &str = "<inline>";

/// The template engine the loader delegates to
pub trait TemplateCompiler: Send + Sync {
    /// Invocable compiled form
    type Template: Send + Sync + 'static;
    /// Compile failure
    type Error: fmt::Display;

    /// Compile template source text
    fn compile(&self, source: &str) -> Result<Self::Template, Self::Error>;
}

/// A compiled template, optionally split into independent fragments
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledTemplate<T> {
    /// The whole source compiled as one template
    Single(T),
    /// The source split on a delimiter, each piece compiled separately
    Fragments(Vec<T>),
}

impl<T> CompiledTemplate<T> {
    /// The template, when compiled unsplit
    pub fn as_single(&self) -> Option<&T> {
        match self {
            Self::Single(template) => Some(template),
            Self::Fragments(_) => None,
        }
    }

    /// Every compiled piece in source order
    pub fn fragments(&self) -> &[T] {
        match self {
            Self::Single(template) => std::slice::from_ref(template),
            Self::Fragments(fragments) => fragments,
        }
    }
}

/// Loads inline or file-backed templates through a [`FileUtil`]
pub struct TemplateLoader<C> {
    files: FileUtil,
    compiler: C,
    suffix: String,
}

impl<C: TemplateCompiler> TemplateLoader<C> {
    /// Create a loader recognising the default template suffix
    pub fn new(files: FileUtil, compiler: C) -> Self {
        Self {
            files,
            compiler,
            suffix: DEFAULT_TEMPLATE_SUFFIX.to_string(),
        }
    }

    /// Create a loader from configuration
    pub fn from_config(files: FileUtil, compiler: C, config: &TemplatesConfig) -> Self {
        Self::new(files, compiler).with_suffix(&config.suffix)
    }

    /// Recognise a different file suffix
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    /// Check whether `template` names a template file
    pub fn is_template_path(&self, template: &str) -> bool {
        template.ends_with(&self.suffix)
    }

    /// Load and compile `template`.
    ///
    /// A template file path is read through the cache and compiled at most
    /// once while its entry lives; anything else is compiled as inline source
    /// on every call. With `split_on`, the source is split on that delimiter
    /// and each piece compiled on its own.
    pub async fn load(
        &self,
        template: &str,
        split_on: Option<&str>,
    ) -> FsResult<Arc<CompiledTemplate<C::Template>>> {
        if !self.is_template_path(template) {
            return self.compile(INLINE_NAME, template, split_on).map(Arc::new);
        }

        let lookup = self
            .files
            .read_file_artifact(template, TEMPLATE_ARTIFACT)
            .await?;
        if let Some(compiled) = lookup.artifact_as::<CompiledTemplate<C::Template>>() {
            debug!("Using compiled template for {}", template);
            return Ok(compiled);
        }

        let source = String::from_utf8_lossy(&lookup.data);
        let compiled = Arc::new(self.compile(template, &source, split_on)?);
        self.files
            .set_file_artifact(template, TEMPLATE_ARTIFACT, compiled.clone());
        debug!("Compiled template {}", template);
        Ok(compiled)
    }

    fn compile(
        &self,
        name: &str,
        source: &str,
        split_on: Option<&str>,
    ) -> FsResult<CompiledTemplate<C::Template>> {
        let compile_one = |text: &str| {
            self.compiler
                .compile(text)
                .map_err(|e| FsError::Template {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
        };

        match split_on {
            Some(delimiter) => source
                .split(delimiter)
                .map(compile_one)
                .collect::<FsResult<Vec<_>>>()
                .map(CompiledTemplate::Fragments),
            None => compile_one(source).map(CompiledTemplate::Single),
        }
    }
}
