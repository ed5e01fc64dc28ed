//! File-name filters applied to directory children

use std::fmt;
use std::sync::Arc;

#[derive(Clone, Default)]
enum FilterKind {
    #[default]
    Any,
    Extensions(Vec<String>),
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

/// Decides which files found inside a directory are kept
///
/// Only consulted for directory children; files named directly are never
/// filtered.
#[derive(Clone, Default)]
pub struct ExtensionFilter {
    kind: FilterKind,
}

impl ExtensionFilter {
    /// Accept every file name
    pub fn any() -> Self {
        Self::default()
    }

    /// Accept names ending in one of `extensions` (with or without the dot)
    pub fn extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_string())
            .collect();
        Self {
            kind: FilterKind::Extensions(extensions),
        }
    }

    /// Accept names for which `predicate` returns true
    pub fn predicate(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            kind: FilterKind::Predicate(Arc::new(predicate)),
        }
    }

    /// Test a file's base name
    pub fn matches(&self, name: &str) -> bool {
        match &self.kind {
            FilterKind::Any => true,
            FilterKind::Extensions(extensions) => name
                .rsplit_once('.')
                .is_some_and(|(_, ext)| extensions.iter().any(|e| e == ext)),
            FilterKind::Predicate(predicate) => predicate(name),
        }
    }
}

impl fmt::Debug for ExtensionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FilterKind::Any => f.write_str("ExtensionFilter::Any"),
            FilterKind::Extensions(exts) => f
                .debug_tuple("ExtensionFilter::Extensions")
                .field(exts)
                .finish(),
            FilterKind::Predicate(_) => f.write_str("ExtensionFilter::Predicate"),
        }
    }
}
