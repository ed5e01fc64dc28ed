//! Derived values stored alongside cached file contents

use crate::cache::entry::Artifact;
use crate::cache::store::ReadCache;
use std::any::Any;
use std::sync::Arc;

/// Cached file contents together with one named artifact
#[derive(Clone)]
pub struct ArtifactLookup {
    /// Raw file bytes
    pub data: Arc<[u8]>,
    /// The requested artifact, if one has been stored
    pub artifact: Option<Artifact>,
}

impl ArtifactLookup {
    /// The artifact downcast to a concrete type
    ///
    /// Returns `None` when no artifact is stored or it has a different type.
    pub fn artifact_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.artifact.clone()?.downcast::<T>().ok()
    }
}

impl std::fmt::Debug for ArtifactLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactLookup")
            .field("len", &self.data.len())
            .field("has_artifact", &self.artifact.is_some())
            .finish()
    }
}

impl ReadCache {
    /// Attach `value` under `name` to the live entry for `path`.
    ///
    /// Artifacts only live as long as their entry: with no entry the value
    /// is dropped and `false` is returned.
    pub fn set_artifact(&self, path: &str, name: &str, value: Artifact) -> bool {
        match self.entry(path) {
            Some(entry) => {
                entry.set_artifact(name, value);
                true
            }
            None => false,
        }
    }
}
