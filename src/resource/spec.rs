//! Path specifications accepted by the expander

use crate::error::{FsError, FsResult};
use crate::resource::descriptor::ResourceDescriptor;
use serde_json::{Map, Value};

/// A path plus the template fields to merge into everything it expands to
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSpec {
    /// Path to expand
    pub src: String,
    /// Fields merged into every produced descriptor
    pub template: Map<String, Value>,
}

impl ResourceSpec {
    /// A resource with an empty template
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            template: Map::new(),
        }
    }

    /// Add a template field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.template.insert(key.into(), value.into());
        self
    }
}

/// Input to [`FileUtil::file_list`](crate::FileUtil::file_list)
#[derive(Debug, Clone, PartialEq)]
pub enum PathSpec {
    /// A bare path
    Path(String),
    /// A path with a resource template
    Resource(ResourceSpec),
    /// An already-normalized record, passed through untouched
    Descriptor(ResourceDescriptor),
    /// Several specs, expanded in order after de-duplication
    List(Vec<PathSpec>),
}

impl PathSpec {
    /// Build a spec from loosely-typed JSON.
    ///
    /// Strings are paths, arrays are lists, objects with a string `src` are
    /// resources (the other keys form the template) and objects without
    /// `src` are descriptors.
    pub fn from_json(value: Value) -> FsResult<Self> {
        match value {
            Value::String(path) => Ok(Self::Path(path)),
            Value::Array(items) => items
                .into_iter()
                .map(Self::from_json)
                .collect::<FsResult<Vec<_>>>()
                .map(Self::List),
            Value::Object(mut fields) => match fields.remove("src") {
                Some(Value::String(src)) => Ok(Self::Resource(ResourceSpec {
                    src,
                    template: fields,
                })),
                Some(other) => Err(FsError::InvalidSpec(format!(
                    "src must be a string, got {}",
                    other
                ))),
                None => serde_json::from_value(Value::Object(fields))
                    .map(Self::Descriptor)
                    .map_err(|e| FsError::InvalidSpec(e.to_string())),
            },
            other => Err(FsError::InvalidSpec(format!(
                "expected a path, resource or list, got {}",
                other
            ))),
        }
    }
}

impl From<&str> for PathSpec {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for PathSpec {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<ResourceSpec> for PathSpec {
    fn from(resource: ResourceSpec) -> Self {
        Self::Resource(resource)
    }
}

impl From<ResourceDescriptor> for PathSpec {
    fn from(descriptor: ResourceDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl<T: Into<PathSpec>> From<Vec<T>> for PathSpec {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}
