//! fileutil - cached, retrying filesystem access for build tools
//!
//! Coalesces concurrent reads of the same path, waits out file-handle
//! exhaustion, expands path specs into resource descriptors and memoizes
//! compiled templates alongside the files they came from.

pub mod cache;
pub mod config;
mod ensure;
pub mod error;
pub mod fs;
pub mod logging;
pub mod path;
pub mod resource;
pub mod retry;
pub mod service;
pub mod template;

pub use cache::{ArtifactLookup, CacheEvent};
pub use config::{Config, ConfigManager};
pub use error::{FsError, FsResult};
pub use fs::{FileStat, FileSystem, MemoryFs, TokioFs};
pub use resource::{ExtensionFilter, PathSpec, ResourceDescriptor, ResourceSpec};
pub use service::FileUtil;
pub use template::{CompiledTemplate, TemplateCompiler, TemplateLoader};
