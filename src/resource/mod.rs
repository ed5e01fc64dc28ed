//! Resource descriptors and path-spec expansion
//!
//! A [`PathSpec`] names what to gather: a path, a path with template
//! fields, a ready descriptor, or a list of those. [`FileUtil::file_list`]
//! expands it into a flat list of [`ResourceDescriptor`]s, one per file or
//! directory found.
//!
//! [`FileUtil::file_list`]: crate::FileUtil::file_list

mod descriptor;
mod expand;
mod filter;
mod spec;

pub use descriptor::{collate, compare_sources, ResourceDescriptor};
pub use filter::ExtensionFilter;
pub use spec::{PathSpec, ResourceSpec};
