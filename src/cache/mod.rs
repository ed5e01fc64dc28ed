//! In-memory read cache for file contents and directory listings
//!
//! Reads are keyed by canonical path (the path after applying the lookup
//! root). Each entry runs its underlying filesystem operation at most once
//! per generation, however many callers ask for it meanwhile.
//!
//! # Entry Lifecycle
//!
//! | State | Entered by | Left by |
//! |-------|------------|---------|
//! | Pending | first request | data, permanent error, reset |
//! | Resolved | data arrived | reset |
//! | Gone | permanent error, reset | next request creates a new generation |
//!
//! Failures are never cached, and artifacts live and die with their entry.

mod artifact;
mod entry;
mod events;
mod store;

pub use artifact::ArtifactLookup;
pub use entry::{Artifact, CacheEntry, EntryData};
pub use events::{CacheEvent, EVENT_CAPACITY};
pub use store::ReadCache;
