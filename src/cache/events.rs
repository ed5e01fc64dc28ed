//! Cache invalidation notifications

/// Number of undelivered events a slow subscriber may lag behind
pub const EVENT_CAPACITY: usize = 256;

/// Published on the cache's broadcast channel
///
/// Observers that keep state derived from cached reads use these to
/// invalidate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A pending read settled, either with data or with a permanent error
    Set(String),
    /// An entry (or, with `None`, the whole table) is about to be cleared
    Reset(Option<String>),
}
