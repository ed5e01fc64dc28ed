//! Lookup-root path resolution
//!
//! Paths are handled as strings: the lookup root is a plain prefix, so
//! resolving and relativizing are exact inverses for any relative input.

use parking_lot::RwLock;

/// Converts between relative and root-qualified paths using one lookup root
#[derive(Debug, Default)]
pub struct PathResolver {
    root: RwLock<Option<String>>,
}

impl PathResolver {
    /// Create a resolver with no lookup root
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with the given lookup root
    pub fn with_root(root: &str) -> Self {
        let resolver = Self::new();
        resolver.set_lookup_path(root);
        resolver
    }

    /// Get the configured lookup root (always ends in `/`)
    pub fn lookup_path(&self) -> Option<String> {
        self.root.read().clone()
    }

    /// Set the lookup root, appending a trailing separator if absent.
    ///
    /// An empty root clears the setting.
    pub fn set_lookup_path(&self, root: &str) {
        let root = if root.is_empty() {
            None
        } else if root.ends_with('/') {
            Some(root.to_string())
        } else {
            Some(format!("{}/", root))
        };
        *self.root.write() = root;
    }

    /// Prefix `name` with the lookup root unless it is absolute or already rooted
    pub fn resolve_path(&self, name: &str) -> String {
        match self.root.read().as_deref() {
            Some(root) if !is_absolute(name) && !name.starts_with(root) => {
                format!("{}{}", root, name)
            }
            _ => name.to_string(),
        }
    }

    /// Strip the lookup root from `name` if present
    pub fn make_relative(&self, name: &str) -> String {
        match self.root.read().as_deref() {
            Some(root) => name.strip_prefix(root).unwrap_or(name).to_string(),
            None => name.to_string(),
        }
    }
}

/// Check for a leading separator or a drive-letter prefix (`C:/`, `C:\`)
pub fn is_absolute(name: &str) -> bool {
    if name.starts_with('/') || name.starts_with('\\') {
        return true;
    }
    let bytes = name.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

/// Lexically normalize a path.
///
/// Collapses repeated separators and `.` segments, and resolves `..` against
/// preceding segments. A trailing separator is kept.
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            _ => parts.push(segment),
        }
    }

    let mut out = parts.join("/");
    if absolute {
        out.insert(0, '/');
    }
    if out.is_empty() {
        out.push('.');
    }
    if path.ends_with('/') && !out.ends_with('/') {
        out.push('/');
    }
    out
}
