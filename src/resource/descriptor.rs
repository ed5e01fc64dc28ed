//! Normalized resource records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Keys a resource template can never override
const RESERVED_KEYS: &[&str] = &["src", "srcDir", "dir", "enoent"];

/// A discovered file or directory plus merged template fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Path relative to the lookup root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    /// Root under which the resource was discovered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_dir: Option<String>,

    /// Set on the synthetic record for an expanded directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    /// Set when the requested path does not exist
    #[serde(default, skip_serializing_if = "is_false")]
    pub enoent: bool,

    /// Fields merged in from the resource template
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ResourceDescriptor {
    /// Record for a regular file
    pub fn file(src: impl Into<String>, src_dir: Option<String>) -> Self {
        Self {
            src: Some(src.into()),
            src_dir,
            ..Self::default()
        }
    }

    /// Record for a path that does not exist
    pub fn missing(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            enoent: true,
            ..Self::default()
        }
    }

    /// Synthetic record for an expanded directory
    pub fn directory(dir: impl Into<String>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Fill in template fields this record does not already carry
    pub fn with_template(mut self, template: &Map<String, Value>) -> Self {
        for (key, value) in template {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            self.fields
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }

    /// Look up a template field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The string descriptors are ordered by: `src`, else `dir`
    pub fn source(&self) -> &str {
        self.src
            .as_deref()
            .or(self.dir.as_deref())
            .unwrap_or_default()
    }
}

/// Punctuation in root-collation order
const PUNCTUATION: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Primary collation weight of one character
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Primary {
    Space,
    Punct(usize),
    Symbol(char),
    Digit(char),
    Letter(char),
}

impl Primary {
    fn of(c: char) -> Self {
        if c.is_whitespace() {
            Self::Space
        } else if let Some(rank) = PUNCTUATION.find(c) {
            Self::Punct(rank)
        } else if c.is_numeric() {
            Self::Digit(c)
        } else if c.is_alphabetic() {
            Self::Letter(c.to_lowercase().next().unwrap_or(c))
        } else {
            Self::Symbol(c)
        }
    }
}

/// Compare two strings the way a root-locale collator does.
///
/// Punctuation sorts before digits and digits before letters; letters compare
/// without case first, then lowercase before uppercase. Raw bytes break any
/// remaining tie.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(Primary::of)
        .cmp(b.chars().map(Primary::of))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// Order two descriptors by [`collate`] on their sources
pub fn compare_sources(a: &ResourceDescriptor, b: &ResourceDescriptor) -> Ordering {
    collate(a.source(), b.source())
}
