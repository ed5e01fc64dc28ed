//! Configuration schema for fileutil
//!
//! Configuration is stored at `~/.config/fileutil/config.toml`

use crate::retry::DEFAULT_RETRY_DELAY;
use crate::service::DEFAULT_IGNORED_NAMES;
use crate::template::DEFAULT_TEMPLATE_SUFFIX;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Path resolution settings
    pub paths: PathsConfig,

    /// Read cache settings
    pub cache: CacheConfig,

    /// Directory expansion settings
    pub expand: ExpandConfig,

    /// Template loading settings
    pub templates: TemplatesConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default log level when `RUST_LOG` is unset
    pub log_level: String,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: "text".to_string(),
        }
    }
}

/// Path resolution configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Prefix applied to relative paths
    pub lookup_root: Option<String>,
}

/// Read cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Delay between retries after file-handle exhaustion
    pub retry_delay_ms: u64,
}

impl CacheConfig {
    /// Retry delay as a duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
        }
    }
}

/// Directory expansion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandConfig {
    /// File names skipped when expanding paths
    pub ignored_names: Vec<String>,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            ignored_names: DEFAULT_IGNORED_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Template loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Suffix that marks a template argument as a file path
    pub suffix: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_TEMPLATE_SUFFIX.to_string(),
        }
    }
}
