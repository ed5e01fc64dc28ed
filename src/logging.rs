//! Logging setup
//!
//! Installs a global `tracing` subscriber. `RUST_LOG` takes precedence over
//! the configured level.

use crate::config::GeneralConfig;
use crate::error::{FsError, FsResult};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber described by `config`.
///
/// Fails if a subscriber is already installed.
pub fn init(config: &GeneralConfig) -> FsResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(config)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = if is_json(config) {
        builder.json().try_init()
    } else {
        builder.without_time().try_init()
    };

    result.map_err(|e| FsError::Logging(e.to_string()))
}

/// Filter directive for the configured level
fn directive(config: &GeneralConfig) -> String {
    let level = match config.log_level.trim() {
        "" => "warn",
        level => level,
    };
    format!("fileutil={}", level.to_ascii_lowercase())
}

fn is_json(config: &GeneralConfig) -> bool {
    config.log_format.eq_ignore_ascii_case("json")
}
