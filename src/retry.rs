//! Fixed-delay retry for transient filesystem failures

use crate::fs::ErrorClass;
use std::future::Future;
use std::io;
use std::time::Duration;
use tracing::debug;

/// Delay between attempts when the process is out of file handles
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Run `op` until it succeeds or fails with a non-transient error.
///
/// Resource-exhausted failures are retried after `delay`, indefinitely. They
/// are never returned to the caller.
pub async fn retry_transient<T, F, Fut>(
    delay: Duration,
    what: &'static str,
    path: &str,
    mut op: F,
) -> io::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<T>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Err(e) if ErrorClass::of(&e).is_transient() => {
                debug!("{} {} out of file handles (attempt {}), retrying", what, path, attempt);
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
}
