//! Timeout enforcement.

use std::future::Future;
use std::time::Duration;

/// Run `fut` with a deadline, mapping expiry through `on_timeout`.
pub async fn with_timeout<T, E, F>(
    duration: Duration,
    fut: F,
    on_timeout: impl FnOnce() -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout()),
    }
}
