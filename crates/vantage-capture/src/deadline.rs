//! Deadline guard for provider calls.
//!
//! A provider call that never returns would tie up one worker
//! indefinitely; every call from the protocol engine goes through
//! [`with_deadline`] so a hang degrades into an ordinary provider error.

use std::future::Future;
use std::time::Duration;

use crate::errors::ProviderError;

/// Run a provider call with an upper bound on its duration.
///
/// On expiry the result is [`ProviderError::Timeout`]; the underlying
/// future is dropped.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_elapsed) => Err(ProviderError::Timeout {
            elapsed_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
