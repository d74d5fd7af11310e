//! Retry with exponential back-off and jitter for provider calls.
//!
//! [`retry_with_backoff`] wraps any fallible async provider operation and
//! retries on transient errors (see [`ProviderError::is_retriable`]). Permanent
//! errors are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ProviderError;

const MAX_DELAY_MS: u64 = 30_000;

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Retry | Sleep before it            |
/// |-------|----------------------------|
/// | 1     | 500 ms × 2⁰ ± 25 % jitter  |
/// | 2     | 500 ms × 2¹ ± 25 % jitter  |
/// | 3     | 500 ms × 2² ± 25 % jitter  |
///
/// A `RateLimited` error's `Retry-After` is a floor on the delay. Delay is
/// capped at 30 s either way.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retriable() || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let delay_ms = match &err {
                    ProviderError::RateLimited {
                        retry_after_secs, ..
                    } => jittered
                        .max(retry_after_secs.saturating_mul(1000))
                        .min(MAX_DELAY_MS),
                    _ => jittered,
                };
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient provider error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
