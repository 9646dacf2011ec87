//! Retry helpers for caller-driven recovery
//!
//! The session itself never retries anything: a frozen verdict or a failed
//! load is reported and the host decides. This module carries the retry
//! loop hosts end up writing around
//! [`recreate_player`](crate::PlayerSession::recreate_player) and
//! [`load`](crate::PlayerSession::load): exponential backoff, optional
//! jitter, and an early stop on errors that retrying cannot fix.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::error::PlayerResult;

/// Configuration for retry behavior
///
/// # Examples
///
/// ```rust
/// # use playback_core::recovery::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::default();
/// assert_eq!(config.max_attempts, 3);
/// assert_eq!(config.initial_delay, Duration::from_millis(100));
/// assert!(config.use_jitter);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts
    pub max_attempts: u32,
    /// Initial delay between attempts
    pub initial_delay: Duration,
    /// Maximum delay between attempts
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Configuration for quick retries, suited to channel reloads after a
    /// freeze: many attempts, short delays, jitter on.
    pub fn quick() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 1.5,
            use_jitter: true,
        }
    }

    /// Configuration for deliberate retries, suited to re-initializing a
    /// session after the engine itself was lost: few attempts, long
    /// delays, no jitter.
    pub fn slow() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 3.0,
            use_jitter: false,
        }
    }
}

/// Retry an operation with exponential backoff.
///
/// Retries only while
/// [`is_recoverable`](crate::PlayerError::is_recoverable) holds and
/// attempts remain; lifecycle misuse fails through immediately. The delay
/// doubles (or whatever `backoff_multiplier` says) after each failure,
/// capped at `max_delay`, with ±10% jitter when enabled.
///
/// # Examples
///
/// ```rust
/// # use playback_core::recovery::{retry_with_backoff, RetryConfig};
/// # use playback_core::PlayerError;
/// # use std::sync::atomic::{AtomicU32, Ordering};
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let attempts = AtomicU32::new(0);
/// let result = retry_with_backoff("reload_channel", RetryConfig::quick(), || async {
///     if attempts.fetch_add(1, Ordering::SeqCst) + 1 < 3 {
///         Err(PlayerError::source_load("udp://239.255.1.1:1234", "no data yet"))
///     } else {
///         Ok("playing")
///     }
/// })
/// .await?;
/// assert_eq!(result, "playing");
/// assert_eq!(attempts.load(Ordering::SeqCst), 3);
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> PlayerResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PlayerResult<T>>,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;
        debug!(
            operation = operation_name,
            attempt,
            max_attempts = config.max_attempts,
            "attempting operation"
        );

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt, "operation succeeded after retries"
                    );
                }
                return Ok(result);
            }
            Err(e) if e.is_recoverable() && attempt < config.max_attempts => {
                warn!(
                    operation = operation_name,
                    attempt,
                    error = %e,
                    category = e.category(),
                    next_delay_ms = delay.as_millis() as u64,
                    "recoverable error, will retry"
                );

                let actual_delay = if config.use_jitter {
                    let jitter = (rand::random::<f64>() - 0.5) * 0.2;
                    let millis = delay.as_millis() as f64;
                    Duration::from_millis((millis * (1.0 + jitter)) as u64)
                } else {
                    delay
                };
                sleep(actual_delay).await;

                let next_delay_ms = (delay.as_millis() as f64 * config.backoff_multiplier) as u64;
                delay = Duration::from_millis(next_delay_ms).min(config.max_delay);
            }
            Err(e) => {
                if attempt >= config.max_attempts {
                    error!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %e,
                        "operation failed after all retry attempts"
                    );
                } else {
                    error!(
                        operation = operation_name,
                        error = %e,
                        category = e.category(),
                        "non-recoverable error, not retrying"
                    );
                }
                return Err(e);
            }
        }
    }
}
