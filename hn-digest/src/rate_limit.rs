use crate::types::GenerationConfig;
use backoff::{backoff::Backoff, ExponentialBackoff};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Errors that can tell a temporary overload apart from a hard failure.
pub trait RetryableError: Display {
    /// True when the call may succeed if repeated after a pause.
    fn is_transient(&self) -> bool;
}

/// Retries a call while it keeps failing with a transient error, sleeping
/// with exponential backoff in between. Hard failures are returned at once.
#[derive(Debug, Clone)]
pub struct RateLimitedInvoker {
    max_attempts: u32,
    initial_delay: Duration,
}

impl RateLimitedInvoker {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_secs(config.retry_delay_seconds),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_delay,
            initial_interval: self.initial_delay,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: self
                .initial_delay
                .saturating_mul(1 << self.max_attempts.min(16)),
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    pub async fn invoke<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError,
    {
        let mut backoff = self.backoff();
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    if attempt >= self.max_attempts {
                        error!(
                            "{}: rate limit persisted after {} attempts: {}",
                            label, self.max_attempts, e
                        );
                        return Err(e);
                    }

                    let delay = backoff.next_backoff().unwrap_or(self.initial_delay);
                    warn!(
                        "{}: rate limited on attempt {}/{}, retrying in {:?}",
                        label, attempt, self.max_attempts, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("{}: request failed: {}", label, e);
                    return Err(e);
                }
            }
        }
    }
}

impl Default for RateLimitedInvoker {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}
