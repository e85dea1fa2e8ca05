//! Bounded retry with class-specific exponential backoff
//!
//! [`RetryingFetcher::call`] runs one remote operation until it succeeds, hits
//! a non-retryable error or runs out of attempts, and reports the result as a
//! [`FetchOutcome`] the caller matches on.

use crate::config::RetryConfig;
use crate::domain::errors::{delay_ms, ApiError, ErrorClass, FetchError};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Exponential backoff for one error class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    /// Delay after the first failed attempt
    pub initial: Duration,

    /// Growth factor applied per further failure
    pub multiplier: f64,
}

impl Backoff {
    /// Creates a backoff
    pub fn new(initial: Duration, multiplier: f64) -> Self {
        Self {
            initial,
            multiplier,
        }
    }

    /// Delay after the `failures`-th consecutive failure (1-based)
    pub fn delay_after(&self, failures: u32) -> Duration {
        let exponent = i32::try_from(failures.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

/// Retry policy shared by every call of one class
///
/// Rate-limited failures back off from `rate_limit`, transient service
/// failures from `transient`. Every delay is capped at `max_delay` and then
/// stretched by up to `jitter` (a fraction) of itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    rate_limit: Backoff,
    transient: Backoff,
    max_delay: Duration,
    jitter: f64,
}

impl RetryPolicy {
    /// Creates a policy without jitter and a five minute delay cap
    pub fn new(max_attempts: u32, rate_limit: Backoff, transient: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            rate_limit,
            transient,
            max_delay: Duration::from_secs(300),
            jitter: 0.0,
        }
    }

    /// Builds a policy from a `[retry.*]` section
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Backoff::new(
                Duration::from_millis(config.rate_limit_delay_ms),
                config.multiplier,
            ),
            Backoff::new(
                Duration::from_millis(config.transient_delay_ms),
                config.multiplier,
            ),
        )
        .with_max_delay(Duration::from_millis(config.max_delay_ms))
        .with_jitter(config.jitter)
    }

    /// Policy that retries without waiting
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(
            max_attempts,
            Backoff::new(Duration::ZERO, 1.0),
            Backoff::new(Duration::ZERO, 1.0),
        )
    }

    /// Caps any single delay
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Sets the jitter fraction, clamped to `0.0..=1.0`
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Total attempts, first one included
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the next attempt, after `failures` failures of `class`
    pub fn delay_for(&self, class: ErrorClass, failures: u32) -> Duration {
        let backoff = match class {
            ErrorClass::RateLimited => &self.rate_limit,
            _ => &self.transient,
        };
        let base = backoff.delay_after(failures).min(self.max_delay);
        if self.jitter > 0.0 && !base.is_zero() {
            let extra = rand::thread_rng().gen_range(0.0..=self.jitter);
            base.mul_f64(1.0 + extra)
        } else {
            base
        }
    }
}

/// Tagged result of a retried call
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// The call succeeded
    Ok(T),

    /// The remote side has no data for this call
    Missing,

    /// Every attempt failed with a retryable error
    Retryable { attempts: u32, cause: ApiError },

    /// A non-retryable error ended the call
    Fatal(ApiError),
}

impl<T> FetchOutcome<T> {
    /// Converts into a `Result`, with `Missing` as `Ok(None)`
    pub fn into_result(self) -> Result<Option<T>, FetchError> {
        match self {
            FetchOutcome::Ok(value) => Ok(Some(value)),
            FetchOutcome::Missing => Ok(None),
            FetchOutcome::Retryable { attempts, cause } => Err(FetchError::RetriesExhausted {
                attempts,
                last: cause,
            }),
            FetchOutcome::Fatal(cause) => Err(FetchError::Fatal(cause)),
        }
    }

    /// Maps the success value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Ok(value) => FetchOutcome::Ok(f(value)),
            FetchOutcome::Missing => FetchOutcome::Missing,
            FetchOutcome::Retryable { attempts, cause } => {
                FetchOutcome::Retryable { attempts, cause }
            }
            FetchOutcome::Fatal(cause) => FetchOutcome::Fatal(cause),
        }
    }

    /// Whether the call succeeded
    pub fn is_ok(&self) -> bool {
        matches!(self, FetchOutcome::Ok(_))
    }
}

impl<T> From<FetchError> for FetchOutcome<T> {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::RetriesExhausted { attempts, last } => FetchOutcome::Retryable {
                attempts,
                cause: last,
            },
            FetchError::Fatal(cause) => FetchOutcome::Fatal(cause),
        }
    }
}

/// Runs remote calls under a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    policy: RetryPolicy,
}

impl RetryingFetcher {
    /// Creates a fetcher
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Calls `op` until it succeeds or the policy gives up
    ///
    /// `label` names the call in log lines. Each failed attempt is logged
    /// once with its number, the classified cause and the delay before the
    /// next attempt.
    pub async fn call<T, F, Fut>(&self, label: &str, mut op: F) -> FetchOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match op().await {
                Ok(value) => return FetchOutcome::Ok(value),
                Err(err) => err,
            };

            match err.class {
                ErrorClass::NotFound => {
                    tracing::debug!(
                        call = label,
                        attempt,
                        max_attempts,
                        cause = %err.class,
                        error = %err,
                        "No data for call"
                    );
                    return FetchOutcome::Missing;
                }
                ErrorClass::Fatal => {
                    tracing::warn!(
                        call = label,
                        attempt,
                        max_attempts,
                        cause = %err.class,
                        error = %err,
                        "Call failed with non-retryable error"
                    );
                    return FetchOutcome::Fatal(err);
                }
                ErrorClass::RateLimited | ErrorClass::TransientService => {
                    if attempt >= max_attempts {
                        tracing::warn!(
                            call = label,
                            attempt,
                            max_attempts,
                            cause = %err.class,
                            error = %err,
                            "Giving up after final attempt"
                        );
                        return FetchOutcome::Retryable {
                            attempts: attempt,
                            cause: err,
                        };
                    }

                    let delay = self.policy.delay_for(err.class, attempt);
                    tracing::warn!(
                        call = label,
                        attempt,
                        max_attempts,
                        delay_ms = delay_ms(delay),
                        cause = %err.class,
                        error = %err,
                        "Retrying call after error"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
