//! Exponential backoff for collaborator API calls.
//!
//! Both the GitHub and the Jenkins clients wrap every request in
//! [`retry_with_backoff`]. Only errors classified as [`ErrorKind::Transient`]
//! are retried; permanent errors are returned after the first attempt.
//!
//! The request handlers never retry on their own: a call either succeeds
//! here or surfaces as a collaborator failure.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Retry classification of a collaborator error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Safe to retry with backoff (5xx, rate limits, network failures).
    Transient,

    /// Retrying cannot help (4xx, bad credentials, unknown job).
    Permanent,
}

/// Errors that carry a retry classification.
pub trait Classified {
    fn kind(&self) -> ErrorKind;

    fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

/// Backoff settings. The delay doubles after every retry up to `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryConfig {
    /// 3 retries after 2s, 4s and 8s.
    pub const DEFAULT: Self = Self {
        max_retries: 3,
        initial_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(16),
    };

    /// A single attempt.
    pub const NONE: Self = Self {
        max_retries: 0,
        initial_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    };

    /// Delay before retry number `retry` (0 is the first retry).
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Every delay in order, one per retry.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(|retry| self.delay(retry))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Runs `operation` until it succeeds, fails permanently, or runs out of
/// retries. The last error is returned on failure.
pub async fn retry_with_backoff<T, E, F, Fut>(config: RetryConfig, mut operation: F) -> Result<T, E>
where
    E: Classified + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut retry = 0;
    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !error.is_transient() {
            return Err(error);
        }
        if retry >= config.max_retries {
            warn!(attempts = retry + 1, error = %error, "Giving up after transient failures");
            return Err(error);
        }

        let delay = config.delay(retry);
        debug!(retry, ?delay, error = %error, "Transient failure, retrying");
        tokio::time::sleep(delay).await;
        retry += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Flaky(ErrorKind);

    impl Display for Flaky {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?} failure", self.0)
        }
    }

    impl Classified for Flaky {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    fn quick(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    /// Fails with `kind` for the first `failures` calls, then succeeds.
    async fn run(config: RetryConfig, kind: ErrorKind, failures: u32) -> (Result<u32, Flaky>, u32) {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(config, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < failures { Err(Flaky(kind)) } else { Ok(n) } }
        })
        .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[test]
    fn default_schedule_is_2_4_8() {
        let delays: Vec<_> = RetryConfig::DEFAULT.schedule().collect();
        assert_eq!(
            delays,
            [2, 4, 8].map(Duration::from_secs).to_vec()
        );
    }

    #[test]
    fn delay_is_capped() {
        assert_eq!(RetryConfig::DEFAULT.delay(10), Duration::from_secs(16));
        assert_eq!(RetryConfig::DEFAULT.delay(40), Duration::from_secs(16));
    }

    #[tokio::test]
    async fn first_success_makes_one_call() {
        let (result, calls) = run(quick(3), ErrorKind::Transient, 0).await;
        assert_eq!(result.unwrap(), 0);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let (result, calls) = run(quick(3), ErrorKind::Permanent, 5).await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn transient_error_recovers() {
        let (result, calls) = run(quick(3), ErrorKind::Transient, 2).await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn transient_error_exhausts_retries() {
        let (result, calls) = run(quick(2), ErrorKind::Transient, 10).await;
        assert!(matches!(result, Err(Flaky(ErrorKind::Transient))));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn none_makes_a_single_attempt() {
        let (result, calls) = run(RetryConfig::NONE, ErrorKind::Transient, 1).await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    proptest! {
        #[test]
        fn schedule_doubles_until_capped(
            initial_ms in 1u64..2000,
            max_ms in 2000u64..60000,
            max_retries in 1u32..20,
        ) {
            let config = RetryConfig {
                max_retries,
                initial_delay: Duration::from_millis(initial_ms),
                max_delay: Duration::from_millis(max_ms),
            };

            let delays: Vec<_> = config.schedule().collect();
            prop_assert_eq!(delays.len(), max_retries as usize);
            prop_assert_eq!(delays[0], Duration::from_millis(initial_ms));
            for pair in delays.windows(2) {
                prop_assert!(pair[1] == pair[0] * 2 || pair[1] == config.max_delay);
            }
            prop_assert!(delays.iter().all(|d| *d <= config.max_delay));
        }
    }
}
