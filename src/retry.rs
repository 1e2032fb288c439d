//! Optional retry with exponential backoff for upstream sources.
//!
//! [`RetrySource`] decorates any [`ArticleSource`] and re-runs a failed fetch
//! after a growing delay. The server wires every source through it with
//! `max_retries` from the config, which defaults to `0`: a failed fetch fails
//! the request immediately unless retries are turned on.
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..=jitter)
//! ```
//!
//! - `max_delay` is capped at 30 seconds
//! - jitter defaults to 250ms to keep concurrent retries from lining up

use crate::error::NewsError;
use crate::models::Article;
use crate::sources::ArticleSource;
use rand::{rng, Rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Wrapper that adds exponential backoff retry logic to an [`ArticleSource`].
pub struct RetrySource<S> {
    /// The source being retried.
    inner: S,
    /// Retries after the first attempt; `0` disables retrying.
    max_retries: usize,
    /// Delay before the first retry (doubles with each attempt).
    base_delay: Duration,
    max_delay: Duration,
    /// Upper bound of the random extra delay, in milliseconds.
    jitter_ms: u64,
}

impl<S: ArticleSource> RetrySource<S> {
    pub fn new(inner: S, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
            jitter_ms: 250,
        }
    }

    pub fn with_jitter(mut self, jitter_ms: u64) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    fn delay_for(&self, attempt: usize) -> Duration {
        let exp = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        let delay = self.base_delay.saturating_mul(1 << exp).min(self.max_delay);
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rng().random_range(0..=self.jitter_ms)
        };
        delay + Duration::from_millis(jitter)
    }
}

impl<S> fmt::Debug for RetrySource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrySource")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<S: ArticleSource> ArticleSource for RetrySource<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    #[instrument(level = "info", skip_all, fields(source = self.inner.name()))]
    async fn fetch(&self, category: &str) -> Result<Vec<Article>, NewsError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(category).await {
                Ok(articles) => return Ok(articles),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        if self.max_retries > 0 {
                            error!(
                                attempt,
                                max = self.max_retries,
                                elapsed_ms_total = total_dt.as_millis(),
                                error = %e,
                                "fetch() exhausted retries"
                            );
                        }
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` calls, then succeeds.
    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
    }

    impl Flaky {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ArticleSource for Flaky {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn fetch(&self, _category: &str) -> Result<Vec<Article>, NewsError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(NewsError::upstream("flaky", "boom"))
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[tokio::test]
    async fn test_no_retries_by_default_config() {
        let source = RetrySource::new(Flaky::new(1), 0, Duration::from_millis(1)).with_jitter(0);

        assert!(source.fetch("geral").await.is_err());
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_within_retry_budget() {
        let source = RetrySource::new(Flaky::new(2), 2, Duration::from_millis(1)).with_jitter(0);

        assert!(source.fetch("geral").await.is_ok());
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let source = RetrySource::new(Flaky::new(5), 2, Duration::from_millis(1)).with_jitter(0);

        let err = source.fetch("geral").await.unwrap_err();
        assert!(matches!(err, NewsError::Upstream { origin: "flaky", .. }));
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let source = RetrySource::new(Flaky::new(0), 10, Duration::from_secs(1)).with_jitter(0);

        assert_eq!(source.delay_for(1), Duration::from_secs(1));
        assert_eq!(source.delay_for(2), Duration::from_secs(2));
        assert_eq!(source.delay_for(3), Duration::from_secs(4));
        assert_eq!(source.delay_for(10), Duration::from_secs(30));
    }

    #[test]
    fn test_name_is_forwarded() {
        let source = RetrySource::new(Flaky::new(0), 0, Duration::ZERO);
        assert_eq!(source.name(), "flaky");
    }
}
