//! Request pacing shared across document workers.

use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::config::RateLimitConfig;

/// Longest gap between two requests a limiter will ever impose.
pub const MAX_INTERVAL: Duration = Duration::from_secs(60 * 60);

const MIN_INTERVAL: Duration = Duration::from_nanos(1);

/// Time between requests at `requests_per_second`, clamped to
/// `1ns..=MAX_INTERVAL`. Zero, negative and non-finite rates map to
/// [`MAX_INTERVAL`].
#[must_use]
pub fn interval_for(requests_per_second: f64) -> Duration {
    Duration::try_from_secs_f64(requests_per_second.recip())
        .unwrap_or(MAX_INTERVAL)
        .clamp(MIN_INTERVAL, MAX_INTERVAL)
}

/// Bounds the aggregate request rate of a run.
///
/// A GCRA limiter: `burst` requests may go out back to back, after which
/// requests are spaced by [`interval_for`] the configured rate.
pub struct RateLimiter {
    inner: DefaultDirectRateLimiter,
    interval: Duration,
    burst: NonZeroU32,
}

impl RateLimiter {
    /// Creates a limiter. A `burst` of 0 is treated as 1.
    #[must_use]
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        let interval = interval_for(requests_per_second);
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(interval)
            .unwrap_or_else(|| Quota::per_hour(NonZeroU32::MIN))
            .allow_burst(burst);

        Self {
            inner: governor::RateLimiter::direct(quota),
            interval,
            burst,
        }
    }

    /// Creates a limiter from configuration.
    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_second, config.burst)
    }

    /// Spacing between requests once the burst is spent.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Takes a permit if one is available right now.
    pub fn try_acquire(&self) -> bool {
        self.inner.check().is_ok()
    }

    /// Waits until a permit is available and takes it.
    pub async fn acquire(&self) {
        self.inner.until_ready().await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("interval", &self.interval)
            .field("burst", &self.burst)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn test_interval_for() {
        assert_eq!(interval_for(2.0), Duration::from_millis(500));
        assert_eq!(interval_for(0.0), MAX_INTERVAL);
        assert_eq!(interval_for(-1.0), MAX_INTERVAL);
        assert_eq!(interval_for(f64::NAN), MAX_INTERVAL);
        assert_eq!(interval_for(1e-30), MAX_INTERVAL);
        assert_eq!(interval_for(1e30), MIN_INTERVAL);
    }

    #[test]
    fn test_extreme_rates_do_not_panic() {
        let slow = RateLimiter::new(1e-30, 1);
        assert_eq!(slow.interval(), MAX_INTERVAL);
        assert!(slow.try_acquire());
        assert!(!slow.try_acquire());

        let fast = RateLimiter::new(f64::MAX, 0);
        assert!(fast.try_acquire());
    }

    #[tokio::test]
    async fn test_burst_is_immediate() {
        let limiter = RateLimiter::new(1.0, 3);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() < Duration::from_millis(200));
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_sustained_rate() {
        let limiter = RateLimiter::new(20.0, 1);
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        // First permit is free, the other four arrive every 50ms.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(190), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_shared_between_tasks() {
        let limiter = Arc::new(RateLimiter::new(20.0, 1));
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_millis(90));
    }
}
