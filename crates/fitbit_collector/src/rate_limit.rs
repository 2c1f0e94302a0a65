//! Sliding-window call quota.
//!
//! The limiter remembers when each admitted call happened. A new call is
//! admitted once fewer than `max_calls` of those instants fall inside the
//! trailing `window`; otherwise the caller sleeps until the oldest one ages
//! out. Calls are delayed, never refused.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{CollectorError, CollectorResult};

pub const HOUR: Duration = Duration::from_secs(60 * 60);

#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    admitted: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_calls: u32, window: Duration) -> CollectorResult<Self> {
        if max_calls == 0 {
            return Err(CollectorError::Config(
                "max calls per window must be at least 1".into(),
            ));
        }
        if window.is_zero() {
            return Err(CollectorError::Config("quota window must be non-zero".into()));
        }
        Ok(Self {
            max_calls: max_calls as usize,
            window,
            admitted: VecDeque::new(),
        })
    }

    pub fn per_hour(max_calls: u32) -> CollectorResult<Self> {
        Self::new(max_calls, HOUR)
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Calls admitted within the trailing window as of `now`.
    pub fn calls_in_window(&mut self, now: Instant) -> usize {
        self.evict(now);
        self.admitted.len()
    }

    /// Wait until the quota admits one more call and record it.
    /// Returns how long the caller was suspended.
    pub async fn acquire(&mut self) -> Duration {
        let started = Instant::now();
        loop {
            let now = Instant::now();
            self.evict(now);
            if self.admitted.len() < self.max_calls {
                self.admitted.push_back(now);
                return now - started;
            }
            // Full queue, so there is a front entry.
            let Some(&oldest) = self.admitted.front() else {
                continue;
            };
            let ready_at = oldest + self.window;
            tracing::info!(
                max_calls = self.max_calls,
                wait_secs = ready_at.saturating_duration_since(now).as_secs(),
                "call quota reached, waiting for window to free up"
            );
            tokio::time::sleep_until(ready_at).await;
        }
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&front) = self.admitted.front() {
            if now.saturating_duration_since(front) >= self.window {
                self.admitted.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quota_is_rejected() {
        assert!(matches!(
            RateLimiter::per_hour(0),
            Err(CollectorError::Config(_))
        ));
        assert!(RateLimiter::new(5, Duration::ZERO).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn calls_under_quota_do_not_wait() {
        let mut limiter = RateLimiter::per_hour(3).unwrap();
        for _ in 0..3 {
            assert_eq!(limiter.acquire().await, Duration::ZERO);
        }
        assert_eq!(limiter.calls_in_window(Instant::now()), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn call_over_quota_waits_for_oldest_to_expire() {
        let mut limiter = RateLimiter::per_hour(2).unwrap();
        let t0 = Instant::now();
        limiter.acquire().await;
        tokio::time::advance(Duration::from_secs(600)).await;
        limiter.acquire().await;

        let waited = limiter.acquire().await;
        assert!(waited >= Duration::from_secs(3000));
        assert!(waited < Duration::from_secs(3001));
        assert!(Instant::now() - t0 >= HOUR);
        assert_eq!(limiter.calls_in_window(Instant::now()), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn no_trailing_window_ever_exceeds_quota() {
        let quota = 4;
        let mut limiter = RateLimiter::per_hour(quota).unwrap();
        let mut stamps = Vec::new();
        for i in 0..23 {
            limiter.acquire().await;
            stamps.push(Instant::now());
            if i % 5 == 0 {
                tokio::time::advance(Duration::from_secs(7 * 60)).await;
            }
        }
        for (i, at) in stamps.iter().enumerate() {
            let in_window = stamps[..=i]
                .iter()
                .filter(|earlier| *at - **earlier < HOUR)
                .count();
            assert!(in_window <= quota as usize, "call {i} saw {in_window} calls");
        }
    }
}
