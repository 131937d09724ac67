use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Outbound request pacer. The pipeline consults it before every
/// upstream call so bursts of window escalation cannot hammer an
/// already-throttling API.
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Arc<DirectRateLimiter>,
    wait_hint: Duration,
}

impl RequestPacer {
    /// Allow `quota_limit` requests per `quota_window`, with the full
    /// limit available as burst.
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        let (quota, wait_hint) = quota_parts(quota_window, quota_limit);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            wait_hint,
        }
    }

    /// Tries to acquire rate budget. When the budget is spent the
    /// recommended wait before re-asking is returned.
    pub fn acquire(&self) -> Result<(), Duration> {
        if self.limiter.check().is_ok() {
            return Ok(());
        }
        Err(self.wait_hint)
    }
}

impl Default for RequestPacer {
    /// 60 requests per minute. Generous enough that a single fetch with
    /// full window escalation never queues behind itself.
    fn default() -> Self {
        Self::new(Duration::from_secs(60), 60)
    }
}

fn quota_parts(quota_window: Duration, quota_limit: u32) -> (Quota, Duration) {
    let safe_limit = quota_limit.max(1);
    let burst = NonZeroU32::new(safe_limit).expect("safe limit must be non-zero");

    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    let quota = Quota::with_period(period)
        .expect("period is always greater than zero")
        .allow_burst(burst);
    (quota, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_a_wait_when_budget_is_spent() {
        let pacer = RequestPacer::new(Duration::from_secs(60), 2);

        assert!(pacer.acquire().is_ok());
        assert!(pacer.acquire().is_ok());

        let wait = pacer.acquire().expect_err("third request should wait");
        assert_eq!(wait, Duration::from_secs(30));
    }

    #[test]
    fn default_budget_covers_a_full_escalation() {
        let pacer = RequestPacer::default();
        // Range attempt plus retries plus all five windows with retries.
        for _ in 0..18 {
            assert!(pacer.acquire().is_ok());
        }
    }
}
