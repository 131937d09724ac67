//! Retry policy for rate-limited queries.

use std::time::Duration;

/// Backoff strategy between attempts at the same query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Fixed delay between attempts.
    Fixed {
        delay: Duration,
    },
    /// Exponential delay, calculated as `base * (factor ^ attempt)`.
    Exponential {
        base: Duration,
        factor: f64,
        /// Upper bound for a single delay.
        max: Duration,
        /// Apply +/- 50% random jitter to the delay.
        jitter: bool,
    },
}

impl Backoff {
    /// Delay before the retry following `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(attempt as i32);
                let seconds = base.as_secs_f64() * scale;
                let capped_seconds = seconds.min(max.as_secs_f64());

                let mut delay = Duration::from_secs_f64(capped_seconds);

                if jitter {
                    let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
                    let random_offset = fastrand::u64(0..=(jitter_ms * 2));
                    let total_ms =
                        delay.as_millis() as i64 + (random_offset as i64 - jitter_ms as i64);
                    delay = Duration::from_millis(total_ms.max(0) as u64);
                }

                delay
            }
        }
    }
}

impl Default for Backoff {
    /// The rate-limit ladder: 1s, 2s, 4s, no jitter. Deterministic
    /// delays keep retry timing predictable and testable.
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(4),
            jitter: false,
        }
    }
}

/// How often one query is tried before the pipeline escalates to the
/// next lookback window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts at a single query, first try included.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget, zero delays. Used by tests and offline runs.
    pub fn without_delays() -> Self {
        Self {
            backoff: Backoff::Fixed {
                delay: Duration::ZERO,
            },
            ..Self::default()
        }
    }

    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}
