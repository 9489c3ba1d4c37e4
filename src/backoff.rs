//! Backoff policy for retrying operations.
//!
//! [`Backoff`] computes clamped exponential delays for the upload and
//! download retry loops; [`poll_delay`] computes the status-poll cadence,
//! which stays flat while polls succeed and escalates after consecutive
//! transient failures. Both are pure functions of their inputs.

use std::time::Duration;

/// Clamped exponential backoff: `multiplier * 2^(attempt - 1)`, bounded
/// by `min` and `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Base multiplier in milliseconds.
    pub multiplier_ms: u64,
    /// Lower clamp in milliseconds.
    pub min_ms: u64,
    /// Upper clamp in milliseconds.
    pub max_ms: u64,
}

impl Backoff {
    /// Policy for image upload retries: 2s, 4s, 8s, then clamped at 10s.
    pub fn upload() -> Self {
        Self {
            multiplier_ms: 2_000,
            min_ms: 1_000,
            max_ms: 10_000,
        }
    }

    /// Policy for artifact download retries: 1s, 2s, 4s.
    pub fn download() -> Self {
        Self {
            multiplier_ms: 1_000,
            min_ms: 1_000,
            max_ms: 10_000,
        }
    }

    /// Delay before retrying after the given failed attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(32);
        let raw = self.multiplier_ms.saturating_mul(1u64 << shift);
        Duration::from_millis(raw.clamp(self.min_ms, self.max_ms))
    }
}

/// Steady-state poll interval between status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Delay before the next status poll given the current consecutive
/// transient-failure streak.
///
/// A streak of zero means the last poll succeeded and the flat cadence
/// applies. Each consecutive failure widens the interval, capped at 15x
/// the cadence. At the default 2s cadence this yields 12s, 14s, ... 30s.
pub fn poll_delay(streak: u32, interval: Duration) -> Duration {
    if streak == 0 {
        interval
    } else {
        let escalated = interval.saturating_mul(5 + streak.min(32));
        escalated.min(interval.saturating_mul(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_backoff_sequence() {
        let b = Backoff::upload();
        assert_eq!(b.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(b.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(b.delay_for_attempt(3), Duration::from_secs(8));
        assert_eq!(b.delay_for_attempt(4), Duration::from_secs(10));
        assert_eq!(b.delay_for_attempt(5), Duration::from_secs(10));
    }

    #[test]
    fn download_backoff_doubles() {
        let b = Backoff::download();
        assert_eq!(b.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(b.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(b.delay_for_attempt(3), Duration::from_secs(4));
    }

    #[test]
    fn delay_is_monotonically_non_decreasing() {
        let b = Backoff::upload();
        let mut prev = Duration::ZERO;
        for attempt in 1..=20 {
            let d = b.delay_for_attempt(attempt);
            assert!(d >= prev, "attempt {attempt} decreased the delay");
            prev = d;
        }
    }

    #[test]
    fn delay_clamps_at_max_regardless_of_attempt() {
        let b = Backoff::upload();
        assert_eq!(b.delay_for_attempt(6), b.delay_for_attempt(10));
        assert_eq!(b.delay_for_attempt(10), Duration::from_millis(b.max_ms));
        // Large attempt numbers must not overflow the shift.
        assert_eq!(b.delay_for_attempt(u32::MAX), Duration::from_millis(b.max_ms));
    }

    #[test]
    fn delay_respects_min_clamp() {
        let b = Backoff {
            multiplier_ms: 100,
            min_ms: 1_000,
            max_ms: 10_000,
        };
        assert_eq!(b.delay_for_attempt(1), Duration::from_secs(1));
    }

    #[test]
    fn poll_delay_flat_while_healthy() {
        assert_eq!(poll_delay(0, POLL_INTERVAL), Duration::from_secs(2));
    }

    #[test]
    fn poll_delay_escalates_then_caps() {
        assert_eq!(poll_delay(1, POLL_INTERVAL), Duration::from_secs(12));
        assert_eq!(poll_delay(2, POLL_INTERVAL), Duration::from_secs(14));
        assert_eq!(poll_delay(10, POLL_INTERVAL), Duration::from_secs(30));
        assert_eq!(poll_delay(u32::MAX, POLL_INTERVAL), Duration::from_secs(30));
    }

    #[test]
    fn poll_delay_scales_with_interval() {
        let fast = Duration::from_millis(10);
        assert_eq!(poll_delay(0, fast), fast);
        assert_eq!(poll_delay(1, fast), Duration::from_millis(60));
        assert_eq!(poll_delay(100, fast), Duration::from_millis(150));
    }
}
