//! Reconnect delay policy for non-logout disconnects.

use std::time::Duration;

use crate::config::ReconnectConfig;

/// Controls how the manager retries after a connection drop.
///
/// The default is a fixed 5-second delay with unlimited attempts and no
/// jitter, matching the bridge's long-standing behavior. Exponential growth,
/// an attempt cap, and jitter are all opt-in through `[reconnect]` config.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the first reconnect attempt.
    pub initial_delay: Duration,
    /// Maximum delay between attempts (cap).
    pub max_delay: Duration,
    /// Multiplier applied after each failed attempt.
    pub backoff_factor: f64,
    /// Maximum number of consecutive failures before giving up.
    /// `0` means unlimited retries.
    pub max_attempts: u32,
    /// Spread attempts by up to 25% extra delay.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(5),
            backoff_factor: 1.0,
            max_attempts: 0, // unlimited
            jitter: false,
        }
    }
}

impl From<&ReconnectConfig> for RetryPolicy {
    fn from(cfg: &ReconnectConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(cfg.delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms.max(cfg.delay_ms)),
            backoff_factor: cfg.backoff_factor,
            max_attempts: cfg.max_attempts,
            jitter: cfg.jitter,
        }
    }
}

impl RetryPolicy {
    /// Compute the delay for the given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_ms = self.initial_delay.as_millis() as f64;
        let delay_ms = base_ms * self.backoff_factor.powi(attempt as i32);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        if !self.jitter {
            return Duration::from_millis(capped_ms as u64);
        }

        let jitter = capped_ms * 0.25 * pseudo_random_fraction(attempt);
        Duration::from_millis((capped_ms + jitter) as u64)
    }

    /// Whether the given attempt number exceeds the max.
    pub fn should_give_up(&self, attempt: u32) -> bool {
        self.max_attempts > 0 && attempt >= self.max_attempts
    }
}

/// Cheap deterministic "random" fraction [0, 1) based on attempt number.
/// Not cryptographically secure — just enough to spread reconnect storms.
fn pseudo_random_fraction(attempt: u32) -> f64 {
    let hash = attempt.wrapping_mul(2654435761); // Knuth multiplicative hash
    (hash as f64) / (u32::MAX as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fixed_five_seconds() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_for_attempt(0), Duration::from_secs(5));
        assert_eq!(p.delay_for_attempt(7), Duration::from_secs(5));
        assert!(!p.should_give_up(1_000_000));
    }

    #[test]
    fn growth_capped_at_max_delay() {
        let p = RetryPolicy {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
            max_attempts: 0,
            jitter: false,
        };
        assert_eq!(p.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(p.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(p.delay_for_attempt(10), Duration::from_secs(30));
    }

    #[test]
    fn jitter_stays_within_quarter_of_delay() {
        let p = RetryPolicy {
            jitter: true,
            ..Default::default()
        };
        for attempt in 0..50 {
            let d = p.delay_for_attempt(attempt);
            assert!(d >= Duration::from_secs(5));
            assert!(d <= Duration::from_millis(6250));
        }
    }

    #[test]
    fn should_give_up_when_limited() {
        let p = RetryPolicy {
            max_attempts: 5,
            ..Default::default()
        };
        assert!(!p.should_give_up(4));
        assert!(p.should_give_up(5));
        assert!(p.should_give_up(6));
    }

    #[test]
    fn config_conversion_preserves_fixed_default() {
        let p = RetryPolicy::from(&ReconnectConfig::default());
        assert_eq!(p.initial_delay, Duration::from_secs(5));
        assert_eq!(p.max_delay, Duration::from_secs(5));
        assert_eq!(p.max_attempts, 0);
        assert!(!p.jitter);
    }

    #[test]
    fn config_conversion_lifts_max_below_initial() {
        let cfg = ReconnectConfig {
            delay_ms: 10_000,
            max_delay_ms: 1000,
            ..Default::default()
        };
        let p = RetryPolicy::from(&cfg);
        assert_eq!(p.max_delay, Duration::from_secs(10));
    }
}
