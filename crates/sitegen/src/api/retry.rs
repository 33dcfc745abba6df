//! Bounded attempts with exponential backoff.
//!
//! Every failed attempt is retried until `max_attempts` is reached; the
//! delay before attempt `n + 1` is `initial_delay * multiplier^n`, capped at
//! `max_delay`. The defaults reproduce the generator's fixed schedule of
//! three attempts separated by 1s and 2s.

use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first (0 is treated as 1).
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
    /// Backoff multiplier (2.0 for power-of-two backoff).
    pub multiplier: f64,
    /// Whether to shorten delays with deterministic jitter.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Create a config with the given number of attempts. Uses default delays.
    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            max_attempts: attempts,
            ..Default::default()
        }
    }

    /// A config that never sleeps. Useful for tests and dry runs.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            max_attempts: attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    /// Attempts actually made, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Calculate the delay after a failed attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        if self.jitter {
            // Deterministic jitter keyed on the attempt number; no rand dependency.
            let jitter_factor = match attempt % 4 {
                0 => 0.75,
                1 => 0.90,
                2 => 0.60,
                _ => 0.85,
            };
            Duration::from_secs_f64(capped * jitter_factor)
        } else {
            Duration::from_secs_f64(capped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_three_attempts() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert!(!config.jitter);
    }

    #[test]
    fn default_schedule_is_power_of_two_seconds() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(4));
    }

    #[test]
    fn delay_capped_at_max() {
        let config = RetryConfig {
            max_delay: Duration::from_secs(2),
            ..RetryConfig::with_attempts(10)
        };
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(2));
    }

    #[test]
    fn jitter_reduces_delay() {
        let jittered = RetryConfig {
            jitter: true,
            ..RetryConfig::default()
        };
        let plain = RetryConfig::default();
        assert!(jittered.delay_for_attempt(2) <= plain.delay_for_attempt(2));
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        assert_eq!(RetryConfig::with_attempts(0).attempts(), 1);
        assert_eq!(RetryConfig::immediate(5).attempts(), 5);
        assert_eq!(RetryConfig::immediate(5).delay_for_attempt(3), Duration::ZERO);
    }
}
