//! Reconnect backoff for the chat socket.

use std::time::Duration;

use fusion_types::config::ReconnectConfig;
use rand::Rng;

/// Exponential backoff with a cap, symmetric jitter and an optional attempt limit.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub jitter: f64,
    pub max_attempts: Option<u32>,
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt `attempt` (1-based), or `None` once the
    /// attempt limit is exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 {
            return Some(Duration::ZERO);
        }
        if self.max_attempts.is_some_and(|max| attempt > max) {
            return None;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let base_ms = self.initial_delay.as_millis() as f64 * self.multiplier.max(1.0).powi(exponent);
        let cap_ms = self.max_delay.as_millis() as f64;
        let mut delay_ms = base_ms.min(cap_ms);

        let jitter = self.jitter.clamp(0.0, 1.0);
        if jitter > 0.0 {
            let factor = rand::thread_rng().gen_range((1.0 - jitter)..=(1.0 + jitter));
            delay_ms = (delay_ms * factor).min(cap_ms);
        }

        Some(Duration::from_millis(delay_ms.max(0.0) as u64))
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = 0.0;
        self
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&ReconnectConfig::default())
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms.max(config.initial_delay_ms)),
            multiplier: config.multiplier,
            jitter: config.jitter,
            max_attempts: config.max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(20),
            multiplier: 2.0,
            jitter: 0.0,
            max_attempts: Some(4),
        }
    }

    #[test]
    fn grows_exponentially_up_to_cap() {
        let p = policy();
        assert_eq!(p.delay_for(1), Some(Duration::from_secs(3)));
        assert_eq!(p.delay_for(2), Some(Duration::from_secs(6)));
        assert_eq!(p.delay_for(3), Some(Duration::from_secs(12)));
        assert_eq!(p.delay_for(4), Some(Duration::from_secs(20)));
    }

    #[test]
    fn stops_after_max_attempts() {
        assert_eq!(policy().delay_for(5), None);
        let unlimited = ReconnectPolicy {
            max_attempts: None,
            ..policy()
        };
        assert_eq!(unlimited.delay_for(500), Some(Duration::from_secs(20)));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let p = ReconnectPolicy {
            jitter: 0.5,
            ..policy()
        };
        for _ in 0..100 {
            let d = p.delay_for(1).unwrap();
            assert!(d >= Duration::from_millis(1_500), "{d:?}");
            assert!(d <= Duration::from_millis(4_500), "{d:?}");
        }
    }

    #[test]
    fn default_first_delay_is_three_seconds() {
        let p = ReconnectPolicy::default().without_jitter();
        assert_eq!(p.delay_for(1), Some(Duration::from_secs(3)));
    }
}
