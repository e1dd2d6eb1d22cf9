//! Reconnect backoff
//!
//! A dropped station is retried after `min`, then after twice the previous
//! delay, capped at `max`. A successful connect or a settings change resets
//! the delay to `min`.

use embassy_time::Duration;

/// Exponential reconnect delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectBackoff {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl ReconnectBackoff {
    /// `max` below `min` is raised to `min`
    pub fn new(min: Duration, max: Duration) -> Self {
        let max = if max < min { min } else { max };
        Self {
            min,
            max,
            current: min,
        }
    }

    /// Delay before the next attempt
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Record a failed attempt: double the delay up to the ceiling
    pub fn advance(&mut self) -> Duration {
        let doubled = Duration::from_ticks(self.current.as_ticks().saturating_mul(2));
        self.current = if doubled > self.max { self.max } else { doubled };
        self.current
    }

    /// Back to the minimum delay
    pub fn reset(&mut self) {
        self.current = self.min;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_to_ceiling() {
        let mut backoff =
            ReconnectBackoff::new(Duration::from_millis(500), Duration::from_millis(3000));
        assert_eq!(backoff.current().as_millis(), 500);
        assert_eq!(backoff.advance().as_millis(), 1000);
        assert_eq!(backoff.advance().as_millis(), 2000);
        assert_eq!(backoff.advance().as_millis(), 3000);
        assert_eq!(backoff.advance().as_millis(), 3000);
    }

    #[test]
    fn test_backoff_reset() {
        let mut backoff = ReconnectBackoff::new(Duration::from_secs(1), Duration::from_secs(60));
        backoff.advance();
        backoff.advance();
        backoff.reset();
        assert_eq!(backoff.current(), Duration::from_secs(1));
    }

    #[test]
    fn test_backoff_max_below_min() {
        let mut backoff = ReconnectBackoff::new(Duration::from_secs(5), Duration::from_secs(1));
        assert_eq!(backoff.advance(), Duration::from_secs(5));
    }
}
