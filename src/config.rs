//! Loop timing configuration.

use std::fmt;
use std::time::Duration;

/// Timing for sampling loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Default interval between ticks.
    pub interval: Duration,
    /// Delay before the first tick of a new loop.
    pub initial_delay: Duration,
    /// Upper bound for a single sensor read.
    pub sample_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            initial_delay: Duration::from_millis(100),
            sample_timeout: Duration::from_secs(2),
        }
    }
}

impl LoopConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_sample_timeout(mut self, timeout: Duration) -> Self {
        self.sample_timeout = timeout;
        self
    }

    /// Rejects zero intervals and timeouts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.sample_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroInterval,
    ZeroTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroInterval => write!(f, "interval must be greater than zero"),
            ConfigError::ZeroTimeout => write!(f, "sample timeout must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_one_second_refresh() {
        let config = LoopConfig::default();
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.initial_delay, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = LoopConfig::default().with_interval(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));

        let config = LoopConfig::default().with_sample_timeout(Duration::ZERO);
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "sample timeout must be greater than zero"
        );
    }
}
