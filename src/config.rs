// MIT License - Copyright (c) 2026 Peter Wright

use std::time::Duration;

/// Static configuration for the alarm entity, loaded once at setup.
#[derive(Debug, Clone)]
pub struct AlarmConfig {
    /// User code checked before arm/disarm commands.
    pub user_code: String,
    /// Skip the code check entirely; all commands proceed regardless of
    /// the code argument, including an absent one.
    pub no_pin_required: bool,
    /// Hour offset applied when fetching the last change record,
    /// correcting panel/host timezone skew.
    pub event_hour_offset: i32,
    /// Interval at which the host should poll `update()`.
    pub scan_interval: Duration,
    /// Wait after issuing a command before trusting a fresh read.
    pub settle_delay: Duration,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            user_code: String::new(),
            no_pin_required: false,
            event_hour_offset: 0,
            scan_interval: Duration::from_secs(10),
            settle_delay: Duration::from_secs(1),
        }
    }
}

impl AlarmConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> AlarmConfigBuilder {
        AlarmConfigBuilder::default()
    }
}

/// Builder for AlarmConfig.
#[derive(Debug, Clone, Default)]
pub struct AlarmConfigBuilder {
    config: AlarmConfig,
}

impl AlarmConfigBuilder {
    pub fn user_code(mut self, code: impl Into<String>) -> Self {
        self.config.user_code = code.into();
        self
    }

    pub fn no_pin_required(mut self, no_pin: bool) -> Self {
        self.config.no_pin_required = no_pin;
        self
    }

    pub fn event_hour_offset(mut self, hours: i32) -> Self {
        self.config.event_hour_offset = hours;
        self
    }

    pub fn scan_interval(mut self, interval: Duration) -> Self {
        self.config.scan_interval = interval;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    pub fn build(self) -> AlarmConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AlarmConfig::default();
        assert_eq!(config.user_code, "");
        assert!(!config.no_pin_required);
        assert_eq!(config.event_hour_offset, 0);
        assert_eq!(config.scan_interval, Duration::from_secs(10));
        assert_eq!(config.settle_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_config_builder() {
        let config = AlarmConfig::builder()
            .user_code("1234")
            .no_pin_required(false)
            .event_hour_offset(-2)
            .scan_interval(Duration::from_secs(30))
            .settle_delay(Duration::from_millis(500))
            .build();

        assert_eq!(config.user_code, "1234");
        assert_eq!(config.event_hour_offset, -2);
        assert_eq!(config.scan_interval, Duration::from_secs(30));
        assert_eq!(config.settle_delay, Duration::from_millis(500));
    }
}
