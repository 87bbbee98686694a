//! Monitor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default keep-alive probe interval.
///
/// Push notifications from the cradle driver silently stop firing after the
/// device idles or sleeps, so the monitor re-queries state on this period as
/// a redundant pull path. 5 seconds is the value validated in the field;
/// longer intervals (30 s was tried) leave a visible window where an
/// extraction goes unreported after wake. The right value is
/// hardware-dependent, which is why it is configuration and not a constant.
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(5);

/// Default capacity of the emitted-event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 32;

/// Configuration for the presence monitor.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cradlewatch_core::MonitorConfig;
///
/// let config = MonitorConfig::default()
///     .with_keep_alive_interval(Duration::from_secs(10));
/// assert_eq!(config.keep_alive_interval, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Interval between keep-alive probes of the cradle state.
    pub keep_alive_interval: Duration,

    /// Capacity of the channel carrying emitted insertion-state events.
    pub event_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            keep_alive_interval: DEFAULT_KEEP_ALIVE_INTERVAL,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl MonitorConfig {
    /// Set the keep-alive probe interval.
    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    /// Set the emitted-event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = MonitorConfig::default();
        assert_eq!(config.keep_alive_interval, DEFAULT_KEEP_ALIVE_INTERVAL);
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
    }

    #[test]
    fn test_config_builders() {
        let config = MonitorConfig::default()
            .with_keep_alive_interval(Duration::from_millis(500))
            .with_event_capacity(8);

        assert_eq!(config.keep_alive_interval, Duration::from_millis(500));
        assert_eq!(config.event_capacity, 8);
    }
}
