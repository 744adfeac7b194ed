//! Watcher configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the SaveWatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Events closer together than this are one save
    #[serde(default = "default_settle_ms", rename = "settle-ms")]
    pub settle_ms: u64,

    /// Arm the session when watching starts
    #[serde(default = "default_start_armed", rename = "start-armed")]
    pub start_armed: bool,
}

fn default_settle_ms() -> u64 {
    75
}

fn default_start_armed() -> bool {
    true
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            start_armed: default_start_armed(),
        }
    }
}

impl WatcherConfig {
    /// Get the settle window as a Duration
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WatcherConfig::default();
        assert_eq!(config.settle_ms, 75);
        assert!(config.start_armed);
    }

    #[test]
    fn test_settle_duration() {
        let config = WatcherConfig {
            settle_ms: 250,
            ..Default::default()
        };
        assert_eq!(config.settle(), Duration::from_millis(250));
    }
}
