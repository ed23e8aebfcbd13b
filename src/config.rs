//! Node configuration parameters
//!
//! All tunable parameters for the sensor node. The host simulation binary
//! can override the defaults from a JSON file; on target the defaults apply.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    // --- Serial ---
    /// UART line rate (bits per second)
    pub uart_baud: u32,

    // --- Sampling ---
    /// Sampling interval each sensor starts with (seconds)
    pub default_interval_secs: u32,
    /// Shortest sampler cycle, applied when the interval is 0 (milliseconds)
    pub min_sample_period_ms: u32,

    // --- Actuation ---
    /// Relay re-apply period (milliseconds)
    pub relay_poll_ms: u32,

    // --- Blocking policy ---
    /// Upper bound on device/relay/serial lock waits (milliseconds).
    /// `None` waits forever.
    pub lock_timeout_ms: Option<u32>,

    // --- Housekeeping ---
    /// Period of the diagnostics counter log line (seconds)
    pub diagnostics_interval_secs: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            uart_baud: 9600,
            default_interval_secs: 2,
            min_sample_period_ms: 10, // one FreeRTOS tick at 100 Hz
            relay_poll_ms: 100,
            lock_timeout_ms: None,
            diagnostics_interval_secs: 60,
        }
    }
}

impl NodeConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(bytes).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the task loops cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uart_baud == 0 {
            return Err(ConfigError::ValidationFailed("uart_baud must be > 0"));
        }
        if self.min_sample_period_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "min_sample_period_ms must be > 0",
            ));
        }
        if self.relay_poll_ms == 0 {
            return Err(ConfigError::ValidationFailed("relay_poll_ms must be > 0"));
        }
        if self.diagnostics_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "diagnostics_interval_secs must be > 0",
            ));
        }
        Ok(())
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }

    pub fn min_sample_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.min_sample_period_ms))
    }

    pub fn relay_poll(&self) -> Duration {
        Duration::from_millis(u64::from(self.relay_poll_ms))
    }
}
