// Serial link, timing, safety and topic configuration
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::hoverboard::transport::DEFAULT_BAUDRATE;
use crate::motor::DEFAULT_SAFETY_DISTANCE;

// Serial port wired to the hoverboard USART (8N1)
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

// Runtime loop frequency (receive drain rate)
pub const LOOP_HZ: u64 = 100;

// Loop period is whole milliseconds, so faster rates round to zero
pub const MAX_LOOP_HZ: u64 = 1000;

// Interval between command frames
pub const SEND_INTERVAL_MS: u64 = 100;

// Command timeout for watchdog (0 disables it)
pub const CMD_TIMEOUT_MS: u64 = 250;

// No valid feedback for this long marks the link stale
pub const FEEDBACK_TIMEOUT_MS: u64 = 1000;

// A distance reading older than this counts as no reading
pub const SENSOR_TIMEOUT_MS: u64 = 500;

// Zenoh topics
pub const TOPIC_CMD_DRIVE: &str = "hoverboard/cmd/drive"; // drive commands
pub const TOPIC_SENSOR_DISTANCE: &str = "hoverboard/sensor/distance"; // proximity readings
pub const TOPIC_FEEDBACK: &str = "hoverboard/state/feedback"; // board telemetry
pub const TOPIC_HEALTH: &str = "hoverboard/state/health"; // health status

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Bridge configuration. Missing fields in a config file take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub port: String,
    pub baud_rate: u32,
    pub send_interval_ms: u64,
    pub loop_hz: u64,
    pub safety_distance_cm: i32,
    pub cmd_timeout_ms: u64,
    pub feedback_timeout_ms: u64,
    pub sensor_timeout_ms: u64,
    pub topic_cmd: String,
    pub topic_distance: String,
    pub topic_feedback: String,
    pub topic_health: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUDRATE,
            send_interval_ms: SEND_INTERVAL_MS,
            loop_hz: LOOP_HZ,
            safety_distance_cm: DEFAULT_SAFETY_DISTANCE,
            cmd_timeout_ms: CMD_TIMEOUT_MS,
            feedback_timeout_ms: FEEDBACK_TIMEOUT_MS,
            sensor_timeout_ms: SENSOR_TIMEOUT_MS,
            topic_cmd: TOPIC_CMD_DRIVE.to_string(),
            topic_distance: TOPIC_SENSOR_DISTANCE.to_string(),
            topic_feedback: TOPIC_FEEDBACK.to_string(),
            topic_health: TOPIC_HEALTH.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port.is_empty() {
            return Err(ConfigError::Invalid("port must not be empty".into()));
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::Invalid("baud_rate must be > 0".into()));
        }
        if self.loop_hz == 0 || self.loop_hz > MAX_LOOP_HZ {
            return Err(ConfigError::Invalid(format!(
                "loop_hz must be in 1..={}",
                MAX_LOOP_HZ
            )));
        }
        if self.send_interval_ms == 0 {
            return Err(ConfigError::Invalid("send_interval_ms must be > 0".into()));
        }
        // Sends happen on loop ticks, so the interval can't beat the loop period
        if self.send_interval() < self.loop_period() {
            return Err(ConfigError::Invalid(format!(
                "send_interval_ms ({}) is shorter than the loop period ({}ms)",
                self.send_interval_ms,
                self.loop_period().as_millis()
            )));
        }
        if self.safety_distance_cm < 0 {
            return Err(ConfigError::Invalid(
                "safety_distance_cm must not be negative".into(),
            ));
        }
        if self.sensor_timeout_ms == 0 {
            return Err(ConfigError::Invalid("sensor_timeout_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }

    pub fn loop_period(&self) -> Duration {
        Duration::from_millis(1000 / self.loop_hz.max(1))
    }

    /// `None` when the command watchdog is disabled
    pub fn cmd_timeout(&self) -> Option<Duration> {
        (self.cmd_timeout_ms > 0).then(|| Duration::from_millis(self.cmd_timeout_ms))
    }

    pub fn feedback_timeout(&self) -> Duration {
        Duration::from_millis(self.feedback_timeout_ms)
    }

    pub fn sensor_timeout(&self) -> Duration {
        Duration::from_millis(self.sensor_timeout_ms)
    }
}
