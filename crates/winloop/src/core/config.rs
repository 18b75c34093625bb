//! # Unified Configuration System
//!
//! Runtime-wide settings that are not tied to a single window. Window
//! creation parameters live in [`crate::window::WindowConfig`].
//!
//! ## Configuration Categories
//!
//! - **Scheduler Config**: loop exit policy, event waiting, frame pacing
//! - **Input Config**: click and double-click synthesis thresholds
//! - **Logging Config**: default log filter
//!
//! Every struct deserializes with defaults for missing fields, so a config
//! file only needs to name what it changes.

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// # Scheduler Configuration
///
/// Controls how the frame scheduler paces ticks and when it stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Stop the loop once the last window has been closed
    pub auto_exit_when_no_windows: bool,
    /// Block at the start of a tick until the platform has events
    pub wait_for_events: bool,
    /// Upper bound for the blocking wait, in milliseconds
    pub wait_timeout_ms: Option<u64>,
    /// Sleep between ticks to hold this frame rate
    pub target_fps: Option<u32>,
}

impl SchedulerConfig {
    /// Create a new scheduler configuration
    pub fn new() -> Self {
        Self {
            auto_exit_when_no_windows: true,
            wait_for_events: false,
            wait_timeout_ms: None,
            target_fps: None, // Unlimited by default
        }
    }

    /// Set the exit policy
    pub fn with_auto_exit(mut self, enabled: bool) -> Self {
        self.auto_exit_when_no_windows = enabled;
        self
    }

    /// Block for events, optionally bounded by a timeout
    pub fn with_wait_for_events(mut self, timeout_ms: Option<u64>) -> Self {
        self.wait_for_events = true;
        self.wait_timeout_ms = timeout_ms;
        self
    }

    /// Set target FPS
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = Some(fps);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.target_fps == Some(0) {
            return Err("Target FPS must be at least 1".to_string());
        }
        if !self.wait_for_events && self.wait_timeout_ms.is_some() {
            return Err("Wait timeout set without wait_for_events".to_string());
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Input Configuration
///
/// Thresholds used when synthesizing `click` and `dblclick` events from
/// raw button transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Maximum time between two clicks of a double click
    pub double_click_ms: u64,
    /// Maximum pointer travel between two clicks of a double click
    pub double_click_distance: f64,
}

impl InputConfig {
    /// Create a new input configuration
    pub fn new() -> Self {
        Self {
            double_click_ms: 500,
            double_click_distance: 4.0,
        }
    }

    /// Set the double click window
    pub fn with_double_click(mut self, interval_ms: u64, distance: f64) -> Self {
        self.double_click_ms = interval_ms;
        self.double_click_distance = distance;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.double_click_distance.is_finite() || self.double_click_distance < 0.0 {
            return Err("Double click distance must be a non-negative number".to_string());
        }
        Ok(())
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Logging Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default env_logger filter, overridden by `RUST_LOG`
    pub level: String,
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self {
            level: "info".to_string(),
        }
    }

    /// Set log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Runtime Configuration
///
/// Top-level configuration handed to [`crate::Runtime`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Frame scheduler configuration
    pub scheduler: SchedulerConfig,
    /// Input synthesis configuration
    pub input: InputConfig,
}

impl RuntimeConfig {
    /// Create a new runtime configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the scheduler configuration
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Replace the input configuration
    pub fn with_input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    /// Replace the logging configuration
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler.validate().map_err(ConfigError::Invalid)?;
        self.input.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

impl Config for RuntimeConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert!(config.scheduler.auto_exit_when_no_windows);
        assert!(!config.scheduler.wait_for_events);
        assert_eq!(config.input.double_click_ms, 500);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            [scheduler]
            auto_exit_when_no_windows = false
            target_fps = 30

            [input]
            double_click_ms = 250
        "#;
        let config = RuntimeConfig::from_str_as(text, ConfigFormat::Toml).unwrap();
        assert!(!config.scheduler.auto_exit_when_no_windows);
        assert_eq!(config.scheduler.target_fps, Some(30));
        assert_eq!(config.input.double_click_ms, 250);
        assert_eq!(config.input.double_click_distance, 4.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_ron_config() {
        let text = "(scheduler: (wait_for_events: true, wait_timeout_ms: Some(16)))";
        let config = RuntimeConfig::from_str_as(text, ConfigFormat::Ron).unwrap();
        assert!(config.scheduler.wait_for_events);
        assert_eq!(config.scheduler.wait_timeout_ms, Some(16));
    }

    #[test]
    fn test_validation_rejects_zero_fps() {
        let config = RuntimeConfig::new().with_scheduler(SchedulerConfig::new().with_target_fps(0));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validation_rejects_timeout_without_wait() {
        let mut scheduler = SchedulerConfig::new();
        scheduler.wait_timeout_ms = Some(10);
        assert!(scheduler.validate().is_err());
        assert!(SchedulerConfig::new().with_wait_for_events(Some(10)).validate().is_ok());
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("winloop-{}-{name}", std::process::id()))
    }

    fn sample() -> RuntimeConfig {
        let mut config = RuntimeConfig::new()
            .with_scheduler(SchedulerConfig::new().with_auto_exit(false).with_target_fps(60));
        config.input.double_click_ms = 300;
        config.logging.level = "winloop=debug,warn".to_string();
        config
    }

    #[test]
    fn test_toml_file_round_trip() {
        let path = temp_path("runtime.toml");
        let config = sample();
        config.save_to_file(&path).unwrap();
        let loaded = RuntimeConfig::load_from_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), config);
    }

    #[test]
    fn test_ron_file_round_trip() {
        let path = temp_path("runtime.ron");
        let config = sample().with_scheduler(SchedulerConfig::new().with_wait_for_events(Some(16)));
        config.save_to_file(&path).unwrap();
        let loaded = RuntimeConfig::load_from_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = RuntimeConfig::load_from_file(temp_path("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
