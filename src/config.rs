//! Startup configuration
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! command line flags. Missing keys in the JSON file keep their defaults.

use crate::core::{Diagnostics, LogLevel, PipelineError, Result, TimestampFormat};
use crate::pipeline::DrainMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_OUTPUT_PATH: &str = "output.txt";
pub const DEFAULT_PRODUCERS: usize = 10;
pub const DEFAULT_WRITES_PER_PRODUCER: u64 = 100_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Settings for one pipeline run
///
/// # Example
///
/// ```
/// use log_pipeline::PipelineConfig;
///
/// let config: PipelineConfig =
///     serde_json::from_str(r#"{ "producers": 2, "writes_per_producer": 3 }"#).unwrap();
///
/// assert_eq!(config.producers, 2);
/// assert_eq!(config.poll_interval_ms, 10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// File the writer appends to; deleted at the start of each run
    pub output_path: PathBuf,
    /// Number of producer threads
    pub producers: usize,
    /// Lines each producer enqueues
    pub writes_per_producer: u64,
    /// Writer idle interval when the queue is empty
    pub poll_interval_ms: u64,
    pub drain_mode: DrainMode,
    pub timestamp_format: TimestampFormat,
    /// Probability in `[0, 1]` that an individual append fails
    pub failure_rate: f64,
    /// Seed for reproducible failures
    pub failure_seed: Option<u64>,
    pub diagnostics_level: LogLevel,
    pub colors: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            producers: DEFAULT_PRODUCERS,
            writes_per_producer: DEFAULT_WRITES_PER_PRODUCER,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            drain_mode: DrainMode::default(),
            timestamp_format: TimestampFormat::default(),
            failure_rate: 0.0,
            failure_seed: None,
            diagnostics_level: LogLevel::Info,
            colors: true,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::io_operation(
                "reading config",
                format!("cannot read '{}'", path.display()),
                e,
            )
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_path.as_os_str().is_empty() {
            return Err(PipelineError::config("output_path", "must not be empty"));
        }
        if self.producers == 0 {
            return Err(PipelineError::config("producers", "must be at least 1"));
        }
        if self.poll_interval_ms == 0 {
            return Err(PipelineError::config(
                "poll_interval_ms",
                "must be greater than 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(PipelineError::config(
                "failure_rate",
                format!("must be within [0, 1], got {}", self.failure_rate),
            ));
        }
        self.timestamp_format
            .validate()
            .map_err(|message| PipelineError::config("timestamp_format", message))?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn expected_lines(&self) -> u64 {
        self.producers as u64 * self.writes_per_producer
    }

    /// Console diagnostics matching this configuration
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::new()
            .with_min_level(self.diagnostics_level)
            .with_colors(self.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.output_path, PathBuf::from("output.txt"));
        assert_eq!(config.producers, 10);
        assert_eq!(config.writes_per_producer, 100_000);
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.drain_mode, DrainMode::Poll);
        assert_eq!(config.expected_lines(), 1_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let bad = [
            PipelineConfig {
                producers: 0,
                ..PipelineConfig::default()
            },
            PipelineConfig {
                poll_interval_ms: 0,
                ..PipelineConfig::default()
            },
            PipelineConfig {
                failure_rate: 1.01,
                ..PipelineConfig::default()
            },
            PipelineConfig {
                output_path: PathBuf::new(),
                ..PipelineConfig::default()
            },
            PipelineConfig {
                timestamp_format: TimestampFormat::Custom("%Q".to_string()),
                ..PipelineConfig::default()
            },
        ];

        for config in bad {
            assert!(
                matches!(
                    config.validate(),
                    Err(PipelineError::InvalidConfiguration { .. })
                ),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_zero_writes_is_valid() {
        let config = PipelineConfig {
            writes_per_producer: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("pipeline.json");
        std::fs::write(
            &path,
            r#"{
                "output_path": "/tmp/lines.txt",
                "producers": 4,
                "drain_mode": "Wait",
                "timestamp_format": "UnixMillis",
                "diagnostics_level": "Debug"
            }"#,
        )
        .expect("write config");

        let config = PipelineConfig::from_json_file(&path).expect("load config");
        assert_eq!(config.output_path, PathBuf::from("/tmp/lines.txt"));
        assert_eq!(config.producers, 4);
        assert_eq!(config.writes_per_producer, DEFAULT_WRITES_PER_PRODUCER);
        assert_eq!(config.drain_mode, DrainMode::Wait);
        assert_eq!(config.timestamp_format, TimestampFormat::UnixMillis);
        assert_eq!(config.diagnostics_level, LogLevel::Debug);
    }

    #[test]
    fn test_from_json_file_errors() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let missing = PipelineConfig::from_json_file(temp_dir.path().join("absent.json"));
        assert!(matches!(missing, Err(PipelineError::IoOperation { .. })));

        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ producers: ").expect("write config");
        let broken = PipelineConfig::from_json_file(&path);
        assert!(matches!(broken, Err(PipelineError::Json(_))));

        let path = temp_dir.path().join("bad-format.json");
        std::fs::write(&path, r#"{ "timestamp_format": { "Custom": "%Q" } }"#)
            .expect("write config");
        let config = PipelineConfig::from_json_file(&path).expect("load config");
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfiguration { ref component, .. })
                if component == "timestamp_format"
        ));
    }
}
