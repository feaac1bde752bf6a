//! Diagnostic output stream
//!
//! Producers, the writer, and the orchestrator report progress and failures
//! here rather than through return values. Lines look like
//!
//! ```text
//! [2025-01-08T10:30:45.123+00:00] [INFO ] Producer 3 completed its work.
//! ```
//!
//! Fatal lines go to stderr. Everything else, failed writes included, goes to
//! stdout. A capturing instance keeps rendered lines in memory instead, for
//! tests.

use super::timestamp::TimestampFormat;
use chrono::Local;
#[cfg(feature = "console")]
use colored::Colorize;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Severity of a diagnostic line, lowest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

/// Console stream a diagnostic line is printed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl LogLevel {
    const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Bracketed label, padded to a fixed width so messages line up
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO ",
            LogLevel::Warn => "WARN ",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    pub fn stream(self) -> Stream {
        match self {
            LogLevel::Fatal => Stream::Stderr,
            _ => Stream::Stdout,
        }
    }

    #[cfg(feature = "console")]
    fn color(self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().trim_end())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("warning") {
            return Ok(LogLevel::Warn);
        }
        LogLevel::ALL
            .into_iter()
            .find(|level| level.label().trim_end().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid log level: '{}'", s))
    }
}

/// Cloneable handle to the diagnostic stream
#[derive(Debug, Clone)]
pub struct Diagnostics {
    min_level: LogLevel,
    use_colors: bool,
    timestamp_format: TimestampFormat,
    captured: Option<Arc<Mutex<Vec<String>>>>,
}

impl Diagnostics {
    /// Console diagnostics at Info level with colors
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            use_colors: true,
            timestamp_format: TimestampFormat::Iso8601,
            captured: None,
        }
    }

    /// Diagnostics that record every line instead of printing it
    ///
    /// # Example
    ///
    /// ```
    /// use log_pipeline::core::{Diagnostics, LogLevel};
    ///
    /// let diagnostics = Diagnostics::capturing().with_min_level(LogLevel::Debug);
    /// diagnostics.debug("writer idle");
    ///
    /// assert!(diagnostics.captured()[0].ends_with("writer idle"));
    /// ```
    pub fn capturing() -> Self {
        Self {
            use_colors: false,
            captured: Some(Arc::new(Mutex::new(Vec::new()))),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        if level < self.min_level {
            return;
        }

        let timestamp = self.timestamp_format.format(&Local::now());
        let message = message.as_ref();

        if let Some(ref captured) = self.captured {
            captured
                .lock()
                .push(format!("[{}] [{}] {}", timestamp, level.label(), message));
            return;
        }

        let output = format!("[{}] [{}] {}", timestamp, self.paint(level), message);
        match level.stream() {
            Stream::Stdout => println!("{}", output),
            Stream::Stderr => eprintln!("{}", output),
        }
    }

    #[cfg(feature = "console")]
    fn paint(&self, level: LogLevel) -> String {
        if self.use_colors {
            level.label().color(level.color()).to_string()
        } else {
            level.label().to_string()
        }
    }

    #[cfg(not(feature = "console"))]
    fn paint(&self, level: LogLevel) -> String {
        level.label().to_string()
    }

    /// Lines recorded so far by a capturing instance; empty otherwise
    pub fn captured(&self) -> Vec<String> {
        self.captured
            .as_ref()
            .map(|captured| captured.lock().clone())
            .unwrap_or_default()
    }

    #[inline]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Fatal, message);
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}
