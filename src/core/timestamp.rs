//! Timestamp formatting utilities
//!
//! Renders the wall-clock timestamp embedded in every log line. The default,
//! [`TimestampFormat::General`], is a short local date and 12-hour time such as
//! `1/8/2025 10:30:45 AM`. Other formats trade readability for precision.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::str::FromStr;

/// Timestamp format options for log lines
///
/// # Examples
///
/// ```
/// use log_pipeline::core::TimestampFormat;
/// use chrono::Local;
///
/// let format = TimestampFormat::Iso8601;
/// let timestamp = format.format(&Local::now());
/// assert!(timestamp.contains('T'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Month/day/year with 12-hour clock: `1/8/2025 10:30:45 AM`
    #[default]
    General,

    /// ISO 8601 with milliseconds and offset: `2025-01-08T10:30:45.123+00:00`
    Iso8601,

    /// RFC 3339 format: `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    ///
    /// Useful when lines from different producers need to be sorted later.
    UnixMillis,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    /// Format a datetime in any timezone according to this format
    ///
    /// A `Custom` pattern that chrono cannot render falls back to RFC 3339.
    #[must_use]
    pub fn format<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        self.try_format(datetime)
            .unwrap_or_else(|_| datetime.to_rfc3339())
    }

    /// Format a datetime, reporting a pattern chrono cannot render
    pub fn try_format<Tz>(&self, datetime: &DateTime<Tz>) -> Result<String, fmt::Error>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let pattern = match self {
            TimestampFormat::General => "%-m/%-d/%Y %-I:%M:%S %p",
            TimestampFormat::Iso8601 => "%Y-%m-%dT%H:%M:%S%.3f%:z",
            TimestampFormat::Rfc3339 => return Ok(datetime.to_rfc3339()),
            TimestampFormat::UnixMillis => return Ok(datetime.timestamp_millis().to_string()),
            TimestampFormat::Custom(pattern) => pattern,
        };

        let mut rendered = String::new();
        write!(rendered, "{}", datetime.format(pattern))?;
        Ok(rendered)
    }

    /// Reject a `Custom` pattern containing items chrono does not know
    pub fn validate(&self) -> Result<(), String> {
        match self {
            TimestampFormat::Custom(pattern) if !is_valid_pattern(pattern) => {
                Err(format!("invalid strftime pattern: '{}'", pattern))
            }
            _ => Ok(()),
        }
    }
}

fn is_valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

impl FromStr for TimestampFormat {
    type Err = String;

    /// Accepts a named format, or any string containing `%` as a strftime pattern
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(TimestampFormat::General),
            "iso8601" => Ok(TimestampFormat::Iso8601),
            "rfc3339" => Ok(TimestampFormat::Rfc3339),
            "unix-millis" | "unix_millis" => Ok(TimestampFormat::UnixMillis),
            _ if s.contains('%') => {
                let format = TimestampFormat::Custom(s.to_string());
                format.validate()?;
                Ok(format)
            }
            _ => Err(format!("Invalid timestamp format: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_general_format() {
        let result = TimestampFormat::General.format(&fixed_datetime());
        assert_eq!(result, "1/8/2025 10:30:45 AM");
    }

    #[test]
    fn test_iso8601_format() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123+00:00");
    }

    #[test]
    fn test_unix_millis_format() {
        let result = TimestampFormat::UnixMillis.format(&fixed_datetime());
        assert_eq!(result, "1736332245123");
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%Y/%m/%d".to_string());
        assert_eq!(format.format(&fixed_datetime()), "2025/01/08");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("ISO8601".parse::<TimestampFormat>(), Ok(TimestampFormat::Iso8601));
        assert_eq!("unix-millis".parse::<TimestampFormat>(), Ok(TimestampFormat::UnixMillis));
        assert_eq!(
            "%H:%M".parse::<TimestampFormat>(),
            Ok(TimestampFormat::Custom("%H:%M".to_string()))
        );
        assert!("yesterday".parse::<TimestampFormat>().is_err());
    }

    #[test]
    fn test_unknown_specifier_rejected() {
        assert!("%Q".parse::<TimestampFormat>().is_err());
        assert!("%Y-%m-%d %Q".parse::<TimestampFormat>().is_err());
        assert!(TimestampFormat::Custom("%Q".to_string()).validate().is_err());
        assert!(TimestampFormat::Custom("%H:%M".to_string()).validate().is_ok());
        assert!(TimestampFormat::General.validate().is_ok());
    }

    #[test]
    fn test_unknown_specifier_does_not_panic() {
        let format = TimestampFormat::Custom("%Q".to_string());
        assert!(format.try_format(&fixed_datetime()).is_err());
        assert_eq!(
            format.format(&fixed_datetime()),
            fixed_datetime().to_rfc3339()
        );
    }

    #[test]
    fn test_deserialization() {
        let format: TimestampFormat =
            serde_json::from_str("\"Rfc3339\"").expect("deserialize Rfc3339");
        assert_eq!(format, TimestampFormat::Rfc3339);

        let format: TimestampFormat =
            serde_json::from_str(r#"{"Custom":"%Y-%m-%d"}"#).expect("deserialize Custom");
        assert_eq!(format, TimestampFormat::Custom("%Y-%m-%d".to_string()));
    }
}
