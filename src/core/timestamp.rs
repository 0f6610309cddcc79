//! Timestamp formats for the optional line prefix
//!
//! The reference line layout carries no timestamp. A
//! [`RecordFormat`](super::RecordFormat) prepends one in any of these forms.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// # Examples
///
/// ```
/// use sink_logger::core::TimestampFormat;
/// use chrono::Utc;
///
/// let stamp = TimestampFormat::Iso8601.format(&Utc::now());
/// assert!(stamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Seconds since the epoch
    Unix,

    /// Milliseconds since the epoch
    UnixMillis,

    /// Any strftime-compatible pattern, e.g. `"%d/%b/%Y:%H:%M:%S %z"`
    ///
    /// A pattern chrono cannot parse renders as [`Iso8601`](Self::Iso8601);
    /// use [`custom`](Self::custom) or [`validate`](Self::validate) to
    /// reject it up front.
    Custom(String),
}

impl TimestampFormat {
    /// Checked constructor for [`Custom`](Self::Custom)
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `pattern` has an unknown specifier
    pub fn custom(pattern: impl Into<String>) -> Result<Self> {
        let format = TimestampFormat::Custom(pattern.into());
        format.validate()?;
        Ok(format)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a `Custom` pattern chrono rejects
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(pattern) = self {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::config(
                    "TimestampFormat",
                    format!("invalid strftime pattern '{}'", pattern),
                ));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(pattern) => {
                let mut out = String::with_capacity(pattern.len() + 16);
                if write!(out, "{}", datetime.format(pattern)).is_err() {
                    return TimestampFormat::Iso8601.format(datetime);
                }
                out
            }
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::Unix | TimestampFormat::UnixMillis)
    }
}
