//! Line format for stream-backed sinks
//!
//! The reference layout is
//! `[<pid:08x>.<tid:08x>] <LEVEL:<5> - <file>(<line>): <message>`, where the
//! id segment can be switched off and an optional timestamp can be
//! prepended.

use super::error::Result;
use super::log_record::LogRecord;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFormat {
    /// Emit the `[pid.tid] ` segment when the record carries ids
    pub system_ids: bool,
    /// Prefix every line with `[timestamp] `
    pub timestamp: Option<TimestampFormat>,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            system_ids: true,
            timestamp: None,
        }
    }
}

impl RecordFormat {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_system_ids(mut self, enabled: bool) -> Self {
        self.system_ids = enabled;
        self
    }

    /// Prefix lines with `format`; see [`try_with_timestamp`](Self::try_with_timestamp)
    #[must_use]
    pub fn with_timestamp(mut self, format: TimestampFormat) -> Self {
        self.timestamp = Some(format);
        self
    }

    /// Like [`with_timestamp`](Self::with_timestamp), rejecting an invalid pattern
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the timestamp pattern is invalid
    pub fn try_with_timestamp(self, format: TimestampFormat) -> Result<Self> {
        format.validate()?;
        Ok(self.with_timestamp(format))
    }

    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the timestamp pattern is invalid
    pub fn validate(&self) -> Result<()> {
        match &self.timestamp {
            Some(format) => format.validate(),
            None => Ok(()),
        }
    }

    /// Render `record` as one output line (the message supplies the newline)
    pub fn render(&self, record: &LogRecord) -> String {
        self.render_with(record, false)
    }

    /// Render with the level name colored for terminals
    pub fn render_colored(&self, record: &LogRecord) -> String {
        self.render_with(record, true)
    }

    fn render_with(&self, record: &LogRecord, colors: bool) -> String {
        let mut out = String::with_capacity(record.message().len() + 48);

        if let Some(ref format) = self.timestamp {
            let _ = write!(out, "[{}] ", format.format(&record.timestamp));
        }

        if self.system_ids {
            if let (Some(pid), Some(tid)) = (record.process_id, record.thread_id) {
                let _ = write!(out, "[{:08x}.{:08x}] ", pid, tid);
            }
        }

        let level = format!("{:<5}", record.level.to_str());
        let _ = write!(
            out,
            "{} - {}({}): {}",
            Self::paint_level(level, record, colors),
            record.file_name(),
            record.line,
            record.message()
        );
        out
    }

    #[cfg(feature = "console")]
    fn paint_level(level: String, record: &LogRecord, colors: bool) -> String {
        use colored::Colorize;
        if colors {
            level.color(record.level.color_code()).to_string()
        } else {
            level
        }
    }

    #[cfg(not(feature = "console"))]
    fn paint_level(level: String, _record: &LogRecord, _colors: bool) -> String {
        level
    }
}
