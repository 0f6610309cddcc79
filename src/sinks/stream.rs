//! Sink that writes formatted lines to any `io::Write`

use crate::core::{
    Disposition, LogRecord, LoggerError, LoggerMetrics, RecordFormat, Result, SharedRecord, Sink,
};
use parking_lot::Mutex;
use std::io::Write;

/// Formats every record and writes it to `W` under one mutex.
///
/// Each record is written and flushed before `accept` returns, so the
/// record can always be released by the caller. Write failures are reported
/// on stderr and counted in [`metrics`](Self::metrics).
pub struct StreamSink<W: Write + Send> {
    name: String,
    writer: Mutex<W>,
    format: RecordFormat,
    colors: bool,
    metrics: LoggerMetrics,
}

impl<W: Write + Send> StreamSink<W> {
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer: Mutex::new(writer),
            format: RecordFormat::default(),
            colors: false,
            metrics: LoggerMetrics::new(),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_system_ids(mut self, enabled: bool) -> Self {
        self.format.system_ids = enabled;
        self
    }

    /// Color the level name (only with the `console` feature)
    #[must_use]
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    pub fn format(&self) -> &RecordFormat {
        &self.format
    }

    pub fn colors(&self) -> bool {
        self.colors
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Run `f` with exclusive access to the writer
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        let mut writer = self.writer.lock();
        f(&mut *writer)
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn render(&self, record: &LogRecord) -> String {
        if self.colors {
            self.format.render_colored(record)
        } else {
            self.format.render(record)
        }
    }

    fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }
}

impl<W: Write + Send> Sink for StreamSink<W> {
    fn accept(&self, record: &SharedRecord) -> Disposition {
        let line = self.render(record);
        match self.write_line(&line) {
            Ok(()) => {
                self.metrics.record_delivered();
            }
            Err(e) => {
                self.metrics.record_failed_write();
                eprintln!("[LOGGER ERROR] Sink '{}' write failed: {}", self.name, e);
            }
        }
        Disposition::FreeNow
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush().map_err(|e| {
            LoggerError::io_operation("flush log stream", format!("sink '{}'", self.name), e)
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<W: Write + Send> std::fmt::Debug for StreamSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSink")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("colors", &self.colors)
            .finish()
    }
}
