//! In-memory text sink

use super::stream::StreamSink;
use crate::core::{Disposition, LoggerMetrics, RecordFormat, Result, SharedRecord, Sink};

/// Accumulates formatted lines in memory; mostly for tests and captures.
///
/// ```
/// use sink_logger::prelude::*;
///
/// let sink = StringSink::new().with_system_ids(false);
/// let _ = sink.accept(&LogRecord::finished("x.cpp", 42, LogLevel::Warn, "disk at 90%"));
/// assert_eq!(sink.contents(), "WARN  - x.cpp(42): disk at 90%\n");
/// ```
#[derive(Debug)]
pub struct StringSink {
    inner: StreamSink<Vec<u8>>,
}

impl StringSink {
    pub fn new() -> Self {
        Self {
            inner: StreamSink::new("string", Vec::new()),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.inner = self.inner.with_format(format);
        self
    }

    #[must_use]
    pub fn with_system_ids(mut self, enabled: bool) -> Self {
        self.inner = self.inner.with_system_ids(enabled);
        self
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        self.inner
            .with_writer(|buffer| String::from_utf8_lossy(buffer).into_owned())
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn clear(&self) {
        self.inner.with_writer(Vec::clear);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.with_writer(|buffer| buffer.is_empty())
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.inner.metrics()
    }
}

impl Default for StringSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for StringSink {
    fn accept(&self, record: &SharedRecord) -> Disposition {
        self.inner.accept(record)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn name(&self) -> &str {
        "string"
    }
}
