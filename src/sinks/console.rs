//! Terminal output

use super::stream::StreamSink;
use crate::core::{Disposition, LoggerMetrics, RecordFormat, Result, SharedRecord, Sink};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    Stdout,
    #[default]
    Stderr,
}

/// Process output stream; the standard handles lock per write
pub struct ConsoleStream(ConsoleTarget);

impl Write for ConsoleStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0 {
            ConsoleTarget::Stdout => io::stdout().write(buf),
            ConsoleTarget::Stderr => io::stderr().write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self.0 {
            ConsoleTarget::Stdout => io::stdout().lock().write_all(buf),
            ConsoleTarget::Stderr => io::stderr().lock().write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0 {
            ConsoleTarget::Stdout => io::stdout().flush(),
            ConsoleTarget::Stderr => io::stderr().flush(),
        }
    }
}

/// Writes records to stderr (or stdout), with colored levels when the
/// `console` feature is enabled.
///
/// # Example
///
/// ```
/// use sink_logger::sinks::{ConsoleSink, ConsoleTarget};
///
/// let sink = ConsoleSink::new()
///     .with_target(ConsoleTarget::Stdout)
///     .with_colors(false);
/// ```
pub struct ConsoleSink {
    inner: StreamSink<ConsoleStream>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::with_target_and_format(ConsoleTarget::Stderr, RecordFormat::default())
    }

    fn with_target_and_format(target: ConsoleTarget, format: RecordFormat) -> Self {
        Self {
            inner: StreamSink::new("console", ConsoleStream(target))
                .with_format(format)
                .with_colors(cfg!(feature = "console")),
        }
    }

    #[must_use]
    pub fn with_target(self, target: ConsoleTarget) -> Self {
        let colors = self.colors();
        Self::with_target_and_format(target, self.inner.format().clone()).with_colors(colors)
    }

    #[must_use]
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.inner = self.inner.with_colors(colors);
        self
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

    pub fn target(&self) -> ConsoleTarget {
        self.inner.with_writer(|stream| stream.0)
    }

    pub fn colors(&self) -> bool {
        self.inner.colors()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.inner.metrics()
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn accept(&self, record: &SharedRecord) -> Disposition {
        self.inner.accept(record)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_stderr() {
        assert_eq!(ConsoleSink::new().target(), ConsoleTarget::Stderr);
    }

    #[test]
    fn test_target_switch_keeps_format() {
        let sink = ConsoleSink::new()
            .with_system_ids(false)
            .with_colors(false)
            .with_target(ConsoleTarget::Stdout);
        assert_eq!(sink.target(), ConsoleTarget::Stdout);
        assert!(!sink.inner.format().system_ids);
        assert!(!sink.colors());
    }
}
