//! Scoped message accumulation with exactly-once delivery
//!
//! A [`MessageScope`] captures the call site, collects the message text and
//! hands the finished record to its sink the first time it is flushed or
//! dropped, whichever comes first. Dropping covers every exit path,
//! including early returns and panics unwinding through the scope.

use super::{
    fatal::FatalCoordinator,
    log_level::LogLevel,
    log_record::LogRecord,
    sink::{Disposition, Sink},
};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// # Example
///
/// ```
/// use sink_logger::prelude::*;
/// use std::fmt::Write;
///
/// let sink = StringSink::new().with_system_ids(false);
/// {
///     let mut scope = MessageScope::new("x.cpp", 42, LogLevel::Warn, &sink);
///     write!(scope, "disk at {}%", 90).unwrap();
/// }
/// assert_eq!(sink.contents(), "WARN  - x.cpp(42): disk at 90%\n");
/// ```
pub struct MessageScope<'a> {
    sink: &'a dyn Sink,
    coordinator: &'a FatalCoordinator,
    level: LogLevel,
    record: Option<LogRecord>,
}

impl<'a> MessageScope<'a> {
    pub fn new(
        file: impl Into<Cow<'static, str>>,
        line: u32,
        level: LogLevel,
        sink: &'a dyn Sink,
    ) -> Self {
        Self::with_record(LogRecord::new(file, line, level), sink)
    }

    /// Start a scope over a pre-built record (custom capacity, stripped ids)
    pub fn with_record(record: LogRecord, sink: &'a dyn Sink) -> Self {
        Self {
            sink,
            coordinator: FatalCoordinator::global(),
            level: record.level,
            record: Some(record),
        }
    }

    /// Use `coordinator` instead of the process-wide one for FATAL handling
    #[must_use]
    pub fn with_coordinator(mut self, coordinator: &'a FatalCoordinator) -> Self {
        self.coordinator = coordinator;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// The record while the scope is still open
    pub fn record(&self) -> Option<&LogRecord> {
        self.record.as_ref()
    }

    pub fn is_delivered(&self) -> bool {
        self.record.is_none()
    }

    /// Write stream of the message; ignored once the scope was flushed
    pub fn stream(&mut self) -> &mut dyn fmt::Write {
        self
    }

    /// Append the display form of `value`, for chained call sites
    pub fn append<T: fmt::Display>(&mut self, value: T) -> &mut Self {
        let _ = fmt::Write::write_fmt(self, format_args!("{}", value));
        self
    }

    /// Finalize and deliver the record.
    ///
    /// Only the first call delivers; it returns the sink's disposition.
    /// Later calls (and the eventual drop) return `None`.
    pub fn flush(&mut self) -> Option<Disposition> {
        let mut record = self.record.take()?;
        record.finalize();

        let record = Arc::new(record);
        let disposition = self.sink.accept(&record);
        match disposition {
            Disposition::FreeNow => {
                if Arc::strong_count(&record) > 1 {
                    eprintln!(
                        "[LOGGER WARNING] Sink '{}' returned FreeNow but kept the record",
                        self.sink.name()
                    );
                }
                drop(record);
            }
            // The taker holds its own handle; ours is released here
            Disposition::TakeOwnership => drop(record),
        }

        if self.level == LogLevel::Fatal {
            let sink = self.sink;
            self.coordinator.trigger_with(|| {
                if let Err(e) = sink.flush() {
                    eprintln!("[LOGGER ERROR] Flush before fatal exit failed: {}", e);
                }
            });
        }

        Some(disposition)
    }
}

impl fmt::Write for MessageScope<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(record) = self.record.as_mut() {
            record.buffer_mut().push_str(s);
        }
        Ok(())
    }
}

impl Drop for MessageScope<'_> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl fmt::Debug for MessageScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageScope")
            .field("sink", &self.sink.name())
            .field("level", &self.level)
            .field("delivered", &self.is_delivered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fatal::FatalPolicy;
    use crate::core::log_record::SharedRecord;
    use parking_lot::Mutex;
    use std::fmt::Write;

    #[derive(Default)]
    struct Capture {
        records: Mutex<Vec<SharedRecord>>,
    }

    impl Sink for Capture {
        fn accept(&self, record: &SharedRecord) -> Disposition {
            self.records.lock().push(Arc::clone(record));
            Disposition::TakeOwnership
        }

        fn name(&self) -> &str {
            "capture"
        }
    }

    impl Capture {
        fn messages(&self) -> Vec<String> {
            self.records
                .lock()
                .iter()
                .map(|r| r.message().to_string())
                .collect()
        }
    }

    #[test]
    fn test_drop_delivers_once() {
        let sink = Capture::default();
        {
            let mut scope = MessageScope::new("src/x.rs", 7, LogLevel::Info, &sink);
            write!(scope, "value={}", 3).unwrap();
        }
        assert_eq!(sink.messages(), vec!["value=3\n"]);
    }

    #[test]
    fn test_explicit_flush_then_drop_is_noop() {
        let sink = Capture::default();
        let mut scope = MessageScope::new("x.rs", 1, LogLevel::Info, &sink);
        scope.append("first");
        assert_eq!(scope.flush(), Some(Disposition::TakeOwnership));
        assert!(scope.is_delivered());
        assert_eq!(scope.flush(), None);

        scope.append("ignored");
        drop(scope);
        assert_eq!(sink.messages(), vec!["first\n"]);
    }

    #[test]
    fn test_existing_newline_not_doubled() {
        let sink = Capture::default();
        MessageScope::new("x.rs", 1, LogLevel::Info, &sink).append("line\n");
        MessageScope::new("x.rs", 2, LogLevel::Info, &sink);
        assert_eq!(sink.messages(), vec!["line\n", "\n"]);
    }

    #[test]
    fn test_finalized_record_is_terminated() {
        let sink = Capture::default();
        MessageScope::new("x.rs", 1, LogLevel::Debug, &sink).append("abc");
        let records = sink.records.lock();
        assert_eq!(records[0].buffer().as_bytes_with_terminator(), b"abc\n\0");
        assert!(records[0].is_finalized());
    }

    #[test]
    fn test_panic_unwinding_still_delivers() {
        let sink = Capture::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut scope = MessageScope::new("x.rs", 1, LogLevel::Error, &sink);
            scope.append("before panic");
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(sink.messages(), vec!["before panic\n"]);
    }

    #[test]
    fn test_fatal_arms_coordinator_once() {
        let sink = Capture::default();
        let coordinator = FatalCoordinator::new(FatalPolicy::NoExit);

        MessageScope::new("x.rs", 1, LogLevel::Fatal, &sink)
            .with_coordinator(&coordinator)
            .append("first fatal");
        MessageScope::new("x.rs", 2, LogLevel::Fatal, &sink)
            .with_coordinator(&coordinator)
            .append("second fatal");

        assert_eq!(coordinator.termination_attempts(), 1);
        assert_eq!(sink.messages().len(), 2);
    }

    #[test]
    fn test_non_fatal_leaves_coordinator_untouched() {
        let sink = Capture::default();
        let coordinator = FatalCoordinator::new(FatalPolicy::NoExit);
        MessageScope::new("x.rs", 1, LogLevel::Error, &sink)
            .with_coordinator(&coordinator)
            .append("bad but survivable");
        assert!(!coordinator.is_claimed());
    }

    #[test]
    fn test_custom_capacity_truncates() {
        let sink = Capture::default();
        let record = LogRecord::with_capacity("x.rs", 1, LogLevel::Info, 8);
        MessageScope::with_record(record, &sink).append("0123456789");
        let records = sink.records.lock();
        assert_eq!(records[0].message(), "012345\n");
        assert!(records[0].buffer().is_truncated());
    }
}
