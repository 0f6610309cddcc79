//! Fan-out of every record to exactly two children

use crate::core::{ChildSink, Disposition, Result, SharedRecord, Sink};

/// Forwards each record to `first`, then to `second`.
///
/// Both children always see the record, even when the first one keeps it.
/// The record may be freed by the caller only if both children agree.
///
/// # Example
///
/// ```
/// use sink_logger::prelude::*;
/// use std::sync::Arc;
///
/// let left = Arc::new(CountingSink::new());
/// let right = Arc::new(CountingSink::new());
/// let tee = TeeLogger::new(Arc::clone(&left), Arc::clone(&right));
///
/// let record = LogRecord::finished("main.rs", 3, LogLevel::Info, "hello");
/// assert_eq!(tee.accept(&record), Disposition::FreeNow);
/// assert_eq!((left.count(), right.count()), (1, 1));
/// ```
#[derive(Debug)]
pub struct TeeLogger {
    first: ChildSink,
    second: ChildSink,
}

impl TeeLogger {
    pub fn new(first: impl Into<ChildSink>, second: impl Into<ChildSink>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn first(&self) -> &dyn Sink {
        self.first.sink()
    }

    pub fn second(&self) -> &dyn Sink {
        self.second.sink()
    }
}

impl Sink for TeeLogger {
    fn accept(&self, record: &SharedRecord) -> Disposition {
        let first = self.first.sink().accept(record);
        let second = self.second.sink().accept(record);
        first.and(second)
    }

    /// Flushes both children; the first error wins
    fn flush(&self) -> Result<()> {
        let first = self.first.sink().flush();
        let second = self.second.sink().flush();
        first.and(second)
    }

    fn name(&self) -> &str {
        "tee"
    }
}
