//! Fan-out of every record to an ordered list of children

use crate::core::{ChildSink, Disposition, LoggerError, Result, SharedRecord, Sink};

/// Forwards each record to every child in insertion order.
///
/// With no children it keeps nothing and answers `FreeNow`. Children can
/// only be added while the multiplexer is still being assembled; once it
/// is shared as a `Sink` the list is fixed.
///
/// # Example
///
/// ```
/// use sink_logger::prelude::*;
///
/// let mux = MultiplexLogger::new()
///     .with(ChildSink::owned(CountingSink::new()))
///     .with(ChildSink::owned(StringSink::new()));
/// assert_eq!(mux.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MultiplexLogger {
    children: Vec<ChildSink>,
}

impl MultiplexLogger {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn with(mut self, child: impl Into<ChildSink>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn add_logger(&mut self, child: impl Into<ChildSink>) {
        self.children.push(child.into());
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> impl Iterator<Item = &dyn Sink> {
        self.children.iter().map(ChildSink::sink)
    }
}

impl Sink for MultiplexLogger {
    fn accept(&self, record: &SharedRecord) -> Disposition {
        self.children
            .iter()
            .fold(Disposition::FreeNow, |acc, child| {
                acc.and(child.sink().accept(record))
            })
    }

    /// Flushes every child and reports how many failed
    fn flush(&self) -> Result<()> {
        let mut failed = Vec::new();
        for child in &self.children {
            if let Err(e) = child.sink().flush() {
                failed.push(format!("{}: {}", child.sink().name(), e));
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::other(format!(
                "{} of {} sinks failed to flush ({})",
                failed.len(),
                self.children.len(),
                failed.join("; ")
            )))
        }
    }

    fn name(&self) -> &str {
        "multiplex"
    }
}

impl FromIterator<ChildSink> for MultiplexLogger {
    fn from_iter<I: IntoIterator<Item = ChildSink>>(iter: I) -> Self {
        Self {
            children: iter.into_iter().collect(),
        }
    }
}
