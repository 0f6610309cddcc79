//! Severity threshold in front of a single child

use crate::core::{ChildSink, Disposition, LogLevel, Result, SharedRecord, Sink};
use std::sync::atomic::{AtomicU8, Ordering};

/// Drops records below a threshold that can be moved at runtime.
///
/// A dropped record never reaches the child and the filter answers
/// `FreeNow`. Records at or above the threshold are forwarded and the
/// child's disposition is passed through unchanged.
///
/// # Example
///
/// ```
/// use sink_logger::prelude::*;
/// use std::sync::Arc;
///
/// let counter = Arc::new(CountingSink::new());
/// let filter = LevelFilterLogger::new(LogLevel::Warn, Arc::clone(&counter));
///
/// let _ = filter.accept(&LogRecord::finished("a.rs", 1, LogLevel::Info, "skip"));
/// let _ = filter.accept(&LogRecord::finished("a.rs", 2, LogLevel::Error, "keep"));
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Debug)]
pub struct LevelFilterLogger {
    threshold: AtomicU8,
    child: ChildSink,
}

impl LevelFilterLogger {
    pub fn new(threshold: LogLevel, child: impl Into<ChildSink>) -> Self {
        Self {
            threshold: AtomicU8::new(threshold.as_u8()),
            child: child.into(),
        }
    }

    pub fn threshold(&self) -> LogLevel {
        LogLevel::try_from(self.threshold.load(Ordering::Relaxed)).unwrap_or(LogLevel::Trace)
    }

    pub fn set_threshold(&self, threshold: LogLevel) {
        self.threshold.store(threshold.as_u8(), Ordering::Relaxed);
    }

    #[inline]
    pub fn passes(&self, level: LogLevel) -> bool {
        level.as_u8() >= self.threshold.load(Ordering::Relaxed)
    }

    pub fn child(&self) -> &dyn Sink {
        self.child.sink()
    }
}

impl Sink for LevelFilterLogger {
    fn accept(&self, record: &SharedRecord) -> Disposition {
        if !self.passes(record.level) {
            return Disposition::FreeNow;
        }
        self.child.sink().accept(record)
    }

    fn flush(&self) -> Result<()> {
        self.child.sink().flush()
    }

    fn name(&self) -> &str {
        "level-filter"
    }
}

/// [`LevelFilterLogger`] with the threshold fixed at compile time.
///
/// `MIN` is the numeric level (`LogLevel::Warn.as_u8()` and so on).
///
/// ```
/// use sink_logger::prelude::*;
/// use sink_logger::loggers::ConstLevelFilter;
///
/// type WarnAndUp = ConstLevelFilter<{ LogLevel::Warn.as_u8() }>;
/// let filter = WarnAndUp::new(ChildSink::owned(CountingSink::new()));
/// assert_eq!(filter.threshold(), LogLevel::Warn);
/// ```
#[derive(Debug)]
pub struct ConstLevelFilter<const MIN: u8> {
    child: ChildSink,
}

impl<const MIN: u8> ConstLevelFilter<MIN> {
    pub fn new(child: impl Into<ChildSink>) -> Self {
        Self {
            child: child.into(),
        }
    }

    pub fn threshold(&self) -> LogLevel {
        LogLevel::try_from(MIN).unwrap_or(LogLevel::Fatal)
    }
}

impl<const MIN: u8> Sink for ConstLevelFilter<MIN> {
    #[inline]
    fn accept(&self, record: &SharedRecord) -> Disposition {
        if record.level.as_u8() < MIN {
            return Disposition::FreeNow;
        }
        self.child.sink().accept(record)
    }

    fn flush(&self) -> Result<()> {
        self.child.sink().flush()
    }

    fn name(&self) -> &str {
        "const-level-filter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogRecord;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Keeper {
        kept: Mutex<Vec<SharedRecord>>,
    }

    impl Sink for Keeper {
        fn accept(&self, record: &SharedRecord) -> Disposition {
            self.kept.lock().push(Arc::clone(record));
            Disposition::TakeOwnership
        }

        fn name(&self) -> &str {
            "keeper"
        }
    }

    impl Keeper {
        fn levels(&self) -> Vec<LogLevel> {
            self.kept.lock().iter().map(|r| r.level).collect()
        }
    }

    #[test]
    fn test_warn_threshold() {
        let keeper = Arc::new(Keeper::default());
        let filter = LevelFilterLogger::new(LogLevel::Warn, Arc::clone(&keeper));

        for level in LogLevel::ALL {
            let record = LogRecord::finished("x.rs", 1, level, "m");
            let disposition = filter.accept(&record);
            if level >= LogLevel::Warn {
                assert_eq!(disposition, Disposition::TakeOwnership);
            } else {
                assert_eq!(disposition, Disposition::FreeNow);
                assert_eq!(Arc::strong_count(&record), 1);
            }
        }

        assert_eq!(
            keeper.levels(),
            vec![LogLevel::Warn, LogLevel::Error, LogLevel::Fatal]
        );
    }

    #[test]
    fn test_threshold_can_move() {
        let keeper = Arc::new(Keeper::default());
        let filter = LevelFilterLogger::new(LogLevel::Error, Arc::clone(&keeper));
        let _ = filter.accept(&LogRecord::finished("x.rs", 1, LogLevel::Info, "a"));

        filter.set_threshold(LogLevel::Trace);
        assert_eq!(filter.threshold(), LogLevel::Trace);
        let _ = filter.accept(&LogRecord::finished("x.rs", 2, LogLevel::Info, "b"));

        assert_eq!(keeper.levels(), vec![LogLevel::Info]);
    }

    #[test]
    fn test_const_filter_matches_runtime_filter() {
        let runtime_keeper = Arc::new(Keeper::default());
        let const_keeper = Arc::new(Keeper::default());
        let runtime = LevelFilterLogger::new(LogLevel::Warn, Arc::clone(&runtime_keeper));
        let fixed =
            ConstLevelFilter::<{ LogLevel::Warn.as_u8() }>::new(Arc::clone(&const_keeper));

        for level in LogLevel::ALL {
            let record = LogRecord::finished("x.rs", 1, level, "m");
            assert_eq!(runtime.accept(&record), fixed.accept(&record));
        }
        assert_eq!(runtime_keeper.levels(), const_keeper.levels());
    }
}
