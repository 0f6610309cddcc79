//! Sink trait for log output destinations and logger composition

use super::{error::Result, log_record::SharedRecord};
use std::sync::Arc;

/// Who is responsible for the record after [`Sink::accept`] returns.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// The sink kept nothing; the caller may release the record now
    FreeNow,
    /// The sink retained the record and releases it later
    TakeOwnership,
}

impl Disposition {
    /// Composite rule: the caller may free only if both sides agree
    #[inline]
    pub fn and(self, other: Disposition) -> Disposition {
        match (self, other) {
            (Disposition::FreeNow, Disposition::FreeNow) => Disposition::FreeNow,
            _ => Disposition::TakeOwnership,
        }
    }

    #[inline]
    pub fn may_free(self) -> bool {
        self == Disposition::FreeNow
    }
}

/// Anything that accepts a finished log record and decides its fate.
///
/// `accept` is total: failures inside a sink are handled locally and never
/// surface to the caller. Every implementation must tolerate concurrent
/// calls from different threads.
///
/// # Example
///
/// ```
/// use sink_logger::core::{Disposition, SharedRecord, Sink};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// struct Tally(AtomicUsize);
///
/// impl Sink for Tally {
///     fn accept(&self, _record: &SharedRecord) -> Disposition {
///         self.0.fetch_add(1, Ordering::Relaxed);
///         Disposition::FreeNow
///     }
///
///     fn name(&self) -> &str {
///         "tally"
///     }
/// }
/// ```
pub trait Sink: Send + Sync {
    /// Take a finished record.
    ///
    /// Return `TakeOwnership` only after cloning the handle to keep it.
    fn accept(&self, record: &SharedRecord) -> Disposition;

    /// Push buffered output to its destination
    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

impl<S: Sink + ?Sized> Sink for &S {
    fn accept(&self, record: &SharedRecord) -> Disposition {
        (**self).accept(record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn accept(&self, record: &SharedRecord) -> Disposition {
        (**self).accept(record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn accept(&self, record: &SharedRecord) -> Disposition {
        (**self).accept(record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// One edge of a composite logger.
///
/// `Observed` children stay under the caller's control: the composite only
/// holds a shared handle and never tears the sink down itself. `Owned`
/// children are destroyed together with the composite.
pub enum ChildSink {
    Observed(Arc<dyn Sink>),
    Owned(Box<dyn Sink>),
}

impl ChildSink {
    pub fn observed<S: Sink + 'static>(sink: Arc<S>) -> Self {
        ChildSink::Observed(sink)
    }

    pub fn owned<S: Sink + 'static>(sink: S) -> Self {
        ChildSink::Owned(Box::new(sink))
    }

    #[inline]
    pub fn sink(&self) -> &dyn Sink {
        match self {
            ChildSink::Observed(sink) => sink.as_ref(),
            ChildSink::Owned(sink) => sink.as_ref(),
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, ChildSink::Owned(_))
    }
}

impl std::fmt::Debug for ChildSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_owned() { "Owned" } else { "Observed" };
        f.debug_tuple(kind).field(&self.sink().name()).finish()
    }
}

impl<S: Sink + 'static> From<Arc<S>> for ChildSink {
    fn from(sink: Arc<S>) -> Self {
        ChildSink::Observed(sink)
    }
}

impl From<Arc<dyn Sink>> for ChildSink {
    fn from(sink: Arc<dyn Sink>) -> Self {
        ChildSink::Observed(sink)
    }
}

impl From<Box<dyn Sink>> for ChildSink {
    fn from(sink: Box<dyn Sink>) -> Self {
        ChildSink::Owned(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Sink for Named {
        fn accept(&self, _record: &SharedRecord) -> Disposition {
            Disposition::FreeNow
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_disposition_and() {
        use Disposition::*;
        assert_eq!(FreeNow.and(FreeNow), FreeNow);
        assert_eq!(FreeNow.and(TakeOwnership), TakeOwnership);
        assert_eq!(TakeOwnership.and(FreeNow), TakeOwnership);
        assert_eq!(TakeOwnership.and(TakeOwnership), TakeOwnership);
        assert!(FreeNow.may_free());
        assert!(!TakeOwnership.may_free());
    }

    #[test]
    fn test_child_sink_variants() {
        let shared = Arc::new(Named("shared"));
        let observed = ChildSink::observed(Arc::clone(&shared));
        assert!(!observed.is_owned());
        assert_eq!(observed.sink().name(), "shared");
        assert_eq!(Arc::strong_count(&shared), 2);

        drop(observed);
        assert_eq!(Arc::strong_count(&shared), 1);

        let owned = ChildSink::owned(Named("owned"));
        assert!(owned.is_owned());
        assert_eq!(format!("{:?}", owned), "Owned(\"owned\")");
    }

    #[test]
    fn test_blanket_impls_forward() {
        let boxed: Box<dyn Sink> = Box::new(Named("boxed"));
        assert_eq!(boxed.name(), "boxed");
        let by_ref = &Named("by_ref");
        assert_eq!(Sink::name(&by_ref), "by_ref");
        let child: ChildSink = boxed.into();
        assert!(child.is_owned());
    }
}
