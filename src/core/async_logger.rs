//! Background delivery of records on a dedicated worker thread
//!
//! [`AsyncLogger`] moves the cost of a slow downstream sink (file or console
//! I/O) off the producing threads. Producers only enqueue a record handle;
//! one worker thread drains the queue in FIFO order and forwards each record
//! downstream.
//!
//! # Shutdown contract
//!
//! [`AsyncLogger::stop`] pushes a sentinel behind every record already in
//! the queue and blocks until the worker has reached it and exited. Every
//! record whose `accept` returned before `stop` was called is therefore
//! delivered before `stop` returns. A record accepted concurrently with
//! `stop` is either queued ahead of the sentinel and delivered, or counted
//! in [`LoggerMetrics::dropped`]; records accepted after `stop` are always
//! counted as dropped. There is no timeout: `stop` waits for the whole
//! backlog.
//!
//! A `stop` requested from the worker thread itself (a downstream sink
//! stopping its own parent) cannot wait for producers mid-send, so records
//! racing it may be lost uncounted.
//!
//! # Queue
//!
//! The queue is unbounded by default, so producers never block; sustained
//! overload grows memory instead. A bounded queue
//! ([`AsyncLoggerBuilder::queue_capacity`]) blocks producers while full.

use super::{
    error::{panic_message, LoggerError, Result},
    log_record::SharedRecord,
    metrics::LoggerMetrics,
    sink::{ChildSink, Disposition, Sink},
};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

/// Default name of the worker thread
pub const DEFAULT_WORKER_NAME: &str = "sink-logger-worker";

enum Envelope {
    Record(SharedRecord),
    /// Acknowledged once every earlier record was delivered and downstream flushed
    Flush(Sender<()>),
    /// Sentinel: the worker exits when it dequeues this
    Stop,
}

pub struct AsyncLogger {
    name: String,
    sender: Sender<Envelope>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
    stopping: AtomicBool,
    /// Shared by producers across the `stopping` check and the send;
    /// exclusive while the sentinel is enqueued
    gate: RwLock<()>,
    downstream: Arc<ChildSink>,
    metrics: Arc<LoggerMetrics>,
}

impl AsyncLogger {
    /// Start a background logger with an unbounded queue
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned
    pub fn new(downstream: impl Into<ChildSink>) -> Result<Self> {
        Self::builder().build(downstream)
    }

    #[must_use]
    pub fn builder() -> AsyncLoggerBuilder {
        AsyncLoggerBuilder::new()
    }

    fn start(builder: AsyncLoggerBuilder, downstream: ChildSink) -> Result<Self> {
        let (sender, receiver) = match builder.queue_capacity {
            Some(0) => {
                return Err(LoggerError::config(
                    "AsyncLogger",
                    "queue capacity must be non-zero",
                ))
            }
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };

        let downstream = Arc::new(downstream);
        let metrics = Arc::new(LoggerMetrics::new());

        let worker = {
            let downstream = Arc::clone(&downstream);
            let metrics = Arc::clone(&metrics);
            thread::Builder::new()
                .name(builder.name.clone())
                .spawn(move || run_worker(receiver, downstream, metrics))
                .map_err(|e| LoggerError::worker_spawn(builder.name.clone(), e))?
        };

        Ok(Self {
            name: builder.name,
            worker_id: worker.thread().id(),
            worker: Mutex::new(Some(worker)),
            sender,
            stopping: AtomicBool::new(false),
            gate: RwLock::new(()),
            downstream,
            metrics,
        })
    }

    /// Drain the queue and join the worker.
    ///
    /// Idempotent; a concurrent caller blocks until the first one finished.
    /// See the module docs for the delivery guarantee.
    ///
    /// # Errors
    ///
    /// Returns `WorkerPanicked` if the worker thread died abnormally
    pub fn stop(&self) -> Result<()> {
        if thread::current().id() == self.worker_id {
            // Joining ourselves would never return; the sentinel still lands
            if !self.stopping.swap(true, Ordering::AcqRel) {
                let _ = self.sender.send(Envelope::Stop);
            }
            return Ok(());
        }

        let mut worker = self.worker.lock();
        let Some(handle) = worker.take() else {
            return Ok(());
        };

        {
            // No producer is between its check and its send here, so nothing
            // can land behind the sentinel
            let _gate = self.gate.write();
            if !self.stopping.swap(true, Ordering::AcqRel) {
                let _ = self.sender.send(Envelope::Stop);
            }
        }

        handle.join().map_err(|payload| {
            let message = panic_message(payload.as_ref());
            eprintln!(
                "[LOGGER ERROR] Async worker thread '{}' panicked during shutdown: {}",
                self.name, message
            );
            LoggerError::worker_panicked(self.name.clone(), message)
        })
    }

    pub fn is_running(&self) -> bool {
        !self.stopping.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn downstream(&self) -> &dyn Sink {
        self.downstream.sink()
    }
}

impl Sink for AsyncLogger {
    /// Enqueue the record; ownership always moves to the queue
    fn accept(&self, record: &SharedRecord) -> Disposition {
        let _gate = self.gate.read();
        if self.stopping.load(Ordering::Acquire) {
            self.metrics.record_dropped();
            return Disposition::TakeOwnership;
        }

        match self.sender.send(Envelope::Record(Arc::clone(record))) {
            Ok(()) => {
                self.metrics.record_enqueued();
            }
            Err(_) => {
                // Worker already gone; the handle inside the error is released
                self.metrics.record_dropped();
            }
        }
        Disposition::TakeOwnership
    }

    /// Wait until every record enqueued before this call was delivered
    fn flush(&self) -> Result<()> {
        if thread::current().id() == self.worker_id {
            return self.downstream.sink().flush();
        }
        if self.stopping.load(Ordering::Acquire) {
            return self.downstream.sink().flush();
        }

        let (ack_tx, ack_rx) = bounded(1);
        self.sender
            .send(Envelope::Flush(ack_tx))
            .map_err(|_| LoggerError::LoggerStopped)?;
        // A disconnect means the worker exited first; stop() already drained
        ack_rx.recv().map_err(|_| LoggerError::LoggerStopped)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            eprintln!("[LOGGER ERROR] Failed to stop async logger: {}", e);
        }

        let dropped = self.metrics.dropped();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Async logger '{}' shut down with {} dropped records",
                self.name, dropped
            );
        }
    }
}

fn run_worker(
    receiver: Receiver<Envelope>,
    downstream: Arc<ChildSink>,
    metrics: Arc<LoggerMetrics>,
) {
    // recv() parks the thread while the queue is empty
    while let Ok(envelope) = receiver.recv() {
        match envelope {
            Envelope::Record(record) => deliver(downstream.sink(), record, &metrics),
            Envelope::Flush(ack) => {
                if let Err(e) = downstream.sink().flush() {
                    eprintln!(
                        "[LOGGER ERROR] Sink '{}' flush failed: {}",
                        downstream.sink().name(),
                        e
                    );
                }
                let _ = ack.send(());
            }
            Envelope::Stop => break,
        }
    }

    // Only a stop from the worker thread can leave records behind the sentinel
    for envelope in receiver.try_iter() {
        if let Envelope::Record(_) = envelope {
            metrics.record_dropped();
        }
    }
}

/// Forward one record, isolating the worker from downstream panics
fn deliver(sink: &dyn Sink, record: SharedRecord, metrics: &LoggerMetrics) {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.accept(&record)));

    match result {
        // FreeNow: ours is the last handle and the record is released here.
        // TakeOwnership: downstream holds its own handle.
        Ok(_disposition) => {
            metrics.record_delivered();
        }
        Err(payload) => {
            metrics.record_panic();
            eprintln!(
                "[LOGGER CRITICAL] Sink '{}' panicked: {}. Worker keeps running.",
                sink.name(),
                panic_message(payload.as_ref())
            );
        }
    }
    drop(record);
}

/// Builder for [`AsyncLogger`]
///
/// # Example
///
/// ```
/// use sink_logger::prelude::*;
///
/// let logger = AsyncLogger::builder()
///     .name("audit-writer")
///     .queue_capacity(4096)
///     .build(ChildSink::owned(CountingSink::new()))
///     .unwrap();
/// logger.stop().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct AsyncLoggerBuilder {
    name: String,
    queue_capacity: Option<usize>,
}

impl AsyncLoggerBuilder {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_WORKER_NAME.to_string(),
            queue_capacity: None,
        }
    }

    /// Name of the worker thread (also reported by `Sink::name`)
    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Bound the queue; producers block while it is full
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn unbounded(mut self) -> Self {
        self.queue_capacity = None;
        self
    }

    /// Spawn the worker
    ///
    /// # Errors
    ///
    /// Returns an error for a zero capacity or if the thread cannot be spawned
    pub fn build(self, downstream: impl Into<ChildSink>) -> Result<AsyncLogger> {
        AsyncLogger::start(self, downstream.into())
    }
}

impl Default for AsyncLoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;
    use crate::core::log_record::LogRecord;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Default)]
    struct Ordered {
        lines: Mutex<Vec<String>>,
    }

    impl Sink for Ordered {
        fn accept(&self, record: &SharedRecord) -> Disposition {
            self.lines.lock().push(record.message().trim_end().to_string());
            Disposition::FreeNow
        }

        fn name(&self) -> &str {
            "ordered"
        }
    }

    struct Slow {
        seen: AtomicUsize,
    }

    impl Sink for Slow {
        fn accept(&self, _record: &SharedRecord) -> Disposition {
            thread::sleep(Duration::from_millis(2));
            self.seen.fetch_add(1, Ordering::SeqCst);
            Disposition::FreeNow
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    struct Panicky;

    impl Sink for Panicky {
        fn accept(&self, record: &SharedRecord) -> Disposition {
            if record.message().starts_with("explode") {
                panic!("downstream exploded");
            }
            Disposition::FreeNow
        }

        fn name(&self) -> &str {
            "panicky"
        }
    }

    fn record(message: &str) -> SharedRecord {
        LogRecord::finished("x.rs", 1, LogLevel::Info, message)
    }

    #[test]
    fn test_accept_always_takes_ownership() {
        let logger = AsyncLogger::new(ChildSink::owned(Ordered::default())).unwrap();
        assert_eq!(logger.accept(&record("a")), Disposition::TakeOwnership);
        logger.stop().unwrap();
        assert_eq!(logger.accept(&record("late")), Disposition::TakeOwnership);
        assert_eq!(logger.metrics().dropped(), 1);
    }

    #[test]
    fn test_fifo_delivery() {
        let sink = Arc::new(Ordered::default());
        let logger = AsyncLogger::new(Arc::clone(&sink)).unwrap();
        for i in 0..200 {
            let _ = logger.accept(&record(&format!("{}", i)));
        }
        logger.stop().unwrap();

        let expected: Vec<String> = (0..200).map(|i| i.to_string()).collect();
        assert_eq!(*sink.lines.lock(), expected);
    }

    #[test]
    fn test_stop_drains_slow_backlog() {
        let sink = Arc::new(Slow {
            seen: AtomicUsize::new(0),
        });
        let logger = AsyncLogger::new(Arc::clone(&sink)).unwrap();
        for _ in 0..25 {
            let _ = logger.accept(&record("work"));
        }
        logger.stop().unwrap();

        assert_eq!(sink.seen.load(Ordering::SeqCst), 25);
        assert!(!logger.is_running());
        assert!(logger.worker.lock().is_none());
    }

    #[test]
    fn test_stop_during_concurrent_accepts_accounts_for_every_record() {
        let sink = Arc::new(Ordered::default());
        let logger = Arc::new(AsyncLogger::new(Arc::clone(&sink)).unwrap());
        let producers: Vec<_> = (0..4)
            .map(|_| {
                let logger = Arc::clone(&logger);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let _ = logger.accept(&record("racing"));
                    }
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(1));
        logger.stop().unwrap();
        for producer in producers {
            producer.join().unwrap();
        }

        let metrics = logger.metrics();
        assert_eq!(metrics.delivered() + metrics.dropped(), 2000);
        assert_eq!(sink.lines.lock().len() as u64, metrics.delivered());
        assert_eq!(metrics.enqueued(), metrics.delivered());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let logger = AsyncLogger::new(ChildSink::owned(Ordered::default())).unwrap();
        logger.stop().unwrap();
        logger.stop().unwrap();
    }

    #[test]
    fn test_flush_waits_for_backlog() {
        let sink = Arc::new(Slow {
            seen: AtomicUsize::new(0),
        });
        let logger = AsyncLogger::new(Arc::clone(&sink)).unwrap();
        for _ in 0..10 {
            let _ = logger.accept(&record("work"));
        }
        logger.flush().unwrap();
        assert_eq!(sink.seen.load(Ordering::SeqCst), 10);
        assert!(logger.is_running());
    }

    #[test]
    fn test_worker_survives_downstream_panic() {
        let logger = AsyncLogger::new(ChildSink::owned(Panicky)).unwrap();
        let _ = logger.accept(&record("explode now"));
        let _ = logger.accept(&record("fine"));
        logger.stop().unwrap();

        assert_eq!(logger.metrics().panics(), 1);
        assert_eq!(logger.metrics().delivered(), 1);
    }

    #[test]
    fn test_bounded_queue_delivers_everything() {
        let sink = Arc::new(Slow {
            seen: AtomicUsize::new(0),
        });
        let logger = AsyncLogger::builder()
            .queue_capacity(2)
            .build(Arc::clone(&sink))
            .unwrap();
        for _ in 0..12 {
            let _ = logger.accept(&record("work"));
        }
        logger.stop().unwrap();
        assert_eq!(sink.seen.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = AsyncLogger::builder()
            .queue_capacity(0)
            .build(ChildSink::owned(Ordered::default()));
        assert!(matches!(
            result,
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_worker_thread_is_named() {
        let logger = AsyncLogger::builder()
            .name("named-worker")
            .build(ChildSink::owned(Ordered::default()))
            .unwrap();
        assert_eq!(logger.name(), "named-worker");
        let handle = logger.worker.lock();
        assert_eq!(handle.as_ref().unwrap().thread().name(), Some("named-worker"));
    }
}
