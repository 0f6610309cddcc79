//! # Sink Logger
//!
//! Scoped, stream-style logging over composable sinks.
//!
//! A [`MessageScope`] collects one message and delivers it exactly once to
//! a [`Sink`] when it goes out of scope. Sinks compose: [`TeeLogger`] and
//! [`MultiplexLogger`] fan records out, [`LevelFilterLogger`] drops them by
//! severity, and [`AsyncLogger`] hands them to a background thread.
//!
//! ## Features
//!
//! - **Exactly-once delivery**: on normal exit, early return or unwinding
//! - **Shared records**: sinks keep a record by cloning its handle
//! - **Background delivery**: FIFO worker with a drain-to-completion shutdown
//! - **FATAL handling**: the first FATAL message terminates the process, once
//!
//! ```
//! use sink_logger::prelude::*;
//! use std::sync::Arc;
//!
//! let capture = Arc::new(StringSink::new().with_system_ids(false));
//! let logger = AsyncLogger::new(Arc::clone(&capture)).unwrap();
//!
//! sink_logger::warn!(logger, "disk at {}%", 90);
//! logger.stop().unwrap();
//!
//! assert!(capture.contents().ends_with("disk at 90%\n"));
//! ```

pub mod chain;
pub mod core;
pub mod loggers;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::chain::{ChainBuilder, ChainConfig, SinkConfig};
    pub use crate::core::{
        AsyncLogger, AsyncLoggerBuilder, ChildSink, Disposition, FatalCoordinator, FatalPolicy,
        LogLevel, LogRecord, LoggerError, LoggerMetrics, MessageScope, RecordFormat, Result,
        SharedRecord, Sink, TimestampFormat, STATIC_FILTER_LEVEL,
    };
    pub use crate::loggers::{LevelFilterLogger, MultiplexLogger, TeeLogger};
    pub use crate::sinks::{
        ConsoleSink, CountingSink, FileMode, FileSink, RotatingFileSink, RotationContext,
        RotationTrigger, StreamSink, StringSink,
    };
}

pub use chain::{ChainBuilder, ChainConfig, SinkConfig};
pub use core::{
    AsyncLogger, AsyncLoggerBuilder, ChildSink, Disposition, FatalCoordinator, FatalPolicy,
    LogLevel, LogRecord, LoggerError, LoggerMetrics, MessageScope, RecordFormat, Result,
    SharedRecord, Sink, TimestampFormat, STATIC_FILTER_LEVEL,
};
pub use loggers::{LevelFilterLogger, MultiplexLogger, TeeLogger};
pub use sinks::{ConsoleSink, CountingSink, FileSink, StringSink};
