//! Core types: records, scopes, the sink capability and delivery machinery

pub mod async_logger;
pub mod error;
pub mod fatal;
pub mod log_level;
pub mod log_record;
pub mod message_scope;
pub mod metrics;
pub mod record_format;
pub mod sink;
pub mod timestamp;

pub use async_logger::{AsyncLogger, AsyncLoggerBuilder, DEFAULT_WORKER_NAME};
pub use error::{LoggerError, Result};
pub use fatal::{FatalCoordinator, FatalPolicy, FATAL_EXIT_CODE};
pub use log_level::{LogLevel, STATIC_FILTER_LEVEL};
pub use log_record::{
    file_name_from_path, LogRecord, MessageBuffer, SharedRecord, UtcTime, DEFAULT_BUFFER_CAPACITY,
};
pub use message_scope::MessageScope;
pub use metrics::LoggerMetrics;
pub use record_format::RecordFormat;
pub use sink::{ChildSink, Disposition, Sink};
pub use timestamp::TimestampFormat;
