//! Assembling sink chains in code or from a configuration document
//!
//! A chain is `[sinks] -> (tee | multiplex) -> [background] -> [level filter]`:
//! the filter runs on the producing thread, so filtered records never reach
//! the queue.

use crate::core::{
    AsyncLogger, AsyncLoggerBuilder, ChildSink, LogLevel, LoggerError, RecordFormat, Result, Sink,
    TimestampFormat,
};
use crate::loggers::{LevelFilterLogger, MultiplexLogger, TeeLogger};
use crate::sinks::{
    rotating_file, ConsoleSink, ConsoleTarget, FileMode, FileSink, RotatingFileSink,
    RotationTrigger,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// # Example
///
/// ```
/// use sink_logger::prelude::*;
/// use std::sync::Arc;
///
/// let capture = Arc::new(StringSink::new().with_system_ids(false));
/// let chain = ChainBuilder::new()
///     .observe(Arc::clone(&capture))
///     .sink(CountingSink::new())
///     .min_level(LogLevel::Warn)
///     .build()
///     .unwrap();
///
/// sink_logger::info!(chain, "dropped by the filter");
/// sink_logger::warn!(chain, "kept");
///
/// let text = capture.contents();
/// assert!(text.starts_with("WARN  - "));
/// assert!(text.ends_with(": kept\n"));
/// assert_eq!(text.lines().count(), 1);
/// ```
#[derive(Default)]
#[must_use = "builder methods return a new value"]
pub struct ChainBuilder {
    sinks: Vec<ChildSink>,
    min_level: Option<LogLevel>,
    background: Option<AsyncLoggerBuilder>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink owned by the chain
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(ChildSink::owned(sink));
        self
    }

    /// Add a sink the caller keeps a handle to
    pub fn observe<S: Sink + 'static>(mut self, sink: Arc<S>) -> Self {
        self.sinks.push(ChildSink::observed(sink));
        self
    }

    pub fn child(mut self, child: impl Into<ChildSink>) -> Self {
        self.sinks.push(child.into());
        self
    }

    /// Drop records below `level` before they enter the chain
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = Some(level);
        self
    }

    /// Deliver through a background worker
    pub fn background(mut self, builder: AsyncLoggerBuilder) -> Self {
        self.background = Some(builder);
        self
    }

    /// # Errors
    ///
    /// Returns an error without sinks or if the background worker cannot
    /// be started
    pub fn build(self) -> Result<Box<dyn Sink>> {
        let mut sinks = self.sinks;
        let combined: Box<dyn Sink> = match sinks.len() {
            0 => {
                return Err(LoggerError::config(
                    "ChainBuilder",
                    "a chain needs at least one sink",
                ))
            }
            1 => match sinks.remove(0) {
                ChildSink::Owned(sink) => sink,
                ChildSink::Observed(sink) => Box::new(sink),
            },
            2 => {
                let second = sinks.remove(1);
                let first = sinks.remove(0);
                Box::new(TeeLogger::new(first, second))
            }
            _ => Box::new(sinks.into_iter().collect::<MultiplexLogger>()),
        };

        let delivered: Box<dyn Sink> = match self.background {
            Some(builder) => Box::new(builder.build(combined)?),
            None => combined,
        };

        Ok(match self.min_level {
            Some(level) => Box::new(LevelFilterLogger::new(level, delivered)),
            None => delivered,
        })
    }
}

fn default_true() -> bool {
    true
}

/// Serializable description of a chain
///
/// ```
/// use sink_logger::ChainConfig;
///
/// let config: ChainConfig = serde_json::from_str(r#"{
///     "min_level": "warning",
///     "background": true,
///     "sinks": [{ "type": "console", "colors": false }]
/// }"#).unwrap();
/// let chain = config.build().unwrap();
/// # drop(chain);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub min_level: Option<LogLevel>,
    pub background: bool,
    /// Bounded queue for the background worker; unbounded when absent
    pub queue_capacity: Option<usize>,
    pub thread_name: Option<String>,
    pub system_ids: bool,
    pub timestamp: Option<TimestampFormat>,
    pub sinks: Vec<SinkConfig>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            min_level: None,
            background: false,
            queue_capacity: None,
            thread_name: None,
            system_ids: true,
            timestamp: None,
            sinks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    Console {
        #[serde(default = "default_true")]
        colors: bool,
        #[serde(default)]
        stdout: bool,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        append: bool,
    },
    /// Files named `<stem>.<n>.<ext>` after `path`
    RotatingFile {
        path: PathBuf,
        max_bytes: Option<u64>,
        interval_secs: Option<u64>,
        #[serde(default)]
        compress: bool,
    },
}

impl SinkConfig {
    fn build(&self, format: &RecordFormat) -> Result<Box<dyn Sink>> {
        Ok(match self {
            SinkConfig::Console { colors, stdout } => {
                let target = if *stdout {
                    ConsoleTarget::Stdout
                } else {
                    ConsoleTarget::Stderr
                };
                Box::new(
                    ConsoleSink::new()
                        .with_format(format.clone())
                        .with_colors(*colors)
                        .with_target(target),
                )
            }
            SinkConfig::File { path, append } => {
                let mode = if *append {
                    FileMode::Append
                } else {
                    FileMode::Create
                };
                Box::new(FileSink::open(path.clone(), mode)?.with_format(format.clone()))
            }
            SinkConfig::RotatingFile {
                path,
                max_bytes,
                interval_secs,
                compress,
            } => {
                let trigger = match (max_bytes, interval_secs) {
                    (Some(bytes), None) => RotationTrigger::Size(*bytes),
                    (None, Some(secs)) => RotationTrigger::Interval(Duration::from_secs(*secs)),
                    _ => {
                        return Err(LoggerError::config(
                            "rotating_file",
                            "exactly one of max_bytes or interval_secs is required",
                        ))
                    }
                };
                Box::new(
                    RotatingFileSink::new(trigger, rotating_file::numbered(path.clone()))?
                        .with_format(format.clone())
                        .with_compression(*compress),
                )
            }
        })
    }
}

impl ChainConfig {
    pub fn record_format(&self) -> RecordFormat {
        RecordFormat {
            system_ids: self.system_ids,
            timestamp: self.timestamp.clone(),
        }
    }

    /// # Errors
    ///
    /// Returns an error for an empty sink list, an invalid timestamp
    /// pattern, a sink that cannot be opened, or a worker that cannot be
    /// started
    pub fn build(&self) -> Result<Box<dyn Sink>> {
        let format = self.record_format();
        format.validate()?;
        let mut builder = ChainBuilder::new();
        for sink in &self.sinks {
            builder = builder.child(sink.build(&format)?);
        }

        if let Some(level) = self.min_level {
            builder = builder.min_level(level);
        }

        if self.background {
            let mut worker = AsyncLogger::builder();
            if let Some(name) = &self.thread_name {
                worker = worker.name(name.clone());
            }
            if let Some(capacity) = self.queue_capacity {
                worker = worker.queue_capacity(capacity);
            }
            builder = builder.background(worker);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogRecord;
    use crate::sinks::{CountingSink, StringSink};
    use tempfile::tempdir;

    #[test]
    fn test_empty_chain_is_rejected() {
        assert!(matches!(
            ChainBuilder::new().build(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_filtered_background_chain() {
        let counter = Arc::new(CountingSink::new());
        let capture = Arc::new(StringSink::new().with_system_ids(false));
        let chain = ChainBuilder::new()
            .observe(Arc::clone(&counter))
            .observe(Arc::clone(&capture))
            .observe(Arc::new(CountingSink::new()))
            .min_level(LogLevel::Warn)
            .background(AsyncLogger::builder().name("chain-test"))
            .build()
            .unwrap();

        for level in LogLevel::ALL {
            let _ = chain.accept(&LogRecord::finished("c.rs", 1, level, level.to_str()));
        }
        chain.flush().unwrap();
        drop(chain);

        assert_eq!(counter.count(), 3);
        assert_eq!(
            capture.lines(),
            vec!["WARN  - c.rs(1): WARN", "ERROR - c.rs(1): ERROR", "FATAL - c.rs(1): FATAL"]
        );
    }

    #[test]
    fn test_config_from_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.log");
        let json = format!(
            r#"{{
                "min_level": "info",
                "system_ids": false,
                "sinks": [{{ "type": "file", "path": {:?} }}]
            }}"#,
            path.display().to_string()
        );
        let config: ChainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.min_level, Some(LogLevel::Info));
        assert!(!config.background);

        let chain = config.build().unwrap();
        let _ = chain.accept(&LogRecord::finished("c.rs", 9, LogLevel::Debug, "hidden"));
        let _ = chain.accept(&LogRecord::finished("c.rs", 9, LogLevel::Info, "shown"));
        drop(chain);

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "INFO  - c.rs(9): shown\n"
        );
    }

    #[test]
    fn test_invalid_timestamp_pattern_rejected() {
        let json = r#"{ "timestamp": { "Custom": "%Q" }, "sinks": [{ "type": "console" }] }"#;
        let config: ChainConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(
            config.build(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_rotating_config_needs_one_trigger() {
        let config = ChainConfig {
            sinks: vec![SinkConfig::RotatingFile {
                path: PathBuf::from("unused.log"),
                max_bytes: Some(10),
                interval_secs: Some(10),
                compress: false,
            }],
            ..ChainConfig::default()
        };
        assert!(config.build().is_err());
    }

    #[test]
    fn test_config_round_trip_names() {
        let config = ChainConfig {
            min_level: Some(LogLevel::Error),
            sinks: vec![SinkConfig::Console {
                colors: true,
                stdout: false,
            }],
            ..ChainConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""min_level":"ERROR""#));
        assert!(json.contains(r#""type":"console""#));
    }
}
