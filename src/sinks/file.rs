//! Plain file output

use super::stream::StreamSink;
use crate::core::{
    Disposition, LoggerError, LoggerMetrics, RecordFormat, Result, SharedRecord, Sink,
};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// How an existing file is treated when the sink opens it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    /// Start from an empty file
    #[default]
    Create,
    /// Keep existing content and write after it
    Append,
}

pub struct FileSink {
    path: PathBuf,
    inner: StreamSink<BufWriter<File>>,
}

impl FileSink {
    /// Open `path`, truncating it
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be created
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path, FileMode::Create)
    }

    /// Open `path`, keeping existing content
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be created
    pub fn append(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path, FileMode::Append)
    }

    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be created
    pub fn open(path: impl Into<PathBuf>, mode: FileMode) -> Result<Self> {
        let path = path.into();
        let file = open_log_file(&path, mode)?;
        Ok(Self {
            inner: StreamSink::new("file", BufWriter::new(file)),
            path,
        })
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

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.inner.metrics()
    }
}

/// Open a log file for writing, creating missing parent directories
pub(crate) fn open_log_file(path: &Path, mode: FileMode) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }

    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        FileMode::Create => options.write(true).truncate(true),
        FileMode::Append => options.append(true),
    };
    options.open(path).map_err(|e| {
        LoggerError::file_sink(path.display().to_string(), format!("Failed to open: {}", e))
    })
}

impl Sink for FileSink {
    fn accept(&self, record: &SharedRecord) -> Disposition {
        self.inner.accept(record)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, LogRecord};
    use tempfile::tempdir;

    #[test]
    fn test_create_truncates_append_keeps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old line\n").unwrap();

        {
            let sink = FileSink::append(&path).unwrap().with_system_ids(false);
            let _ = sink.accept(&LogRecord::finished("a.rs", 1, LogLevel::Info, "appended"));
        }
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "old line\nINFO  - a.rs(1): appended\n"
        );

        {
            let sink = FileSink::create(&path).unwrap().with_system_ids(false);
            let _ = sink.accept(&LogRecord::finished("a.rs", 2, LogLevel::Info, "fresh"));
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "INFO  - a.rs(2): fresh\n");
    }

    #[test]
    fn test_record_visible_without_flush() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("live.log");
        let sink = FileSink::create(&path).unwrap().with_system_ids(false);
        let _ = sink.accept(&LogRecord::finished("a.rs", 1, LogLevel::Error, "now"));

        // Each record is flushed as it is written
        assert_eq!(fs::read_to_string(&path).unwrap(), "ERROR - a.rs(1): now\n");
    }

    #[test]
    fn test_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/app.log");
        let sink = FileSink::create(&path).unwrap();
        assert_eq!(sink.path(), path);
        assert!(path.exists());
    }

    #[test]
    fn test_unopenable_path_is_an_error() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened as a log file
        let result = FileSink::create(dir.path());
        assert!(matches!(result, Err(LoggerError::FileSinkError { .. })));
    }
}
