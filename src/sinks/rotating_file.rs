//! File output that moves on to a new file by size or by age
//!
//! File names come from a caller-supplied callback that receives the
//! sequence number of the file about to be opened and the UTC time of
//! opening. A size trigger is checked after each write, an interval trigger
//! before each write, so a record is never split across files.

use super::file::{open_log_file, FileMode};
use crate::core::{
    Disposition, LogRecord, LoggerError, LoggerMetrics, RecordFormat, Result, SharedRecord, Sink,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationTrigger {
    /// Rotate once the current file reached this many bytes
    Size(u64),
    /// Rotate when the current file has been open this long
    Interval(Duration),
}

/// What the naming callback knows about the file being opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationContext {
    /// 0 for the first file, then incremented on every rotation
    pub log_number: u64,
    pub opened_at: DateTime<Utc>,
}

pub type NamingFn = dyn Fn(&RotationContext) -> PathBuf + Send + Sync;

/// `base` with the log number inserted before the extension:
/// `app.log` becomes `app.0.log`, `app.1.log`, ...
pub fn numbered(base: impl Into<PathBuf>) -> impl Fn(&RotationContext) -> PathBuf + Send + Sync {
    let base = base.into();
    move |ctx| {
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match base.extension() {
            Some(ext) => format!("{}.{}.{}", stem, ctx.log_number, ext.to_string_lossy()),
            None => format!("{}.{}", stem, ctx.log_number),
        };
        base.with_file_name(name)
    }
}

/// `base` with the opening time inserted before the extension:
/// `app.log` becomes `app.20250108-103045.log`
pub fn timestamped(base: impl Into<PathBuf>) -> impl Fn(&RotationContext) -> PathBuf + Send + Sync {
    let base = base.into();
    move |ctx| {
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stamp = ctx.opened_at.format("%Y%m%d-%H%M%S");
        let name = match base.extension() {
            Some(ext) => format!("{}.{}.{}.{}", stem, stamp, ctx.log_number, ext.to_string_lossy()),
            None => format!("{}.{}.{}", stem, stamp, ctx.log_number),
        };
        base.with_file_name(name)
    }
}

struct ActiveFile {
    writer: BufWriter<File>,
    path: PathBuf,
    context: RotationContext,
    opened: Instant,
    written: u64,
}

pub struct RotatingFileSink {
    trigger: RotationTrigger,
    naming: Box<NamingFn>,
    format: RecordFormat,
    compress: bool,
    active: Mutex<ActiveFile>,
    metrics: LoggerMetrics,
}

impl RotatingFileSink {
    /// Open the first file (log number 0)
    ///
    /// # Errors
    ///
    /// Returns an error if the first file cannot be opened, or for a zero
    /// size or interval
    pub fn new<F>(trigger: RotationTrigger, naming: F) -> Result<Self>
    where
        F: Fn(&RotationContext) -> PathBuf + Send + Sync + 'static,
    {
        match trigger {
            RotationTrigger::Size(0) => {
                return Err(LoggerError::config(
                    "RotatingFileSink",
                    "size threshold must be non-zero",
                ))
            }
            RotationTrigger::Interval(d) if d.is_zero() => {
                return Err(LoggerError::config(
                    "RotatingFileSink",
                    "rotation interval must be non-zero",
                ))
            }
            _ => {}
        }

        let naming: Box<NamingFn> = Box::new(naming);
        let active = open_active(naming.as_ref(), 0)?;
        Ok(Self {
            trigger,
            naming,
            format: RecordFormat::default(),
            compress: false,
            active: Mutex::new(active),
            metrics: LoggerMetrics::new(),
        })
    }

    #[must_use]
    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_system_ids(mut self, enabled: bool) -> Self {
        self.format.system_ids = enabled;
        self
    }

    /// Gzip every file once it has been rotated away from
    #[must_use]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    pub fn trigger(&self) -> RotationTrigger {
        self.trigger
    }

    /// Path of the file currently written to
    pub fn current_path(&self) -> PathBuf {
        self.active.lock().path.clone()
    }

    pub fn log_number(&self) -> u64 {
        self.active.lock().context.log_number
    }

    pub fn current_size(&self) -> u64 {
        self.active.lock().written
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    fn write_record(&self, record: &LogRecord) -> Result<()> {
        let line = self.format.render(record);
        let mut active = self.active.lock();

        if let RotationTrigger::Interval(interval) = self.trigger {
            if active.opened.elapsed() >= interval {
                self.rotate(&mut active)?;
            }
        }

        active.writer.write_all(line.as_bytes()).map_err(|e| {
            LoggerError::io_operation(
                "write log record",
                format!("file '{}'", active.path.display()),
                e,
            )
        })?;
        active.writer.flush()?;
        active.written += line.len() as u64;

        if let RotationTrigger::Size(max_bytes) = self.trigger {
            if active.written >= max_bytes {
                self.rotate(&mut active)?;
            }
        }
        Ok(())
    }

    fn rotate(&self, active: &mut ActiveFile) -> Result<()> {
        active.writer.flush().map_err(|e| {
            LoggerError::file_rotation(
                active.path.display().to_string(),
                format!("Failed to flush before rotation: {}", e),
            )
        })?;

        let next = open_active(self.naming.as_ref(), active.context.log_number + 1)?;
        let finished = std::mem::replace(active, next);
        let finished_path = finished.path.clone();
        drop(finished);

        if self.compress && finished_path != active.path {
            if let Err(e) = compress_file(&finished_path) {
                eprintln!(
                    "[LOGGER WARNING] Failed to compress rotated log '{}': {}",
                    finished_path.display(),
                    e
                );
            }
        }
        Ok(())
    }
}

fn open_active(naming: &NamingFn, log_number: u64) -> Result<ActiveFile> {
    let context = RotationContext {
        log_number,
        opened_at: Utc::now(),
    };
    let path = naming(&context);
    let file = open_log_file(&path, FileMode::Create).map_err(|e| {
        LoggerError::file_rotation(path.display().to_string(), e.to_string())
    })?;
    Ok(ActiveFile {
        writer: BufWriter::new(file),
        path,
        context,
        opened: Instant::now(),
        written: 0,
    })
}

/// Replace `path` with `path.gz`; the original is removed only after the
/// compressed copy is complete
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, Read};

    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(".gz");
    let gz_path = PathBuf::from(gz_name);
    let mut tmp_name = gz_path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let temp_gz_path = PathBuf::from(tmp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create '{}'", temp_gz_path.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let result = (|| -> std::io::Result<()> {
        let mut chunk = vec![0u8; 64 * 1024];
        loop {
            let read = reader.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            encoder.write_all(&chunk[..read])?;
        }
        encoder.finish()?.flush()
    })();

    if let Err(e) = result.and_then(|()| fs::rename(&temp_gz_path, &gz_path)) {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress '{}'", path.display()),
            e,
        ));
    }

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compressed '{}' but could not remove the original: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

impl Sink for RotatingFileSink {
    fn accept(&self, record: &SharedRecord) -> Disposition {
        match self.write_record(record) {
            Ok(()) => {
                self.metrics.record_delivered();
            }
            Err(e) => {
                self.metrics.record_failed_write();
                eprintln!("[LOGGER ERROR] Rotating file sink failed: {}", e);
            }
        }
        Disposition::FreeNow
    }

    fn flush(&self) -> Result<()> {
        let mut active = self.active.lock();
        active.writer.flush().map_err(|e| {
            LoggerError::io_operation(
                "flush log file",
                format!("file '{}'", active.path.display()),
                e,
            )
        })
    }

    fn name(&self) -> &str {
        "rotating-file"
    }
}

impl std::fmt::Debug for RotatingFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileSink")
            .field("trigger", &self.trigger)
            .field("current_path", &self.current_path())
            .field("compress", &self.compress)
            .finish()
    }
}
