//! Log record structure
//!
//! A [`LogRecord`] is created by a [`MessageScope`](super::MessageScope),
//! written only by the issuing thread while the scope is open, and becomes
//! read-only once it is finalized and shared with the sink chain.

use super::log_level::LogLevel;
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Default message buffer capacity in bytes (terminator included)
pub const DEFAULT_BUFFER_CAPACITY: usize = 20_000;

/// Bytes held back in every buffer for the trailing newline and terminator
const FINALIZE_RESERVE: usize = 2;

/// Handle through which finished records travel the sink chain.
///
/// The record is freed when the last handle is dropped, so any number of
/// sinks may retain it without coordinating who frees it.
pub type SharedRecord = Arc<LogRecord>;

#[cfg(feature = "system-ids")]
mod system_ids {
    use std::cell::Cell;
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

    // Per-thread cache so the counter is touched once per thread
    thread_local! {
        static THREAD_ID_CACHE: Cell<u64> = const { Cell::new(0) };
    }

    pub(super) fn current() -> (Option<u32>, Option<u64>) {
        let thread_id = THREAD_ID_CACHE.with(|cache| {
            if cache.get() == 0 {
                cache.set(NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed));
            }
            cache.get()
        });
        (Some(std::process::id()), Some(thread_id))
    }
}

#[cfg(not(feature = "system-ids"))]
mod system_ids {
    pub(super) fn current() -> (Option<u32>, Option<u64>) {
        (None, None)
    }
}

/// Substring of `path` after its last separator.
///
/// `/` is always a separator; `\` is one as well on Windows.
pub fn file_name_from_path(path: &str) -> &str {
    let cut = if cfg!(windows) {
        path.rfind(|c| c == '/' || c == '\\')
    } else {
        path.rfind('/')
    };
    match cut {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Bounded, append-only text buffer of a single message.
///
/// Writes past capacity are truncated on a character boundary and flag the
/// buffer; they never fail and never grow the storage past its capacity.
#[derive(Debug, Clone)]
pub struct MessageBuffer {
    text: String,
    capacity: usize,
    truncated: bool,
    finalized: bool,
}

impl MessageBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(FINALIZE_RESERVE);
        Self {
            text: String::new(),
            capacity,
            truncated: false,
            finalized: false,
        }
    }

    /// Append as much of `s` as fits, returning the number of bytes taken
    pub fn push_str(&mut self, s: &str) -> usize {
        if self.finalized {
            return 0;
        }
        let limit = self.capacity - FINALIZE_RESERVE;
        let room = limit.saturating_sub(self.text.len());
        if s.len() <= room {
            self.text.push_str(s);
            return s.len();
        }

        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.text.push_str(&s[..cut]);
        self.truncated = true;
        cut
    }

    /// Ensure a trailing newline and append the terminator byte.
    ///
    /// Returns `false` if the buffer was already finalized.
    pub fn finalize(&mut self) -> bool {
        if self.finalized {
            return false;
        }
        if !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push('\0');
        self.finalized = true;
        true
    }

    /// Message text, newline included, terminator excluded
    pub fn as_str(&self) -> &str {
        if self.finalized {
            &self.text[..self.text.len() - 1]
        } else {
            &self.text
        }
    }

    /// Raw bytes including the terminator once finalized
    pub fn as_bytes_with_terminator(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

impl fmt::Write for MessageBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

/// UTC calendar breakdown of a record's timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub line: u32,
    pub full_path: Cow<'static, str>,
    pub timestamp: DateTime<Utc>,
    pub process_id: Option<u32>,
    pub thread_id: Option<u64>,
    buffer: MessageBuffer,
}

impl LogRecord {
    pub fn new(full_path: impl Into<Cow<'static, str>>, line: u32, level: LogLevel) -> Self {
        Self::with_capacity(full_path, line, level, DEFAULT_BUFFER_CAPACITY)
    }

    pub fn with_capacity(
        full_path: impl Into<Cow<'static, str>>,
        line: u32,
        level: LogLevel,
        capacity: usize,
    ) -> Self {
        let (process_id, thread_id) = system_ids::current();
        Self {
            level,
            line,
            full_path: full_path.into(),
            timestamp: Utc::now(),
            process_id,
            thread_id,
            buffer: MessageBuffer::with_capacity(capacity),
        }
    }

    /// Drop the captured process/thread ids
    #[must_use]
    pub fn without_system_ids(mut self) -> Self {
        self.process_id = None;
        self.thread_id = None;
        self
    }

    /// Convenience for tests and non-scope producers: a finalized record
    pub fn finished(
        full_path: impl Into<Cow<'static, str>>,
        line: u32,
        level: LogLevel,
        message: &str,
    ) -> SharedRecord {
        let mut record = Self::new(full_path, line, level);
        record.buffer_mut().push_str(message);
        record.finalize();
        Arc::new(record)
    }

    pub fn file_name(&self) -> &str {
        file_name_from_path(&self.full_path)
    }

    /// Message text including its trailing newline once finalized
    pub fn message(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn buffer(&self) -> &MessageBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut MessageBuffer {
        &mut self.buffer
    }

    pub fn finalize(&mut self) -> bool {
        self.buffer.finalize()
    }

    pub fn is_finalized(&self) -> bool {
        self.buffer.is_finalized()
    }

    pub fn unix_time(&self) -> i64 {
        self.timestamp.timestamp()
    }

    pub fn utc_time(&self) -> UtcTime {
        UtcTime {
            year: self.timestamp.year(),
            month: self.timestamp.month(),
            day: self.timestamp.day(),
            hour: self.timestamp.hour(),
            minute: self.timestamp.minute(),
            second: self.timestamp.second(),
        }
    }
}
