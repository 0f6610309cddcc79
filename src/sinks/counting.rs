//! Sink that only counts what it receives

use crate::core::{Disposition, LogLevel, SharedRecord, Sink};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct CountingSink {
    total: AtomicU64,
    per_level: [AtomicU64; 6],
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    pub fn count_at(&self, level: LogLevel) -> u64 {
        self.per_level[level.as_u8() as usize].load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.total.store(0, Ordering::Release);
        for counter in &self.per_level {
            counter.store(0, Ordering::Release);
        }
    }
}

impl Sink for CountingSink {
    fn accept(&self, record: &SharedRecord) -> Disposition {
        self.per_level[record.level.as_u8() as usize].fetch_add(1, Ordering::AcqRel);
        self.total.fetch_add(1, Ordering::AcqRel);
        Disposition::FreeNow
    }

    fn name(&self) -> &str {
        "counting"
    }
}
