//! In-memory counter source
//!
//! Same drain semantics as the kernel map, backed by atomics. Each class is
//! reset with a single `swap(0)`, so concurrent `record` calls are never lost.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cachestat_common::EVENT_CLASS_COUNT;

use super::CounterSource;
use crate::domain::{CounterReadError, CounterTable, EventClass};

#[derive(Debug, Default)]
pub struct MemoryCounters {
    counts: [AtomicU64; EVENT_CLASS_COUNT],
}

impl MemoryCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one event
    pub fn record(&self, class: EventClass) {
        self.add(class, 1);
    }

    /// Count `n` events of one class
    pub fn add(&self, class: EventClass, n: u64) {
        self.counts[class.index() as usize].fetch_add(n, Ordering::Relaxed);
    }

    /// Atomically take every count and reset it to zero
    pub fn drain(&self) -> CounterTable {
        let mut table = CounterTable::default();
        for class in EventClass::ALL {
            table[class] = self.counts[class.index() as usize].swap(0, Ordering::AcqRel);
        }
        table
    }
}

impl CounterSource for MemoryCounters {
    fn snapshot_and_clear(&mut self) -> Result<CounterTable, CounterReadError> {
        Ok(self.drain())
    }
}

impl CounterSource for Arc<MemoryCounters> {
    fn snapshot_and_clear(&mut self) -> Result<CounterTable, CounterReadError> {
        Ok(self.drain())
    }
}
