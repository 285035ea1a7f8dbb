//! Core value types passed between the counter source, the ratio
//! calculator and the reporters.

use cachestat_common::{EventClass, EVENT_CLASS_COUNT};
use serde::Serialize;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Event counts for one sampling interval, indexed by [`EventClass`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterTable {
    counts: [u64; EVENT_CLASS_COUNT],
}

impl CounterTable {
    #[must_use]
    pub fn new(counts: [u64; EVENT_CLASS_COUNT]) -> Self {
        Self { counts }
    }

    /// True when no event of any class was counted
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Iterate `(class, count)` pairs in slot order
    pub fn iter(&self) -> impl Iterator<Item = (EventClass, u64)> + '_ {
        EventClass::ALL.iter().map(move |&class| (class, self[class]))
    }
}

impl Index<EventClass> for CounterTable {
    type Output = u64;

    fn index(&self, class: EventClass) -> &u64 {
        &self.counts[class.index() as usize]
    }
}

impl IndexMut<EventClass> for CounterTable {
    fn index_mut(&mut self, class: EventClass) -> &mut u64 {
        &mut self.counts[class.index() as usize]
    }
}

impl fmt::Display for CounterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (class, count) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}={count}", class.name())?;
            first = false;
        }
        Ok(())
    }
}

/// One derived observation per interval
///
/// `hit_ratio` is always within `[0, 100]`. The intermediate values are kept
/// for logging and JSON output; `hits + misses == total` holds after the
/// read-ahead correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub hit_ratio: f64,
    pub hits: u64,
    pub misses: u64,
    pub total: u64,
}

/// How the process was started
///
/// Passed explicitly to the termination handler for its log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Foreground,
    Daemon,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Foreground => f.write_str("foreground"),
            ExecutionMode::Daemon => f.write_str("daemon"),
        }
    }
}
