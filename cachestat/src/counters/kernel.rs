//! Kernel-backed counter source
//!
//! Reads the `PAGECACHE_COUNTS` per-CPU array filled by the eBPF programs.
//!
//! The kernel counters are never written from userspace. Each drain sums the
//! per-CPU slots into cumulative totals and returns the difference from the
//! totals seen at the previous drain, which makes read-and-clear a single
//! step from the caller's point of view: an increment is either already in
//! the totals read now, or it will be in the next read.

use aya::maps::{MapData, PerCpuArray};
use aya::Ebpf;
use cachestat_common::COUNTS_MAP;
use log::debug;

use super::CounterSource;
use crate::domain::{CounterReadError, CounterTable, EventClass};

/// Drains the eBPF page-cache counters
pub struct KernelCounters {
    map: PerCpuArray<MapData, u64>,
    baseline: CounterTable,
}

impl KernelCounters {
    /// Take ownership of the counter map from a loaded eBPF object
    ///
    /// Counts recorded before this call (between attach and now) are folded
    /// into the baseline so the first interval starts clean.
    ///
    /// # Errors
    /// Returns an error if the map is missing or cannot be read
    pub fn from_ebpf(bpf: &mut Ebpf) -> Result<Self, CounterReadError> {
        let map = bpf.take_map(COUNTS_MAP).ok_or(CounterReadError::MapNotFound(COUNTS_MAP))?;
        let map = PerCpuArray::try_from(map)?;

        let mut counters = Self { map, baseline: CounterTable::default() };
        counters.baseline = counters.read_totals()?;
        debug!("Initial counter totals: {}", counters.baseline);
        Ok(counters)
    }

    /// Sum every class slot across all CPUs
    fn read_totals(&self) -> Result<CounterTable, CounterReadError> {
        let mut totals = CounterTable::default();
        for class in EventClass::ALL {
            let per_cpu = self
                .map
                .get(&class.index(), 0)
                .map_err(|source| CounterReadError::SlotRead { class, source })?;
            totals[class] = per_cpu.iter().fold(0u64, |acc, v| acc.wrapping_add(*v));
        }
        Ok(totals)
    }
}

impl CounterSource for KernelCounters {
    fn snapshot_and_clear(&mut self) -> Result<CounterTable, CounterReadError> {
        let totals = self.read_totals()?;
        Ok(advance_baseline(&mut self.baseline, totals))
    }
}

/// Return `totals - baseline` per class and move the baseline to `totals`
///
/// Wrapping subtraction keeps the delta correct across a `u64` wrap of the
/// summed totals.
pub(crate) fn advance_baseline(baseline: &mut CounterTable, totals: CounterTable) -> CounterTable {
    let mut interval = CounterTable::default();
    for class in EventClass::ALL {
        interval[class] = totals[class].wrapping_sub(baseline[class]);
    }
    *baseline = totals;
    interval
}
