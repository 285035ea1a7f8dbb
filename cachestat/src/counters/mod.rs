//! Counter sources
//!
//! The sampler drains event counts through the [`CounterSource`] capability:
//! - [`KernelCounters`] - the eBPF per-CPU map written by the kernel probes
//! - [`MemoryCounters`] - in-process atomics, for tests and simulations

pub mod kernel;
pub mod memory;

pub use kernel::KernelCounters;
pub use memory::MemoryCounters;

use crate::domain::{CounterReadError, CounterTable};

/// Something that counts page-cache events and can be drained
pub trait CounterSource {
    /// Return the counts accumulated since the previous call and reset them
    ///
    /// Every increment is attributed to exactly one call. An increment racing
    /// with the call may land in either the returned table or the next one.
    ///
    /// # Errors
    /// Returns an error if the underlying counter storage cannot be read
    fn snapshot_and_clear(&mut self) -> Result<CounterTable, CounterReadError>;
}
