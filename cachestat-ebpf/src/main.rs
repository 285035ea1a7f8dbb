//! # eBPF Kernel-Side Page-Cache Counters
//!
//! Counts four page-cache events into a per-CPU array. No event data leaves
//! the kernel: userspace only drains the totals once per sampling interval.
//!
//! ## Programs
//!
//! - **kprobe** `count_cache_insert` - `add_to_page_cache_lru`
//! - **kprobe** `count_page_accessed` - `mark_page_accessed`
//! - **kprobe** `count_buffer_dirtied` - `mark_buffer_dirty`
//! - **kprobe** `count_page_dirtied` - `folio_account_dirtied` or `account_page_dirtied`
//! - **tracepoint** `count_page_dirtied_tp` - `writeback:writeback_dirty_{folio,page}`
//!
//! Userspace attaches exactly one of the two dirty-writeback programs.
//!
//! ## Build
//!
//! ```bash
//! cargo xtask build-ebpf --release
//! ```

#![no_std]
#![no_main]
#![allow(unused_unsafe)]

use aya_ebpf::{
    macros::{kprobe, map, tracepoint},
    maps::PerCpuArray,
    programs::{ProbeContext, TracePointContext},
};
use cachestat_common::{EventClass, EVENT_CLASS_COUNT};

// ============================================================================
// eBPF Maps
// ============================================================================

/// Map: event class slot → event count (per CPU)
///
/// Each CPU owns its own copy of every slot, so increments need no atomics.
/// Counters only grow; userspace derives interval counts from the difference
/// between consecutive drains.
#[map]
static PAGECACHE_COUNTS: PerCpuArray<u64> =
    PerCpuArray::with_max_entries(EVENT_CLASS_COUNT as u32, 0);

#[inline(always)]
fn count(class: EventClass) -> u32 {
    if let Some(slot) = PAGECACHE_COUNTS.get_ptr_mut(class.index()) {
        unsafe {
            *slot += 1;
        }
    }
    0
}

// ============================================================================
// eBPF Program Hooks
// ============================================================================

/// Hook: `add_to_page_cache_lru`
#[kprobe]
pub fn count_cache_insert(_ctx: ProbeContext) -> u32 {
    count(EventClass::CacheInsert)
}

/// Hook: `mark_page_accessed`
#[kprobe]
pub fn count_page_accessed(_ctx: ProbeContext) -> u32 {
    count(EventClass::PageAccessed)
}

/// Hook: `mark_buffer_dirty`
#[kprobe]
pub fn count_buffer_dirtied(_ctx: ProbeContext) -> u32 {
    count(EventClass::BufferDirtied)
}

/// Hook: `folio_account_dirtied` (5.15+) or `account_page_dirtied`
#[kprobe]
pub fn count_page_dirtied(_ctx: ProbeContext) -> u32 {
    count(EventClass::PageDirtyWriteback)
}

/// Hook: `writeback:writeback_dirty_folio` or `writeback:writeback_dirty_page`
#[tracepoint]
pub fn count_page_dirtied_tp(_ctx: TracePointContext) -> u32 {
    count(EventClass::PageDirtyWriteback)
}

#[cfg(all(not(test), target_os = "none"))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}
