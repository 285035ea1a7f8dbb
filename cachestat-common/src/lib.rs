//! # Shared Definitions (eBPF ↔ Userspace)
//!
//! Constants shared between the kernel-side counting programs and the
//! userspace agent. Both sides index the same per-CPU counter array, so the
//! slot layout defined here is the contract between them.
//!
//! ## Counter Layout
//!
//! `PAGECACHE_COUNTS` is a `PerCpuArray<u64>` with [`EVENT_CLASS_COUNT`]
//! slots. Slot `i` holds the number of times the event of class `i` fired on
//! that CPU since the program was loaded. Userspace sums across CPUs.
//!
//! | Slot | Class                | Kernel hook                                  |
//! |------|----------------------|----------------------------------------------|
//! | 0    | `CacheInsert`        | `add_to_page_cache_lru`                      |
//! | 1    | `PageAccessed`       | `mark_page_accessed`                         |
//! | 2    | `BufferDirtied`      | `mark_buffer_dirty`                          |
//! | 3    | `PageDirtyWriteback` | `folio_account_dirtied` and fallbacks        |

#![cfg_attr(not(test), no_std)]

// ============================================================================
// Event Classes
// ============================================================================

/// Kind of page-cache activity a counter increment represents
///
/// The discriminant is the slot index in `PAGECACHE_COUNTS`.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventClass {
    /// A page was added to the page-cache LRU (miss fill or re-insertion)
    CacheInsert = 0,

    /// A page already resident in the cache was marked accessed
    PageAccessed = 1,

    /// A buffer was dirtied as a side effect of a fresh insertion
    ///
    /// Subtracted from `PageAccessed` to get real cache touches.
    BufferDirtied = 2,

    /// A page was accounted as dirtied for writeback
    ///
    /// Subtracted from `CacheInsert` to get real read misses.
    PageDirtyWriteback = 3,
}

/// Number of tracked event classes (and slots in the counter map)
pub const EVENT_CLASS_COUNT: usize = 4;

impl EventClass {
    /// All classes in slot order
    pub const ALL: [EventClass; EVENT_CLASS_COUNT] = [
        EventClass::CacheInsert,
        EventClass::PageAccessed,
        EventClass::BufferDirtied,
        EventClass::PageDirtyWriteback,
    ];

    /// Slot index in `PAGECACHE_COUNTS`
    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Short, stable name used in logs and error messages
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            EventClass::CacheInsert => "cache_insert",
            EventClass::PageAccessed => "page_accessed",
            EventClass::BufferDirtied => "buffer_dirtied",
            EventClass::PageDirtyWriteback => "page_dirty_writeback",
        }
    }
}

// ============================================================================
// Map and Program Names
// ============================================================================

/// Per-CPU counter array, one slot per [`EventClass`]
pub const COUNTS_MAP: &str = "PAGECACHE_COUNTS";

/// kprobe program counting [`EventClass::CacheInsert`]
pub const PROG_CACHE_INSERT: &str = "count_cache_insert";

/// kprobe program counting [`EventClass::PageAccessed`]
pub const PROG_PAGE_ACCESSED: &str = "count_page_accessed";

/// kprobe program counting [`EventClass::BufferDirtied`]
pub const PROG_BUFFER_DIRTIED: &str = "count_buffer_dirtied";

/// kprobe program counting [`EventClass::PageDirtyWriteback`]
pub const PROG_PAGE_DIRTIED: &str = "count_page_dirtied";

/// Tracepoint program counting [`EventClass::PageDirtyWriteback`]
///
/// Used when neither dirty-accounting function can be kprobed.
pub const PROG_PAGE_DIRTIED_TP: &str = "count_page_dirtied_tp";

// ============================================================================
// Kernel Hook Points
// ============================================================================

/// Page inserted into the page cache LRU
pub const SYM_ADD_TO_PAGE_CACHE_LRU: &str = "add_to_page_cache_lru";

/// Page marked accessed
pub const SYM_MARK_PAGE_ACCESSED: &str = "mark_page_accessed";

/// Buffer marked dirty
pub const SYM_MARK_BUFFER_DIRTY: &str = "mark_buffer_dirty";

/// Dirty accounting, Linux 5.15 and newer
///
/// Static function: may be inlined away, in which case the tracepoints below
/// are the only option.
pub const SYM_FOLIO_ACCOUNT_DIRTIED: &str = "folio_account_dirtied";

/// Dirty accounting, before Linux 5.15
pub const SYM_ACCOUNT_PAGE_DIRTIED: &str = "account_page_dirtied";

/// Tracepoint category for the dirty writeback events
pub const TP_WRITEBACK: &str = "writeback";

/// Dirty writeback tracepoint, folio era
pub const TP_WRITEBACK_DIRTY_FOLIO: &str = "writeback_dirty_folio";

/// Dirty writeback tracepoint, page era
pub const TP_WRITEBACK_DIRTY_PAGE: &str = "writeback_dirty_page";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_indices_match_order() {
        for (slot, class) in EventClass::ALL.iter().enumerate() {
            assert_eq!(class.index() as usize, slot);
        }
        assert_eq!(EventClass::ALL.len(), EVENT_CLASS_COUNT);
    }
}
