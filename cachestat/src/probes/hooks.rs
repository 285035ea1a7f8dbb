//! Kernel hook table
//!
//! Three event classes hook version-stable functions. The dirty-writeback
//! class moved between kernel releases (`account_page_dirtied` became
//! `folio_account_dirtied` in 5.15, and both are static functions that the
//! compiler may inline away), so it carries an ordered fallback list ending
//! in the writeback tracepoints.

use std::fmt;

use cachestat_common::{
    EventClass, PROG_BUFFER_DIRTIED, PROG_CACHE_INSERT, PROG_PAGE_ACCESSED, PROG_PAGE_DIRTIED,
    PROG_PAGE_DIRTIED_TP, SYM_ACCOUNT_PAGE_DIRTIED, SYM_ADD_TO_PAGE_CACHE_LRU,
    SYM_FOLIO_ACCOUNT_DIRTIED, SYM_MARK_BUFFER_DIRTY, SYM_MARK_PAGE_ACCESSED, TP_WRITEBACK,
    TP_WRITEBACK_DIRTY_FOLIO, TP_WRITEBACK_DIRTY_PAGE,
};

/// A kernel instrumentation point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Function-entry kprobe on a kernel symbol
    KProbe { symbol: &'static str },
    /// Static tracepoint `category:name`
    TracePoint { category: &'static str, name: &'static str },
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::KProbe { symbol } => write!(f, "kprobe:{symbol}"),
            Hook::TracePoint { category, name } => write!(f, "tracepoint:{category}:{name}"),
        }
    }
}

/// One way of binding an event class: an eBPF program and where to attach it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub program: &'static str,
    pub hook: Hook,
}

/// How an event class gets bound
#[derive(Debug, Clone, Copy)]
pub enum Targets {
    /// Always-present symbol; attach directly, failure is fatal
    Fixed(Strategy),
    /// Try in order, first candidate the kernel supports wins
    Fallback(&'static [Strategy]),
}

const fn kprobe(program: &'static str, symbol: &'static str) -> Strategy {
    Strategy { program, hook: Hook::KProbe { symbol } }
}

const fn tracepoint(program: &'static str, category: &'static str, name: &'static str) -> Strategy {
    Strategy { program, hook: Hook::TracePoint { category, name } }
}

/// Dirty-writeback candidates, newest kprobe first, oldest tracepoint last
pub const DIRTY_WRITEBACK_STRATEGIES: [Strategy; 4] = [
    kprobe(PROG_PAGE_DIRTIED, SYM_FOLIO_ACCOUNT_DIRTIED),
    kprobe(PROG_PAGE_DIRTIED, SYM_ACCOUNT_PAGE_DIRTIED),
    tracepoint(PROG_PAGE_DIRTIED_TP, TP_WRITEBACK, TP_WRITEBACK_DIRTY_FOLIO),
    tracepoint(PROG_PAGE_DIRTIED_TP, TP_WRITEBACK, TP_WRITEBACK_DIRTY_PAGE),
];

/// Every event class and how to bind it, in attachment order
pub const HOOK_TABLE: [(EventClass, Targets); 4] = [
    (
        EventClass::CacheInsert,
        Targets::Fixed(kprobe(PROG_CACHE_INSERT, SYM_ADD_TO_PAGE_CACHE_LRU)),
    ),
    (
        EventClass::PageAccessed,
        Targets::Fixed(kprobe(PROG_PAGE_ACCESSED, SYM_MARK_PAGE_ACCESSED)),
    ),
    (
        EventClass::BufferDirtied,
        Targets::Fixed(kprobe(PROG_BUFFER_DIRTIED, SYM_MARK_BUFFER_DIRTY)),
    ),
    (EventClass::PageDirtyWriteback, Targets::Fallback(&DIRTY_WRITEBACK_STRATEGIES)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_class_once() {
        let classes: Vec<_> = HOOK_TABLE.iter().map(|(class, _)| *class).collect();
        assert_eq!(classes, EventClass::ALL.to_vec());
    }

    #[test]
    fn test_dirty_writeback_priority_order() {
        let hooks: Vec<String> =
            DIRTY_WRITEBACK_STRATEGIES.iter().map(|s| s.hook.to_string()).collect();
        assert_eq!(
            hooks,
            vec![
                "kprobe:folio_account_dirtied",
                "kprobe:account_page_dirtied",
                "tracepoint:writeback:writeback_dirty_folio",
                "tracepoint:writeback:writeback_dirty_page",
            ]
        );
    }

    #[test]
    fn test_only_dirty_writeback_falls_back() {
        for (class, targets) in &HOOK_TABLE {
            let fallback = matches!(targets, Targets::Fallback(_));
            assert_eq!(fallback, *class == EventClass::PageDirtyWriteback, "{}", class.name());
        }
        let (_, Targets::Fixed(first)) = HOOK_TABLE[0] else { panic!("cache_insert must be fixed") };
        assert_eq!(first.hook, Hook::KProbe { symbol: "add_to_page_cache_lru" });
    }
}
