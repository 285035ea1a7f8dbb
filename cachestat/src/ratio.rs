//! Page-cache hit ratio derivation
//!
//! Turns one interval of raw event counts into a hit percentage.
//!
//! ## Model
//!
//! - `total  = mark_page_accessed - mark_buffer_dirty` (real cache touches)
//! - `misses = add_to_page_cache_lru - account_page_dirtied` (real read misses)
//! - `hits   = total - misses`
//!
//! Read-ahead inserts more pages than were asked for, so `misses` can exceed
//! `total`. When that happens the whole interval is counted as misses rather
//! than reporting a negative hit count.

// Counts fit well within f64's 53-bit mantissa over any sane interval
#![allow(clippy::cast_precision_loss)]

use crate::domain::{CounterTable, EventClass, Sample};

/// Derive the hit ratio from raw interval counts
///
/// Arguments are the counts for `CacheInsert`, `PageAccessed`,
/// `BufferDirtied` and `PageDirtyWriteback` respectively.
///
/// Both differences are clamped at zero *before* `hits` is derived, and the
/// negative-hits correction runs *after*. Reordering changes the result
/// whenever a raw subtraction would go negative.
#[must_use]
pub fn compute_ratio(apcl: u64, mpa: u64, mbd: u64, apd: u64) -> Sample {
    let total = mpa.saturating_sub(mbd);
    let mut misses = apcl.saturating_sub(apd);
    let mut hits = i128::from(total) - i128::from(misses);

    if hits < 0 {
        misses = total;
        hits = 0;
    }

    // 0 <= hits <= total here, so the narrowing cannot fail
    let hits = u64::try_from(hits).unwrap_or(0);

    let hit_ratio = if total > 0 { hits as f64 / total as f64 * 100.0 } else { 0.0 };

    Sample { hit_ratio, hits, misses, total }
}

/// [`compute_ratio`] over a drained counter table
#[must_use]
pub fn sample_from_table(table: &CounterTable) -> Sample {
    compute_ratio(
        table[EventClass::CacheInsert],
        table[EventClass::PageAccessed],
        table[EventClass::BufferDirtied],
        table[EventClass::PageDirtyWriteback],
    )
}
