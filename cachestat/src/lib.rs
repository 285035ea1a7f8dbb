//! # cachestat - eBPF Page-Cache Hit Ratio Agent
//!
//! cachestat counts four kernel page-cache events with eBPF and turns each
//! interval's counts into a system-wide hit-ratio percentage. It runs until
//! told to stop, in the foreground or as a daemon.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   eBPF Programs (Kernel)                     │
//! │  kprobes: add_to_page_cache_lru, mark_page_accessed,         │
//! │           mark_buffer_dirty, folio/account_page_dirtied      │
//! │  tracepoints: writeback_dirty_{folio,page} (fallback)        │
//! └──────────────────────────┬───────────────────────────────────┘
//!                            │ PAGECACHE_COUNTS (per-CPU array)
//!                            ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    cachestat (This Crate)                    │
//! │                                                              │
//! │  ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐   │
//! │  │ Counters │──▶│ Sampler  │──▶│  Ratio   │──▶│ Reporter │   │
//! │  │ (drain)  │   │ (loop)   │   │ (pure)   │   │ stdout / │   │
//! │  └──────────┘   └──────────┘   └──────────┘   │ statsd   │   │
//! │       ▲                                       └──────────┘   │
//! │  ┌──────────┐                                                │
//! │  │  Probes  │ attach once at startup, with fallback          │
//! │  └──────────┘                                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`probes`]: hook table, fallback attachment, tracefs discovery, aya loading
//! - [`counters`]: the [`counters::CounterSource`] capability (kernel map or in-memory)
//! - [`ratio`]: hit-ratio derivation with the read-ahead correction
//! - [`sampler`]: the cancellable interval loop
//! - [`report`]: stdout and DogStatsD reporters
//! - [`lifecycle`]: daemon mode, PID file, termination signals
//! - [`preflight`]: root, kernel version and tracefs checks
//! - [`cli`], [`logging`]: argument parsing and logger setup
//! - [`domain`]: core types and errors
//!
//! ## Typical Usage
//!
//! ```bash
//! # Print the hit ratio every 5 seconds
//! sudo ./cachestat
//!
//! # Background agent feeding a local DogStatsD
//! sudo ./cachestat --daemon --send-metrics --log-file /var/log/cachestat.log
//! ```

pub mod cli;
pub mod counters;
pub mod domain;
pub mod lifecycle;
pub mod logging;
pub mod preflight;
pub mod probes;
pub mod ratio;
pub mod report;
pub mod sampler;
