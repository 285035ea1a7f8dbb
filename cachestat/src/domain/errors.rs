//! Structured error types for cachestat
//!
//! Using thiserror for automatic Display implementation and error chaining.

use cachestat_common::EventClass;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttachError {
    #[error(
        "No supported kernel hook for {}: tried {}",
        .class.name(),
        .attempted.join(", ")
    )]
    NoSupportedTarget { class: EventClass, attempted: Vec<String> },

    #[error("Failed to attach {program} to {target}: {error}")]
    ProbeAttachFailed { program: &'static str, target: String, error: String },

    #[error("eBPF program {0} not found")]
    ProgramNotFound(&'static str),
}

#[derive(Error, Debug)]
pub enum CounterReadError {
    #[error("Counter map {0} not found")]
    MapNotFound(&'static str),

    #[error("Failed to read counter slot for {}: {source}", .class.name())]
    SlotRead {
        class: EventClass,
        #[source]
        source: aya::maps::MapError,
    },

    #[error(transparent)]
    Map(#[from] aya::maps::MapError),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("Counter read failed: {0}")]
    Counter(#[from] CounterReadError),

    #[error("Report failed: {0}")]
    Report(#[from] ReportError),
}

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("Another instance is already running (pid file {} is locked)", .path.display())]
    AlreadyRunning { path: PathBuf },

    #[error("Failed to access pid file {}: {source}", .path.display())]
    PidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to detach from terminal: {0}")]
    Detach(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_supported_target_names_every_attempt() {
        let err = AttachError::NoSupportedTarget {
            class: EventClass::PageDirtyWriteback,
            attempted: vec![
                "kprobe:folio_account_dirtied".to_string(),
                "kprobe:account_page_dirtied".to_string(),
                "tracepoint:writeback:writeback_dirty_folio".to_string(),
                "tracepoint:writeback:writeback_dirty_page".to_string(),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("page_dirty_writeback"));
        assert!(msg.contains("folio_account_dirtied"));
        assert!(msg.contains("account_page_dirtied"));
        assert!(msg.contains("writeback_dirty_folio"));
        assert!(msg.contains("writeback_dirty_page"));
    }

    #[test]
    fn test_probe_attach_error() {
        let err = AttachError::ProbeAttachFailed {
            program: "count_cache_insert",
            target: "kprobe:add_to_page_cache_lru".to_string(),
            error: "symbol not found".to_string(),
        };
        assert!(err.to_string().contains("count_cache_insert"));
        assert!(err.to_string().contains("add_to_page_cache_lru"));
    }

    #[test]
    fn test_already_running_mentions_path() {
        let err = DaemonError::AlreadyRunning { path: PathBuf::from("/var/run/cachestat.pid") };
        assert!(err.to_string().contains("/var/run/cachestat.pid"));
    }
}
