//! Domain model for cachestat
//!
//! This module contains core domain types and errors that provide:
//! - A typed view of the kernel counter table
//! - The per-interval sample handed to reporters
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use cachestat_common::EventClass;
pub use types::{CounterTable, ExecutionMode, Sample};

pub use errors::{AttachError, CounterReadError, DaemonError, ReportError, SamplerError};
