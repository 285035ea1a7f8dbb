//! Kernel probe attachment
//!
//! - `hooks`: the declarative table of kernel hook points per event class
//! - `manager`: first-success fallback over that table
//! - `tracefs`: which kprobe symbols and tracepoints the running kernel offers
//! - `ebpf_setup`: load the eBPF object and bind programs with aya

pub mod ebpf_setup;
pub mod hooks;
pub mod manager;
pub mod tracefs;

pub use ebpf_setup::{load_ebpf_program, EbpfAttacher};
pub use hooks::{Hook, Strategy, Targets, HOOK_TABLE};
pub use manager::{attach_all, attach_class, Binding, Bindings, HookAttacher, KernelHooks};
pub use tracefs::TraceFs;
