//! # eBPF Program Loading and Attachment
//!
//! Loads the compiled counting programs and binds them to kernel hooks.
//!
//! ## Attachment Points
//!
//! - **kprobe**: `add_to_page_cache_lru`, `mark_page_accessed`, `mark_buffer_dirty`
//! - **kprobe or tracepoint**: dirty-writeback accounting, chosen at startup
//!
//! Links are owned by the [`Ebpf`] object; the probes stay attached for as
//! long as it is alive.

use anyhow::Result;
#[cfg(embedded_ebpf)]
use aya::include_bytes_aligned;
use aya::{
    programs::{KProbe, Program, ProgramError, TracePoint},
    Ebpf,
};

use super::hooks::{Hook, Strategy};
use super::manager::HookAttacher;
use crate::domain::AttachError;

/// Load the eBPF program binary
///
/// Always uses the release build; see `cargo xtask build-ebpf`.
///
/// # Errors
/// Returns an error if the eBPF program binary cannot be loaded
#[cfg(embedded_ebpf)]
pub fn load_ebpf_program() -> Result<Ebpf> {
    let bpf = Ebpf::load(include_bytes_aligned!(env!("CACHESTAT_EBPF_OBJECT")))?;
    Ok(bpf)
}

/// Load the eBPF program binary
///
/// This build has no embedded object.
///
/// # Errors
/// Always: the object was missing when this binary was compiled
#[cfg(not(embedded_ebpf))]
pub fn load_ebpf_program() -> Result<Ebpf> {
    anyhow::bail!(
        "This binary was built without the eBPF object.\n\n\
         Run: cargo xtask build-ebpf --release && cargo build --release"
    )
}

/// Binds programs of a loaded [`Ebpf`] object
pub struct EbpfAttacher<'a> {
    bpf: &'a mut Ebpf,
}

impl<'a> EbpfAttacher<'a> {
    pub fn new(bpf: &'a mut Ebpf) -> Self {
        Self { bpf }
    }
}

impl HookAttacher for EbpfAttacher<'_> {
    fn attach(&mut self, strategy: &Strategy) -> Result<(), AttachError> {
        let program = self
            .bpf
            .program_mut(strategy.program)
            .ok_or(AttachError::ProgramNotFound(strategy.program))?;

        attach_program(program, strategy.hook).map_err(|e| AttachError::ProbeAttachFailed {
            program: strategy.program,
            target: strategy.hook.to_string(),
            error: e.to_string(),
        })
    }
}

fn attach_program(program: &mut Program, hook: Hook) -> Result<(), ProgramError> {
    match hook {
        Hook::KProbe { symbol } => {
            let program: &mut KProbe = program.try_into()?;
            // Shared by two candidates, so it may already be loaded
            if program.fd().is_err() {
                program.load()?;
            }
            program.attach(symbol, 0)?;
        }
        Hook::TracePoint { category, name } => {
            let program: &mut TracePoint = program.try_into()?;
            if program.fd().is_err() {
                program.load()?;
            }
            program.attach(category, name)?;
        }
    }
    Ok(())
}
