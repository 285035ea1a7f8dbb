//! Probe attachment manager
//!
//! Binds every event class to exactly one live kernel hook before sampling
//! starts. Per class the state moves
//! `Unattached → Probing(i) → Attached(i) | Probing(i + 1) → … → FatalFailure`.
//!
//! A fallback candidate is skipped when the kernel does not offer its hook,
//! and superseded by the next one when binding fails. Nothing is retried.

use std::fmt;

use log::{debug, warn};

use super::hooks::{Hook, Strategy, Targets, HOOK_TABLE};
use crate::domain::{AttachError, EventClass};

/// What the running kernel offers
pub trait KernelHooks {
    fn kprobe_available(&self, symbol: &str) -> bool;

    fn tracepoint_available(&self, category: &str, name: &str) -> bool;

    fn is_available(&self, hook: &Hook) -> bool {
        match hook {
            Hook::KProbe { symbol } => self.kprobe_available(symbol),
            Hook::TracePoint { category, name } => self.tracepoint_available(category, name),
        }
    }
}

/// Binds a program to a hook
pub trait HookAttacher {
    /// # Errors
    /// Returns an error if the program is missing or the kernel rejects the attachment
    fn attach(&mut self, strategy: &Strategy) -> Result<(), AttachError>;
}

/// The hook chosen for one event class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub class: EventClass,
    pub strategy: Strategy,
    /// 1-based position of the chosen candidate in its priority list
    pub rank: usize,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} (strategy {})", self.class.name(), self.strategy.hook, self.rank)
    }
}

/// Attachment bindings for all event classes, fixed after startup
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    bindings: Vec<Binding>,
}

impl Bindings {
    #[must_use]
    pub fn get(&self, class: EventClass) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.class == class)
    }

    /// In attachment order
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }
}

/// Attach every class in [`HOOK_TABLE`]
///
/// # Errors
/// Returns the first class that could not be bound
pub fn attach_all<K, A>(kernel: &K, attacher: &mut A) -> Result<Bindings, AttachError>
where
    K: KernelHooks + ?Sized,
    A: HookAttacher + ?Sized,
{
    let mut bindings = Vec::with_capacity(HOOK_TABLE.len());
    for (class, targets) in &HOOK_TABLE {
        bindings.push(attach_class(*class, targets, kernel, attacher)?);
    }
    Ok(Bindings { bindings })
}

/// Bind one event class
///
/// # Errors
/// - Fixed targets: the attach error itself
/// - Fallback targets: [`AttachError::NoSupportedTarget`] listing every candidate
pub fn attach_class<K, A>(
    class: EventClass,
    targets: &Targets,
    kernel: &K,
    attacher: &mut A,
) -> Result<Binding, AttachError>
where
    K: KernelHooks + ?Sized,
    A: HookAttacher + ?Sized,
{
    match targets {
        Targets::Fixed(strategy) => {
            attacher.attach(strategy)?;
            Ok(Binding { class, strategy: *strategy, rank: 1 })
        }
        Targets::Fallback(candidates) => {
            for (i, strategy) in candidates.iter().enumerate() {
                debug!("{}: probing candidate {} ({})", class.name(), i + 1, strategy.hook);

                if !kernel.is_available(&strategy.hook) {
                    debug!("{}: {} not offered by this kernel", class.name(), strategy.hook);
                    continue;
                }

                match attacher.attach(strategy) {
                    Ok(()) => return Ok(Binding { class, strategy: *strategy, rank: i + 1 }),
                    Err(e) => warn!("{}: {e}, trying next candidate", class.name()),
                }
            }

            Err(AttachError::NoSupportedTarget {
                class,
                attempted: candidates.iter().map(|s| s.hook.to_string()).collect(),
            })
        }
    }
}
