//! Kernel hook discovery via tracefs
//!
//! - kprobe-able functions: `available_filter_functions`, minus the kprobe
//!   blacklist from debugfs when it is readable. Kernels built without
//!   dynamic ftrace have no such list; no kprobe is reported available then.
//! - tracepoints: `events/<category>/<name>/`

use anyhow::{bail, Context, Result};
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::manager::KernelHooks;

/// Where tracefs is usually mounted, newest location first
pub const TRACEFS_ROOTS: [&str; 2] = ["/sys/kernel/tracing", "/sys/kernel/debug/tracing"];

const KPROBE_BLACKLIST: &str = "/sys/kernel/debug/kprobes/blacklist";

/// Snapshot of the hooks a kernel offers
pub struct TraceFs {
    root: PathBuf,
    functions: HashSet<String>,
}

impl TraceFs {
    /// Find the mounted tracefs and read its function list
    ///
    /// # Errors
    /// Returns an error if no tracefs mount is found or it cannot be read
    pub fn discover() -> Result<Self> {
        let Some(root) = find_root(&TRACEFS_ROOTS) else {
            bail!(
                "tracefs not found at {}.\n\n\
                 Mount it with: mount -t tracefs nodev /sys/kernel/tracing",
                TRACEFS_ROOTS.join(" or ")
            );
        };
        Self::open(root, Some(Path::new(KPROBE_BLACKLIST)))
    }

    /// Read a tracefs tree rooted at `root`
    ///
    /// # Errors
    /// Returns an error if `available_filter_functions` exists but cannot be read
    pub fn open(root: impl Into<PathBuf>, blacklist: Option<&Path>) -> Result<Self> {
        let root = root.into();
        let path = root.join("available_filter_functions");
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} missing (no dynamic ftrace), kprobe list is empty", path.display());
                String::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let mut functions: HashSet<String> = content.lines().filter_map(parse_function).collect();

        if let Some(blacklist) = blacklist {
            // Only readable with debugfs mounted; absence is not an error
            if let Ok(content) = fs::read_to_string(blacklist) {
                for symbol in content.lines().filter_map(parse_blacklist_entry) {
                    functions.remove(symbol);
                }
            }
        }

        debug!("tracefs at {}: {} kprobe-able functions", root.display(), functions.len());
        Ok(Self { root, functions })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl KernelHooks for TraceFs {
    fn kprobe_available(&self, symbol: &str) -> bool {
        self.functions.contains(symbol)
    }

    fn tracepoint_available(&self, category: &str, name: &str) -> bool {
        self.root.join("events").join(category).join(name).is_dir()
    }
}

/// First candidate that looks like a tracefs mount
///
/// Every tracefs has `events/`; `available_filter_functions` does not exist
/// without dynamic ftrace.
pub fn find_root(candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().map(PathBuf::from).find(|p| p.join("events").is_dir())
}

/// `"folio_account_dirtied"` or `"xfs_iread [xfs]"` → symbol name
fn parse_function(line: &str) -> Option<String> {
    line.split_whitespace().next().map(str::to_string)
}

/// `"0xffffffff81000000-0xffffffff81000010\tsymbol"` → symbol name
fn parse_blacklist_entry(line: &str) -> Option<&str> {
    line.split_whitespace().nth(1)
}
