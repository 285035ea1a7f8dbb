//! Pre-flight checks for cachestat
//!
//! Validates system requirements before attempting to load eBPF programs.
//! Provides clear, actionable error messages when requirements aren't met.

#![allow(unsafe_code)] // geteuid() requires unsafe

use anyhow::{bail, Context, Result};

use crate::probes::tracefs::{find_root, TRACEFS_ROOTS};

/// Minimum kernel version: per-CPU array maps and tracepoint programs
const MIN_KERNEL_VERSION: (u32, u32) = (4, 7);

/// Run all pre-flight checks before eBPF loading
///
/// # Errors
/// Returns the first failed check with a description of how to fix it
pub fn run_preflight_checks() -> Result<()> {
    check_privileges()?;
    check_kernel_version()?;
    check_tracefs()?;
    Ok(())
}

/// Check if running with sufficient privileges for eBPF
fn check_privileges() -> Result<()> {
    if unsafe { libc::geteuid() } == 0 {
        return Ok(());
    }

    bail!(
        "Permission denied: cachestat requires root privileges to load eBPF programs.\n\n\
         Run with: sudo cachestat ..."
    );
}

/// Check if the kernel version is sufficient for eBPF features
fn check_kernel_version() -> Result<()> {
    let version_str = std::fs::read_to_string("/proc/version")
        .context("Failed to read kernel version from /proc/version")?;

    // "Linux version 5.15.0-generic ..." → "5.15.0-generic"
    let release = version_str.split_whitespace().nth(2).unwrap_or("unknown");
    check_kernel_release(release)
}

fn check_kernel_release(release: &str) -> Result<()> {
    let Some((major, minor)) = parse_kernel_release(release) else {
        // Can't parse, assume it's fine
        return Ok(());
    };

    if (major, minor) < MIN_KERNEL_VERSION {
        bail!(
            "Kernel version {}.{} is too old.\n\n\
             cachestat requires Linux {}.{} or newer for per-CPU maps and tracepoint programs.\n\
             Current kernel: {}",
            major,
            minor,
            MIN_KERNEL_VERSION.0,
            MIN_KERNEL_VERSION.1,
            release
        );
    }

    Ok(())
}

/// Check that tracefs is mounted so hook availability can be queried
fn check_tracefs() -> Result<()> {
    if find_root(&TRACEFS_ROOTS).is_none() {
        bail!(
            "tracefs is not mounted (looked in {}).\n\n\
             Mount it with: mount -t tracefs nodev /sys/kernel/tracing",
            TRACEFS_ROOTS.join(", ")
        );
    }
    Ok(())
}

/// `"6.1.0-arch1-1"` → `(6, 1)`
fn parse_kernel_release(release: &str) -> Option<(u32, u32)> {
    let mut parts = release.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts
        .next()?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()?;
    Some((major, minor))
}
