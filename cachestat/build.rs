//! Embed the eBPF object when `cargo xtask build-ebpf` has produced it.
//!
//! Without it the agent still builds (and its tests run); loading then fails
//! at runtime with a hint to build the object first.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rustc-check-cfg=cfg(embedded_ebpf)");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let object = manifest_dir.join("../target/bpfel-unknown-none/release/cachestat");

    println!("cargo:rerun-if-changed={}", object.display());

    if object.is_file() {
        println!("cargo:rustc-cfg=embedded_ebpf");
        println!("cargo:rustc-env=CACHESTAT_EBPF_OBJECT={}", object.display());
    }
}
