//! Build script for AWG firmware
//!
//! Handles memory layout configuration. The `embassy-stm32` `memory-x`
//! feature generates the linker script; this only wires the search path
//! and the defmt linker fragment for target builds.

fn main() {
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    if let Ok(dir) = std::env::var("CARGO_MANIFEST_DIR") {
        println!("cargo:rustc-link-search={dir}");
    }

    // Host test builds must not pull in the Cortex-M link scripts
    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_some() {
        let target = std::env::var("TARGET").unwrap_or_default();
        if target.starts_with("thumb") {
            println!("cargo:rustc-link-arg-bins=--nmagic");
            println!("cargo:rustc-link-arg-bins=-Tlink.x");
            println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
        }
    }
}
