//! Passes the kernel linker script when building the bare-metal image.

use std::env;
use std::path::PathBuf;

fn main() {
    let target = env::var("TARGET").unwrap_or_default();
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let script = manifest_dir.join("src/arch/riscv/kernel.ld");

    if target.starts_with("riscv64") && target.ends_with("-none-elf") {
        println!("cargo:rustc-link-arg-bins=-T{}", script.display());
    }

    println!("cargo:rerun-if-changed={}", script.display());
    println!("cargo:rerun-if-changed=build.rs");
}
