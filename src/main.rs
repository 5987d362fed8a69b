//! OtterOS kernel image
//!
//! On the bare-metal target this binary is just the reset vector; the
//! kernel itself lives in the library. Built for the host it only says so.

#![cfg_attr(all(target_arch = "riscv64", target_os = "none"), no_std, no_main)]

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
mod image {
    use otteros as _;

    // Include boot assembly
    core::arch::global_asm!(include_str!("arch/riscv/boot.S"));
}

#[cfg(not(all(target_arch = "riscv64", target_os = "none")))]
fn main() {
    println!(
        "otteros v{}: build with --target riscv64gc-unknown-none-elf and run under qemu-system-riscv64 -machine virt -bios none",
        otteros::VERSION
    );
}
