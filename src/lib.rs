//! OtterOS - Minimal Preemptive RISC-V Kernel
//!
//! A machine-mode kernel for the QEMU `virt` board that runs a handful of
//! user-mode processes, each isolated in its own Sv39 address space.
//!
//! # Features
//! - Round-robin preemptive scheduling on a machine-timer tick
//! - Six system calls: print, putchar, getchar, sleep, yield, exit
//! - Interrupt-driven UART input with blocking reads
//! - One 2 MiB region per process, mapped at address 0
//!
//! # Architecture
//! - Target: riscv64gc-unknown-none-elf
//! - Hypervisor: QEMU virt machine, `-bios none`
//! - Single hart, everything in M-mode except the processes
//!
//! The kernel core (`kernel`, `trap`, `syscall`, `sched`) never touches
//! hardware directly; it drives a [`platform::Platform`]. On the target
//! that is `arch::riscv::Machine`; under `cargo test` it is a mock, so
//! the whole trap handler runs on the host.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod arch;
pub mod boot;
pub mod config;
pub mod drivers;
pub mod error;
pub mod kernel;
pub mod logger;
pub mod mm;
pub mod platform;
pub mod process;
pub mod ringbuf;
pub mod sched;
pub mod syscall;
pub mod trap;

#[cfg(test)]
mod testing;

pub use error::KernelError;
pub use kernel::Kernel;

/// Kernel version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
