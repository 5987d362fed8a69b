//! Device drivers for the QEMU virt machine
//!
//! Thin MMIO wrappers. They hold no policy; the trap handler reaches them
//! only through `Platform`.
//!
//! - `uart`: NS16550A console, also the `kprint!` sink
//! - `plic`: interrupt controller, hart 0 M-mode context
//! - `clint`: machine timer

pub mod clint;
pub mod plic;
pub mod uart;
