//! Kernel configuration constants
//!
//! Everything here is fixed at compile time. The values describe the QEMU
//! `virt` machine and the static process layout set up at boot.

use static_assertions::const_assert;

/// Number of process slots in the process table.
pub const MAXPROCS: usize = 8;

/// Capacity of the UART receive ring buffer in bytes.
pub const RING_CAPACITY: usize = 32;

/// Timer interval between two ticks, in `mtime` cycles.
/// About 1/10th of a second on QEMU.
pub const TIMER_INTERVAL: u64 = 2000;

/// Sleeping processes are only checked (and a reschedule forced) every
/// `WAKE_CHECK_PERIOD` ticks.
pub const WAKE_CHECK_PERIOD: u64 = 10;

/// Physical base of process 0's private region.
pub const PROC_REGION_BASE: usize = 0x8020_0000;

/// Size of one process region. Each region is mapped as a single Sv39
/// megapage at process-relative address 0.
pub const PROC_REGION_SIZE: usize = 0x20_0000;

/// Number of processes made runnable at boot (pid 0 runs first).
pub const BOOT_PROCESSES: usize = 2;

/// Device addresses and interrupt sources on the QEMU `virt` machine.
pub mod devices {
    /// NS16550A UART base address
    pub const UART0_BASE: usize = 0x1000_0000;
    /// Platform-level interrupt controller base address
    pub const PLIC_BASE: usize = 0x0c00_0000;
    /// Core-local interruptor (timer) base address
    pub const CLINT_BASE: usize = 0x0200_0000;
    /// PLIC interrupt source wired to UART0
    pub const UART0_IRQ: u32 = 10;
}

const_assert!(MAXPROCS > 0);
const_assert!(RING_CAPACITY > 0);
const_assert!(WAKE_CHECK_PERIOD > 0);
const_assert!(BOOT_PROCESSES > 0 && BOOT_PROCESSES <= MAXPROCS);
const_assert!(PROC_REGION_BASE % PROC_REGION_SIZE == 0);
