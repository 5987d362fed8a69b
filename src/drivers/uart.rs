//! NS16550A UART Driver for QEMU virt machine
//!
//! Serial console for kernel diagnostics and the byte stream user processes
//! read and write through syscalls.
//!
//! # Memory Map (QEMU virt)
//! - Base address: 0x1000_0000
//! - Byte-wide registers, PLIC source 10
//!
//! # Interrupts
//! Only "received data available" is enabled. The transmitter is polled.

use bitflags::bitflags;
use core::fmt::{self, Write};
use spin::Mutex;

use crate::config::devices::UART0_BASE;

/// NS16550 register offsets
mod regs {
    /// Receive buffer (read) / transmit holding (write)
    pub const RBR_THR: usize = 0x00;
    /// Interrupt enable
    pub const IER: usize = 0x01;
    /// FIFO control (write only)
    pub const FCR: usize = 0x02;
    /// Line status
    pub const LSR: usize = 0x05;
}

/// IER: received data available
const IER_RX_AVAILABLE: u8 = 1 << 0;
/// FCR: enable FIFOs and clear both
const FCR_ENABLE_AND_CLEAR: u8 = 0b111;

bitflags! {
    /// Line Status Register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineStatus: u8 {
        /// At least one byte waits in the receiver
        const DATA_READY = 1 << 0;
        const OVERRUN_ERROR = 1 << 1;
        const PARITY_ERROR = 1 << 2;
        const FRAMING_ERROR = 1 << 3;
        const BREAK = 1 << 4;
        /// Transmit holding register empty
        const THR_EMPTY = 1 << 5;
        const TX_IDLE = 1 << 6;
        const FIFO_ERROR = 1 << 7;
    }
}

/// NS16550A UART driver
pub struct Ns16550 {
    base: usize,
}

impl Ns16550 {
    /// Create a UART handle for the device at `base`.
    pub const fn new(base: usize) -> Self {
        Self { base }
    }

    /// Enable the FIFOs and the receive interrupt.
    ///
    /// # Safety
    /// - `base` must be the UART's MMIO base
    /// - Must only be called once, before any interrupt is enabled
    ///
    /// SAFETY AUDIT: 2026-10-19
    /// - 0x1000_0000 is fixed by the QEMU virt machine
    /// - Called once from kernel_main with interrupts disabled
    pub unsafe fn init(&mut self) {
        // SAFETY: guaranteed by the caller
        unsafe {
            self.write_reg(regs::FCR, FCR_ENABLE_AND_CLEAR);
            self.write_reg(regs::IER, IER_RX_AVAILABLE);
        }
    }

    /// Current line status.
    pub fn line_status(&self) -> LineStatus {
        // SAFETY: LSR reads have no side effects on the 16550
        LineStatus::from_bits_truncate(unsafe { self.read_reg(regs::LSR) })
    }

    #[inline]
    pub fn read_ready(&self) -> bool {
        self.line_status().contains(LineStatus::DATA_READY)
    }

    #[inline]
    pub fn write_ready(&self) -> bool {
        self.line_status().contains(LineStatus::THR_EMPTY)
    }

    /// Take the next received byte. Only meaningful when `read_ready()`.
    pub fn read_byte(&mut self) -> u8 {
        // SAFETY: RBR is a valid MMIO register at a fixed offset
        unsafe { self.read_reg(regs::RBR_THR) }
    }

    /// Write one byte without waiting for the transmitter.
    pub fn write_byte(&mut self, byte: u8) {
        // SAFETY: THR is a valid MMIO register at a fixed offset
        unsafe { self.write_reg(regs::RBR_THR, byte) }
    }

    /// Write one byte, spinning until the transmitter can take it.
    pub fn putc(&mut self, byte: u8) {
        while !self.write_ready() {
            core::hint::spin_loop();
        }
        self.write_byte(byte);
    }

    /// # Safety
    /// `offset` must name a readable register of the device at `self.base`.
    unsafe fn read_reg(&self, offset: usize) -> u8 {
        // SAFETY: guaranteed by the caller
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u8) }
    }

    /// # Safety
    /// `offset` must name a writable register of the device at `self.base`.
    unsafe fn write_reg(&mut self, offset: usize, value: u8) {
        // SAFETY: guaranteed by the caller
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u8, value) }
    }
}

impl Write for Ns16550 {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.putc(b'\r');
            }
            self.putc(byte);
        }
        Ok(())
    }
}

/// Global console UART protected by spinlock
pub static UART: Mutex<Ns16550> = Mutex::new(Ns16550::new(UART0_BASE));

/// Print macro for kernel output
#[macro_export]
macro_rules! kprint {
    ($($arg:tt)*) => {{
        use core::fmt::Write;
        let mut uart = $crate::drivers::uart::UART.lock();
        let _ = write!(uart, $($arg)*);
    }};
}

/// Println macro for kernel output
#[macro_export]
macro_rules! kprintln {
    () => {
        $crate::kprint!("\n")
    };
    ($($arg:tt)*) => {{
        $crate::kprint!($($arg)*);
        $crate::kprint!("\n");
    }};
}
