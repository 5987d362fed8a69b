//! Hardware seam for the trap handler
//!
//! The core never touches a CSR or an MMIO register itself. Everything it
//! needs from the machine goes through `Platform`: the device primitives
//! (UART, PLIC, CLINT), the two CSRs it programs on a switch, and access to
//! physical memory for syscall arguments and saved register frames.

use crate::mm::address::PhysAddr;
use crate::trap::TrapFrame;

/// Machine primitives consumed by the kernel core.
pub trait Platform {
    /// Receive data is waiting in the UART.
    fn uart_read_ready(&self) -> bool;
    /// Take one byte from the UART receiver.
    fn uart_read_byte(&mut self) -> u8;
    /// The UART transmitter can accept a byte.
    fn uart_write_ready(&self) -> bool;
    /// Hand one byte to the UART transmitter.
    fn uart_write_byte(&mut self, byte: u8);

    /// Claim the highest-priority pending interrupt (0 when none).
    fn irq_claim(&mut self) -> u32;
    /// Tell the interrupt controller `irq` has been serviced.
    fn irq_complete(&mut self, irq: u32);

    /// Current value of the machine timer.
    fn timer_now(&self) -> u64;
    /// Program the timer to interrupt at `deadline`.
    fn timer_set_next(&mut self, deadline: u64);

    /// Load `mscratch`. The trap trampoline uses it to find the physical
    /// base of whichever process traps next.
    fn set_scratch(&mut self, physbase: PhysAddr);
    /// Switch `satp` to the table rooted at `root` and flush the TLB.
    fn activate_page_table(&mut self, root: PhysAddr);

    /// Read one byte of physical memory.
    fn load_byte(&self, addr: PhysAddr) -> u8;
    /// The saved register frame at `addr`.
    fn frame_mut(&mut self, addr: PhysAddr) -> &mut TrapFrame;

    /// Blocking write of one byte to the UART.
    fn putc(&mut self, byte: u8) {
        while !self.uart_write_ready() {
            core::hint::spin_loop();
        }
        self.uart_write_byte(byte);
    }
}
