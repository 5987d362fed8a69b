//! Platform-Level Interrupt Controller
//!
//! Only hart 0's machine-mode context (context 0) is used.

mod regs {
    /// Source priorities, one u32 per source
    pub const PRIORITY: usize = 0x0000;
    /// Context 0 enable bits
    pub const ENABLE: usize = 0x2000;
    /// Context 0 priority threshold
    pub const THRESHOLD: usize = 0x20_0000;
    /// Context 0 claim/complete
    pub const CLAIM: usize = 0x20_0004;
}

/// PLIC register block for hart 0, M-mode.
pub struct Plic {
    base: usize,
}

impl Plic {
    pub const fn new(base: usize) -> Self {
        Self { base }
    }

    /// Give `irq` a non-zero priority and enable it for context 0.
    ///
    /// # Safety
    /// `self.base` must be the PLIC's MMIO base.
    pub unsafe fn enable(&mut self, irq: u32, priority: u32) {
        let word = regs::ENABLE + (irq as usize / 32) * 4;
        // SAFETY: guaranteed by the caller; offsets are within the PLIC
        unsafe {
            self.write(regs::PRIORITY + irq as usize * 4, priority);
            let bits = self.read(word);
            self.write(word, bits | 1 << (irq % 32));
        }
    }

    /// Accept interrupts of any priority above `threshold`.
    ///
    /// # Safety
    /// `self.base` must be the PLIC's MMIO base.
    pub unsafe fn set_threshold(&mut self, threshold: u32) {
        // SAFETY: guaranteed by the caller
        unsafe { self.write(regs::THRESHOLD, threshold) }
    }

    /// Claim the highest-priority pending source, 0 when none.
    pub fn claim(&mut self) -> u32 {
        // SAFETY: claim register of the PLIC this handle was created for
        unsafe { self.read(regs::CLAIM) }
    }

    /// Signal completion of `irq`.
    pub fn complete(&mut self, irq: u32) {
        // SAFETY: claim/complete register, see `claim`
        unsafe { self.write(regs::CLAIM, irq) }
    }

    unsafe fn read(&self, offset: usize) -> u32 {
        // SAFETY: guaranteed by the caller
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    unsafe fn write(&mut self, offset: usize, value: u32) {
        // SAFETY: guaranteed by the caller
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}
