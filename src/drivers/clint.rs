//! Core-Local Interruptor: the machine timer

/// `mtimecmp` for hart 0
const MTIMECMP: usize = 0x4000;
/// Free-running `mtime` counter
const MTIME: usize = 0xbff8;

pub struct Clint {
    base: usize,
}

impl Clint {
    pub const fn new(base: usize) -> Self {
        Self { base }
    }

    /// Current `mtime`.
    pub fn now(&self) -> u64 {
        // SAFETY: mtime is a read-only counter in the CLINT block
        unsafe { core::ptr::read_volatile((self.base + MTIME) as *const u64) }
    }

    /// Raise the machine timer interrupt once `mtime >= deadline`.
    /// Writing also clears a pending timer interrupt.
    pub fn set_deadline(&mut self, deadline: u64) {
        // SAFETY: hart 0's mtimecmp in the CLINT block
        unsafe { core::ptr::write_volatile((self.base + MTIMECMP) as *mut u64, deadline) }
    }
}
