//! Address translation for the trap handler
//!
//! The trap handler runs with direct physical addressing, so anything a
//! process hands over (stack pointer, syscall pointer arguments) has to be
//! rebased onto the process's region before the kernel touches it.
//!
//! Both directions use the *current* process. Translate before the
//! scheduler switches `current_pid`, never after.

use super::address::{PhysAddr, ProcAddr};
use crate::process::ProcessTable;

impl ProcessTable {
    /// Process-relative address of the current process → physical address.
    #[inline]
    pub fn to_kernel(&self, addr: ProcAddr) -> PhysAddr {
        self.current().physbase().add(addr.as_usize())
    }

    /// Physical address → address relative to the current process.
    #[inline]
    pub fn to_process(&self, addr: PhysAddr) -> ProcAddr {
        ProcAddr::new(addr.offset_from(self.current().physbase()))
    }
}
