//! Saved register frame

use static_assertions::const_assert_eq;

/// Register indices into [`TrapFrame::x`].
pub mod reg {
    pub const RA: usize = 1;
    pub const SP: usize = 2;
    /// Syscall parameter and return value
    pub const A0: usize = 10;
    /// Syscall number
    pub const A7: usize = 17;
    pub const T6: usize = 31;
}

/// General purpose registers of a trapped process.
///
/// Must match the save/restore layout of `arch/riscv/trap.S`: `x[i]` at
/// offset `i * 8`. Slot 0 is never written. `x[SP]` holds the user stack
/// pointer as the process saw it (process-relative).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapFrame {
    pub x: [usize; 32],
}

/// Size of a saved frame in bytes.
pub const TRAP_FRAME_SIZE: usize = core::mem::size_of::<TrapFrame>();

const_assert_eq!(TRAP_FRAME_SIZE, 32 * 8);
const_assert_eq!(TRAP_FRAME_SIZE % 16, 0);

impl TrapFrame {
    #[inline]
    pub fn syscall_number(&self) -> usize {
        self.x[reg::A7]
    }

    #[inline]
    pub fn syscall_param(&self) -> usize {
        self.x[reg::A0]
    }

    #[inline]
    pub fn set_return_value(&mut self, value: usize) {
        self.x[reg::A0] = value;
    }

    #[inline]
    pub fn sp(&self) -> usize {
        self.x[reg::SP]
    }

    #[inline]
    pub fn set_sp(&mut self, sp: usize) {
        self.x[reg::SP] = sp;
    }
}
