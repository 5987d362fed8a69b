//! Process control block

use crate::mm::address::{PhysAddr, ProcAddr};

/// Process identifier: an index into the process table.
pub type Pid = usize;

/// Scheduling state of a process slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ProcState {
    /// Unused or exited. Never scheduled again.
    #[default]
    None = 0,
    Ready = 1,
    Running = 2,
    /// Waiting for UART input.
    Blocked = 3,
    /// Waiting for the tick counter to reach `wakeuptime`.
    Sleeping = 4,
}

/// Per-process execution state and memory region.
///
/// `physbase` and `pagetablebase` are fixed when the slot is created and
/// are only readable afterwards.
#[derive(Debug, Clone, Copy)]
pub struct Pcb {
    pub state: ProcState,
    /// Resume address. Valid while the process is not RUNNING.
    pub pc: usize,
    /// Process-relative address of the saved register frame.
    pub sp: ProcAddr,
    /// Tick at or after which a SLEEPING process may run again.
    pub wakeuptime: u64,
    physbase: PhysAddr,
    pagetablebase: PhysAddr,
}

impl Pcb {
    pub const fn new(physbase: PhysAddr, pagetablebase: PhysAddr, pc: usize, sp: ProcAddr) -> Self {
        Self {
            state: ProcState::None,
            pc,
            sp,
            wakeuptime: 0,
            physbase,
            pagetablebase,
        }
    }

    /// Physical base of the process's private region.
    #[inline]
    pub const fn physbase(&self) -> PhysAddr {
        self.physbase
    }

    /// Physical address of the process's root page table.
    #[inline]
    pub const fn pagetablebase(&self) -> PhysAddr {
        self.pagetablebase
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state == ProcState::Ready
    }
}
