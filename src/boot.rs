//! Static process layout and initial process table
//!
//! Every pid owns one `PROC_REGION_SIZE` region starting at
//! `PROC_REGION_BASE + pid * PROC_REGION_SIZE`. The program image starts at
//! process-relative address 0; the stack grows down from the top of the
//! region, and the first register frame sits just below the stack top so
//! the first dispatch can go through the normal trap-return path.

use crate::config::{MAXPROCS, PROC_REGION_BASE, PROC_REGION_SIZE};
use crate::mm::address::{PhysAddr, ProcAddr};
use crate::process::{Pcb, Pid, ProcState, ProcessTable};
use crate::trap::{TrapFrame, TRAP_FRAME_SIZE};

/// Where a process lives and how it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessLayout {
    pub physbase: PhysAddr,
    /// Entry point (process-relative).
    pub entry: usize,
    /// Initial user stack pointer (process-relative).
    pub stack_top: ProcAddr,
    /// Initial saved register frame (process-relative).
    pub frame: ProcAddr,
}

/// Layout of process `pid`.
pub const fn layout(pid: Pid) -> ProcessLayout {
    // Keep the top 16 bytes free and the stack 16-byte aligned.
    let stack_top = (PROC_REGION_SIZE - 16) & !0xf;
    ProcessLayout {
        physbase: PhysAddr::new(PROC_REGION_BASE + pid * PROC_REGION_SIZE),
        entry: 0,
        stack_top: ProcAddr::new(stack_top),
        frame: ProcAddr::new(stack_top - TRAP_FRAME_SIZE),
    }
}

/// Register frame a process is first resumed from: all zero apart from
/// the stack pointer.
pub fn initial_frame(layout: &ProcessLayout) -> TrapFrame {
    let mut frame = TrapFrame::default();
    frame.set_sp(layout.stack_top.as_usize());
    frame
}

/// Build the boot process table. Pid 0 is RUNNING, pids `1..runnable` are
/// READY and the remaining slots are NONE. `roots[pid]` is the physical
/// address of that process's root page table.
pub fn process_table(roots: &[PhysAddr; MAXPROCS], runnable: usize) -> ProcessTable {
    let pcbs = core::array::from_fn(|pid| {
        let layout = layout(pid);
        let mut pcb = Pcb::new(layout.physbase, roots[pid], layout.entry, layout.frame);
        pcb.state = match pid {
            0 => ProcState::Running,
            p if p < runnable => ProcState::Ready,
            _ => ProcState::None,
        };
        pcb
    });
    ProcessTable::new(pcbs, 0)
}
