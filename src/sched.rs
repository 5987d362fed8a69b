//! Round-robin scheduler
//!
//! No priorities and no run queue: the process table itself is scanned
//! cyclically, starting just after the current process.

use crate::config::MAXPROCS;
use crate::error::KernelError;
use crate::platform::Platform;
use crate::process::{Pid, ProcState, ProcessTable};

/// First READY pid scanning forward from `current_pid + 1`, wrapping.
/// The current process itself is considered last.
pub fn pick_next(procs: &ProcessTable) -> Option<Pid> {
    let start = procs.current_pid() + 1;
    (0..MAXPROCS)
        .map(|i| (start + i) % MAXPROCS)
        .find(|&pid| procs.get(pid).is_some_and(|p| p.is_ready()))
}

/// Select the next process and make it RUNNING.
///
/// Also points `mscratch` at the new process's region. The page table is
/// left alone; the trap handler switches it while finalizing, together
/// with the TLB flush.
///
/// Fails with `NoRunnableProcess` when nothing is READY. Callers must make
/// sure that cannot happen; the trap handler treats it as fatal.
pub fn schedule<P: Platform>(procs: &mut ProcessTable, platform: &mut P) -> Result<Pid, KernelError> {
    let prev = procs.current_pid();
    let next = pick_next(procs).ok_or(KernelError::NoRunnableProcess)?;

    procs.set_current(next);
    let pcb = procs.current_mut();
    pcb.state = ProcState::Running;
    platform.set_scratch(pcb.physbase());

    if prev != next {
        log::trace!("switch {} -> {}", prev, next);
    }
    Ok(next)
}
