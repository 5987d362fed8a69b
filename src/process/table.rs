//! Fixed-size process table
//!
//! Slots are populated once at boot and live for the lifetime of the
//! kernel. An exited process drops to `None` and its slot is never reused.

use heapless::Deque;

use super::pcb::{Pcb, Pid, ProcState};
use crate::config::MAXPROCS;

/// The process table plus the scheduling scalars that go with it.
#[derive(Debug, Clone)]
pub struct ProcessTable {
    pcbs: [Pcb; MAXPROCS],
    current: Pid,
    /// Processes blocked on UART input, oldest first.
    input_waiters: Deque<Pid, MAXPROCS>,
}

impl ProcessTable {
    /// Build a table from fully initialised PCBs. `current` must be the
    /// one slot whose state is `Running`.
    pub fn new(pcbs: [Pcb; MAXPROCS], current: Pid) -> Self {
        debug_assert!(current < MAXPROCS);
        debug_assert_eq!(pcbs[current].state, ProcState::Running);
        Self {
            pcbs,
            current,
            input_waiters: Deque::new(),
        }
    }

    /// Pid of the RUNNING process.
    #[inline]
    pub fn current_pid(&self) -> Pid {
        self.current
    }

    #[inline]
    pub fn current(&self) -> &Pcb {
        &self.pcbs[self.current]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut Pcb {
        &mut self.pcbs[self.current]
    }

    /// Make `pid` the current process. Only the scheduler switches.
    #[inline]
    pub(crate) fn set_current(&mut self, pid: Pid) {
        self.current = pid;
    }

    #[inline]
    pub fn get(&self, pid: Pid) -> Option<&Pcb> {
        self.pcbs.get(pid)
    }

    #[inline]
    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Pcb> {
        self.pcbs.get_mut(pid)
    }

    /// Iterate over all slots with their pids.
    pub fn iter(&self) -> impl Iterator<Item = (Pid, &Pcb)> {
        self.pcbs.iter().enumerate()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (Pid, &mut Pcb)> {
        self.pcbs.iter_mut().enumerate()
    }

    /// Number of slots in the given state.
    pub fn count_in(&self, state: ProcState) -> usize {
        self.pcbs.iter().filter(|p| p.state == state).count()
    }

    /// The oldest process blocked on input, if any.
    #[inline]
    pub fn waiting_pid(&self) -> Option<Pid> {
        self.input_waiters.front().copied()
    }

    /// Block `pid` until input arrives.
    pub fn block_on_input(&mut self, pid: Pid) {
        self.pcbs[pid].state = ProcState::Blocked;
        if self.input_waiters.iter().any(|&p| p == pid) {
            return;
        }
        // One entry per pid at most, so the queue cannot overflow.
        if self.input_waiters.push_back(pid).is_err() {
            log::error!("input wait queue full, pid {} not queued", pid);
        }
    }

    /// Release up to `limit` input waiters in FIFO order. Returns how many
    /// became READY.
    pub fn wake_input_waiters(&mut self, limit: usize) -> usize {
        let mut woken = 0;
        while woken < limit {
            let Some(pid) = self.input_waiters.pop_front() else {
                break;
            };
            let pcb = &mut self.pcbs[pid];
            if pcb.state == ProcState::Blocked {
                pcb.state = ProcState::Ready;
                log::debug!("pid {} woken by input", pid);
                woken += 1;
            }
        }
        woken
    }
}
