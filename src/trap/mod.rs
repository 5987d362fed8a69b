//! RISC-V Machine-Mode Trap Handling
//!
//! The trampoline in `arch/riscv/trap.S` saves the trapped process's
//! registers into a frame on its own stack and hands the frame's physical
//! address to [`Kernel::handle_trap`]. What comes back is the physical
//! address of the frame to restore and the PC to `mret` to, which may
//! belong to a different process.
//!
//! # Trap Lifecycle
//! - Entered: save `pc`/`sp` into the trapped PCB, mark it READY
//! - Classified: timer, external interrupt, ECALL, or anything else
//! - Dispatched: the path above may have switched `current_pid`
//! - Finalized: activate the current process's page table and `mscratch`,
//!   locate its frame
//!
//! # Fault Policy
//! Exceptions other than ECALL get a diagnostic and nothing else. The
//! process resumes at the faulting instruction, so a persistent fault
//! repeats forever. This is a known limitation, reported as
//! [`TrapOutcome::Fault`].

mod cause;
mod frame;

#[cfg(test)]
mod tests;

pub use cause::{describe_cause, is_interrupt, TrapCause, ECALL_FROM_U, INTERRUPT_FLAG, MEI, MTI};
pub use frame::{reg, TrapFrame, TRAP_FRAME_SIZE};

use crate::config::{devices::UART0_IRQ, TIMER_INTERVAL, WAKE_CHECK_PERIOD};
use crate::error::KernelError;
use crate::kernel::Kernel;
use crate::mm::address::PhysAddr;
use crate::platform::Platform;
use crate::process::{Pid, ProcState};
use crate::ringbuf;
use crate::sched;
use crate::syscall::{self, Syscall, SyscallOutcome};

/// Marker written to the UART when a received byte is dropped.
pub const OVERFLOW_MARKER: u8 = b'*';

/// Trap CSRs as read on entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapInfo {
    /// `mcause`
    pub cause: usize,
    /// `mepc`: the trapped instruction
    pub epc: usize,
    /// `mtval`: faulting address or instruction, cause dependent
    pub tval: usize,
}

/// What one trap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapOutcome {
    Syscall(SyscallOutcome),
    /// Timer tick; `rescheduled` on every `WAKE_CHECK_PERIOD`th tick.
    Timer { ticks: u64, rescheduled: bool },
    /// External interrupt `irq` serviced.
    External { irq: u32 },
    /// An interrupt source the kernel does not use.
    Ignored { cause: usize },
    /// Unhandled exception. No recovery, the faulting instruction reruns.
    Fault { cause: usize, pc: usize, tval: usize },
}

/// Where to continue after a trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resume {
    /// Pid of the process being resumed.
    pub pid: Pid,
    /// Physical address of its saved register frame.
    pub frame: PhysAddr,
    /// Value for `mepc`.
    pub pc: usize,
    pub outcome: TrapOutcome,
}

impl<P: Platform> Kernel<P> {
    /// Handle one trap taken while the current process was running.
    ///
    /// `frame` is the physical address of the registers the trampoline
    /// saved. Fails only with `NoRunnableProcess`, which leaves the kernel
    /// with nothing to resume.
    pub fn handle_trap(&mut self, frame: PhysAddr, info: TrapInfo) -> Result<Resume, KernelError> {
        let caller = self.enter(frame, info.epc);
        log::trace!(
            "trap pid={} cause={:#x} ({}) epc={:#x}",
            caller,
            info.cause,
            describe_cause(info.cause),
            info.epc
        );

        let outcome = match TrapCause::from(info.cause) {
            TrapCause::MachineTimer => self.on_timer()?,
            TrapCause::MachineExternal => self.on_external(),
            TrapCause::EnvCall => self.on_ecall(caller, frame)?,
            TrapCause::Interrupt(code) => {
                log::warn!("ignoring interrupt code {}", code);
                TrapOutcome::Ignored { cause: info.cause }
            }
            TrapCause::Exception(_) => self.on_fault(caller, info),
        };

        Ok(self.finalize(outcome))
    }

    /// Record where the current process stopped. It stays READY unless the
    /// dispatch path decides otherwise.
    fn enter(&mut self, frame: PhysAddr, epc: usize) -> Pid {
        let sp = self.procs.to_process(frame);
        let pcb = self.procs.current_mut();
        pcb.pc = epc;
        pcb.sp = sp;
        pcb.state = ProcState::Ready;
        self.procs.current_pid()
    }

    fn on_timer(&mut self) -> Result<TrapOutcome, KernelError> {
        let next = self.platform.timer_now().wrapping_add(TIMER_INTERVAL);
        self.platform.timer_set_next(next);
        self.ticks += 1;

        let rescheduled = self.ticks % WAKE_CHECK_PERIOD == 0;
        if rescheduled {
            self.wake_sleepers();
            sched::schedule(&mut self.procs, &mut self.platform)?;
        }
        Ok(TrapOutcome::Timer {
            ticks: self.ticks,
            rescheduled,
        })
    }

    fn wake_sleepers(&mut self) {
        let now = self.ticks;
        for (pid, pcb) in self.procs.iter_mut() {
            if pcb.state == ProcState::Sleeping && now >= pcb.wakeuptime {
                pcb.state = ProcState::Ready;
                pcb.wakeuptime = 0;
                log::debug!("pid {} woke at tick {}", pid, now);
            }
        }
    }

    fn on_external(&mut self) -> TrapOutcome {
        let irq = self.platform.irq_claim();
        if irq == UART0_IRQ {
            if self.platform.uart_read_ready() {
                let byte = self.platform.uart_read_byte();
                if let Err(ringbuf::Full(dropped)) = self.input.write(byte) {
                    self.platform.putc(OVERFLOW_MARKER);
                    log::warn!("{}: {:#04x}", KernelError::RingBufferFull, dropped);
                }
            }
            self.platform.irq_complete(irq);
            self.procs.wake_input_waiters(self.input.len());
        } else if irq != 0 {
            log::warn!("unexpected external irq {}", irq);
            self.platform.irq_complete(irq);
        }
        TrapOutcome::External { irq }
    }

    /// Run a system call for `caller`. A completed call moves the caller
    /// past its ECALL and leaves the result in its saved `a0`; a blocked
    /// call leaves the PC on the ECALL so it runs again.
    fn on_ecall(&mut self, caller: Pid, frame: PhysAddr) -> Result<TrapOutcome, KernelError> {
        let (nr, param) = {
            let regs = self.platform.frame_mut(frame);
            (regs.syscall_number(), regs.syscall_param())
        };
        let call = Syscall::decode(nr, param);
        let outcome = syscall::dispatch(self, call)?;

        if let SyscallOutcome::Complete(ret) = outcome {
            if let Some(pcb) = self.procs.get_mut(caller) {
                pcb.pc = pcb.pc.wrapping_add(4);
            }
            self.platform.frame_mut(frame).set_return_value(ret);
        }
        Ok(TrapOutcome::Syscall(outcome))
    }

    fn on_fault(&mut self, pid: Pid, info: TrapInfo) -> TrapOutcome {
        log::error!(
            "pid {}: {} ({}) pc={:#x} tval={:#x}",
            pid,
            KernelError::UnhandledTrapCause(info.cause),
            describe_cause(info.cause),
            info.epc,
            info.tval
        );
        TrapOutcome::Fault {
            cause: info.cause,
            pc: info.epc,
            tval: info.tval,
        }
    }

    /// Prepare the machine to run the current process for the first time.
    /// Returns its frame and entry PC.
    pub fn start(&mut self) -> (PhysAddr, usize) {
        let (_, frame, pc) = self.activate_current();
        (frame, pc)
    }

    fn finalize(&mut self, outcome: TrapOutcome) -> Resume {
        let (pid, frame, pc) = self.activate_current();
        Resume {
            pid,
            frame,
            pc,
            outcome,
        }
    }

    /// Set up the machine for whichever process is current now.
    fn activate_current(&mut self) -> (Pid, PhysAddr, usize) {
        let pid = self.procs.current_pid();
        let pcb = self.procs.current_mut();
        // Still current and not scheduled away: it keeps the CPU.
        if pcb.state == ProcState::Ready {
            pcb.state = ProcState::Running;
        }
        let (root, physbase, pc, sp) = (pcb.pagetablebase(), pcb.physbase(), pcb.pc, pcb.sp);

        self.platform.activate_page_table(root);
        self.platform.set_scratch(physbase);
        (pid, self.procs.to_kernel(sp), pc)
    }
}
