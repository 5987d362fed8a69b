//! System Call Handler
//!
//! Dispatches system calls and implements individual syscall handlers.
//!
//! Handlers act on the current process. Any handler that invokes the
//! scheduler does so last, after every use of the caller's context,
//! because `current_pid` (and with it address translation) changes there.

use crate::error::KernelError;
use crate::kernel::Kernel;
use crate::mm::address::ProcAddr;
use crate::platform::Platform;
use crate::process::ProcState;
use crate::sched;

use super::validate;
use super::Syscall;

/// How far a system call got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyscallOutcome {
    /// Finished with a return value. The caller resumes after its ECALL.
    Complete(usize),
    /// The caller blocked. It resumes *at* its ECALL and retries.
    Pending,
    /// The caller is gone.
    Exited,
}

/// Dispatch a decoded system call for the current process.
///
/// Only `NoRunnableProcess` escapes; every other problem is reported and
/// turned into a return value.
pub fn dispatch<P: Platform>(kernel: &mut Kernel<P>, call: Syscall) -> Result<SyscallOutcome, KernelError> {
    match call {
        Syscall::PrintString(ptr) => Ok(sys_print_string(kernel, ptr)),
        Syscall::PutChar(byte) => {
            kernel.platform.putc(byte);
            Ok(SyscallOutcome::Complete(0))
        }
        Syscall::GetChar => sys_get_char(kernel),
        Syscall::Sleep(ticks) => sys_sleep(kernel, ticks),
        Syscall::Yield => {
            kernel.procs.current_mut().state = ProcState::Ready;
            sched::schedule(&mut kernel.procs, &mut kernel.platform)?;
            Ok(SyscallOutcome::Complete(0))
        }
        Syscall::Exit => {
            log::info!("pid {} exited", kernel.procs.current_pid());
            kernel.procs.current_mut().state = ProcState::None;
            sched::schedule(&mut kernel.procs, &mut kernel.platform)?;
            Ok(SyscallOutcome::Exited)
        }
        Syscall::Unknown(nr) => {
            log::warn!(
                "pid {}: {}",
                kernel.procs.current_pid(),
                KernelError::InvalidSyscallNumber(nr)
            );
            Ok(SyscallOutcome::Complete(0))
        }
    }
}

/// Print bytes from the caller's region up to a NUL or the region end.
fn sys_print_string<P: Platform>(kernel: &mut Kernel<P>, ptr: ProcAddr) -> SyscallOutcome {
    let start = match validate::validate_user_str(ptr) {
        Ok(start) => start,
        Err(e) => {
            log::warn!("pid {}: printastring: {}", kernel.procs.current_pid(), e);
            return SyscallOutcome::Complete(0);
        }
    };

    for offset in 0..validate::bytes_to_region_end(start) {
        let addr = kernel.procs.to_kernel(start.add(offset));
        let byte = kernel.platform.load_byte(addr);
        if byte == 0 {
            break;
        }
        kernel.platform.putc(byte);
    }
    SyscallOutcome::Complete(0)
}

/// Take one byte of input, or block the caller until some arrives.
fn sys_get_char<P: Platform>(kernel: &mut Kernel<P>) -> Result<SyscallOutcome, KernelError> {
    match kernel.input.read() {
        Ok(byte) => Ok(SyscallOutcome::Complete(byte as usize)),
        Err(_) => {
            let pid = kernel.procs.current_pid();
            log::debug!("pid {} blocked on input", pid);
            kernel.procs.block_on_input(pid);
            sched::schedule(&mut kernel.procs, &mut kernel.platform)?;
            Ok(SyscallOutcome::Pending)
        }
    }
}

/// The parameter is stored as an absolute wake-up tick, not added to the
/// current tick count.
fn sys_sleep<P: Platform>(kernel: &mut Kernel<P>, ticks: u64) -> Result<SyscallOutcome, KernelError> {
    if ticks > 0 {
        let pcb = kernel.procs.current_mut();
        pcb.state = ProcState::Sleeping;
        pcb.wakeuptime = ticks;
    }
    sched::schedule(&mut kernel.procs, &mut kernel.platform)?;
    Ok(SyscallOutcome::Complete(0))
}
