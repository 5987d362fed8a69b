//! System Call Interface
//!
//! One call number in `a7`, one integer parameter in `a0`, one integer
//! result back in `a0`. The numbers below are the stable ABI user programs
//! are built against.
//!
//! # Syscalls
//! - 1: printastring(ptr) - print a NUL-terminated string
//! - 2: putachar(c) - print one byte
//! - 3: getachar() - read one byte of UART input, blocking
//! - 4: sleep(ticks) - sleep until the tick counter reaches `ticks`
//! - 23: yield() - give up the CPU
//! - 42: exit() - terminate the calling process

mod handler;
mod validate;

pub use handler::{dispatch, SyscallOutcome};

use crate::mm::address::ProcAddr;

/// System call numbers
pub mod numbers {
    pub const PRINTASTRING: usize = 1;
    pub const PUTACHAR: usize = 2;
    pub const GETACHAR: usize = 3;
    pub const SLEEP: usize = 4;
    pub const YIELD: usize = 23;
    pub const EXIT: usize = 42;
}

/// A decoded system call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syscall {
    PrintString(ProcAddr),
    PutChar(u8),
    GetChar,
    Sleep(u64),
    Yield,
    Exit,
    Unknown(usize),
}

impl Syscall {
    /// Decode the raw number/parameter pair taken from the trapped frame.
    pub fn decode(nr: usize, param: usize) -> Self {
        match nr {
            numbers::PRINTASTRING => Syscall::PrintString(ProcAddr::new(param)),
            numbers::PUTACHAR => Syscall::PutChar(param as u8),
            numbers::GETACHAR => Syscall::GetChar,
            numbers::SLEEP => Syscall::Sleep(param as u64),
            numbers::YIELD => Syscall::Yield,
            numbers::EXIT => Syscall::Exit,
            other => Syscall::Unknown(other),
        }
    }
}
