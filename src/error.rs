//! Kernel error taxonomy
//!
//! None of these reach user mode directly. The trap handler absorbs them
//! locally; user processes only ever see syscall return values and the
//! implicit retry of a blocking `GETACHAR`.

use core::fmt;

use crate::mm::address::ProcAddr;
use crate::ringbuf;

/// Errors raised while handling a trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// A received byte could not be buffered and was dropped.
    RingBufferFull,
    /// A read found no buffered input; the reader blocks.
    RingBufferEmpty,
    /// The syscall number is not part of the ABI.
    InvalidSyscallNumber(usize),
    /// A pointer argument lies outside the caller's private region.
    BadAddress(ProcAddr),
    /// An exception cause the kernel has no policy for.
    UnhandledTrapCause(usize),
    /// The scheduler found no READY process.
    NoRunnableProcess,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RingBufferFull => write!(f, "input ring buffer full, byte dropped"),
            Self::RingBufferEmpty => write!(f, "input ring buffer empty"),
            Self::InvalidSyscallNumber(nr) => write!(f, "invalid syscall number {}", nr),
            Self::BadAddress(addr) => write!(f, "bad user address {}", addr),
            Self::UnhandledTrapCause(cause) => write!(f, "unhandled trap cause {:#x}", cause),
            Self::NoRunnableProcess => write!(f, "no runnable process"),
        }
    }
}

impl From<ringbuf::Full> for KernelError {
    fn from(_: ringbuf::Full) -> Self {
        Self::RingBufferFull
    }
}

impl From<ringbuf::Empty> for KernelError {
    fn from(_: ringbuf::Empty) -> Self {
        Self::RingBufferEmpty
    }
}
