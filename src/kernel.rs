//! The kernel context
//!
//! All mutable kernel state lives in one `Kernel` value: the process
//! table, the UART input buffer, the tick counter, and the platform it
//! drives. It is built once at boot and never torn down. On the target it
//! sits behind a single `spin::Mutex` that the trap entry holds for the
//! whole of one trap, which is the explicit form of "traps are not
//! reentrant".

use crate::platform::Platform;
use crate::process::ProcessTable;
use crate::ringbuf::RingBuffer;

pub struct Kernel<P: Platform> {
    pub(crate) procs: ProcessTable,
    pub(crate) input: RingBuffer,
    pub(crate) ticks: u64,
    pub(crate) platform: P,
}

impl<P: Platform> Kernel<P> {
    pub fn new(procs: ProcessTable, platform: P) -> Self {
        Self {
            procs,
            input: RingBuffer::new(),
            ticks: 0,
            platform,
        }
    }

    #[inline]
    pub fn procs(&self) -> &ProcessTable {
        &self.procs
    }

    #[inline]
    pub fn input(&self) -> &RingBuffer {
        &self.input
    }

    /// Timer interrupts seen since boot.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    #[inline]
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}
