//! Bounded byte FIFO for received UART input
//!
//! Written only by the external-interrupt path and read only by the
//! `GETACHAR` syscall. Both run inside the trap handler, so the buffer is
//! single-producer/single-consumer without a lock of its own.

use crate::config::RING_CAPACITY;

/// A write found the buffer full. Carries the dropped byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full(pub u8);

/// A read found the buffer empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Empty;

/// Fixed-capacity circular byte queue.
///
/// `head` is the next slot to write, `tail` the next slot to read.
/// Invariant: `count <= N`, and the buffer is full exactly when `count == N`.
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize = RING_CAPACITY> {
    buf: [u8; N],
    head: usize,
    tail: usize,
    count: usize,
}

impl<const N: usize> RingBuffer<N> {
    /// Create an empty ring buffer.
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Append a byte. Leaves the buffer untouched when it is full.
    pub fn write(&mut self, byte: u8) -> Result<(), Full> {
        if self.is_full() {
            return Err(Full(byte));
        }
        self.buf[self.head] = byte;
        self.head = (self.head + 1) % N;
        self.count += 1;
        Ok(())
    }

    /// Remove the oldest byte. Leaves the buffer untouched when it is empty.
    pub fn read(&mut self) -> Result<u8, Empty> {
        if self.is_empty() {
            return Err(Empty);
        }
        let byte = self.buf[self.tail];
        self.tail = (self.tail + 1) % N;
        self.count -= 1;
        Ok(byte)
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub const fn is_full(&self) -> bool {
        self.count == N
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Index of the next slot to be written.
    #[inline]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Index of the next slot to be read.
    #[inline]
    pub const fn tail(&self) -> usize {
        self.tail
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests_prop;
