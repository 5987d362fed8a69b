//! Physical and Process-Relative Address Types
//!
//! Type-safe wrappers for memory addresses that prevent mixing the
//! kernel's physical view with a process's view of its own region.
//!
//! # Address Spaces
//! - `PhysAddr`: what the trap handler dereferences. Machine mode runs
//!   with direct physical addressing whatever `satp` holds.
//! - `ProcAddr`: an address as a process sees it. Each process's region
//!   is mapped at process-relative address 0.

use core::fmt;

/// Page size (4 KiB)
pub const PAGE_SIZE: usize = 4096;
/// Page size mask
pub const PAGE_MASK: usize = PAGE_SIZE - 1;
/// Bits to shift for page number
pub const PAGE_SHIFT: usize = 12;

/// Size of an Sv39 level-1 leaf (2 MiB megapage)
pub const MEGAPAGE_SIZE: usize = 0x20_0000;

/// Number of entries per page table (512 for Sv39)
pub const ENTRIES_PER_TABLE: usize = 512;

/// A physical memory address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct PhysAddr(usize);

impl PhysAddr {
    /// Create a new physical address.
    ///
    /// # Panics
    /// Panics in debug mode if the address uses more than the 56 bits
    /// Sv39 can name.
    #[inline]
    pub const fn new(addr: usize) -> Self {
        debug_assert!(addr <= 0x00FF_FFFF_FFFF_FFFF);
        Self(addr)
    }

    /// Get the raw address value.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Get the raw address as u64 (for page table entries).
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0 as u64
    }

    /// Check if the address is aligned to `align` (a power of two).
    #[inline]
    pub const fn is_aligned_to(self, align: usize) -> bool {
        self.0 & (align - 1) == 0
    }

    /// Check if the address is page-aligned.
    #[inline]
    pub const fn is_aligned(self) -> bool {
        self.is_aligned_to(PAGE_SIZE)
    }

    /// Get the page frame number.
    #[inline]
    pub const fn page_frame_number(self) -> usize {
        self.0 >> PAGE_SHIFT
    }

    /// Create from a page frame number.
    #[inline]
    pub const fn from_page_frame_number(pfn: usize) -> Self {
        Self(pfn << PAGE_SHIFT)
    }

    /// Add an offset to this address.
    #[inline]
    pub const fn add(self, offset: usize) -> Self {
        Self(self.0.wrapping_add(offset))
    }

    /// Distance from `base` to this address.
    #[inline]
    pub const fn offset_from(self, base: PhysAddr) -> usize {
        self.0.wrapping_sub(base.0)
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#018x})", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// An address relative to the start of a process's private region.
///
/// This is what user programs put in registers: stack pointers, string
/// pointers passed to syscalls. The kernel never dereferences one without
/// translating it first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct ProcAddr(usize);

impl ProcAddr {
    #[inline]
    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    /// Get the raw address value.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Add an offset to this address.
    #[inline]
    pub const fn add(self, offset: usize) -> Self {
        Self(self.0.wrapping_add(offset))
    }

    /// Check if the address falls inside a region of `size` bytes.
    #[inline]
    pub const fn is_within(self, size: usize) -> bool {
        self.0 < size
    }

    /// Sv39 virtual page numbers for this address, hardware order
    /// (VPN[2], VPN[1], VPN[0]).
    #[inline]
    pub const fn vpn_indices(self) -> [usize; 3] {
        let addr = self.0;
        [
            (addr >> 30) & 0x1FF,
            (addr >> 21) & 0x1FF,
            (addr >> 12) & 0x1FF,
        ]
    }

    /// Offset inside the enclosing megapage.
    #[inline]
    pub const fn megapage_offset(self) -> usize {
        self.0 & (MEGAPAGE_SIZE - 1)
    }
}

impl fmt::Debug for ProcAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcAddr({:#x})", self.0)
    }
}

impl fmt::Display for ProcAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
