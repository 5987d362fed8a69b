//! RISC-V Sv39 Page Tables
//!
//! Every process gets the same two-level shape: a root table whose entry 0
//! points to a second-level table whose entry 0 is a 2 MiB leaf. That maps
//! process-relative addresses `0..PROC_REGION_SIZE` onto the process's
//! physical region and nothing else.
//!
//! # Page Table Structure (Sv39, 4KB granule)
//! - L2 (root): 512 entries, each covers 1GB
//! - L1: 512 entries, each covers 2MB (leaf here = megapage)
//! - L0: 512 entries, each covers 4KB (unused)

use core::ops::{Index, IndexMut};

use bitflags::bitflags;

use super::address::{PhysAddr, ProcAddr, ENTRIES_PER_TABLE, MEGAPAGE_SIZE, PAGE_SHIFT};

/// `satp.MODE` value selecting Sv39.
pub const SATP_MODE_SV39: usize = 8 << 60;

bitflags! {
    /// Flags stored in the low bits of an Sv39 page-table entry.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PteFlags: u64 {
        const VALID = 1 << 0;
        const READ = 1 << 1;
        const WRITE = 1 << 2;
        const EXECUTE = 1 << 3;
        const USER = 1 << 4;
        const GLOBAL = 1 << 5;
        const ACCESSED = 1 << 6;
        const DIRTY = 1 << 7;

        /// A user region: readable, writable, executable from U-mode.
        /// A and D are preset so the hardware never has to update them.
        const USER_RWX = Self::VALID.bits() | Self::READ.bits() | Self::WRITE.bits()
            | Self::EXECUTE.bits() | Self::USER.bits() | Self::ACCESSED.bits()
            | Self::DIRTY.bits();
    }
}

/// Error type for page mapping operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingError {
    /// The address is not properly aligned.
    MisalignedAddress,
    /// The virtual address is already mapped.
    AlreadyMapped,
}

impl core::fmt::Display for MappingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MisalignedAddress => write!(f, "address not properly aligned"),
            Self::AlreadyMapped => write!(f, "virtual address already mapped"),
        }
    }
}

/// A single Sv39 page table entry.
///
/// Bits [53:10] hold the physical page number, bits [7:0] the flags.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PageTableEntry(u64);

impl PageTableEntry {
    const PPN_SHIFT: u32 = 10;
    const PPN_MASK: u64 = ((1 << 44) - 1) << Self::PPN_SHIFT;
    const FLAG_MASK: u64 = 0xff;

    /// Create an invalid (empty) entry.
    #[inline]
    pub const fn invalid() -> Self {
        Self(0)
    }

    /// Create an entry pointing to the next level table (V set, R/W/X clear).
    #[inline]
    pub fn table(next_table: PhysAddr) -> Self {
        debug_assert!(next_table.is_aligned());
        Self::encode(next_table, PteFlags::VALID)
    }

    /// Create a leaf entry mapping a physical page or megapage.
    #[inline]
    pub fn leaf(phys: PhysAddr, flags: PteFlags) -> Self {
        debug_assert!(phys.is_aligned());
        Self::encode(phys, flags | PteFlags::VALID)
    }

    fn encode(phys: PhysAddr, flags: PteFlags) -> Self {
        let ppn = (phys.page_frame_number() as u64) << Self::PPN_SHIFT;
        Self((ppn & Self::PPN_MASK) | flags.bits())
    }

    #[inline]
    pub fn flags(self) -> PteFlags {
        PteFlags::from_bits_truncate(self.0 & Self::FLAG_MASK)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.flags().contains(PteFlags::VALID)
    }

    /// A valid entry with any of R/W/X set maps memory; otherwise it points
    /// to the next level.
    #[inline]
    pub fn is_leaf(self) -> bool {
        self.is_valid()
            && self
                .flags()
                .intersects(PteFlags::READ | PteFlags::WRITE | PteFlags::EXECUTE)
    }

    /// Physical address named by this entry.
    #[inline]
    pub fn addr(self) -> PhysAddr {
        PhysAddr::from_page_frame_number(((self.0 & Self::PPN_MASK) >> Self::PPN_SHIFT) as usize)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl core::fmt::Debug for PageTableEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_valid() {
            write!(f, "PTE(addr={}, flags={:?})", self.addr(), self.flags())
        } else {
            write!(f, "PTE(invalid)")
        }
    }
}

/// One 4 KiB page of page-table entries.
#[repr(C, align(4096))]
pub struct PageTable {
    entries: [PageTableEntry; ENTRIES_PER_TABLE],
}

impl PageTable {
    /// Create a new empty page table (all entries invalid).
    pub const fn new() -> Self {
        const INVALID: PageTableEntry = PageTableEntry::invalid();
        Self {
            entries: [INVALID; ENTRIES_PER_TABLE],
        }
    }

    /// Iterate over all valid entries with their indices.
    pub fn iter_valid(&self) -> impl Iterator<Item = (usize, &PageTableEntry)> {
        self.entries.iter().enumerate().filter(|(_, e)| e.is_valid())
    }

    /// Physical address of this table. Kernel memory is identity mapped
    /// in machine mode, so this is the table's own address.
    pub fn phys_addr(&self) -> PhysAddr {
        PhysAddr::new(self as *const _ as usize)
    }
}

impl Index<usize> for PageTable {
    type Output = PageTableEntry;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl IndexMut<usize> for PageTable {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.entries[index]
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The two tables making up one process's address space.
#[repr(C, align(4096))]
pub struct ProcessPageTables {
    root: PageTable,
    l1: PageTable,
}

impl ProcessPageTables {
    pub const fn new() -> Self {
        Self {
            root: PageTable::new(),
            l1: PageTable::new(),
        }
    }

    /// Map process-relative `0..MEGAPAGE_SIZE` onto `physbase`.
    pub fn map_region(&mut self, physbase: PhysAddr) -> Result<(), MappingError> {
        if !physbase.is_aligned_to(MEGAPAGE_SIZE) {
            return Err(MappingError::MisalignedAddress);
        }
        if self.root[0].is_valid() {
            return Err(MappingError::AlreadyMapped);
        }
        self.root[0] = PageTableEntry::table(self.l1.phys_addr());
        self.l1[0] = PageTableEntry::leaf(physbase, PteFlags::USER_RWX);
        Ok(())
    }

    /// Physical address of the root table, as stored in `pagetablebase`.
    pub fn root_addr(&self) -> PhysAddr {
        self.root.phys_addr()
    }

    /// Software walk of this address space. Returns `None` for unmapped
    /// addresses.
    pub fn translate(&self, addr: ProcAddr) -> Option<PhysAddr> {
        let [vpn2, vpn1, _] = addr.vpn_indices();
        let root = self.root[vpn2];
        if !root.is_valid() || root.is_leaf() || root.addr() != self.l1.phys_addr() {
            return None;
        }
        let leaf = self.l1[vpn1];
        if !leaf.is_leaf() {
            return None;
        }
        Some(leaf.addr().add(addr.megapage_offset()))
    }
}

impl Default for ProcessPageTables {
    fn default() -> Self {
        Self::new()
    }
}

/// `satp` value activating the Sv39 address space rooted at `root`.
#[inline]
pub const fn satp_value(root: PhysAddr) -> usize {
    SATP_MODE_SV39 | (root.as_usize() >> PAGE_SHIFT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PROC_REGION_SIZE;

    #[test]
    fn test_leaf_entry_encoding() {
        let pte = PageTableEntry::leaf(PhysAddr::new(0x8020_0000), PteFlags::USER_RWX);
        assert_eq!(pte.as_u64(), (0x8020_0000u64 >> 12 << 10) | 0xdf);
        assert!(pte.is_leaf());
        assert_eq!(pte.addr(), PhysAddr::new(0x8020_0000));
    }

    #[test]
    fn test_table_entry_is_not_leaf() {
        let pte = PageTableEntry::table(PhysAddr::new(0x8000_3000));
        assert!(pte.is_valid());
        assert!(!pte.is_leaf());
        assert_eq!(pte.flags(), PteFlags::VALID);
    }

    #[test]
    fn test_region_maps_megapage_at_zero() {
        let mut pt = Box::new(ProcessPageTables::new());
        pt.map_region(PhysAddr::new(0x8040_0000)).unwrap();
        assert_eq!(pt.root.iter_valid().count(), 1);
        assert_eq!(pt.translate(ProcAddr::new(0)), Some(PhysAddr::new(0x8040_0000)));
        assert_eq!(
            pt.translate(ProcAddr::new(PROC_REGION_SIZE - 1)),
            Some(PhysAddr::new(0x8040_0000 + PROC_REGION_SIZE - 1))
        );
        assert_eq!(pt.translate(ProcAddr::new(PROC_REGION_SIZE)), None);
        assert_eq!(pt.translate(ProcAddr::new(0x4000_0000)), None);
    }

    #[test]
    fn test_map_region_rejects_misaligned_and_double_map() {
        let mut pt = Box::new(ProcessPageTables::new());
        assert_eq!(
            pt.map_region(PhysAddr::new(0x8020_1000)),
            Err(MappingError::MisalignedAddress)
        );
        pt.map_region(PhysAddr::new(0x8020_0000)).unwrap();
        assert_eq!(
            pt.map_region(PhysAddr::new(0x8060_0000)),
            Err(MappingError::AlreadyMapped)
        );
    }

    #[test]
    fn test_satp_value() {
        assert_eq!(satp_value(PhysAddr::new(0x8000_5000)), (8 << 60) | 0x80005);
    }
}
