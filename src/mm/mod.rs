//! Memory management for OtterOS
//!
//! Provides:
//! - Typed physical and process-relative addresses
//! - Translation between the two for the current process
//! - Sv39 page tables for the fixed per-process regions
//!
//! There is no allocator: every process owns one fixed region and one
//! pair of statically allocated page tables.

pub mod address;
pub mod paging;
mod translate;

pub use address::{PhysAddr, ProcAddr};
