//! System Call Pointer Validation
//!
//! A process may only hand the kernel pointers into its own region. The
//! region is mapped at process-relative 0, so checking a pointer is a
//! bounds check against the region size.

use crate::config::PROC_REGION_SIZE;
use crate::error::KernelError;
use crate::mm::address::ProcAddr;

/// Validate the start of a user string.
///
/// The terminating NUL is looked for while printing; the walk stops at the
/// end of the region either way.
pub fn validate_user_str(ptr: ProcAddr) -> Result<ProcAddr, KernelError> {
    if !ptr.is_within(PROC_REGION_SIZE) {
        return Err(KernelError::BadAddress(ptr));
    }
    Ok(ptr)
}

/// Number of bytes from `ptr` to the end of the caller's region.
pub fn bytes_to_region_end(ptr: ProcAddr) -> usize {
    PROC_REGION_SIZE.saturating_sub(ptr.as_usize())
}
