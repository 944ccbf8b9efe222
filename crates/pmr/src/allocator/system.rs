//! System allocator implementation
//!
//! Provides an allocator that wraps the system's default memory allocator.
//! It is the default upstream of [`TrackingAllocator`](super::TrackingAllocator)
//! and is passed around as an explicit handle rather than looked up from
//! process-wide state.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;
use std::alloc::System;

use super::{AllocError, AllocResult, Allocator};

/// Wrapper for the system's default allocator
///
/// This allocator delegates all operations to `std::alloc::System` while
/// reporting failures through [`AllocError`].
///
/// `SystemAllocator` is a zero-sized, stateless handle: memory obtained
/// through one value may be released through any other, so every two
/// values compare equal under [`Allocator::is_equal`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl SystemAllocator {
    /// Creates a new SystemAllocator
    ///
    /// This is a zero-cost operation as the SystemAllocator contains no state.
    #[inline]
    pub const fn new() -> Self {
        SystemAllocator
    }
}

// SAFETY: all requests are forwarded to `System`, which upholds the
// `GlobalAlloc` contract; zero-sized requests never reach it.
unsafe impl Allocator for SystemAllocator {
    #[inline]
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            // Handle zero-sized allocations by returning a well-aligned dangling pointer
            // SAFETY: `layout.align()` is a non-zero power of two, so the
            // address is non-null and suitably aligned
            let ptr =
                unsafe { NonNull::new_unchecked(core::ptr::without_provenance_mut(layout.align())) };
            return Ok(NonNull::slice_from_raw_parts(ptr, 0));
        }

        // SAFETY: layout has non-zero size (checked above)
        let ptr = unsafe { System.alloc(layout) };

        match NonNull::new(ptr) {
            Some(non_null) => Ok(NonNull::slice_from_raw_parts(non_null, layout.size())),
            None => Err(AllocError::allocation_failed_with_layout(layout)),
        }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return; // Nothing to deallocate for zero-sized allocations
        }

        // SAFETY: caller guarantees `ptr` was allocated here with `layout`
        unsafe { System.dealloc(ptr.as_ptr(), layout) };
    }

    fn is_equal(&self, other: &dyn Allocator) -> bool {
        other.is_system()
    }

    fn is_system(&self) -> bool {
        true
    }
}
