//! Allocator interface shared by the tracking resource and the queue
//!
//! The system is built around one object-safe trait:
//! - `Allocator`: allocate / deallocate raw blocks and compare handles
//!
//! plus `AllocatorExt`, which accepts the `(bytes, alignment)` pairs that
//! callers outside the `Layout` world tend to carry around.
//!
//! # Safety
//!
//! `Allocator` is an unsafe trait. Implementors promise that:
//! - returned pointers are valid for reads and writes of `layout.size()` bytes
//! - returned pointers are aligned to `layout.align()`
//! - a block stays valid until it is handed back through `deallocate`
//!
//! Blanket impls for `&A` forward every call to `A`, so the contract is
//! preserved through delegation.

use core::alloc::Layout;
use core::ptr::NonNull;

use super::{AllocError, AllocResult};

/// Builds a `Layout` from a raw byte count and alignment.
///
/// Alignment must be a non-zero power of two and the size, rounded up to the
/// alignment, must fit in `isize`.
#[inline]
pub fn layout_for(bytes: usize, alignment: usize) -> AllocResult<Layout> {
    if !alignment.is_power_of_two() {
        return Err(AllocError::invalid_alignment(alignment));
    }

    Layout::from_size_align(bytes, alignment)
        .map_err(|_| AllocError::invalid_layout("size overflows isize when padded to alignment"))
}

/// Memory resource interface
///
/// Provides raw block allocation for allocator-aware containers. All
/// allocation methods are unsafe as they hand out uninitialized memory and
/// accept raw pointers back.
///
/// # Safety
///
/// Implementors must ensure that:
/// - Returned pointers are valid for the requested size
/// - Memory is properly aligned according to the layout
/// - Deallocation only releases previously allocated pointers
pub unsafe trait Allocator {
    /// Allocates a block with the given layout
    ///
    /// # Safety
    /// - Memory content is uninitialized and must be initialized before reads
    /// - The block must be returned with `deallocate` using the same layout
    ///
    /// # Errors
    /// Returns `AllocationFailed` if the request cannot be satisfied.
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>>;

    /// Deallocates the block at `ptr`
    ///
    /// # Safety
    /// - `ptr` must have been allocated by an allocator that `is_equal` to
    ///   this one
    /// - `layout` must match the layout used for the allocation
    /// - After this call `ptr` must not be used
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Whether memory allocated by `other` can be released through `self`
    /// and vice versa.
    ///
    /// The default is identity: an allocator equals only itself.
    fn is_equal(&self, other: &dyn Allocator) -> bool {
        core::ptr::addr_eq(self, other)
    }

    /// Whether this handle is a stateless pass-through to the system heap.
    ///
    /// All such handles are interchangeable, so
    /// [`SystemAllocator`](super::SystemAllocator) compares equal to any
    /// allocator that answers `true` here.
    fn is_system(&self) -> bool {
        false
    }
}

// SAFETY: forwards every call to `A`, preserving its contract.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        // SAFETY: caller's contract is forwarded unchanged
        unsafe { (**self).allocate(layout) }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller's contract is forwarded unchanged
        unsafe { (**self).deallocate(ptr, layout) }
    }

    fn is_equal(&self, other: &dyn Allocator) -> bool {
        (**self).is_equal(other)
    }

    fn is_system(&self) -> bool {
        (**self).is_system()
    }
}

/// `(bytes, alignment)` entry points on top of [`Allocator`]
pub trait AllocatorExt: Allocator {
    /// Allocates `bytes` bytes aligned to `alignment`.
    ///
    /// # Safety
    /// Same as [`Allocator::allocate`].
    unsafe fn allocate_bytes(&self, bytes: usize, alignment: usize) -> AllocResult<NonNull<u8>> {
        let layout = layout_for(bytes, alignment)?;
        // SAFETY: layout validated above; caller upholds `allocate`'s contract
        unsafe { self.allocate(layout) }.map(NonNull::cast)
    }

    /// Releases a block obtained from [`AllocatorExt::allocate_bytes`].
    ///
    /// A malformed `(bytes, alignment)` pair cannot describe a block this
    /// allocator handed out, so it is ignored.
    ///
    /// # Safety
    /// Same as [`Allocator::deallocate`].
    unsafe fn deallocate_bytes(&self, ptr: NonNull<u8>, bytes: usize, alignment: usize) {
        if let Ok(layout) = layout_for(bytes, alignment) {
            // SAFETY: caller guarantees `ptr` came from this allocator with
            // the same size and alignment
            unsafe { self.deallocate(ptr, layout) };
        }
    }
}

impl<A: Allocator + ?Sized> AllocatorExt for A {}
