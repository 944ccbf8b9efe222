//! Shared fixtures for integration tests

#![allow(dead_code, unsafe_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::ptr::NonNull;

use nebula_pmr::allocator::{AllocError, AllocResult, Allocator, SystemAllocator};
use std::alloc::Layout;

/// Upstream allocator that counts traffic per address and can be told to
/// refuse requests.
#[derive(Default)]
pub struct CountingAllocator {
    allocations: Cell<usize>,
    deallocations: Cell<usize>,
    frees_by_address: RefCell<HashMap<usize, usize>>,
    fail_after: Cell<Option<usize>>,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every request once `count` more allocations have succeeded
    pub fn fail_after(&self, count: usize) {
        self.fail_after.set(Some(self.allocations.get() + count));
    }

    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub fn deallocations(&self) -> usize {
        self.deallocations.get()
    }

    pub fn outstanding(&self) -> usize {
        self.allocations() - self.deallocations()
    }

    /// How many times `ptr` has been handed back
    pub fn frees_of(&self, ptr: NonNull<u8>) -> usize {
        self.frees_by_address
            .borrow()
            .get(&(ptr.as_ptr() as usize))
            .copied()
            .unwrap_or(0)
    }
}

unsafe impl Allocator for CountingAllocator {
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        if self
            .fail_after
            .get()
            .is_some_and(|limit| self.allocations.get() >= limit)
        {
            return Err(AllocError::allocation_failed_with_layout(layout));
        }

        let block = unsafe { SystemAllocator.allocate(layout) }?;
        self.allocations.set(self.allocations.get() + 1);
        Ok(block)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.deallocations.set(self.deallocations.get() + 1);
        *self
            .frees_by_address
            .borrow_mut()
            .entry(ptr.as_ptr() as usize)
            .or_default() += 1;
        unsafe { SystemAllocator.deallocate(ptr, layout) };
    }
}

/// Plain value record pushed through the queue in scenario tests
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: i32,
    pub value: f64,
    pub name: String,
}

impl Record {
    pub fn new(id: i32, value: f64, name: &str) -> Self {
        Self {
            id,
            value,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record{{id={}, value={}, name=\"{}\"}}",
            self.id, self.value, self.name
        )
    }
}
