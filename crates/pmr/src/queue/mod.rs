//! Allocator-aware FIFO queue
//!
//! [`Queue`] is a singly linked list whose nodes live in blocks obtained from
//! an [`Allocator`]. `push` allocates one node-sized block and moves the value
//! into it; `pop` moves the value out and hands the block back.
//!
//! ```
//! use nebula_pmr::allocator::TrackingAllocator;
//! use nebula_pmr::queue::Queue;
//!
//! let tracker = TrackingAllocator::new();
//! let mut queue = Queue::new_in(&tracker);
//!
//! queue.push(1)?;
//! queue.push(2)?;
//! assert_eq!(tracker.live_blocks(), 2);
//!
//! assert_eq!(queue.pop(), Some(1));
//! assert_eq!(queue.front(), Some(&2));
//! # Ok::<(), nebula_pmr::MemoryError>(())
//! ```
//!
//! Queues cannot be copied; there is no allocator-aware clone:
//!
//! ```compile_fail
//! use nebula_pmr::queue::Queue;
//!
//! let queue: Queue<'_, i32> = Queue::new();
//! let copy = queue.clone();
//! ```

mod iter;

use core::alloc::Layout;
use core::convert::Infallible;
use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, ManuallyDrop};
use core::ptr::NonNull;

pub use iter::{IntoIter, Iter, IterMut};

use crate::allocator::{AllocResult, Allocator, SystemAllocator};
use crate::error::PushError;

/// One queue element: a value and the owning link to its successor
struct Node<T> {
    value: T,
    next: Option<NonNull<Node<T>>>,
}

/// Raw node storage that goes back to the allocator unless it is linked in
struct NodeSlot<'a, T> {
    alloc: &'a dyn Allocator,
    node: NonNull<Node<T>>,
}

impl<'a, T> NodeSlot<'a, T> {
    fn allocate(alloc: &'a dyn Allocator) -> AllocResult<Self> {
        // SAFETY: `Node<T>` always has a valid, non-zero-sized layout
        let raw = unsafe { alloc.allocate(Layout::new::<Node<T>>()) }?;
        Ok(Self {
            alloc,
            node: raw.cast(),
        })
    }

    /// Initializes the slot and hands ownership of the node to the caller
    fn fill(self, value: T) -> NonNull<Node<T>> {
        let this = ManuallyDrop::new(self);
        // SAFETY: the slot is an uninitialized block sized and aligned for
        // `Node<T>`
        unsafe { this.node.as_ptr().write(Node { value, next: None }) };
        this.node
    }
}

impl<T> Drop for NodeSlot<'_, T> {
    fn drop(&mut self) {
        // SAFETY: allocated from `alloc` with this layout and never
        // initialized, so there is nothing to drop
        unsafe { self.alloc.deallocate(self.node.cast(), Layout::new::<Node<T>>()) };
    }
}

/// FIFO queue with node storage sourced from an [`Allocator`]
///
/// The queue owns its whole chain of nodes and borrows the allocator for
/// `'a`; the allocator therefore outlives every node it backs.
///
/// # Invariants
/// - `head.is_none()` ⇔ `tail.is_none()` ⇔ `len == 0`
/// - the tail node's `next` is always `None`
/// - `len` is the number of nodes reachable from `head`
pub struct Queue<'a, T> {
    head: Option<NonNull<Node<T>>>,
    tail: Option<NonNull<Node<T>>>,
    alloc: &'a dyn Allocator,
    len: usize,
    _owns: PhantomData<Node<T>>,
}

impl<T> Queue<'static, T> {
    /// Creates an empty queue over the system allocator
    pub fn new() -> Self {
        Self::new_in(&SystemAllocator)
    }
}

impl<T> Default for Queue<'static, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> Queue<'a, T> {
    /// Creates an empty queue whose nodes are allocated from `alloc`
    pub fn new_in(alloc: &'a dyn Allocator) -> Self {
        Self {
            head: None,
            tail: None,
            alloc,
            len: 0,
            _owns: PhantomData,
        }
    }

    /// Layout of the block each element occupies
    pub fn node_layout() -> Layout {
        Layout::new::<Node<T>>()
    }

    /// The allocator nodes are obtained from
    pub fn allocator(&self) -> &'a dyn Allocator {
        self.alloc
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the queue holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Appends `value` at the tail.
    ///
    /// On allocation failure the queue is unchanged and `value` is dropped.
    pub fn push(&mut self, value: T) -> AllocResult<()> {
        self.push_with(|| value)
    }

    /// Allocates a node, then builds its value in place with `make`.
    pub fn push_with<F>(&mut self, make: F) -> AllocResult<()>
    where
        F: FnOnce() -> T,
    {
        match self.try_push_with(|| Ok::<T, Infallible>(make())) {
            Ok(()) => Ok(()),
            Err(PushError::Alloc(err)) => Err(err),
            Err(PushError::Construct(never)) => match never {},
        }
    }

    /// Allocates a node, then builds its value in place with a fallible
    /// constructor.
    ///
    /// If `make` fails (or panics) the node storage is returned to the
    /// allocator before the error propagates; the queue is unchanged.
    pub fn try_push_with<E, F>(&mut self, make: F) -> Result<(), PushError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let slot = NodeSlot::allocate(self.alloc)?;
        let value = make().map_err(PushError::Construct)?;
        let node = slot.fill(value);
        self.link_back(node);
        Ok(())
    }

    /// Pushes every item of `items` in order, stopping at the first
    /// allocation failure.
    pub fn try_extend<I>(&mut self, items: I) -> AllocResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.push(item)?;
        }
        Ok(())
    }

    fn link_back(&mut self, node: NonNull<Node<T>>) {
        match self.tail {
            // SAFETY: tail is a live node owned by this queue
            Some(mut tail) => unsafe { tail.as_mut().next = Some(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node);
        self.len += 1;
    }

    /// Removes the head element and returns it; `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        let head = self.head?;

        // SAFETY: head is an initialized node owned by this queue; after the
        // read it is unlinked and its storage is only deallocated
        let Node { value, next } = unsafe { head.as_ptr().read() };

        self.head = next;
        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;

        // SAFETY: allocated from `self.alloc` with the node layout; the value
        // has been moved out
        unsafe {
            self.alloc
                .deallocate(head.cast(), Layout::new::<Node<T>>());
        }

        Some(value)
    }

    /// The head element, if any
    pub fn front(&self) -> Option<&T> {
        // SAFETY: head is a live node borrowed for the lifetime of `&self`
        self.head.map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// The head element, mutably
    pub fn front_mut(&mut self) -> Option<&mut T> {
        // SAFETY: head is a live node and `&mut self` makes the access unique
        self.head.map(|node| unsafe { &mut (*node.as_ptr()).value })
    }

    /// The most recently pushed element, if any
    pub fn back(&self) -> Option<&T> {
        // SAFETY: tail is a live node borrowed for the lifetime of `&self`
        self.tail.map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// Drops every element and returns all node storage to the allocator
    pub fn clear(&mut self) {
        while self.pop().is_some() {}
    }

    /// Moves the whole chain into a new queue, leaving `self` empty.
    ///
    /// The new queue shares this queue's allocator; `self` stays usable.
    pub fn take(&mut self) -> Queue<'a, T> {
        Queue {
            head: self.head.take(),
            tail: self.tail.take(),
            alloc: self.alloc,
            len: mem::take(&mut self.len),
            _owns: PhantomData,
        }
    }

    /// Replaces this queue's contents with `source`'s chain.
    ///
    /// The existing elements are dropped and their storage returned to this
    /// queue's own allocator first; then the chain and the allocator handle
    /// are taken over from `source`, which is left empty.
    pub fn move_from(&mut self, source: &mut Queue<'a, T>) {
        self.clear();

        self.head = source.head.take();
        self.tail = source.tail.take();
        self.len = mem::take(&mut source.len);
        self.alloc = source.alloc;
    }

    /// Front-to-back iterator over shared references
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.head, self.len)
    }

    /// Front-to-back iterator over mutable references
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.head, self.len)
    }
}

impl<T> Drop for Queue<'_, T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for Queue<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'b, T: PartialEq> PartialEq<Queue<'b, T>> for Queue<'_, T> {
    fn eq(&self, other: &Queue<'b, T>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Queue<'_, T> {}

impl<'q, T> IntoIterator for &'q Queue<'_, T> {
    type Item = &'q T;
    type IntoIter = Iter<'q, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'q, T> IntoIterator for &'q mut Queue<'_, T> {
    type Item = &'q mut T;
    type IntoIter = IterMut<'q, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<'a, T> IntoIterator for Queue<'a, T> {
    type Item = T;
    type IntoIter = IntoIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
