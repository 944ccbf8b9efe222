//! Forward iterators over a [`Queue`]

use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

use super::{Node, Queue};

/// Shared front-to-back iterator
///
/// Holds the node it will yield next, or `None` once it has reached the end.
/// Two iterators compare equal when they point at the same node; every
/// exhausted iterator is equal to every other.
pub struct Iter<'q, T> {
    current: Option<NonNull<Node<T>>>,
    remaining: usize,
    _marker: PhantomData<&'q Node<T>>,
}

impl<T> Iter<'_, T> {
    pub(super) fn new(head: Option<NonNull<Node<T>>>, len: usize) -> Self {
        Self {
            current: head,
            remaining: len,
            _marker: PhantomData,
        }
    }

    /// Whether the iterator is past the last element
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }
}

impl<'q, T> Iterator for Iter<'q, T> {
    type Item = &'q T;

    #[inline]
    fn next(&mut self) -> Option<&'q T> {
        let node = self.current?;
        // SAFETY: the queue is borrowed for 'q, so every reachable node stays
        // alive and unmodified
        let node = unsafe { &*node.as_ptr() };
        self.current = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            current: self.current,
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Iter<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current
    }
}

impl<T> Eq for Iter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Mutable front-to-back iterator
pub struct IterMut<'q, T> {
    current: Option<NonNull<Node<T>>>,
    remaining: usize,
    _marker: PhantomData<&'q mut Node<T>>,
}

impl<T> IterMut<'_, T> {
    pub(super) fn new(head: Option<NonNull<Node<T>>>, len: usize) -> Self {
        Self {
            current: head,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'q, T> Iterator for IterMut<'q, T> {
    type Item = &'q mut T;

    #[inline]
    fn next(&mut self) -> Option<&'q mut T> {
        let node = self.current?;
        // SAFETY: the queue is mutably borrowed for 'q and each node is
        // yielded at most once, so the references never alias
        let node = unsafe { &mut *node.as_ptr() };
        self.current = node.next;
        self.remaining -= 1;
        Some(&mut node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

impl<T> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IterMut").field(&self.remaining).finish()
    }
}

/// Owning iterator; pops from the front
///
/// Elements not consumed are dropped, and their storage returned to the
/// allocator, when the iterator is dropped.
pub struct IntoIter<'a, T> {
    queue: Queue<'a, T>,
}

impl<'a, T> IntoIter<'a, T> {
    pub(super) fn new(queue: Queue<'a, T>) -> Self {
        Self { queue }
    }
}

impl<T> Iterator for IntoIter<'_, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.queue.pop()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<'_, T> {}

impl<T> FusedIterator for IntoIter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.queue).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::allocator::TrackingAllocator;
    use crate::queue::Queue;

    #[test]
    fn test_walks_in_push_order() {
        let mut queue = Queue::new();
        queue.try_extend([1, 2, 3]).unwrap();

        let mut it = queue.iter();
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next(), Some(&2));
        assert_eq!(it.next(), Some(&3));
        assert!(it.is_end());
        assert_eq!(it.next(), None);
        // Advancing past the end stays at the end
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_range_based_sum() {
        let mut queue = Queue::new();
        queue.try_extend([1, 2, 3]).unwrap();

        let mut sum = 0;
        for item in &queue {
            sum += item;
        }
        assert_eq!(sum, 6);
    }

    #[test]
    fn test_position_equality() {
        let mut queue = Queue::new();
        queue.try_extend([1, 2]).unwrap();

        let begin = queue.iter();
        let mut walker = queue.iter();
        assert!(begin == walker);

        walker.next();
        assert!(begin != walker);

        let saved = walker.clone();
        walker.next();
        assert!(walker.is_end());
        assert!(saved != walker);

        let mut other_end = queue.iter();
        while other_end.next().is_some() {}
        assert!(walker == other_end);

        let empty: Queue<'_, i32> = Queue::new();
        assert!(empty.iter() == walker);
    }

    #[test]
    fn test_exact_size() {
        let mut queue = Queue::new();
        queue.try_extend(0..5).unwrap();

        let mut it = queue.iter();
        assert_eq!(it.len(), 5);
        it.next();
        assert_eq!(it.len(), 4);
    }

    #[test]
    fn test_iter_mut() {
        let mut queue = Queue::new();
        queue.try_extend([1, 2, 3]).unwrap();

        for item in &mut queue {
            *item *= 10;
        }
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn test_into_iter_releases_remaining_nodes() {
        let tracker = TrackingAllocator::new();
        let mut queue = Queue::new_in(&tracker);
        queue.try_extend(["a", "b", "c"]).unwrap();

        let mut it = queue.into_iter();
        assert_eq!(it.next(), Some("a"));
        assert_eq!(it.len(), 2);
        assert_eq!(tracker.live_blocks(), 2);

        drop(it);
        assert_eq!(tracker.live_blocks(), 0);
    }
}
