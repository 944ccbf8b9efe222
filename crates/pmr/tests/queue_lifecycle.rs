//! FIFO behavior of the queue over tracked and failing allocators

mod common;

use common::CountingAllocator;
use nebula_pmr::prelude::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

#[test]
fn test_push_then_drain_in_order() {
    let tracker = TrackingAllocator::new();
    let mut queue = Queue::new_in(&tracker);

    for i in 1..=5 {
        queue.push(i).unwrap();
    }
    assert_eq!(queue.len(), 5);
    assert_eq!(tracker.live_blocks(), 5);

    let mut drained = Vec::new();
    while let Some(front) = queue.front().copied() {
        drained.push(front);
        queue.pop();
    }

    assert_eq!(drained, vec![1, 2, 3, 4, 5]);
    assert!(queue.is_empty());
    assert_eq!(tracker.live_blocks(), 0);
}

#[rstest]
#[case::empty(0, 0)]
#[case::push_only(4, 0)]
#[case::partial_drain(6, 2)]
#[case::full_drain(3, 3)]
#[case::over_drain(2, 5)]
fn test_len_after_push_and_pop(#[case] pushes: usize, #[case] pops: usize) {
    let mut queue = Queue::new();
    queue.try_extend(0..pushes).unwrap();
    for _ in 0..pops {
        queue.pop();
    }

    let expected = pushes.saturating_sub(pops);
    assert_eq!(queue.len(), expected);
    assert_eq!(queue.is_empty(), expected == 0);
    assert_eq!(queue.front().is_none(), expected == 0);
}

#[rstest]
#[case::first_push(0)]
#[case::after_some(3)]
fn test_push_failure_leaves_queue_unchanged(#[case] before: usize) {
    let upstream = CountingAllocator::new();
    let mut queue = Queue::new_in(&upstream);
    queue.try_extend(0..before).unwrap();

    upstream.fail_after(0);
    let err = queue.push(99).unwrap_err();
    assert!(err.is_out_of_memory());

    assert_eq!(queue.len(), before);
    assert_eq!(queue.iter().copied().collect::<Vec<_>>(), (0..before).collect::<Vec<_>>());
    assert_eq!(upstream.outstanding(), before);
}

#[test]
fn test_constructor_failure_releases_node_through_tracker() {
    let upstream = CountingAllocator::new();
    let tracker = TrackingAllocator::with_upstream(&upstream);
    let mut queue = Queue::new_in(&tracker);

    let err = queue
        .try_push_with(|| "not a number".parse::<i32>())
        .unwrap_err();
    assert!(matches!(err, PushError::Construct(_)));

    assert!(queue.is_empty());
    assert_eq!(tracker.live_blocks(), 0);
    assert_eq!(upstream.allocations(), 1);
    assert_eq!(upstream.deallocations(), 1);
}

#[test]
fn test_panicking_constructor_releases_node() {
    let tracker = TrackingAllocator::new();
    let mut queue: Queue<'_, i32> = Queue::new_in(&tracker);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = queue.push_with(|| panic!("constructor blew up"));
    }));
    assert!(outcome.is_err());

    assert!(queue.is_empty());
    assert_eq!(tracker.live_blocks(), 0);
}

#[test]
fn test_nested_scopes_return_every_node() {
    // The queue is declared after the tracker, so it is dropped first and
    // every node goes back through a live ledger.
    let upstream = CountingAllocator::new();
    {
        let tracker = TrackingAllocator::with_upstream(&upstream);
        let mut queue = Queue::new_in(&tracker);
        queue.try_extend(["x".to_string(), "y".to_string()]).unwrap();
    }
    assert_eq!(upstream.outstanding(), 0);
    assert_eq!(upstream.allocations(), 2);
}

#[derive(Debug, Clone)]
enum Op {
    Push(i64),
    Pop,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i64>().prop_map(Op::Push),
        2 => Just(Op::Pop),
    ]
}

proptest! {
    /// The queue agrees with a `VecDeque` model under any interleaving.
    #[test]
    fn prop_matches_fifo_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let tracker = TrackingAllocator::new();
        let mut queue = Queue::new_in(&tracker);
        let mut model = std::collections::VecDeque::new();

        for op in ops {
            match op {
                Op::Push(value) => {
                    queue.push(value).unwrap();
                    model.push_back(value);
                }
                Op::Pop => {
                    prop_assert_eq!(queue.pop(), model.pop_front());
                }
            }

            prop_assert_eq!(queue.len(), model.len());
            prop_assert_eq!(queue.is_empty(), model.is_empty());
            prop_assert_eq!(queue.front(), model.front());
            prop_assert_eq!(queue.back(), model.back());
            prop_assert_eq!(tracker.live_blocks(), model.len());
        }

        prop_assert!(queue.iter().eq(model.iter()));
    }

    /// Pushing `n` then popping `m <= n` leaves `n - m` elements, the
    /// survivors being the last ones pushed.
    #[test]
    fn prop_size_after_n_pushes_m_pops(n in 0usize..64, m in 0usize..64) {
        let m = m.min(n);
        let mut queue = Queue::new();
        queue.try_extend(0..n).unwrap();

        let popped: Vec<_> = (0..m).filter_map(|_| queue.pop()).collect();

        prop_assert_eq!(popped, (0..m).collect::<Vec<_>>());
        prop_assert_eq!(queue.len(), n - m);
        prop_assert_eq!(queue.into_iter().collect::<Vec<_>>(), (m..n).collect::<Vec<_>>());
    }
}
