//! Allocator tests.
//!
//! Test coverage:
//! - Construction until exhaustion, for both pool flavours
//! - LIFO-only destruction on the stack pool
//! - Bulk reset and slot reuse on the linear pool
//! - Handle validation

use super::*;

#[derive(Debug, PartialEq)]
struct Payload {
    a: usize,
    b: usize,
    values: Vec<usize>,
}

impl Payload {
    fn new(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            values: vec![a, b, a * b],
        }
    }
}

#[test]
fn test_stack_construct_destroy_cycle_keeps_pool_empty() {
    let mut pool = StackAllocator::new(100);

    for i in 0..50 {
        let handle = pool.construct(Payload::new(i, i + i)).unwrap();
        assert_eq!(pool.get(handle).unwrap().a, i);
        let payload = pool.destroy(handle).unwrap();
        assert_eq!(payload.b, i + i);
    }

    assert!(!pool.is_full());
    assert!(pool.is_empty());
    assert_eq!(pool.remaining(), pool.capacity());
}

#[test]
fn test_stack_exhaustion() {
    let mut pool = StackAllocator::new(3);
    for i in 0..3 {
        pool.construct(Payload::new(i, i)).unwrap();
    }

    assert!(pool.is_full());
    assert_eq!(pool.remaining(), 0);
    assert_eq!(
        pool.construct(Payload::new(9, 9)),
        Err(ArenaError::Exhausted { capacity: 3 })
    );
    assert_eq!(pool.len(), 3);
}

#[test]
fn test_stack_rejects_destroy_of_non_top_handle() {
    let mut pool = StackAllocator::new(4);
    let first = pool.construct(Payload::new(1, 1)).unwrap();
    let second = pool.construct(Payload::new(2, 2)).unwrap();

    assert_eq!(
        pool.destroy(first),
        Err(ArenaError::NotMostRecent { handle: 0, top: 1 })
    );
    // rejected destroy leaves both slots alive
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.get(first).unwrap().a, 1);

    assert_eq!(pool.destroy(second).unwrap().a, 2);
    assert_eq!(pool.destroy(first).unwrap().a, 1);
    assert!(pool.is_empty());
}

#[test]
fn test_stack_rejects_stale_handle() {
    let mut pool = StackAllocator::new(4);
    let handle = pool.construct(Payload::new(1, 1)).unwrap();
    pool.destroy(handle).unwrap();

    assert_eq!(pool.destroy(handle), Err(ArenaError::InvalidHandle(0)));
    assert_eq!(pool.get(handle), Err(ArenaError::InvalidHandle(0)));
}

#[test]
fn test_stack_top_tracks_most_recent_slot() {
    let mut pool = StackAllocator::new(4);
    assert_eq!(pool.top(), None);
    pool.construct(Payload::new(1, 1)).unwrap();
    let second = pool.construct(Payload::new(2, 2)).unwrap();
    assert_eq!(pool.top(), Some(second));
}

#[test]
fn test_stack_flush_empties_pool() {
    let mut pool = StackAllocator::new(10);
    for i in 0..10 {
        pool.construct(Payload::new(i, i)).unwrap();
    }
    pool.flush();
    assert!(pool.is_empty());
    assert_eq!(pool.remaining(), 10);
}

#[test]
fn test_linear_fill_and_flush() {
    let mut pool = LinearAllocator::new(1000);

    for i in 0..500 {
        let handle = pool.construct(Payload::new(i, i + i)).unwrap();
        assert_eq!(pool.get(handle).unwrap().a, i);
        assert!(pool.destroy_last().is_some());
    }
    assert!(!pool.is_full());
    assert_eq!(pool.remaining(), pool.capacity());

    for i in 0..1000 {
        pool.construct(Payload::new(i, i)).unwrap();
    }
    assert!(pool.is_full());
    assert!(matches!(
        pool.construct(Payload::new(0, 0)),
        Err(ArenaError::Exhausted { capacity: 1000 })
    ));

    pool.flush();
    assert!(pool.is_empty());
    assert_eq!(pool.remaining(), pool.capacity());
}

#[test]
fn test_linear_flush_reuses_slot_zero() {
    let mut pool = LinearAllocator::new(8);
    pool.construct(Payload::new(1, 1)).unwrap();
    pool.construct(Payload::new(2, 2)).unwrap();

    pool.flush();

    let handle = pool.construct(Payload::new(3, 3)).unwrap();
    assert_eq!(handle.index(), 0);
    assert_eq!(pool.get(handle).unwrap(), &Payload::new(3, 3));
}

#[test]
fn test_linear_get_mut_and_iter() {
    let mut pool = LinearAllocator::new(4);
    let first = pool.construct(Payload::new(1, 2)).unwrap();
    pool.construct(Payload::new(3, 4)).unwrap();

    pool.get_mut(first).unwrap().values.push(42);

    let collected: Vec<_> = pool.iter().map(|(h, p)| (h.index(), p.a)).collect();
    assert_eq!(collected, vec![(0, 1), (1, 3)]);
    assert_eq!(pool.get(first).unwrap().values, vec![1, 2, 2, 42]);
}

#[test]
fn test_zero_capacity_pool_is_always_full() {
    let mut pool: LinearAllocator<Payload> = LinearAllocator::new(0);
    assert!(pool.is_full());
    assert!(pool.construct(Payload::new(0, 0)).is_err());
}
