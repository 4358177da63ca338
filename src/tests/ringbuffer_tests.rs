// src/tests/ringbuffer_tests.rs

//! Tests for [`src/queue/ringbuffer.rs`].
//!
//! [`src/queue/ringbuffer.rs`]: ../../queue/ringbuffer.rs

use crate::queue::ringbuffer::RingBuffer;

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use ::more_asserts::{assert_ge, assert_le};
use ::test_case::test_case;

#[test]
fn test_new_capacity_zero_rejected() {
    let result = RingBuffer::<u32>::new(0);
    assert!(result.is_err());
    assert!(result
        .err()
        .unwrap()
        .is_invalid_parameter());
}

#[test]
fn test_new_capacity_overflow_rejected() {
    // no power of two at or above this fits in usize
    let result = RingBuffer::<u32>::new((usize::MAX >> 1) + 2);
    assert!(result.is_err());
}

#[test_case(1, 1)]
#[test_case(2, 2)]
#[test_case(3, 4)]
#[test_case(5, 8)]
#[test_case(256, 256)]
#[test_case(1000, 1024)]
fn test_new_capacity_rounds_to_power_of_two(
    requested: usize,
    expect: usize,
) {
    let rb: RingBuffer<u32> = RingBuffer::new(requested).unwrap();
    assert_eq!(rb.capacity(), expect);
}

#[test]
fn test_push_pop_fifo() {
    let rb: RingBuffer<u32> = RingBuffer::new(16).unwrap();
    for value in 0..10u32 {
        assert!(rb.push(value).is_ok());
    }
    for value in 0..10u32 {
        assert_eq!(rb.pop(), Some(value));
    }
    assert_eq!(rb.pop(), None);
}

#[test]
fn test_pop_empty_returns_none() {
    let rb: RingBuffer<u32> = RingBuffer::new(4).unwrap();
    assert_eq!(rb.pop(), None);
    assert_eq!(rb.size(), 0);
}

// the `C+1`-th push must fail, one pop must make room for exactly one push
#[test]
fn test_full_rejects_then_pop_makes_room() {
    const CAP: usize = 8;
    let rb: RingBuffer<usize> = RingBuffer::new(CAP).unwrap();
    for value in 0..CAP {
        assert!(rb.push(value).is_ok(), "push {} of {} failed", value, CAP);
    }
    // the rejected value is handed back
    assert_eq!(rb.push(99), Err(99));
    assert_eq!(rb.size(), CAP);

    assert_eq!(rb.pop(), Some(0));
    assert!(rb.push(100).is_ok());
    assert_eq!(rb.push(101), Err(101));
}

#[test]
fn test_size_tracks_push_pop() {
    let rb: RingBuffer<u32> = RingBuffer::new(8).unwrap();
    assert_eq!(rb.size(), 0);
    assert!(rb.is_empty());
    rb.push(1).unwrap();
    rb.push(2).unwrap();
    assert_eq!(rb.size(), 2);
    rb.pop().unwrap();
    assert_eq!(rb.size(), 1);
    rb.pop().unwrap();
    assert!(rb.is_empty());
}

#[test]
fn test_wraparound_many_laps() {
    let rb: RingBuffer<usize> = RingBuffer::new(4).unwrap();
    for lap in 0..1000usize {
        rb.push(lap).unwrap();
        assert_eq!(rb.pop(), Some(lap));
    }
    assert!(rb.is_empty());
}

// pending entries between `read_index` and `write_index` run their
// destructors at queue teardown
#[test]
fn test_drop_runs_pending_destructors() {
    let token: Arc<()> = Arc::new(());
    {
        let rb: RingBuffer<Arc<()>> = RingBuffer::new(8).unwrap();
        for _ in 0..5 {
            rb.push(token.clone()).unwrap();
        }
        // pop two so the pending range does not start at slot 0
        rb.pop().unwrap();
        rb.pop().unwrap();
        assert_eq!(Arc::strong_count(&token), 4);
    }
    assert_eq!(Arc::strong_count(&token), 1);
}

/// M producers + 1 consumer: every value emerges exactly once
/// (zero duplicates, zero spurious values) and per-producer order holds.
#[test]
fn test_mpmc_no_duplicates_no_spurious() {
    const PRODUCERS: u64 = 4;
    const PER_PRODUCER: u64 = 25_000;
    const CAP: usize = 64;

    let rb: Arc<RingBuffer<u64>> = Arc::new(RingBuffer::new(CAP).unwrap());

    let mut handles: Vec<thread::JoinHandle<()>> = Vec::new();
    for producer in 0..PRODUCERS {
        let rb_ = rb.clone();
        handles.push(thread::spawn(move || {
            for seq in 0..PER_PRODUCER {
                let mut value: u64 = (producer << 32) | seq;
                // spin until accepted; this test verifies the protocol,
                // not the drop policy
                loop {
                    match rb_.push(value) {
                        Ok(()) => break,
                        Err(rejected) => {
                            value = rejected;
                            thread::yield_now();
                        }
                    }
                }
            }
        }));
    }

    let consumer: thread::JoinHandle<Vec<u64>> = {
        let rb_ = rb.clone();
        thread::spawn(move || {
            let mut seen: Vec<u64> = Vec::with_capacity((PRODUCERS * PER_PRODUCER) as usize);
            while seen.len() < (PRODUCERS * PER_PRODUCER) as usize {
                match rb_.pop() {
                    Some(value) => seen.push(value),
                    None => thread::yield_now(),
                }
            }
            seen
        })
    };

    for handle in handles {
        handle.join().unwrap();
    }
    let seen: Vec<u64> = consumer.join().unwrap();

    assert_eq!(seen.len() as u64, PRODUCERS * PER_PRODUCER);
    let unique: HashSet<u64> = seen.iter().copied().collect();
    assert_eq!(unique.len(), seen.len(), "duplicate values emerged");

    // per-producer FIFO
    let mut last_seq: [i64; PRODUCERS as usize] = [-1; PRODUCERS as usize];
    for value in seen.iter() {
        let producer = (value >> 32) as usize;
        let seq = (value & 0xFFFF_FFFF) as i64;
        assert_le!(producer, PRODUCERS as usize - 1, "spurious producer tag");
        assert!(seq > last_seq[producer], "producer {} out of order", producer);
        last_seq[producer] = seq;
    }
    for producer in 0..PRODUCERS as usize {
        assert_ge!(last_seq[producer], (PER_PRODUCER - 1) as i64);
    }
}
