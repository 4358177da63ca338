// src/queue/ringbuffer.rs

//! A bounded lock-free MPMC queue using per-cell sequence counters
//! (the Vyukov protocol).
//!
//! Capacity is rounded up to a power of two so indexing is a bit-mask.
//! `push` and `pop` never block: a full queue rejects the push (the caller
//! drops the value; bounded memory under overload is the contract of the
//! whole pipeline), an empty queue returns `None` (the caller blocks on a
//! condition variable, not on the queue).
//!
//! ## Cell sequence protocol
//!
//! On construction, cell `i` holds `sequence == i`. A producer intending
//! to write at logical index `w` owns cell `w mod cap` only when that
//! cell's `sequence == w`; after moving the value in, it publishes with
//! `sequence = w + 1`. A consumer at logical index `r` owns the cell only
//! when `sequence == r + 1`; after moving the value out, it recycles the
//! cell for the next lap with `sequence = r + cap`.
//!
//! Ownership transfer is carried entirely by the acquire load / release
//! store pair on `sequence`; the `write_index`/`read_index` compare-exchange
//! is relaxed.

use crate::common::{LogError, LogResult};

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

extern crate crossbeam_utils;
use crossbeam_utils::CachePadded;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RingBuffer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One slot of a [`RingBuffer`].
///
/// `sequence` encodes the protocol state of the slot; `data` is only
/// initialized between a producer's publish and a consumer's take.
struct RingBufferCell<T> {
    sequence: AtomicUsize,
    data: UnsafeCell<MaybeUninit<T>>,
}

/// Bounded lock-free multi-producer multi-consumer queue.
///
/// Safe for any number of producers and consumers; the logging pipeline
/// uses N producers and the single worker thread as consumer.
pub struct RingBuffer<T> {
    /// one contiguous allocation of `capacity` cells
    cells: Box<[RingBufferCell<T>]>,
    /// `capacity - 1`; capacity is a power of two
    mask: usize,
    /// next logical write index; own cache line to avoid false sharing
    write_index: CachePadded<AtomicUsize>,
    /// next logical read index; own cache line to avoid false sharing
    read_index: CachePadded<AtomicUsize>,
}

// `RingBuffer<T>` hands `T` across threads but never hands out references
// to a cell that is not owned via the sequence protocol.
unsafe impl<T: Send> Send for RingBuffer<T> {}
unsafe impl<T: Send> Sync for RingBuffer<T> {}

impl<T> RingBuffer<T> {
    /// Create a `RingBuffer` holding at least `capacity` entries;
    /// the actual capacity is `capacity` rounded up to a power of two.
    ///
    /// Returns [`InvalidParameter`] for capacity `0` and for a capacity
    /// whose rounded power of two would overflow `usize`.
    ///
    /// [`InvalidParameter`]: crate::common::LogError#variant.InvalidParameter
    pub fn new(capacity: usize) -> LogResult<RingBuffer<T>> {
        if capacity == 0 {
            return Err(LogError::InvalidParameter(
                "ring buffer capacity must be greater than 0".to_string(),
            ));
        }
        let capacity_p2: usize = match capacity.checked_next_power_of_two() {
            Some(val) => val,
            None => {
                return Err(LogError::InvalidParameter(format!(
                    "requested ring buffer capacity {} rounds beyond usize::MAX",
                    capacity,
                )));
            }
        };

        let mut cells: Vec<RingBufferCell<T>> = Vec::with_capacity(capacity_p2);
        for index in 0..capacity_p2 {
            cells.push(RingBufferCell {
                sequence: AtomicUsize::new(index),
                data: UnsafeCell::new(MaybeUninit::uninit()),
            });
        }

        Ok(RingBuffer {
            cells: cells.into_boxed_slice(),
            mask: capacity_p2 - 1,
            write_index: CachePadded::new(AtomicUsize::new(0)),
            read_index: CachePadded::new(AtomicUsize::new(0)),
        })
    }

    /// The fixed capacity (a power of two).
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Try to enqueue `data`.
    ///
    /// Never blocks. A full queue returns `Err(data)`, handing the value
    /// back to the caller; the logging hot path counts it as a drop.
    pub fn push(
        &self,
        data: T,
    ) -> Result<(), T> {
        let mut windex: usize = self
            .write_index
            .load(Ordering::Relaxed);
        loop {
            let cell: &RingBufferCell<T> = &self.cells[windex & self.mask];
            let sequence: usize = cell
                .sequence
                .load(Ordering::Acquire);
            let diff: isize = (sequence as isize).wrapping_sub(windex as isize);
            if diff == 0 {
                // the cell is writable for this lap; race other producers
                // for the slot
                match self.write_index.compare_exchange_weak(
                    windex,
                    windex.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        unsafe {
                            (*cell.data.get()).write(data);
                        }
                        cell.sequence
                            .store(windex.wrapping_add(1), Ordering::Release);

                        return Ok(());
                    }
                    Err(current) => {
                        windex = current;
                    }
                }
            } else if diff < 0 {
                // the consumer has not recycled this cell; the queue is full
                return Err(data);
            } else {
                // another producer owned the slot first
                windex = self
                    .write_index
                    .load(Ordering::Relaxed);
            }
        }
    }

    /// Try to dequeue the oldest entry.
    ///
    /// Never blocks; an empty queue returns `None`.
    pub fn pop(&self) -> Option<T> {
        let mut rindex: usize = self
            .read_index
            .load(Ordering::Relaxed);
        loop {
            let cell: &RingBufferCell<T> = &self.cells[rindex & self.mask];
            let sequence: usize = cell
                .sequence
                .load(Ordering::Acquire);
            let diff: isize = (sequence as isize).wrapping_sub(rindex.wrapping_add(1) as isize);
            if diff == 0 {
                // the cell holds published data for this lap; race other
                // consumers for the slot
                match self.read_index.compare_exchange_weak(
                    rindex,
                    rindex.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        let data: T = unsafe { (*cell.data.get()).assume_init_read() };
                        // recycle the cell for the next lap
                        cell.sequence.store(
                            rindex.wrapping_add(self.mask).wrapping_add(1),
                            Ordering::Release,
                        );

                        return Some(data);
                    }
                    Err(current) => {
                        rindex = current;
                    }
                }
            } else if diff < 0 {
                return None;
            } else {
                // another consumer owned the slot first
                rindex = self
                    .read_index
                    .load(Ordering::Relaxed);
            }
        }
    }

    /// Entries currently queued, on a consistent-enough snapshot.
    ///
    /// Two acquire loads; concurrent pushes and pops make the result
    /// approximate, callers accept that.
    pub fn size(&self) -> usize {
        let windex: usize = self
            .write_index
            .load(Ordering::Acquire);
        let rindex: usize = self
            .read_index
            .load(Ordering::Acquire);

        windex.wrapping_sub(rindex)
    }

    /// Returns `true` if [`size`] observed an empty queue.
    ///
    /// [`size`]: RingBuffer::size
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

impl<T> Drop for RingBuffer<T> {
    /// Run destructors of entries still queued between `read_index` and
    /// `write_index`.
    fn drop(&mut self) {
        while self.pop().is_some() {}
    }
}
