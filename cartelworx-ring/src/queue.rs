//! Single-Producer Single-Consumer Ring for Interrupt-to-Task Hand-off
#![allow(unsafe_code)] // Storage is reinterpreted as atomic bytes
//!
//! ## Overview
//!
//! [`RingBuffer`](crate::RingBuffer) needs `&mut self` for every mutation,
//! which is exactly right inside one context and useless across an interrupt
//! boundary. [`SpscRing`] keeps the same overwrite-on-full contract but
//! publishes its indices through atomics so the knock ISR (producer) and the
//! analysis task (consumer) can run concurrently without a lock.
//!
//! ```text
//! Producer (ISR)                         Consumer (task)
//!      ↓                                       ↓
//!   write slot ── Release head ──→ Acquire head ── read slot
//!      ↓                                       ↓
//!   full? CAS tail (drop oldest)        CAS tail (claim slot)
//! ```
//!
//! ## Record Types
//!
//! Records must be [`bytemuck::Pod`]. Slots are held as `AtomicU8` and every
//! record is copied byte by byte with atomic loads and stores, so a consumer
//! copy that overlaps a producer overwrite is a torn value, never a data
//! race. `Pod` makes every bit pattern a valid record, so a torn copy is
//! harmless until it is thrown away.
//!
//! ## Algorithm
//!
//! `head` and `tail` are running counters that wrap at the largest multiple
//! of `capacity` a `usize` can hold, so `counter % capacity` stays continuous
//! across the wrap for any capacity. The fill level is their distance.
//!
//! ### Push (producer)
//! 1. Load own `head` (Relaxed) and `tail` (Acquire)
//! 2. If `head - tail == capacity`, compare-exchange `tail` forward by one to
//!    drop the oldest record, then issue a Release fence. If the exchange
//!    fails the consumer just popped, so there is room anyway
//! 3. Store the record bytes (Relaxed)
//! 4. Store `head + 1` with Release
//!
//! ### Pop (consumer)
//! 1. Load `tail` and `head` (Acquire); equal means empty
//! 2. Load the slot bytes (Relaxed), then issue an Acquire fence
//! 3. Compare-exchange `tail` forward by one. Failure means the producer
//!    overwrote that slot meanwhile: discard the copy and retry
//!
//! This is the seqlock pattern. The producer only rewrites slot
//! `t % capacity` after moving `tail` past `t` and fencing, so a consumer
//! that saw any rewritten byte also sees the moved `tail` after its own
//! fence, and its compare-exchange fails. A consumer retries at most once
//! per producer push.
//!
//! ## Memory Ordering
//!
//! - **Release** on `head`: the record bytes are visible before the new head
//! - **Acquire** on `head`/`tail` loads: see every write published before them
//! - **Release fence** after an overwrite claim, paired with the consumer's
//!   **Acquire fence** after copying
//! - **AcqRel** compare-exchange on `tail`
//! - **Relaxed** for record bytes and statistics
//!
//! ## Usage
//!
//! ```rust
//! use cartelworx_ring::SpscRing;
//!
//! let mut storage = [0u16; 512];
//! let mut ring = SpscRing::new(&mut storage).unwrap();
//! let (mut producer, mut consumer) = ring.split();
//!
//! std::thread::scope(|s| {
//!     s.spawn(move || {
//!         for sample in 0..100u16 {
//!             producer.push(sample);
//!         }
//!     });
//! });
//!
//! assert_eq!(consumer.pop(), Some(0));
//! assert_eq!(consumer.len(), 99);
//! ```

use core::convert::Infallible;
use core::marker::PhantomData;
use core::mem;
use core::sync::atomic::{fence, AtomicU32, AtomicU8, AtomicUsize, Ordering};

use bytemuck::Pod;

use crate::buffer::PushOutcome;
use crate::errors::{RingError, RingResult};
use crate::stats::RingStats;
use crate::traits::RecordSource;

/// Shared counters, updated with Relaxed ordering
///
/// Track ring health without affecting the hand-off itself.
#[derive(Debug)]
pub struct QueueStats {
    /// Records pushed
    pub pushed: AtomicU32,
    /// Records popped
    pub popped: AtomicU32,
    /// Records dropped to make room for newer ones
    pub overwritten: AtomicU32,
    /// Highest fill level seen
    pub max_depth: AtomicU32,
}

impl QueueStats {
    const fn new() -> Self {
        Self {
            pushed: AtomicU32::new(0),
            popped: AtomicU32::new(0),
            overwritten: AtomicU32::new(0),
            max_depth: AtomicU32::new(0),
        }
    }

    /// Raise the high-water mark if `current` is above it
    fn update_max_depth(&self, current: u32) {
        let mut max = self.max_depth.load(Ordering::Relaxed);
        while current > max {
            match self.max_depth.compare_exchange_weak(
                max,
                current,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => max = actual,
            }
        }
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> RingStats {
        RingStats {
            pushed: self.pushed.load(Ordering::Relaxed),
            popped: self.popped.load(Ordering::Relaxed),
            overwritten: self.overwritten.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
        }
    }
}

/// Ring over caller-owned storage, shareable between one producer and one
/// consumer context
///
/// Build it, then [`split`](SpscRing::split) it. Both halves borrow the ring,
/// so the storage borrow is proven to outlive every access.
pub struct SpscRing<'a, T> {
    /// Borrowed storage viewed as atomic bytes, `capacity` records long
    slots: &'a [AtomicU8],
    capacity: usize,
    /// Counters wrap here; a multiple of `capacity`
    wrap_limit: usize,

    /// Write counter (producer owned)
    head: AtomicUsize,

    /// Read counter (consumer owned, advanced by the producer on overwrite)
    tail: AtomicUsize,

    stats: QueueStats,
    _records: PhantomData<T>,
}

impl<'a, T: Pod> SpscRing<'a, T> {
    /// Build a shared ring over `storage`, using every slot
    ///
    /// ## Errors
    ///
    /// - [`RingError::MissingStorage`] for an empty slice
    /// - [`RingError::ZeroElementSize`] for a zero-sized `T`
    pub fn new(storage: &'a mut [T]) -> RingResult<Self> {
        if storage.is_empty() {
            log_debug!("spsc ring rejected: no storage");
            return Err(RingError::MissingStorage);
        }
        if mem::size_of::<T>() == 0 {
            log_debug!("spsc ring rejected: zero-sized records");
            return Err(RingError::ZeroElementSize);
        }

        let capacity = storage.len();
        log_debug!(
            "spsc ring ready: {} slots of {} bytes",
            capacity,
            mem::size_of::<T>()
        );

        let bytes: &'a mut [u8] = bytemuck::cast_slice_mut(storage);
        // SAFETY: `AtomicU8` has the size, alignment and bit validity of
        // `u8`, and the exclusive borrow means nothing else touches these
        // bytes for `'a`.
        let slots = unsafe { &*(bytes as *mut [u8] as *const [AtomicU8]) };

        Ok(Self {
            slots,
            capacity,
            wrap_limit: capacity * (usize::MAX / capacity),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            stats: QueueStats::new(),
            _records: PhantomData,
        })
    }

    /// Split into the producer and consumer halves
    ///
    /// Taking `&mut self` guarantees at most one pair exists at a time.
    /// Records left by an earlier pair are kept.
    pub fn split(&mut self) -> (Producer<'_, T>, Consumer<'_, T>) {
        log_debug!("spsc ring split with {} records queued", self.len());
        let ring: &SpscRing<'_, T> = self;
        (Producer { ring }, Consumer { ring })
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        self.distance(head, tail).min(self.capacity)
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of records
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shared counters
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    /// Forget every stored record
    ///
    /// Needs `&mut self`, so no halves can be alive.
    pub fn clear(&mut self) {
        log_trace!("spsc ring cleared with {} records", self.len());
        *self.head.get_mut() = 0;
        *self.tail.get_mut() = 0;
    }

    /// Counter after `index`
    #[inline]
    fn next(&self, index: usize) -> usize {
        if index + 1 == self.wrap_limit {
            0
        } else {
            index + 1
        }
    }

    /// Records between `tail` and `head`
    #[inline]
    fn distance(&self, head: usize, tail: usize) -> usize {
        if head >= tail {
            head - tail
        } else {
            self.wrap_limit - tail + head
        }
    }

    /// Bytes of the slot for counter `index`
    #[inline]
    fn slot(&self, index: usize) -> &[AtomicU8] {
        let size = mem::size_of::<T>();
        let start = (index % self.capacity) * size;
        &self.slots[start..start + size]
    }

    /// Store `item` into the slot for counter `index`
    fn store(&self, index: usize, item: T) {
        for (dst, &byte) in self.slot(index).iter().zip(bytemuck::bytes_of(&item)) {
            dst.store(byte, Ordering::Relaxed);
        }
    }

    /// Copy the slot for counter `index`; may be torn if it races a store
    fn load(&self, index: usize) -> T {
        let mut item = T::zeroed();
        for (dst, src) in bytemuck::bytes_of_mut(&mut item)
            .iter_mut()
            .zip(self.slot(index))
        {
            *dst = src.load(Ordering::Relaxed);
        }
        item
    }
}

/// Producer half of a split [`SpscRing`]
///
/// `Send` when `T: Sync`, so it can move into an interrupt handler's context.
pub struct Producer<'r, T> {
    ring: &'r SpscRing<'r, T>,
}

impl<T: Pod> Producer<'_, T> {
    /// Append a record, dropping the oldest if full
    ///
    /// Never fails and never waits on the consumer.
    pub fn push(&mut self, item: T) -> PushOutcome {
        let ring = self.ring;
        let head = ring.head.load(Ordering::Relaxed);
        let tail = ring.tail.load(Ordering::Acquire);

        let mut outcome = PushOutcome::Stored;
        if ring.distance(head, tail) >= ring.capacity {
            // Failure means the consumer freed the slot first
            if ring
                .tail
                .compare_exchange(tail, ring.next(tail), Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                // Pairs with the consumer's fence: a copy that sees any byte
                // stored below also sees `tail` moved
                fence(Ordering::Release);
                outcome = PushOutcome::Overwrote;
                ring.stats.overwritten.fetch_add(1, Ordering::Relaxed);
            }
        }

        ring.store(head, item);
        ring.head.store(ring.next(head), Ordering::Release);

        ring.stats.pushed.fetch_add(1, Ordering::Relaxed);
        ring.stats.update_max_depth(self.len() as u32);
        outcome
    }

    /// Push every record in order with the overwrite policy
    ///
    /// Returns `items.len()`.
    pub fn push_multiple(&mut self, items: &[T]) -> usize {
        for &item in items {
            self.push(item);
        }
        items.len()
    }

    /// Number of stored records as seen by the producer
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free slots as seen by the producer
    ///
    /// Can only grow until the next push, since the consumer only frees slots.
    pub fn available(&self) -> usize {
        self.ring.capacity - self.len()
    }

    /// True if the next push will overwrite (unless the consumer pops first)
    pub fn is_full(&self) -> bool {
        self.len() == self.ring.capacity
    }

    /// Maximum number of records
    pub fn capacity(&self) -> usize {
        self.ring.capacity
    }

    /// Shared counters
    pub fn stats(&self) -> RingStats {
        self.ring.stats.snapshot()
    }
}

/// Consumer half of a split [`SpscRing`]
pub struct Consumer<'r, T> {
    ring: &'r SpscRing<'r, T>,
}

impl<T: Pod> Consumer<'_, T> {
    /// Remove and return the oldest record
    pub fn pop(&mut self) -> Option<T> {
        let ring = self.ring;
        loop {
            let tail = ring.tail.load(Ordering::Acquire);
            let head = ring.head.load(Ordering::Acquire);
            if head == tail {
                return None;
            }

            let item = ring.load(tail);
            fence(Ordering::Acquire);

            if ring
                .tail
                .compare_exchange(tail, ring.next(tail), Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                ring.stats.popped.fetch_add(1, Ordering::Relaxed);
                return Some(item);
            }

            // Producer lapped us
            core::hint::spin_loop();
        }
    }

    /// Pop up to `out.len()` records in FIFO order
    ///
    /// Stops early when the ring runs empty. Returns the number copied.
    pub fn pop_multiple(&mut self, out: &mut [T]) -> usize {
        let mut popped = 0;
        for slot in out.iter_mut() {
            match self.pop() {
                Some(item) => {
                    *slot = item;
                    popped += 1;
                }
                None => break,
            }
        }
        popped
    }

    /// Copy of the oldest record without removing it
    pub fn peek(&self) -> Option<T> {
        let ring = self.ring;
        loop {
            let tail = ring.tail.load(Ordering::Acquire);
            let head = ring.head.load(Ordering::Acquire);
            if head == tail {
                return None;
            }

            // Only trusted if `tail` did not move
            let item = ring.load(tail);
            fence(Ordering::Acquire);

            if ring.tail.load(Ordering::Relaxed) == tail {
                return Some(item);
            }
            core::hint::spin_loop();
        }
    }

    /// Number of stored records as seen by the consumer
    ///
    /// Can only grow until the next pop, unless the producer overwrites.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of records
    pub fn capacity(&self) -> usize {
        self.ring.capacity
    }

    /// Shared counters
    pub fn stats(&self) -> RingStats {
        self.ring.stats.snapshot()
    }

    /// Non-blocking pop for `nb`-style polling loops
    pub fn poll_pop(&mut self) -> nb::Result<T, Infallible> {
        self.pop().ok_or(nb::Error::WouldBlock)
    }
}

impl<T: Pod> RecordSource for Consumer<'_, T> {
    type Record = T;
    type Error = Infallible;

    fn poll_next(&mut self) -> nb::Result<T, Infallible> {
        self.poll_pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.capacity()))
    }
}

/// Iterator that pops until the consumer sees an empty ring
pub struct ConsumerDrain<'c, 'r, T> {
    consumer: &'c mut Consumer<'r, T>,
}

impl<T: Pod> Iterator for ConsumerDrain<'_, '_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.consumer.pop()
    }
}

impl<'r, T: Pod> Consumer<'r, T> {
    /// Pop everything currently stored
    ///
    /// Records pushed while draining are picked up too.
    pub fn drain(&mut self) -> ConsumerDrain<'_, 'r, T> {
        ConsumerDrain { consumer: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_basic() {
        let mut storage = [0u32; 4];
        let mut ring = SpscRing::new(&mut storage).unwrap();
        let (mut producer, mut consumer) = ring.split();

        assert_eq!(producer.push(7), PushOutcome::Stored);
        assert_eq!(consumer.len(), 1);
        assert_eq!(consumer.peek(), Some(7));
        assert_eq!(consumer.pop(), Some(7));
        assert!(consumer.is_empty());
        assert_eq!(consumer.pop(), None);
    }

    #[test]
    fn rejects_bad_storage() {
        let mut empty: [u8; 0] = [];
        assert_eq!(SpscRing::new(&mut empty).err(), Some(RingError::MissingStorage));

        let mut units = [(); 3];
        assert_eq!(SpscRing::new(&mut units).err(), Some(RingError::ZeroElementSize));
    }

    #[test]
    fn queue_full_overwrites() {
        let mut storage = [0u32; 4];
        let mut ring = SpscRing::new(&mut storage).unwrap();
        let (mut producer, mut consumer) = ring.split();

        // Uses every slot, no sentinel
        for i in 1..=4 {
            assert_eq!(producer.push(i), PushOutcome::Stored);
        }
        assert!(producer.is_full());
        assert_eq!(producer.available(), 0);

        assert_eq!(producer.push(5), PushOutcome::Overwrote);
        assert_eq!(producer.len(), 4);

        let drained: Vec<u32> = consumer.drain().collect();
        assert_eq!(drained, vec![2, 3, 4, 5]);

        let stats = consumer.stats();
        assert_eq!(stats.pushed, 5);
        assert_eq!(stats.popped, 4);
        assert_eq!(stats.overwritten, 1);
        assert_eq!(stats.max_depth, 4);
    }

    #[test]
    fn counters_survive_wraparound() {
        let mut storage = [0u8; 3];
        let mut ring = SpscRing::new(&mut storage).unwrap();
        assert_eq!(ring.wrap_limit % 3, 0);
        let start = ring.wrap_limit - 2;
        *ring.head.get_mut() = start;
        *ring.tail.get_mut() = start;

        let (mut producer, mut consumer) = ring.split();
        for i in 0..5u8 {
            producer.push(i);
        }
        assert_eq!(consumer.len(), 3);

        let mut out = [0u8; 4];
        assert_eq!(consumer.pop_multiple(&mut out), 3);
        assert_eq!(&out[..3], &[2, 3, 4]);
    }

    #[test]
    fn clear_after_halves_dropped() {
        let mut storage = [0u16; 4];
        let mut ring = SpscRing::new(&mut storage).unwrap();
        {
            let (mut producer, _consumer) = ring.split();
            producer.push_multiple(&[1, 2, 3]);
        }
        assert_eq!(ring.len(), 3);

        ring.clear();
        assert!(ring.is_empty());
    }

    #[test]
    fn poll_pop_would_block() {
        let mut storage = [0u8; 2];
        let mut ring = SpscRing::new(&mut storage).unwrap();
        let (mut producer, mut consumer) = ring.split();

        assert!(matches!(consumer.poll_pop(), Err(nb::Error::WouldBlock)));
        producer.push(9);
        assert!(matches!(consumer.poll_next(), Ok(9)));
    }
}
