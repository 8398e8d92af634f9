//! Fixed-Capacity Ring Buffer over Caller-Owned Storage
//!
//! ## Overview
//!
//! [`RingBuffer`] passes fixed-size records from a producer to a consumer
//! inside one execution context. It never allocates: the caller hands in a
//! mutable slice at construction and gets it back when the ring is dropped.
//! The borrow checker proves the storage outlives the ring.
//!
//! ## Design Rationale
//!
//! ### Why Overwrite When Full?
//!
//! The producer is usually the knock sampler or a CAN interrupt. Stalling it
//! because the consumer fell behind would lose *new* data to keep *old* data.
//! For engine monitoring the newest samples matter most, so a push into a full
//! ring drops the oldest record and always succeeds. The evicted record is
//! handed back so the caller can count or log the loss.
//!
//! ### Why Typed Storage?
//!
//! Records are almost always a known `Copy` type (`u16` ADC samples, a CAN
//! frame struct), so the element size is a compile-time constant and no
//! runtime size checks are needed. Runtime-sized records use
//! [`ByteRing`](crate::ByteRing), which shares the same index engine.
//!
//! ### Zero-Copy Regions
//!
//! The ring is circular but storage is linear. [`RingBuffer::write_region`]
//! and [`RingBuffer::read_region`] expose the largest span that does not
//! cross the physical end, so a DMA transfer or `copy_from_slice` never has
//! to wrap mid-copy. A second call after advancing returns the wrapped part.
//!
//! ```text
//! capacity = 8, tail = 3, head = 6, available = 5
//!
//! ┌───┬───┬───┬───┬───┬───┬───┬───┐
//! │   │   │   │ x │ x │ x │   │   │
//! └───┴───┴───┴───┴───┴───┴───┴───┘
//!               ↑           ↑
//!             tail        head
//! first write_region  = slots 6..8 (2 slots)
//! second write_region = slots 0..3 (3 slots)
//! ```
//!
//! ## Performance Characteristics
//!
//! - `push()` / `pop()` / `peek*()`: O(1), one slot copy
//! - `push_multiple()` / `pop_multiple()`: O(n) in records moved
//! - regions: O(1), no copy
//!
//! ## Thread Safety
//!
//! Not synchronized. Every mutating call takes `&mut self`. To hand records
//! from an interrupt to a task use [`SpscRing`](crate::SpscRing).
//!
//! ## Usage Example
//!
//! ```rust
//! use cartelworx_ring::RingBuffer;
//!
//! let mut storage = [0u16; 8];
//! let mut ring = RingBuffer::new(&mut storage).unwrap();
//!
//! // Producer: bulk write through the zero-copy region
//! let region = ring.write_region();
//! let n = region.len().min(3);
//! region[..n].copy_from_slice(&[100, 200, 300]);
//! ring.advance_write(n).unwrap();
//!
//! // Consumer
//! assert_eq!(ring.peek(), Some(&100));
//! assert_eq!(ring.pop(), Some(100));
//! assert_eq!(ring.len(), 2);
//! ```

use core::convert::Infallible;
use core::mem;

use crate::config::RingConfig;
use crate::cursor::Cursor;
use crate::errors::{RingError, RingResult};
use crate::stats::RingStats;
use crate::traits::RecordSource;

/// What a push did to the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Stored in a free slot
    Stored,
    /// Stored after discarding the oldest record
    Overwrote,
}

impl PushOutcome {
    /// True if a record was lost to make room
    pub fn overwrote(self) -> bool {
        matches!(self, Self::Overwrote)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PushOutcome {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Stored => defmt::write!(fmt, "Stored"),
            Self::Overwrote => defmt::write!(fmt, "Overwrote"),
        }
    }
}

/// Ring buffer of `T` records over a borrowed slice
///
/// ## Internal Invariants
///
/// - `len() <= capacity()`
/// - head slot = (tail slot + `len()`) mod `capacity()`
/// - `capacity() == storage.len() >= 1`
pub struct RingBuffer<'a, T> {
    storage: &'a mut [T],
    cursor: Cursor,
    stats: RingStats,
}

impl<'a, T: Copy> RingBuffer<'a, T> {
    /// Build a ring over `storage`, using every slot
    ///
    /// Existing contents of `storage` are ignored; the ring starts empty.
    ///
    /// ## Errors
    ///
    /// - [`RingError::MissingStorage`] for an empty slice
    /// - [`RingError::ZeroElementSize`] for a zero-sized `T`
    pub fn new(storage: &'a mut [T]) -> RingResult<Self> {
        if storage.is_empty() {
            log_debug!("ring rejected: no storage");
            return Err(RingError::MissingStorage);
        }

        let element_size = mem::size_of::<T>();
        let config = RingConfig::new(mem::size_of_val(storage), element_size);
        if let Err(e) = config.validate() {
            log_debug!("ring rejected: {}", e);
            return Err(e);
        }

        let capacity = storage.len();
        log_debug!("ring ready: {} slots of {} bytes", capacity, element_size);

        Ok(Self {
            storage,
            cursor: Cursor::new(capacity),
            stats: RingStats::new(),
        })
    }

    /// Append a record, discarding the oldest if full
    ///
    /// Returns the discarded record, if any. Never fails.
    ///
    /// ```rust
    /// # use cartelworx_ring::RingBuffer;
    /// let mut storage = [0u8; 2];
    /// let mut ring = RingBuffer::new(&mut storage).unwrap();
    ///
    /// assert_eq!(ring.push(1), None);
    /// assert_eq!(ring.push(2), None);
    /// assert_eq!(ring.push(3), Some(1));
    /// ```
    pub fn push(&mut self, item: T) -> Option<T> {
        let (slot, overwrote) = self.cursor.push_slot();
        let evicted = if overwrote { Some(self.storage[slot]) } else { None };
        self.storage[slot] = item;

        self.stats
            .record_push(1, usize::from(overwrote), self.cursor.len());
        evicted
    }

    /// Push every record in order with the overwrite policy
    ///
    /// Returns the number of records written, always `items.len()`. If more
    /// than `capacity()` records are pushed only the last `capacity()` remain.
    /// Use [`RingBuffer::stats`] to see how many were overwritten.
    pub fn push_multiple(&mut self, items: &[T]) -> usize {
        for &item in items {
            self.push(item);
        }
        items.len()
    }

    /// Remove and return the oldest record
    pub fn pop(&mut self) -> Option<T> {
        let slot = self.cursor.pop_slot()?;
        self.stats.record_pop(1);
        Some(self.storage[slot])
    }

    /// Pop up to `out.len()` records in FIFO order
    ///
    /// Stops early when the ring runs empty. Returns the number copied.
    pub fn pop_multiple(&mut self, out: &mut [T]) -> usize {
        let mut popped = 0;

        // At most two contiguous spans: up to the physical end, then from 0
        while popped < out.len() {
            let span = self.cursor.read_span();
            if span.is_empty() {
                break;
            }

            let n = span.len().min(out.len() - popped);
            out[popped..popped + n].copy_from_slice(&self.storage[span.start..span.start + n]);
            self.cursor.consume_front(n);
            popped += n;
        }

        self.stats.record_pop(popped);
        popped
    }

    /// Oldest record without removing it
    pub fn peek(&self) -> Option<&T> {
        self.cursor.slot_at(0).map(|slot| &self.storage[slot])
    }

    /// Record `index` positions from the front without removing it
    ///
    /// `peek_at(0)` is what `pop()` would return next.
    pub fn peek_at(&self, index: usize) -> RingResult<&T> {
        match self.cursor.slot_at(index) {
            Some(slot) => Ok(&self.storage[slot]),
            None => Err(RingError::OutOfRange {
                index,
                len: self.cursor.len(),
            }),
        }
    }

    /// Contiguous free slots starting at the write position
    ///
    /// Sized `min(available(), slots before the end of storage)`. Empty when
    /// full. Fill some prefix of it, then call [`RingBuffer::advance_write`].
    /// Unlike `push`, this path never overwrites.
    pub fn write_region(&mut self) -> &mut [T] {
        let span = self.cursor.grant_write();
        &mut self.storage[span]
    }

    /// Publish `written` records placed in the last write region
    ///
    /// ## Errors
    ///
    /// [`RingError::RegionExceeded`] if `written` is larger than what remains
    /// of the last region handed out. Nothing changes on error.
    pub fn advance_write(&mut self, written: usize) -> RingResult<()> {
        let granted = self.cursor.write_grant();
        if !self.cursor.commit_write(written) {
            return Err(RingError::RegionExceeded {
                requested: written,
                granted,
            });
        }

        self.stats.record_push(written, 0, self.cursor.len());
        Ok(())
    }

    /// Contiguous stored records starting at the read position
    ///
    /// Sized `min(len(), slots before the end of storage)`. Empty when the
    /// ring is empty. Release what was consumed with
    /// [`RingBuffer::advance_read`].
    pub fn read_region(&mut self) -> &[T] {
        let span = self.cursor.grant_read();
        &self.storage[span]
    }

    /// Release `read` records from the last read region
    ///
    /// ## Errors
    ///
    /// [`RingError::RegionExceeded`] if `read` is larger than what remains of
    /// the last region handed out. Nothing changes on error.
    pub fn advance_read(&mut self, read: usize) -> RingResult<()> {
        let granted = self.cursor.read_grant();
        if !self.cursor.commit_read(read) {
            return Err(RingError::RegionExceeded {
                requested: read,
                granted,
            });
        }

        self.stats.record_pop(read);
        Ok(())
    }

    /// Iterate stored records oldest first
    pub fn iter(&self) -> Iter<'_, 'a, T> {
        Iter {
            ring: self,
            index: 0,
        }
    }

    /// Pop every stored record
    pub fn drain(&mut self) -> Drain<'_, 'a, T> {
        Drain { ring: self }
    }
}

impl<'a, T> RingBuffer<'a, T> {
    /// Number of stored records
    pub fn len(&self) -> usize {
        self.cursor.len()
    }

    /// Maximum number of records
    pub fn capacity(&self) -> usize {
        self.cursor.capacity()
    }

    /// Free slots
    pub fn available(&self) -> usize {
        self.cursor.available()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty()
    }

    /// True if the next push will overwrite
    pub fn is_full(&self) -> bool {
        self.cursor.is_full()
    }

    /// Fill level from 0.0 (empty) to 1.0 (full)
    pub fn fill_ratio(&self) -> f32 {
        self.cursor.len() as f32 / self.cursor.capacity() as f32
    }

    /// Forget every stored record
    ///
    /// Storage contents are left as they are. Outstanding regions are revoked.
    pub fn clear(&mut self) {
        log_trace!("ring cleared with {} records", self.cursor.len());
        self.cursor.clear();
    }

    /// Counters since construction or the last [`RingBuffer::reset_stats`]
    pub fn stats(&self) -> RingStats {
        self.stats
    }

    /// Zero the counters
    pub fn reset_stats(&mut self) {
        self.stats = RingStats::new();
    }
}

impl<T: Copy> RecordSource for RingBuffer<'_, T> {
    type Record = T;
    type Error = Infallible;

    fn poll_next(&mut self) -> nb::Result<T, Infallible> {
        self.pop().ok_or(nb::Error::WouldBlock)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

/// Iterator over stored records, oldest first
pub struct Iter<'r, 'a, T> {
    ring: &'r RingBuffer<'a, T>,
    index: usize,
}

impl<'r, T> Iterator for Iter<'r, '_, T> {
    type Item = &'r T;

    fn next(&mut self) -> Option<Self::Item> {
        let ring = self.ring;
        let slot = ring.cursor.slot_at(self.index)?;
        self.index += 1;
        Some(&ring.storage[slot])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.ring.cursor.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, '_, T> {}

/// Draining iterator returned by [`RingBuffer::drain`]
pub struct Drain<'r, 'a, T> {
    ring: &'r mut RingBuffer<'a, T>,
}

impl<T: Copy> Iterator for Drain<'_, '_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.ring.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.ring.len(), Some(self.ring.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer() {
        let mut storage = [0u32; 4];
        let mut ring = RingBuffer::new(&mut storage).unwrap();

        assert!(ring.is_empty());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.available(), 4);
        assert_eq!(ring.pop(), None);
        assert!(ring.peek().is_none());
        assert_eq!(ring.cursor.head(), 0);
        assert_eq!(ring.cursor.tail(), 0);
    }

    #[test]
    fn rejects_empty_storage() {
        let mut storage: [u32; 0] = [];
        assert_eq!(
            RingBuffer::new(&mut storage).err(),
            Some(RingError::MissingStorage)
        );
    }

    #[test]
    fn rejects_zero_sized_records() {
        let mut storage = [(); 4];
        assert_eq!(
            RingBuffer::new(&mut storage).err(),
            Some(RingError::ZeroElementSize)
        );
    }

    #[test]
    fn circular_overwrite() {
        let mut storage = [0u32; 4];
        let mut ring = RingBuffer::new(&mut storage).unwrap();

        for i in 1..=5 {
            ring.push(i);
        }

        assert_eq!(ring.len(), 4);
        assert!(ring.is_full());
        let values: Vec<u32> = ring.iter().copied().collect();
        assert_eq!(values, vec![2, 3, 4, 5]);
        assert_eq!(ring.stats().overwritten, 1);
    }

    #[test]
    fn push_returns_evicted_record() {
        let mut storage = [0u8; 3];
        let mut ring = RingBuffer::new(&mut storage).unwrap();

        assert_eq!(ring.push(10), None);
        assert_eq!(ring.push(11), None);
        assert_eq!(ring.push(12), None);
        assert_eq!(ring.push(13), Some(10));
        assert_eq!(ring.push(14), Some(11));
    }

    #[test]
    fn peek_at_offsets() {
        let mut storage = [0u32; 4];
        let mut ring = RingBuffer::new(&mut storage).unwrap();
        ring.push_multiple(&[3, 4, 5]);

        assert_eq!(ring.peek_at(0), Ok(&3));
        assert_eq!(ring.peek_at(1), Ok(&4));
        assert_eq!(ring.peek_at(2), Ok(&5));
        assert_eq!(ring.peek_at(3), Err(RingError::OutOfRange { index: 3, len: 3 }));
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn pop_multiple_crosses_wrap() {
        let mut storage = [0u16; 4];
        let mut ring = RingBuffer::new(&mut storage).unwrap();

        ring.push_multiple(&[1, 2, 3]);
        ring.pop();
        ring.pop();
        ring.push_multiple(&[4, 5, 6]);
        // tail = 2, records in slots 2, 3, 0, 1

        let mut out = [0u16; 8];
        assert_eq!(ring.pop_multiple(&mut out), 4);
        assert_eq!(&out[..4], &[3, 4, 5, 6]);
        assert!(ring.is_empty());
        assert_eq!(ring.stats().popped, 6);
    }

    #[test]
    fn pop_multiple_partial() {
        let mut storage = [0u16; 4];
        let mut ring = RingBuffer::new(&mut storage).unwrap();
        ring.push_multiple(&[1, 2, 3]);

        let mut out = [0u16; 2];
        assert_eq!(ring.pop_multiple(&mut out), 2);
        assert_eq!(out, [1, 2]);
        assert_eq!(ring.pop(), Some(3));
    }

    #[test]
    fn write_region_bounded_by_physical_end() {
        let mut storage = [0u32; 4];
        let mut ring = RingBuffer::new(&mut storage).unwrap();

        ring.push_multiple(&[1, 2, 3]);
        ring.pop();
        ring.pop();
        // head = 3, available = 3
        assert_eq!(ring.available(), 3);
        assert_eq!(ring.write_region().len(), 1);
    }

    #[test]
    fn write_region_empty_when_full() {
        let mut storage = [0u32; 2];
        let mut ring = RingBuffer::new(&mut storage).unwrap();
        ring.push_multiple(&[1, 2]);

        assert!(ring.write_region().is_empty());
        assert_eq!(
            ring.advance_write(1),
            Err(RingError::RegionExceeded { requested: 1, granted: 0 })
        );
    }

    #[test]
    fn advance_write_without_region_fails() {
        let mut storage = [0u32; 4];
        let mut ring = RingBuffer::new(&mut storage).unwrap();

        assert!(ring.advance_write(1).is_err());
        assert!(ring.advance_write(0).is_ok());
        assert!(ring.is_empty());
    }

    #[test]
    fn region_round_trip() {
        let mut storage = [0u32; 4];
        let mut ring = RingBuffer::new(&mut storage).unwrap();

        let region = ring.write_region();
        assert_eq!(region.len(), 4);
        region[0] = 7;
        region[1] = 8;
        ring.advance_write(2).unwrap();
        assert_eq!(ring.len(), 2);

        let region = ring.read_region();
        assert_eq!(region, &[7, 8]);
        assert!(ring.advance_read(3).is_err());
        ring.advance_read(2).unwrap();
        assert!(ring.is_empty());

        let stats = ring.stats();
        assert_eq!((stats.pushed, stats.popped), (2, 2));
    }

    #[test]
    fn pop_revokes_read_region() {
        let mut storage = [0u32; 4];
        let mut ring = RingBuffer::new(&mut storage).unwrap();
        ring.push_multiple(&[1, 2, 3]);

        assert_eq!(ring.read_region().len(), 3);
        ring.pop();
        assert!(ring.advance_read(1).is_err());
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn clear_keeps_storage() {
        let mut storage = [0u32; 4];
        {
            let mut ring = RingBuffer::new(&mut storage).unwrap();
            ring.push_multiple(&[9, 9]);
            ring.clear();
            assert!(ring.is_empty());
            assert_eq!(ring.available(), 4);
        }
        assert_eq!(&storage[..2], &[9, 9]);
    }

    #[test]
    fn drain_empties_in_order() {
        let mut storage = [0i16; 3];
        let mut ring = RingBuffer::new(&mut storage).unwrap();
        ring.push_multiple(&[-1, 0, 1, 2]);

        let drained: Vec<i16> = ring.drain().collect();
        assert_eq!(drained, vec![0, 1, 2]);
        assert!(ring.is_empty());
    }

    #[test]
    fn fill_ratio() {
        let mut storage = [0u8; 4];
        let mut ring = RingBuffer::new(&mut storage).unwrap();
        assert_eq!(ring.fill_ratio(), 0.0);

        ring.push_multiple(&[1, 2]);
        assert!((ring.fill_ratio() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn poll_next_would_block_when_empty() {
        let mut storage = [0u8; 2];
        let mut ring = RingBuffer::new(&mut storage).unwrap();

        assert!(matches!(ring.poll_next(), Err(nb::Error::WouldBlock)));
        ring.push(5);
        assert_eq!(ring.size_hint(), (1, Some(1)));
        assert_eq!(ring.poll_next(), Ok(5));
    }
}
