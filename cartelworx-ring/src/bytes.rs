//! Byte-oriented ring for records sized at runtime
//!
//! [`ByteRing`] stores opaque records of `element_size` bytes in a borrowed
//! byte slice. Use it when the record layout is not a Rust type, e.g. radio
//! payloads whose size comes from a negotiated MTU. It follows exactly the
//! same rules as [`RingBuffer`](crate::RingBuffer); only the units differ:
//! region lengths and advance counts are in bytes and must be whole records.
//!
//! ```rust
//! use cartelworx_ring::{ByteRing, PushOutcome, RingConfig};
//!
//! let mut storage = [0u8; 17];
//! let mut ring = ByteRing::with_config(&mut storage, RingConfig::new(17, 4)).unwrap();
//! assert_eq!(ring.capacity(), 4); // last byte unused
//!
//! assert_eq!(ring.push(&[1, 2, 3, 4]).unwrap(), PushOutcome::Stored);
//! assert_eq!(ring.peek(), Some(&[1, 2, 3, 4][..]));
//!
//! let mut out = [0u8; 4];
//! ring.pop(&mut out).unwrap();
//! assert_eq!(out, [1, 2, 3, 4]);
//! ```

use core::ops::Range;

use crate::buffer::PushOutcome;
use crate::config::RingConfig;
use crate::cursor::Cursor;
use crate::errors::{RingError, RingResult};
use crate::stats::RingStats;

/// Ring of fixed-size byte records over a borrowed byte slice
pub struct ByteRing<'a> {
    storage: &'a mut [u8],
    element_size: usize,
    cursor: Cursor,
    stats: RingStats,
}

impl<'a> ByteRing<'a> {
    /// Build a ring over the whole of `storage`
    ///
    /// Capacity is `storage.len() / element_size`; any remainder is unused.
    ///
    /// ## Errors
    ///
    /// - [`RingError::MissingStorage`] for an empty slice
    /// - [`RingError::ZeroElementSize`] if `element_size == 0`
    /// - [`RingError::StorageTooSmall`] if not even one record fits
    pub fn new(storage: &'a mut [u8], element_size: usize) -> RingResult<Self> {
        let config = RingConfig::new(storage.len(), element_size);
        Self::with_config(storage, config)
    }

    /// Build a ring over the first `config.total_bytes` bytes of `storage`
    ///
    /// ## Errors
    ///
    /// As [`ByteRing::new`], plus [`RingError::ConfigExceedsStorage`] if
    /// the slice is shorter than `config.total_bytes`.
    pub fn with_config(storage: &'a mut [u8], config: RingConfig) -> RingResult<Self> {
        if storage.is_empty() {
            log_debug!("byte ring rejected: no storage");
            return Err(RingError::MissingStorage);
        }
        if let Err(e) = config.validate() {
            log_debug!("byte ring rejected: {}", e);
            return Err(e);
        }
        if config.total_bytes > storage.len() {
            log_debug!(
                "byte ring rejected: {} configured bytes, {} supplied",
                config.total_bytes,
                storage.len()
            );
            return Err(RingError::ConfigExceedsStorage {
                configured: config.total_bytes,
                available: storage.len(),
            });
        }

        let (storage, _) = storage.split_at_mut(config.total_bytes);
        log_debug!(
            "byte ring ready: {} records of {} bytes, {} bytes unused",
            config.capacity(),
            config.element_size,
            config.unused_bytes()
        );

        Ok(Self {
            storage,
            element_size: config.element_size,
            cursor: Cursor::new(config.capacity()),
            stats: RingStats::new(),
        })
    }

    /// Bytes per record
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Bytes of storage the ring was configured with, unused remainder included
    pub fn total_bytes(&self) -> usize {
        self.storage.len()
    }

    /// Maximum number of records
    pub fn capacity(&self) -> usize {
        self.cursor.capacity()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.cursor.len()
    }

    /// Free record slots
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

    #[inline]
    fn slot_bytes(&self, slot: usize) -> Range<usize> {
        let start = slot * self.element_size;
        start..start + self.element_size
    }

    #[inline]
    fn span_bytes(&self, span: Range<usize>) -> Range<usize> {
        span.start * self.element_size..span.end * self.element_size
    }

    /// Append one record, discarding the oldest if full
    ///
    /// ## Errors
    ///
    /// [`RingError::ElementSizeMismatch`] if `record.len() != element_size()`.
    /// A full ring is not an error; the outcome reports the overwrite.
    pub fn push(&mut self, record: &[u8]) -> RingResult<PushOutcome> {
        if record.len() != self.element_size {
            return Err(RingError::ElementSizeMismatch {
                expected: self.element_size,
                actual: record.len(),
            });
        }

        Ok(if self.store(record) {
            PushOutcome::Overwrote
        } else {
            PushOutcome::Stored
        })
    }

    /// Push back-to-back records with the overwrite policy
    ///
    /// `records` holds whole records laid end to end. Returns the number of
    /// records written (0 for an empty slice).
    ///
    /// ## Errors
    ///
    /// [`RingError::ElementSizeMismatch`] if `records.len()` is not a multiple
    /// of `element_size()`; `actual` is the slice length. Nothing is written.
    pub fn push_multiple(&mut self, records: &[u8]) -> RingResult<usize> {
        if !records.len().is_multiple_of(self.element_size) {
            log_debug!(
                "byte ring batch rejected: {} bytes is not a whole number of {}-byte records",
                records.len(),
                self.element_size
            );
            return Err(RingError::ElementSizeMismatch {
                expected: self.element_size,
                actual: records.len(),
            });
        }

        let mut pushed = 0;
        for record in records.chunks_exact(self.element_size) {
            self.store(record);
            pushed += 1;
        }
        Ok(pushed)
    }

    /// Copy one record into the head slot. Returns true if it overwrote.
    fn store(&mut self, record: &[u8]) -> bool {
        let (slot, overwrote) = self.cursor.push_slot();
        let range = self.slot_bytes(slot);
        self.storage[range].copy_from_slice(record);
        self.stats
            .record_push(1, usize::from(overwrote), self.cursor.len());
        overwrote
    }

    /// Remove the oldest record into the front of `out`
    ///
    /// ## Errors
    ///
    /// - [`RingError::ElementSizeMismatch`] if `out` is shorter than one record
    /// - [`RingError::Empty`] if nothing is stored
    ///
    /// Nothing changes on error.
    pub fn pop(&mut self, out: &mut [u8]) -> RingResult<()> {
        if out.len() < self.element_size {
            return Err(RingError::ElementSizeMismatch {
                expected: self.element_size,
                actual: out.len(),
            });
        }

        let slot = self.cursor.pop_slot().ok_or(RingError::Empty)?;
        let range = self.slot_bytes(slot);
        out[..self.element_size].copy_from_slice(&self.storage[range]);
        self.stats.record_pop(1);
        Ok(())
    }

    /// Pop up to `out.len() / element_size()` records back-to-back into `out`
    ///
    /// Stops early when the ring runs empty. Returns the number of records.
    pub fn pop_multiple(&mut self, out: &mut [u8]) -> usize {
        let wanted = out.len() / self.element_size;
        let mut popped = 0;

        while popped < wanted {
            let span = self.cursor.read_span();
            if span.is_empty() {
                break;
            }

            let n = span.len().min(wanted - popped);
            let src = self.span_bytes(span.start..span.start + n);
            let dst = self.span_bytes(popped..popped + n);
            out[dst].copy_from_slice(&self.storage[src]);
            self.cursor.consume_front(n);
            popped += n;
        }

        self.stats.record_pop(popped);
        popped
    }

    /// Oldest record without removing it
    pub fn peek(&self) -> Option<&[u8]> {
        self.cursor
            .slot_at(0)
            .map(|slot| &self.storage[self.slot_bytes(slot)])
    }

    /// Record `index` positions from the front without removing it
    pub fn peek_at(&self, index: usize) -> RingResult<&[u8]> {
        match self.cursor.slot_at(index) {
            Some(slot) => Ok(&self.storage[self.slot_bytes(slot)]),
            None => Err(RingError::OutOfRange {
                index,
                len: self.cursor.len(),
            }),
        }
    }

    /// Contiguous free bytes starting at the write position
    ///
    /// Always a whole number of records, bounded by free space and by the
    /// physical end of storage. Empty when full.
    pub fn write_region(&mut self) -> &mut [u8] {
        let span = self.cursor.grant_write();
        let range = self.span_bytes(span);
        &mut self.storage[range]
    }

    /// Publish `bytes` written into the last write region
    ///
    /// ## Errors
    ///
    /// - [`RingError::Misaligned`] if `bytes` is not a whole number of records
    /// - [`RingError::RegionExceeded`] if `bytes` is more than remains granted
    ///
    /// Nothing changes on error.
    pub fn advance_write(&mut self, bytes: usize) -> RingResult<()> {
        let records = self.records_in(bytes)?;
        let granted = self.cursor.write_grant() * self.element_size;
        if !self.cursor.commit_write(records) {
            return Err(RingError::RegionExceeded {
                requested: bytes,
                granted,
            });
        }

        self.stats.record_push(records, 0, self.cursor.len());
        Ok(())
    }

    /// Contiguous stored bytes starting at the read position
    ///
    /// Always a whole number of records, bounded by stored records and by
    /// the physical end of storage. Empty when the ring is empty.
    pub fn read_region(&mut self) -> &[u8] {
        let span = self.cursor.grant_read();
        let range = self.span_bytes(span);
        &self.storage[range]
    }

    /// Release `bytes` consumed from the last read region
    ///
    /// ## Errors
    ///
    /// Same rules as [`ByteRing::advance_write`].
    pub fn advance_read(&mut self, bytes: usize) -> RingResult<()> {
        let records = self.records_in(bytes)?;
        let granted = self.cursor.read_grant() * self.element_size;
        if !self.cursor.commit_read(records) {
            return Err(RingError::RegionExceeded {
                requested: bytes,
                granted,
            });
        }

        self.stats.record_pop(records);
        Ok(())
    }

    fn records_in(&self, bytes: usize) -> RingResult<usize> {
        if !bytes.is_multiple_of(self.element_size) {
            return Err(RingError::Misaligned {
                bytes,
                element_size: self.element_size,
            });
        }
        Ok(bytes / self.element_size)
    }

    /// Iterate stored records oldest first
    pub fn iter(&self) -> ByteIter<'_, 'a> {
        ByteIter {
            ring: self,
            index: 0,
        }
    }

    /// Forget every stored record; storage bytes are left as they are
    pub fn clear(&mut self) {
        log_trace!("byte ring cleared with {} records", self.cursor.len());
        self.cursor.clear();
    }

    /// Counters since construction or the last [`ByteRing::reset_stats`]
    pub fn stats(&self) -> RingStats {
        self.stats
    }

    /// Zero the counters
    pub fn reset_stats(&mut self) {
        self.stats = RingStats::new();
    }
}

/// Iterator over the records of a [`ByteRing`], oldest first
pub struct ByteIter<'r, 'a> {
    ring: &'r ByteRing<'a>,
    index: usize,
}

impl<'r> Iterator for ByteIter<'r, '_> {
    type Item = &'r [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let ring = self.ring;
        let slot = ring.cursor.slot_at(self.index)?;
        self.index += 1;
        Some(&ring.storage[ring.slot_bytes(slot)])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.ring.cursor.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ByteIter<'_, '_> {}
