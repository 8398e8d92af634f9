//! Slot index engine shared by [`RingBuffer`](crate::RingBuffer) and
//! [`ByteRing`](crate::ByteRing)
//!
//! Works purely in slot units and never touches storage. The shells map slots
//! to typed elements or byte ranges.
//!
//! ```text
//! capacity = 6, tail = 4, count = 4, head = (4 + 4) % 6 = 2
//!
//! ┌─────┬─────┬─────┬─────┬─────┬─────┐
//! │  C  │  D  │     │     │  A  │  B  │
//! └─────┴─────┴─────┴─────┴─────┴─────┘
//!                ↑           ↑
//!              head        tail
//!
//! read span  = 4..6 (A, B)   then 0..2 (C, D) after advancing
//! write span = 2..4
//! ```
//!
//! Zero-copy regions are tracked as grants: the size handed out by the last
//! `grant_*` call, shrunk by each commit. Any other movement of the same
//! index drops the grant.

use core::ops::Range;

/// Index state for one ring
#[derive(Debug, Clone)]
pub(crate) struct Cursor {
    capacity: usize,
    /// Next slot to write
    head: usize,
    /// Next slot to read
    tail: usize,
    count: usize,
    write_grant: usize,
    read_grant: usize,
}

impl Cursor {
    /// `capacity` must be at least 1
    pub(crate) const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            head: 0,
            tail: 0,
            count: 0,
            write_grant: 0,
            read_grant: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    pub(crate) fn available(&self) -> usize {
        self.capacity - self.count
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub(crate) fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    #[cfg(test)]
    pub(crate) fn head(&self) -> usize {
        self.head
    }

    #[cfg(test)]
    pub(crate) fn tail(&self) -> usize {
        self.tail
    }

    pub(crate) fn write_grant(&self) -> usize {
        self.write_grant
    }

    pub(crate) fn read_grant(&self) -> usize {
        self.read_grant
    }

    /// Advance `index` by `by` slots. Callers keep `by <= capacity`.
    #[inline]
    fn wrap_add(&self, index: usize, by: usize) -> usize {
        let next = index + by;
        if next >= self.capacity {
            next - self.capacity
        } else {
            next
        }
    }

    /// Claim the head slot for one push.
    ///
    /// Returns the slot and whether the oldest record was dropped to make
    /// room. When full, `head == tail`, so the returned slot is the evicted one.
    pub(crate) fn push_slot(&mut self) -> (usize, bool) {
        let slot = self.head;
        self.head = self.wrap_add(self.head, 1);
        self.write_grant = 0;

        let overwrote = self.count == self.capacity;
        if overwrote {
            self.tail = self.wrap_add(self.tail, 1);
            self.read_grant = 0;
        } else {
            self.count += 1;
        }

        self.debug_check();
        (slot, overwrote)
    }

    /// Release the tail slot for one pop
    pub(crate) fn pop_slot(&mut self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }

        let slot = self.tail;
        self.consume_front(1);
        Some(slot)
    }

    /// Physical slot of the record `index` positions from the front
    pub(crate) fn slot_at(&self, index: usize) -> Option<usize> {
        if index >= self.count {
            return None;
        }
        Some(self.wrap_add(self.tail, index))
    }

    /// Free slots from `head` up to the physical end of storage
    pub(crate) fn write_span(&self) -> Range<usize> {
        let len = self.available().min(self.capacity - self.head);
        self.head..self.head + len
    }

    /// Stored slots from `tail` up to the physical end of storage
    pub(crate) fn read_span(&self) -> Range<usize> {
        let len = self.count.min(self.capacity - self.tail);
        self.tail..self.tail + len
    }

    /// Hand out the write span and remember its size
    pub(crate) fn grant_write(&mut self) -> Range<usize> {
        let span = self.write_span();
        self.write_grant = span.len();
        span
    }

    /// Hand out the read span and remember its size
    pub(crate) fn grant_read(&mut self) -> Range<usize> {
        let span = self.read_span();
        self.read_grant = span.len();
        span
    }

    /// Publish `slots` written into the granted region.
    ///
    /// Returns false without mutating if `slots` exceeds the grant.
    pub(crate) fn commit_write(&mut self, slots: usize) -> bool {
        if slots > self.write_grant {
            return false;
        }
        let remaining = self.write_grant - slots;
        self.produce_back(slots);
        self.write_grant = remaining;
        true
    }

    /// Release `slots` read from the granted region.
    ///
    /// Returns false without mutating if `slots` exceeds the grant.
    pub(crate) fn commit_read(&mut self, slots: usize) -> bool {
        if slots > self.read_grant {
            return false;
        }
        let remaining = self.read_grant - slots;
        self.consume_front(slots);
        self.read_grant = remaining;
        true
    }

    /// Append `slots` records behind `head`. Caller guarantees the space.
    fn produce_back(&mut self, slots: usize) {
        debug_assert!(slots <= self.available());
        self.head = self.wrap_add(self.head, slots);
        self.count += slots;
        self.write_grant = 0;
        self.debug_check();
    }

    /// Drop `slots` records from the front. Caller guarantees they exist.
    pub(crate) fn consume_front(&mut self, slots: usize) {
        debug_assert!(slots <= self.count);
        self.tail = self.wrap_add(self.tail, slots);
        self.count -= slots;
        self.read_grant = 0;
        self.debug_check();
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new(self.capacity);
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert!(self.count <= self.capacity);
        debug_assert!(self.head < self.capacity && self.tail < self.capacity);
        debug_assert_eq!(self.head, (self.tail + self.count) % self.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_until_full_then_overwrite() {
        let mut cursor = Cursor::new(3);

        assert_eq!(cursor.push_slot(), (0, false));
        assert_eq!(cursor.push_slot(), (1, false));
        assert_eq!(cursor.push_slot(), (2, false));
        assert!(cursor.is_full());

        // Full: head == tail, so the claimed slot is the oldest record
        assert_eq!(cursor.push_slot(), (0, true));
        assert_eq!(cursor.len(), 3);
        assert_eq!(cursor.tail(), 1);
        assert_eq!(cursor.head(), 1);
    }

    #[test]
    fn pop_on_empty_leaves_state() {
        let mut cursor = Cursor::new(4);
        assert_eq!(cursor.pop_slot(), None);
        assert_eq!((cursor.head(), cursor.tail(), cursor.len()), (0, 0, 0));
    }

    #[test]
    fn slot_at_wraps() {
        let mut cursor = Cursor::new(4);
        for _ in 0..6 {
            cursor.push_slot();
        }
        // tail = 2, records live in slots 2, 3, 0, 1
        assert_eq!(cursor.slot_at(0), Some(2));
        assert_eq!(cursor.slot_at(2), Some(0));
        assert_eq!(cursor.slot_at(3), Some(1));
        assert_eq!(cursor.slot_at(4), None);
    }

    #[test]
    fn write_span_stops_at_physical_end() {
        let mut cursor = Cursor::new(4);
        cursor.push_slot();
        cursor.push_slot();
        cursor.push_slot();
        cursor.pop_slot();
        cursor.pop_slot();

        // head = 3, three slots free but only one before the end
        assert_eq!(cursor.head(), 3);
        assert_eq!(cursor.available(), 3);
        assert_eq!(cursor.write_span(), 3..4);

        // head wrapped to 0, now free space is the bound
        cursor.push_slot();
        assert_eq!(cursor.head(), 0);
        assert_eq!(cursor.available(), 2);
        assert_eq!(cursor.write_span(), 0..2);
    }

    #[test]
    fn grants_shrink_on_commit() {
        let mut cursor = Cursor::new(8);
        let span = cursor.grant_write();
        assert_eq!(span, 0..8);

        assert!(cursor.commit_write(3));
        assert_eq!(cursor.write_grant(), 5);
        assert!(!cursor.commit_write(6));
        assert!(cursor.commit_write(5));
        assert!(cursor.is_full());
        assert_eq!(cursor.write_grant(), 0);
    }

    #[test]
    fn push_drops_write_grant() {
        let mut cursor = Cursor::new(8);
        cursor.grant_write();
        cursor.push_slot();
        assert_eq!(cursor.write_grant(), 0);
        assert!(!cursor.commit_write(1));
        assert!(cursor.commit_write(0));
    }

    #[test]
    fn overwrite_drops_read_grant() {
        let mut cursor = Cursor::new(2);
        cursor.push_slot();
        cursor.push_slot();
        assert_eq!(cursor.grant_read(), 0..2);

        cursor.push_slot();
        assert_eq!(cursor.read_grant(), 0);
        assert!(!cursor.commit_read(1));
    }

    #[test]
    fn clear_resets_everything() {
        let mut cursor = Cursor::new(4);
        cursor.push_slot();
        cursor.grant_read();
        cursor.clear();
        assert!(cursor.is_empty());
        assert_eq!(cursor.read_grant(), 0);
        assert_eq!((cursor.head(), cursor.tail()), (0, 0));
    }
}
