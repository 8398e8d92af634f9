//! Consumer-side traits
//!
//! Consumer tasks pull records with the same non-blocking model the rest of
//! the firmware uses: `nb::Error::WouldBlock` means "nothing yet, come back
//! next tick", never "something went wrong".
//!
//! ```rust
//! use cartelworx_ring::{RecordSource, RingBuffer};
//!
//! fn drain_into<S: RecordSource<Record = u16>>(source: &mut S, out: &mut [u16]) -> usize {
//!     let mut n = 0;
//!     while n < out.len() {
//!         match source.poll_next() {
//!             Ok(sample) => {
//!                 out[n] = sample;
//!                 n += 1;
//!             }
//!             Err(nb::Error::WouldBlock) => break,
//!             Err(nb::Error::Other(_)) => break,
//!         }
//!     }
//!     n
//! }
//!
//! let mut storage = [0u16; 8];
//! let mut ring = RingBuffer::new(&mut storage).unwrap();
//! ring.push_multiple(&[10, 20, 30]);
//!
//! let mut out = [0u16; 8];
//! assert_eq!(drain_into(&mut ring, &mut out), 3);
//! assert_eq!(&out[..3], &[10, 20, 30]);
//! ```

/// Non-blocking source of records
///
/// Implemented by [`RingBuffer`](crate::RingBuffer) and the SPSC
/// [`Consumer`](crate::Consumer), so a drain task can be written once and fed
/// by either.
pub trait RecordSource {
    /// Record type produced
    type Record;

    /// Error type; the rings in this crate never fail a poll
    type Error;

    /// Pull the next record
    ///
    /// Returns:
    /// - `Ok(record)` - oldest record, now removed
    /// - `Err(nb::Error::WouldBlock)` - nothing stored
    /// - `Err(nb::Error::Other(e))` - source failure
    fn poll_next(&mut self) -> nb::Result<Self::Record, Self::Error>;

    /// Bounds on records currently available, like `Iterator::size_hint`
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}
