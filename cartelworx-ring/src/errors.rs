//! Error Types for Ring Buffer Operations
//!
//! ## Design Philosophy
//!
//! Errors are returned from the sampling hot path, so they follow the same
//! rules as the rest of the firmware:
//!
//! 1. **Small Size**: every variant carries at most two `usize` values.
//!
//! 2. **No Heap Allocation**: no `String`, nothing boxed.
//!
//! 3. **Copy Semantics**: errors are `Copy` so they can be returned and
//!    stored without moves.
//!
//! ## Error Categories
//!
//! ### Configuration (construction time)
//! - `MissingStorage`: empty storage slice
//! - `ZeroElementSize`: zero-sized records
//! - `StorageTooSmall`: storage cannot hold a single record
//! - `ConfigExceedsStorage`: `RingConfig::total_bytes` is larger than the slice
//!
//! ### Empty State
//! - `Empty`: nothing to pop
//! - `OutOfRange`: `peek_at` beyond the stored records
//!
//! ### Zero-Copy Protocol Violations
//! - `Misaligned`: byte count is not a whole number of records
//! - `RegionExceeded`: advanced past the region that was handed out
//!
//! ### Arguments
//! - `ElementSizeMismatch`: record slice does not match the element size
//!
//! A full buffer is never an error. Pushing into it overwrites the oldest
//! record and the push return value says so.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use cartelworx_ring::{ByteRing, RingError};
//!
//! let mut storage = [0u8; 16];
//! let mut ring = ByteRing::new(&mut storage, 4).unwrap();
//! let mut frame = [0u8; 4];
//!
//! match ring.pop(&mut frame) {
//!     Ok(()) => {
//!         // forward the frame
//!     }
//!     Err(RingError::Empty) => {
//!         // nothing sampled yet, poll again next tick
//!     }
//!     Err(_) => {
//!         // caller bug: wrong output size
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for ring buffer operations
pub type RingResult<T> = Result<T, RingError>;

/// Ring buffer errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// No backing storage was supplied
    #[error("No backing storage supplied")]
    MissingStorage,

    /// Records must be at least one byte wide
    #[error("Element size must be at least one byte")]
    ZeroElementSize,

    /// Storage is smaller than a single record
    #[error("Storage of {total_bytes} bytes cannot hold one {element_size}-byte element")]
    StorageTooSmall {
        /// Bytes of storage supplied
        total_bytes: usize,
        /// Requested record size
        element_size: usize,
    },

    /// Configured size is larger than the storage slice
    #[error("Configured {configured} bytes but storage only has {available}")]
    ConfigExceedsStorage {
        /// `total_bytes` from the configuration
        configured: usize,
        /// Length of the storage slice
        available: usize,
    },

    /// Nothing stored
    #[error("Ring buffer is empty")]
    Empty,

    /// Offset past the last stored record
    #[error("Index {index} out of range for {len} stored elements")]
    OutOfRange {
        /// Requested offset from the front
        index: usize,
        /// Number of records stored
        len: usize,
    },

    /// Byte count is not a whole number of records
    #[error("{bytes} bytes is not a multiple of the {element_size}-byte element size")]
    Misaligned {
        /// Byte count passed to the advance call
        bytes: usize,
        /// Record size
        element_size: usize,
    },

    /// Advance is larger than the region most recently handed out
    #[error("Advance of {requested} exceeds granted region of {granted}")]
    RegionExceeded {
        /// Amount passed to the advance call
        requested: usize,
        /// Amount still granted
        granted: usize,
    },

    /// Record slice does not match the element size
    #[error("Record of {actual} bytes does not match {expected}-byte element size")]
    ElementSizeMismatch {
        /// Record size of the ring
        expected: usize,
        /// Length of the slice supplied
        actual: usize,
    },
}

impl RingError {
    /// True for errors raised while constructing a ring
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::MissingStorage
                | Self::ZeroElementSize
                | Self::StorageTooSmall { .. }
                | Self::ConfigExceedsStorage { .. }
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RingError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::MissingStorage =>
                defmt::write!(fmt, "No storage"),
            Self::ZeroElementSize =>
                defmt::write!(fmt, "Zero element size"),
            Self::StorageTooSmall { total_bytes, element_size } =>
                defmt::write!(fmt, "Storage {} < element {}", total_bytes, element_size),
            Self::ConfigExceedsStorage { configured, available } =>
                defmt::write!(fmt, "Config {} > storage {}", configured, available),
            Self::Empty =>
                defmt::write!(fmt, "Empty"),
            Self::OutOfRange { index, len } =>
                defmt::write!(fmt, "Index {} >= len {}", index, len),
            Self::Misaligned { bytes, element_size } =>
                defmt::write!(fmt, "{} bytes not multiple of {}", bytes, element_size),
            Self::RegionExceeded { requested, granted } =>
                defmt::write!(fmt, "Advance {} > granted {}", requested, granted),
            Self::ElementSizeMismatch { expected, actual } =>
                defmt::write!(fmt, "Record {} bytes, expected {}", actual, expected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_classified() {
        assert!(RingError::MissingStorage.is_config_error());
        assert!(RingError::StorageTooSmall { total_bytes: 2, element_size: 4 }.is_config_error());
        assert!(!RingError::Empty.is_config_error());
        assert!(!RingError::Misaligned { bytes: 3, element_size: 4 }.is_config_error());
    }

    #[test]
    fn errors_stay_small() {
        assert!(core::mem::size_of::<RingError>() <= 3 * core::mem::size_of::<usize>());
    }

    #[test]
    fn display_mentions_values() {
        let msg = format!("{}", RingError::OutOfRange { index: 5, len: 3 });
        assert!(msg.contains('5'));
        assert!(msg.contains('3'));
    }
}
