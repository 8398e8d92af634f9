//! Ring sizing
//!
//! A ring is configured by exactly two numbers: how many bytes of storage it
//! may use and how wide one record is. Capacity is derived from them by
//! truncating division; leftover bytes stay unused.

use crate::errors::{RingError, RingResult};

/// Storage size and record size of a ring
///
/// ```rust
/// use cartelworx_ring::RingConfig;
///
/// let config = RingConfig::new(17, 4);
/// assert_eq!(config.capacity(), 4);
/// assert_eq!(config.unused_bytes(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingConfig {
    /// Bytes of storage the ring may use
    pub total_bytes: usize,
    /// Bytes per record
    pub element_size: usize,
}

impl RingConfig {
    /// Create a configuration
    pub const fn new(total_bytes: usize, element_size: usize) -> Self {
        Self {
            total_bytes,
            element_size,
        }
    }

    /// Configuration holding exactly `records` values of `T`
    pub const fn for_records<T>(records: usize) -> Self {
        let element_size = core::mem::size_of::<T>();
        Self::new(records.saturating_mul(element_size), element_size)
    }

    /// Check that at least one record fits
    pub fn validate(&self) -> RingResult<()> {
        if self.element_size == 0 {
            return Err(RingError::ZeroElementSize);
        }
        if self.total_bytes < self.element_size {
            return Err(RingError::StorageTooSmall {
                total_bytes: self.total_bytes,
                element_size: self.element_size,
            });
        }
        Ok(())
    }

    /// Number of records that fit (0 for an invalid configuration)
    pub const fn capacity(&self) -> usize {
        match self.total_bytes.checked_div(self.element_size) {
            Some(records) => records,
            None => 0,
        }
    }

    /// Trailing bytes that can never hold a record
    pub const fn unused_bytes(&self) -> usize {
        match self.total_bytes.checked_rem(self.element_size) {
            Some(rest) => rest,
            None => self.total_bytes,
        }
    }
}
