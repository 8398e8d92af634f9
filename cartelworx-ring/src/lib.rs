//! Fixed-capacity ring buffer for CartelWorx edge firmware
//!
//! Moves fixed-size records (knock samples, CAN frames, outbound radio
//! payloads) from a real-time producer to a consumer task.
//!
//! Key constraints:
//! - Storage is supplied and owned by the caller; nothing is allocated
//! - Every single-element operation is O(1) and never blocks
//! - A full buffer overwrites its oldest record instead of stalling the producer
//!
//! Three shapes share one index engine:
//! - [`RingBuffer`]: typed records, single execution context
//! - [`ByteRing`]: records whose size is only known at runtime
//! - [`SpscRing`]: split into [`Producer`] / [`Consumer`] halves for ISR-to-task hand-off
//!
//! ```rust
//! use cartelworx_ring::RingBuffer;
//!
//! let mut storage = [0u32; 4];
//! let mut ring = RingBuffer::new(&mut storage).unwrap();
//!
//! for sample in 1..=5 {
//!     ring.push(sample);
//! }
//!
//! // 1 was overwritten by 5
//! assert_eq!(ring.pop(), Some(2));
//! assert_eq!(ring.len(), 3);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod buffer;
pub mod bytes;
pub mod config;
pub mod constants;
mod cursor;
pub mod errors;
pub mod queue;
pub mod stats;
pub mod traits;

// Public API
pub use buffer::{PushOutcome, RingBuffer};
pub use bytes::ByteRing;
pub use config::RingConfig;
pub use errors::{RingError, RingResult};
pub use queue::{Consumer, Producer, SpscRing};
pub use stats::RingStats;
pub use traits::RecordSource;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
