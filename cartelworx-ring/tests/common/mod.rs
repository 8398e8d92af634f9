//! Shared fixtures for the integration tests
//!
//! - Record types shaped like the ones the firmware queues
//! - A deterministic generator so failures replay exactly

#![allow(dead_code)]

use bytemuck::{Pod, Zeroable};
use cartelworx_ring::constants::{CAN_MAX_DATA_LENGTH, KNOCK_ADC_MAX};

/// Extended (29-bit) identifier flag in [`CanFrame::flags`]
pub const CAN_FLAG_EXTENDED: u8 = 0x01;

/// Received CAN frame as the RX interrupt queues it
///
/// Laid out without padding so it can cross the split ring.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct CanFrame {
    pub id: u32,
    pub timestamp_us: u32,
    pub data: [u8; CAN_MAX_DATA_LENGTH],
    pub dlc: u8,
    pub flags: u8,
    pub reserved: [u8; 2],
}

impl CanFrame {
    /// Standard-id frame carrying `seq` in its first four data bytes and
    /// its complement in the last four
    pub fn numbered(id: u32, seq: u32) -> Self {
        let mut data = [0u8; CAN_MAX_DATA_LENGTH];
        data[..4].copy_from_slice(&seq.to_le_bytes());
        data[4..].copy_from_slice(&(!seq).to_le_bytes());
        Self {
            id,
            timestamp_us: seq.wrapping_mul(250),
            data,
            dlc: 8,
            ..Self::default()
        }
    }

    /// Sequence number written by [`CanFrame::numbered`]
    pub fn seq(&self) -> u32 {
        u32::from_le_bytes([self.data[0], self.data[1], self.data[2], self.data[3]])
    }

    /// True if the frame is exactly what [`CanFrame::numbered`] built
    pub fn is_intact(&self) -> bool {
        *self == Self::numbered(self.id, self.seq())
    }

    pub fn is_extended(&self) -> bool {
        self.flags & CAN_FLAG_EXTENDED != 0
    }
}

/// Xorshift generator
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    /// Uniform in `0..bound`
    pub fn below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }
}

/// 12-bit knock sensor samples: a slow baseline plus noise
///
/// Values stay within `0..=KNOCK_ADC_MAX`.
pub fn knock_samples(rng: &mut TestRng, count: usize) -> Vec<u16> {
    (0..count)
        .map(|i| {
            let baseline = 2048 + ((i % 64) as i32 - 32) * 8;
            let noise = rng.below(65) as i32 - 32;
            (baseline + noise).clamp(0, i32::from(KNOCK_ADC_MAX)) as u16
        })
        .collect()
}

/// Radio payload whose bytes all equal `tag`
pub fn payload<const N: usize>(tag: u8) -> [u8; N] {
    [tag; N]
}
