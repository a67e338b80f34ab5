//! The decimated output record.
//!
//! `DecimatedRecord` is the unit stored in the circular buffer, one per
//! emitted output sample. It uses `#[repr(C)]` to ensure a predictable memory
//! layout that external zero-copy consumers (Python, C++) can map directly.
//!
//! # Memory Layout
//! ```text
//! offset  field             type
//! 0       current           f32 (little-endian)
//! 4       voltage           f32
//! 8       power             f32
//! 12      current_range     u8
//! 13      current_lsb       u8
//! 14      voltage_lsb       u8
//! 15      reserved          u8
//! ```
//!
//! The record is exactly 16 bytes. Field order and widths are part of the
//! external contract and must not be altered.

use serde::{Deserialize, Serialize};

/// Size of one `DecimatedRecord` in bytes.
pub const RECORD_SIZE: usize = 16;

/// One decimated output sample with its quality metrics.
///
/// The three signal fields are the filter outputs for the group of raw
/// samples that contributed to this record. The three metric fields summarize
/// measurement conditions over that same group:
///
/// - `current_range`: mean 4-bit current range code, scaled by 16 so the full
///   u8 range is used.
/// - `current_lsb` / `voltage_lsb`: fraction of the group during which the
///   corresponding least-significant-bit flag was set, scaled to 0..=255.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DecimatedRecord {
    /// Decimated current in amperes.
    pub current: f32,
    /// Decimated voltage in volts.
    pub voltage: f32,
    /// Decimated instantaneous power in watts, formed per raw sample before
    /// filtering.
    pub power: f32,
    /// Mean current range code over the group, scaled by 16.
    pub current_range: u8,
    /// Current LSB duty over the group, 0..=255.
    pub current_lsb: u8,
    /// Voltage LSB duty over the group, 0..=255.
    pub voltage_lsb: u8,
    /// Reserved for future use; always zero.
    pub reserved: u8,
}

// The 16-byte size is load-bearing for external consumers.
const _: () = assert!(std::mem::size_of::<DecimatedRecord>() == RECORD_SIZE);
const _: () = assert!(std::mem::align_of::<DecimatedRecord>() == 4);

impl DecimatedRecord {
    /// Serializes the record to its stable little-endian wire layout.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[0..4].copy_from_slice(&self.current.to_le_bytes());
        out[4..8].copy_from_slice(&self.voltage.to_le_bytes());
        out[8..12].copy_from_slice(&self.power.to_le_bytes());
        out[12] = self.current_range;
        out[13] = self.current_lsb;
        out[14] = self.voltage_lsb;
        out[15] = self.reserved;
        out
    }

    /// Deserializes a record from its stable little-endian wire layout.
    pub fn from_bytes(bytes: &[u8; RECORD_SIZE]) -> Self {
        let f32_at = |offset: usize| {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&bytes[offset..offset + 4]);
            f32::from_le_bytes(raw)
        };
        Self {
            current: f32_at(0),
            voltage: f32_at(4),
            power: f32_at(8),
            current_range: bytes[12],
            current_lsb: bytes[13],
            voltage_lsb: bytes[14],
            reserved: bytes[15],
        }
    }
}
