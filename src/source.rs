//! The upstream instrument surface consumed by the decimation pipeline.
//!
//! The raw high-rate source buffer and its transport ingestion live outside
//! this crate. What the stream buffer needs from upstream is (a) one
//! calibrated `RawSample` per push and (b) a handful of configuration
//! accessors that it forwards unchanged to its own callers. `RawSource` is
//! the seam for (b); samples themselves arrive through
//! `StreamBuffer::push_sample`, keeping ingestion a plain synchronous call
//! chain.

use serde::{Deserialize, Serialize};

/// One calibrated input sample with its packed quality bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Calibrated current, amperes.
    pub current: f32,
    /// Calibrated voltage, volts.
    pub voltage: f32,
    /// 4-bit current range code (0..=15).
    pub range_code: u8,
    /// Current least-significant-bit flag.
    pub current_lsb: bool,
    /// Voltage least-significant-bit flag.
    pub voltage_lsb: bool,
}

/// Calibration offsets and gains applied upstream of this crate.
///
/// Carried only so downstream consumers can read the active calibration
/// through the stream buffer; the samples pushed here are already calibrated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Current channel offset, amperes.
    pub current_offset: f64,
    /// Current channel gain.
    pub current_gain: f64,
    /// Voltage channel offset, volts.
    pub voltage_offset: f64,
    /// Voltage channel gain.
    pub voltage_gain: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            current_offset: 0.0,
            current_gain: 1.0,
            voltage_offset: 0.0,
            voltage_gain: 1.0,
        }
    }
}

/// How the source handles samples taken during current-range switching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuppressMode {
    /// Keep raw samples unmodified.
    Off,
    /// Replace affected samples with the window mean.
    Mean,
    /// Interpolate across the affected window.
    #[default]
    Interpolate,
    /// Replace affected samples with NaN.
    Nan,
}

/// Generic source status counters, forwarded verbatim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    /// Total samples the source has delivered.
    pub sample_count: u64,
    /// Samples the source dropped or never received.
    pub sample_missing_count: u64,
    /// Discontinuities observed in the transport stream.
    pub skip_count: u64,
}

/// Configuration surface of the upstream sample source.
///
/// The stream buffer forwards these accessors unchanged; it never interprets
/// them.
pub trait RawSource {
    /// Human-readable source name.
    fn name(&self) -> String;

    /// The calibration currently applied upstream.
    fn calibration(&self) -> Calibration;

    /// Maximum sample id the source will deliver.
    fn sample_id_max(&self) -> u64;

    /// Sets the maximum sample id the source will deliver.
    fn set_sample_id_max(&mut self, max: u64);

    /// Maximum contiguous sample run the source guarantees.
    fn contiguous_max(&self) -> u64;

    /// Sets the maximum contiguous sample run.
    fn set_contiguous_max(&mut self, max: u64);

    /// Active range-switch suppression mode.
    fn suppress_mode(&self) -> SuppressMode;

    /// Sets the range-switch suppression mode.
    fn set_suppress_mode(&mut self, mode: SuppressMode);

    /// Generic status counters.
    fn status(&self) -> SourceStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_default_is_identity() {
        let cal = Calibration::default();
        assert_eq!(cal.current_gain, 1.0);
        assert_eq!(cal.voltage_gain, 1.0);
        assert_eq!(cal.current_offset, 0.0);
        assert_eq!(cal.voltage_offset, 0.0);
    }

    #[test]
    fn suppress_mode_defaults_to_interpolate() {
        assert_eq!(SuppressMode::default(), SuppressMode::Interpolate);
    }
}
