//! Mock sample source for tests and benchmarks.
//!
//! Generates a constant (current, voltage) pair with optional uniform noise
//! and fixed quality bits. Deterministic: the noise generator is seeded, so
//! a given configuration always produces the same stream.

use crate::source::{Calibration, RawSample, RawSource, SourceStatus, SuppressMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A deterministic signal generator implementing the source surface.
pub struct MockSource {
    name: String,
    calibration: Calibration,
    sample_id_max: u64,
    contiguous_max: u64,
    suppress_mode: SuppressMode,
    current: f32,
    voltage: f32,
    noise: f32,
    range_code: u8,
    current_lsb: bool,
    voltage_lsb: bool,
    produced: u64,
    rng: StdRng,
}

impl MockSource {
    /// A source producing a constant (current, voltage) pair.
    pub fn constant(current: f32, voltage: f32) -> Self {
        Self {
            name: "mock".to_string(),
            calibration: Calibration::default(),
            sample_id_max: u64::MAX,
            contiguous_max: u64::MAX,
            suppress_mode: SuppressMode::default(),
            current,
            voltage,
            noise: 0.0,
            range_code: 0,
            current_lsb: false,
            voltage_lsb: false,
            produced: 0,
            rng: StdRng::seed_from_u64(0x5eed),
        }
    }

    /// Adds zero-mean uniform noise of the given amplitude to both channels.
    pub fn with_noise(mut self, amplitude: f32) -> Self {
        self.noise = amplitude;
        self
    }

    /// Fixes the quality bits attached to every sample.
    pub fn with_quality(mut self, range_code: u8, current_lsb: bool, voltage_lsb: bool) -> Self {
        self.range_code = range_code & 0x0F;
        self.current_lsb = current_lsb;
        self.voltage_lsb = voltage_lsb;
        self
    }

    /// Produces the next sample.
    pub fn next_sample(&mut self) -> RawSample {
        self.produced += 1;
        let (di, dv) = if self.noise > 0.0 {
            (
                self.rng.gen_range(-self.noise..=self.noise),
                self.rng.gen_range(-self.noise..=self.noise),
            )
        } else {
            (0.0, 0.0)
        };
        RawSample {
            current: self.current + di,
            voltage: self.voltage + dv,
            range_code: self.range_code,
            current_lsb: self.current_lsb,
            voltage_lsb: self.voltage_lsb,
        }
    }
}

impl RawSource for MockSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn calibration(&self) -> Calibration {
        self.calibration
    }

    fn sample_id_max(&self) -> u64 {
        self.sample_id_max
    }

    fn set_sample_id_max(&mut self, max: u64) {
        self.sample_id_max = max;
    }

    fn contiguous_max(&self) -> u64 {
        self.contiguous_max
    }

    fn set_contiguous_max(&mut self, max: u64) {
        self.contiguous_max = max;
    }

    fn suppress_mode(&self) -> SuppressMode {
        self.suppress_mode
    }

    fn set_suppress_mode(&mut self, mode: SuppressMode) {
        self.suppress_mode = mode;
    }

    fn status(&self) -> SourceStatus {
        SourceStatus {
            sample_count: self.produced,
            sample_missing_count: 0,
            skip_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_source_is_noise_free() {
        let mut source = MockSource::constant(1.0, 5.0);
        for _ in 0..100 {
            let s = source.next_sample();
            assert_eq!(s.current, 1.0);
            assert_eq!(s.voltage, 5.0);
        }
        assert_eq!(source.status().sample_count, 100);
    }

    #[test]
    fn noise_stays_within_amplitude() {
        let mut source = MockSource::constant(1.0, 5.0).with_noise(0.1);
        for _ in 0..1000 {
            let s = source.next_sample();
            assert!((s.current - 1.0).abs() <= 0.1 + f32::EPSILON);
            assert!((s.voltage - 5.0).abs() <= 0.1 + f32::EPSILON);
        }
    }

    #[test]
    fn quality_bits_are_carried() {
        let mut source = MockSource::constant(0.0, 0.0).with_quality(7, true, false);
        let s = source.next_sample();
        assert_eq!(s.range_code, 7);
        assert!(s.current_lsb);
        assert!(!s.voltage_lsb);
    }

    #[test]
    fn passthrough_setters_round_trip() {
        let mut source = MockSource::constant(0.0, 0.0);
        source.set_sample_id_max(1_000);
        source.set_contiguous_max(500);
        source.set_suppress_mode(SuppressMode::Nan);
        assert_eq!(source.sample_id_max(), 1_000);
        assert_eq!(source.contiguous_max(), 500);
        assert_eq!(source.suppress_mode(), SuppressMode::Nan);
    }
}
