//! Anti-alias decimation filtering.
//!
//! The instrument streams at a single fixed input rate. Each supported output
//! rate maps to a cascade of averaging FIR stages whose decimation factors
//! multiply to `M = INPUT_RATE / output_rate`. Selection is a static lookup
//! over `RATE_TABLE`; there is no dynamic dispatch.
//!
//! The three signal channels (current, voltage, power) are sample-synchronized
//! and share one cascade with per-channel accumulators, so the filter emits
//! exactly one output triple per `M` input triples. The first emission after
//! construction or reset reflects the cascade's warm-up window; the filter
//! does not compensate for its own settling.

use crate::error::{StreamError, StreamResult};

/// The only input sampling frequency the instrument produces, in Hz.
pub const INPUT_RATE: u32 = 2_000_000;

/// Number of synchronized signal channels (current, voltage, power).
pub const CHANNELS: usize = 3;

/// Stage-factor decomposition for each supported output rate.
///
/// Invariant: the factors of each entry multiply to `INPUT_RATE / rate`.
const RATE_TABLE: &[(u32, &[usize])] = &[
    (100_000, &[4, 5]),
    (20_000, &[10, 10]),
    (10_000, &[4, 5, 10]),
    (2_000, &[10, 10, 10]),
    (1_000, &[10, 10, 20]),
    (100, &[10, 10, 10, 20]),
    (10, &[10, 10, 10, 10, 20]),
    (1, &[10, 10, 10, 10, 10, 20]),
];

/// The supported output sampling frequencies, in Hz.
pub fn supported_output_rates() -> impl Iterator<Item = u32> {
    RATE_TABLE.iter().map(|(rate, _)| *rate)
}

/// Whether `output_rate` has a filter configuration.
pub fn is_supported_output_rate(output_rate: u32) -> bool {
    RATE_TABLE.iter().any(|(rate, _)| *rate == output_rate)
}

fn stage_factors(output_rate: u32) -> Option<&'static [usize]> {
    RATE_TABLE
        .iter()
        .find(|(rate, _)| *rate == output_rate)
        .map(|(_, stages)| *stages)
}

/// One averaging FIR stage: accumulate `len` inputs, emit their mean.
#[derive(Debug, Clone)]
struct AveragingStage {
    len: usize,
    fill: usize,
    acc: [f64; CHANNELS],
}

impl AveragingStage {
    fn new(len: usize) -> Self {
        Self {
            len,
            fill: 0,
            acc: [0.0; CHANNELS],
        }
    }

    fn push(&mut self, input: [f64; CHANNELS]) -> Option<[f64; CHANNELS]> {
        for (acc, x) in self.acc.iter_mut().zip(input) {
            *acc += x;
        }
        self.fill += 1;
        if self.fill < self.len {
            return None;
        }
        let scale = 1.0 / self.len as f64;
        let out = self.acc.map(|a| a * scale);
        self.fill = 0;
        self.acc = [0.0; CHANNELS];
        Some(out)
    }

    fn reset(&mut self) {
        self.fill = 0;
        self.acc = [0.0; CHANNELS];
    }
}

/// Cascaded decimation filter for one supported output rate.
#[derive(Debug, Clone)]
pub struct DecimationFilter {
    stages: Vec<AveragingStage>,
    downsample_m: usize,
}

impl DecimationFilter {
    /// Builds the cascade for `output_rate`.
    ///
    /// # Errors
    /// `StreamError::UnsupportedOutputRate` when the rate is not in the
    /// supported set.
    pub fn new(output_rate: u32) -> StreamResult<Self> {
        let factors =
            stage_factors(output_rate).ok_or(StreamError::UnsupportedOutputRate(output_rate))?;
        Ok(Self {
            stages: factors.iter().map(|f| AveragingStage::new(*f)).collect(),
            downsample_m: factors.iter().product(),
        })
    }

    /// Total decimation factor `M` of the cascade.
    pub fn downsample_m(&self) -> usize {
        self.downsample_m
    }

    /// Pushes one input triple; emits one output triple per `M` inputs.
    pub fn push(&mut self, input: [f64; CHANNELS]) -> Option<[f64; CHANNELS]> {
        let mut value = input;
        for stage in &mut self.stages {
            value = stage.push(value)?;
        }
        Some(value)
    }

    /// Clears all stage state, returning the cascade to its initial state.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}
