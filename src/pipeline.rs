//! The per-sample decimation pipeline.
//!
//! `DecimationPipeline` consumes one calibrated sample at a time, drives the
//! decimation filter, and accumulates the packed quality bits over each group
//! of `M` input samples. When the filter emits a filtered (current, voltage,
//! power) triple, the accumulators are quantized into the 8-bit record
//! metrics, a `DecimatedRecord` is returned, and the accumulators reset.
//!
//! The pipeline is a pure synchronous transform: it executes inline on
//! whatever context delivers raw samples and never blocks or spawns work.

use crate::error::StreamResult;
use crate::filter::DecimationFilter;
use crate::record::DecimatedRecord;
use crate::source::RawSample;
use log::trace;

/// Per-sample pipeline from raw samples to decimated records.
#[derive(Debug, Clone)]
pub struct DecimationPipeline {
    filter: DecimationFilter,
    downsample_m: u64,
    range_sum: u64,
    current_lsb_count: u64,
    voltage_lsb_count: u64,
}

impl DecimationPipeline {
    /// Builds the pipeline for `output_rate`.
    ///
    /// # Errors
    /// `StreamError::UnsupportedOutputRate` when the rate has no filter
    /// configuration.
    pub fn new(output_rate: u32) -> StreamResult<Self> {
        let filter = DecimationFilter::new(output_rate)?;
        let downsample_m = filter.downsample_m() as u64;
        Ok(Self {
            filter,
            downsample_m,
            range_sum: 0,
            current_lsb_count: 0,
            voltage_lsb_count: 0,
        })
    }

    /// Input samples per emitted record.
    pub fn downsample_m(&self) -> u64 {
        self.downsample_m
    }

    /// Pushes one calibrated sample; returns a record on every `M`-th push.
    pub fn push(&mut self, sample: &RawSample) -> Option<DecimatedRecord> {
        // Power is formed per raw sample and decimated directly. The filter
        // is linear and does not commute with the multiply, so filtering the
        // product is what yields the correct average power over the window.
        let current = f64::from(sample.current);
        let voltage = f64::from(sample.voltage);
        let power = current * voltage;

        self.range_sum += u64::from(sample.range_code & 0x0F);
        self.current_lsb_count += u64::from(sample.current_lsb);
        self.voltage_lsb_count += u64::from(sample.voltage_lsb);

        let [c, v, p] = self.filter.push([current, voltage, power])?;

        let record = DecimatedRecord {
            current: c as f32,
            voltage: v as f32,
            power: p as f32,
            current_range: Self::quantize(self.range_sum * 16, self.downsample_m),
            current_lsb: Self::quantize(self.current_lsb_count * 255, self.downsample_m),
            voltage_lsb: Self::quantize(self.voltage_lsb_count * 255, self.downsample_m),
            reserved: 0,
        };
        trace!(
            "emit record: i={:.6} v={:.6} p={:.6} range={}",
            record.current,
            record.voltage,
            record.power,
            record.current_range
        );
        self.range_sum = 0;
        self.current_lsb_count = 0;
        self.voltage_lsb_count = 0;
        Some(record)
    }

    /// Clears filter state and quality accumulators.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.range_sum = 0;
        self.current_lsb_count = 0;
        self.voltage_lsb_count = 0;
    }

    fn quantize(scaled_sum: u64, m: u64) -> u8 {
        (scaled_sum / m).min(255) as u8
    }
}
