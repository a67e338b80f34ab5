//! The decimating stream buffer: circular record store, sample-id/time
//! mapper, and range-query engine.
//!
//! `StreamBuffer` owns the decimation pipeline and a fixed arena of
//! `DecimatedRecord`s. The pipeline is the arena's sole writer: every `M`-th
//! pushed sample emits one record, written at `processed_count % capacity`
//! with overwrite-oldest semantics and no backpressure. Range queries map a
//! sample-id interval onto the retained window, fill the portions that fell
//! outside it, and copy the rest into a statistics table.
//!
//! # Valid window
//!
//! The set of retained sample ids is always
//! `[max(0, processed_count - capacity), processed_count)`. Ids at or above
//! `processed_count` have never been written; ids below the window have been
//! overwritten. The query engine enforces this; the raw record read does
//! not.
//!
//! # Concurrency
//!
//! Single writer, single reader, no internal synchronization. The write path
//! takes `&mut self`, so sharing a `StreamBuffer` across threads already
//! requires external synchronization (a `Mutex`, or an equivalent handoff)
//! from the caller; none is embedded here because the intended usage is a
//! synchronous ingestion callback chain plus a same-thread query path.
//! `reset` must not race an in-flight query or push.

use crate::config::StreamConfig;
use crate::error::{StreamError, StreamResult};
use crate::pipeline::DecimationPipeline;
use crate::record::DecimatedRecord;
use crate::source::{Calibration, RawSample, RawSource, SourceStatus, SuppressMode};
use crate::statistics::{invalid_row, record_row, StatsRow, StatsTable};
use log::{debug, warn};

/// Bounded trailing history of decimated records with range queries.
pub struct StreamBuffer {
    config: StreamConfig,
    pipeline: DecimationPipeline,
    records: Box<[DecimatedRecord]>,
    processed_count: u64,
    source: Option<Box<dyn RawSource>>,
}

impl StreamBuffer {
    /// Builds a stream buffer from validated construction parameters.
    ///
    /// The record arena is allocated once, sized to
    /// `round_up(duration * output_rate, reduction_step)`, and never
    /// resized; reconfiguration requires reconstruction.
    ///
    /// # Errors
    /// Construction-time configuration errors per `StreamConfig::validate`.
    pub fn new(config: StreamConfig) -> StreamResult<Self> {
        config.validate()?;
        let pipeline = DecimationPipeline::new(config.output_rate)?;
        let capacity = config.capacity() as usize;
        debug!(
            "stream buffer: capacity={} records, output_rate={} Hz, M={}",
            capacity,
            config.output_rate,
            pipeline.downsample_m()
        );
        Ok(Self {
            config,
            pipeline,
            records: vec![DecimatedRecord::default(); capacity].into_boxed_slice(),
            processed_count: 0,
            source: None,
        })
    }

    /// The construction parameters.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Arena capacity in records.
    pub fn capacity(&self) -> u64 {
        self.records.len() as u64
    }

    /// Records emitted since construction or the last reset.
    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    /// Index the next emitted record will be written at.
    pub fn write_index(&self) -> u64 {
        self.processed_count % self.capacity()
    }

    /// Input samples per emitted record.
    pub fn downsample_m(&self) -> u64 {
        self.pipeline.downsample_m()
    }

    /// Returns the buffer to an empty logical state.
    ///
    /// Counters, quality accumulators, and filter state are zeroed; record
    /// storage is left as-is and becomes unreachable through queries.
    pub fn reset(&mut self) {
        self.processed_count = 0;
        self.pipeline.reset();
    }

    /// Pushes one calibrated sample through the decimation pipeline.
    ///
    /// Returns `true` when this push emitted a record. Synchronous; never
    /// blocks.
    pub fn push_sample(&mut self, sample: &RawSample) -> bool {
        match self.pipeline.push(sample) {
            Some(record) => {
                self.commit(record);
                true
            }
            None => false,
        }
    }

    fn commit(&mut self, record: DecimatedRecord) {
        let idx = (self.processed_count % self.capacity()) as usize;
        self.records[idx] = record;
        self.processed_count += 1;
    }

    /// Raw record read at `sample_id`, which the caller must have validated
    /// against the retained window.
    fn read(&self, sample_id: u64) -> DecimatedRecord {
        self.records[(sample_id % self.capacity()) as usize]
    }

    // ---- sample-id / time mapping -------------------------------------

    /// Half-open range of sample ids still retained, clamped at 0.
    pub fn limits_samples(&self) -> (i64, i64) {
        let processed = self.processed_count as i64;
        let capacity = self.capacity() as i64;
        ((processed - capacity).max(0), processed)
    }

    /// Half-open time range `[0, capacity / output_rate)` in seconds.
    pub fn limits_time(&self) -> (f64, f64) {
        (0.0, self.capacity() as f64 / f64::from(self.config.output_rate))
    }

    /// Maps a sample id into the buffer's time interval.
    pub fn sample_id_to_time(&self, sample_id: i64) -> f64 {
        let (first, _) = self.limits_samples();
        (sample_id - first) as f64 / f64::from(self.config.output_rate)
    }

    /// Maps a buffer-relative time back to a sample id.
    ///
    /// Exact inverse of `sample_id_to_time` (up to floating-point rounding)
    /// for any id within `limits_samples`.
    pub fn time_to_sample_id(&self, time: f64) -> i64 {
        let (first, _) = self.limits_samples();
        first + (time * f64::from(self.config.output_rate)).round() as i64
    }

    // ---- range queries ------------------------------------------------

    /// Range query over `[start, stop)` sample ids with the given row
    /// increment.
    ///
    /// Returns `floor((stop - start) / increment)` rows of per-field
    /// statistics, oldest first. Rows whose window fell outside retained
    /// history are invalid-filled (`count == 0`, NaN fields). `start >= stop`
    /// yields an empty table; caller errors beyond that produce a warning
    /// diagnostic and a shortened table, never a fault.
    ///
    /// # Errors
    /// `StreamError::UnsupportedIncrement` for `increment > 1`: multi-record
    /// windowed aggregation is a planned extension point, and returning a
    /// wrong answer silently is not acceptable.
    pub fn data_get(&self, start: i64, stop: i64, increment: i64) -> StreamResult<StatsTable> {
        if increment > 1 {
            return Err(StreamError::UnsupportedIncrement(increment));
        }
        if increment < 1 {
            warn!("data_get: non-positive increment {increment}");
            return Ok(StatsTable::default());
        }
        if start >= stop {
            return Ok(StatsTable::default());
        }

        let processed = self.processed_count as i64;
        let capacity = self.capacity() as i64;
        let increment_wide = i128::from(increment);

        // Row count implied by the request, computed wide so a degenerate
        // interval cannot overflow before it has been validated.
        let expected_wide = (i128::from(stop) - i128::from(start)) / increment_wide;

        // Where a negative start lands after advancing by whole increments,
        // and how many rows that skips. Arithmetic only; the skipped rows are
        // realized as invalid table rows further down.
        let (first, skipped) = if start < 0 {
            let skip = (-i128::from(start) + increment_wide - 1) / increment_wide;
            (i128::from(start) + skip * increment_wide, skip)
        } else {
            (i128::from(start), 0)
        };

        // The entire window predates retained history.
        if i128::from(stop) + i128::from(capacity) < i128::from(processed) {
            let Ok(expected) = usize::try_from(expected_wide) else {
                warn!("data_get: window [{start}, {stop}) implies an unaddressable row count");
                return Ok(StatsTable::default());
            };
            warn!(
                "data_get: window [{start}, {stop}) fully stale, oldest retained id is {}",
                processed - capacity
            );
            return Ok(StatsTable::with_invalid_rows(expected));
        }

        // A request reaching past what the pipeline has produced is a caller
        // error: abort the read before allocating the table the request
        // implies, since that row count is bounded only by the request
        // itself.
        if first > i128::from(processed) || stop > processed || i128::from(stop) <= first {
            warn!(
                "data_get: request out of range after adjustment: start={start} stop={stop} \
                 processed={processed}"
            );
            return Ok(StatsTable::default());
        }

        // Past validation the window ends at or below the head, so the row
        // count is serviceable.
        let Ok(expected) = usize::try_from(expected_wide) else {
            warn!("data_get: window [{start}, {stop}) implies an unaddressable row count");
            return Ok(StatsTable::default());
        };
        let mut table = StatsTable::with_invalid_rows(expected);
        let mut start = first as i64;
        let mut row = usize::try_from(skipped).unwrap_or(expected);

        // Skip the partially stale prefix by whole increments.
        while start + capacity < processed && row < expected {
            start += increment;
            row += 1;
        }

        // Direct copy: one retained record per row.
        while row < expected && start < stop {
            table.rows[row] = record_row(&self.read(start as u64));
            start += increment;
            row += 1;
        }

        if row != expected {
            warn!("data_get: produced {row} rows, expected {expected}");
        }
        Ok(table)
    }

    /// Raw per-sample retrieval. Unsupported by design.
    ///
    /// # Errors
    /// Always `StreamError::NotImplemented`.
    pub fn samples_get(&self, _start: i64, _stop: i64) -> StreamResult<Vec<RawSample>> {
        Err(StreamError::NotImplemented("samples_get"))
    }

    /// Aggregate statistics over `[start, stop)`.
    ///
    /// Windowed aggregation is not implemented; this allocates and returns a
    /// default-valued row so callers get a well-formed shape.
    pub fn statistics_get(&self, start: i64, stop: i64) -> StreamResult<StatsRow> {
        debug!("statistics_get([{start}, {stop})): aggregation not implemented, returning defaults");
        Ok(invalid_row())
    }

    // ---- source passthrough -------------------------------------------

    /// Attaches the upstream source whose configuration this buffer forwards.
    pub fn attach_source(&mut self, source: Box<dyn RawSource>) {
        self.source = Some(source);
    }

    /// Name of the attached source, if any.
    pub fn source_name(&self) -> Option<String> {
        self.source.as_ref().map(|s| s.name())
    }

    /// Calibration of the attached source.
    pub fn calibration(&self) -> Option<Calibration> {
        self.source.as_ref().map(|s| s.calibration())
    }

    /// `sample_id_max` of the attached source.
    pub fn sample_id_max(&self) -> Option<u64> {
        self.source.as_ref().map(|s| s.sample_id_max())
    }

    /// Forwards `sample_id_max` to the attached source.
    pub fn set_sample_id_max(&mut self, max: u64) {
        if let Some(source) = self.source.as_mut() {
            source.set_sample_id_max(max);
        }
    }

    /// `contiguous_max` of the attached source.
    pub fn contiguous_max(&self) -> Option<u64> {
        self.source.as_ref().map(|s| s.contiguous_max())
    }

    /// Forwards `contiguous_max` to the attached source.
    pub fn set_contiguous_max(&mut self, max: u64) {
        if let Some(source) = self.source.as_mut() {
            source.set_contiguous_max(max);
        }
    }

    /// Suppression mode of the attached source.
    pub fn suppress_mode(&self) -> Option<SuppressMode> {
        self.source.as_ref().map(|s| s.suppress_mode())
    }

    /// Forwards the suppression mode to the attached source.
    pub fn set_suppress_mode(&mut self, mode: SuppressMode) {
        if let Some(source) = self.source.as_mut() {
            source.set_suppress_mode(mode);
        }
    }

    /// Status counters of the attached source.
    pub fn source_status(&self) -> Option<SourceStatus> {
        self.source.as_ref().map(|s| s.status())
    }
}
