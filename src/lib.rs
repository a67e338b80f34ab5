//! # va_stream
//!
//! A decimating stream buffer for calibrated current/voltage telemetry.
//!
//! Measurement instruments in this family stream calibrated (current, voltage)
//! samples at a fixed 2 MSa/s together with packed quality bits. This crate
//! turns that stream into a lower-rate record stream (current, voltage, power,
//! plus quality metrics), retains a bounded trailing history of those records
//! in a circular buffer, and answers range queries over the retained history
//! as per-field summary statistics.
//!
//! ## Crate Structure
//!
//! - **`config`**: Construction parameters (`StreamConfig`) with TOML loading
//!   and validation. Retention duration, reduction factors, and the input and
//!   output sampling frequencies are fixed at construction.
//! - **`error`**: The crate-wide `StreamError` enum and `StreamResult` alias.
//! - **`record`**: The 16-byte `DecimatedRecord` output record. Its binary
//!   layout is an external contract.
//! - **`statistics`**: The `FieldStats` running-statistics accumulator and the
//!   `StatsTable` returned by range queries.
//! - **`filter`**: The anti-alias decimation filter and the static table of
//!   supported output rates.
//! - **`pipeline`**: The per-sample decimation pipeline that drives the filter
//!   and accumulates quality bits into per-record metrics.
//! - **`buffer`**: `StreamBuffer`, the circular record store with the
//!   sample-id/time mapper and the range-query engine. This is the main entry
//!   point.
//! - **`source`**: The upstream instrument surface (`RawSource`, `RawSample`,
//!   `Calibration`) consumed by the pipeline.
//! - **`mock`**: A deterministic mock source for tests and benchmarks.

pub mod buffer;
pub mod config;
pub mod error;
pub mod filter;
pub mod mock;
pub mod pipeline;
pub mod record;
pub mod source;
pub mod statistics;

pub use buffer::StreamBuffer;
pub use config::StreamConfig;
pub use error::{StreamError, StreamResult};
pub use mock::MockSource;
pub use record::DecimatedRecord;
pub use source::{Calibration, RawSample, RawSource, SourceStatus, SuppressMode};
pub use statistics::{Field, FieldStats, StatsTable, FIELD_COUNT};
