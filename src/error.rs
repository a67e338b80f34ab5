//! Custom error types for the stream buffer.
//!
//! This module defines the primary error type, `StreamError`, for the crate.
//! Using the `thiserror` crate, it provides a centralized and consistent way
//! to distinguish the error classes the stream buffer produces:
//!
//! - **`Config`**: Wraps errors from the `config` crate, typically file or
//!   format issues when loading a `StreamConfig` from TOML.
//! - **`Configuration`**: Semantic errors in the configuration, such as a
//!   non-positive retention duration that parses fine but is logically
//!   invalid.
//! - **`UnsupportedInputRate` / `UnsupportedOutputRate`**: Construction-time
//!   rejections. The instrument streams at exactly one input rate, and only
//!   an enumerated set of output rates has a filter configuration.
//! - **`NotImplemented`**: An operation that exists on the API surface but is
//!   deliberately unimplemented (raw per-sample retrieval). Distinct from
//!   recoverable query conditions, which are never errors; those produce a
//!   warning diagnostic and a degraded result instead.
//! - **`UnsupportedIncrement`**: Windowed aggregation across multiple records
//!   per output row is a planned extension point, not a silent wrong answer.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type StreamResult<T> = std::result::Result<T, StreamError>;

/// Errors produced by stream buffer construction and queries.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Configuration file could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration parsed but failed semantic validation.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// The input sampling frequency is fixed by the instrument.
    #[error("Unsupported input sampling frequency: {0} Hz (the instrument streams at {expected} Hz)", expected = crate::filter::INPUT_RATE)]
    UnsupportedInputRate(u32),

    /// The output sampling frequency has no filter configuration.
    #[error("Unsupported output sampling frequency: {0} Hz")]
    UnsupportedOutputRate(u32),

    /// The operation exists on the API surface but is not implemented.
    #[error("Operation not implemented: {0}")]
    NotImplemented(&'static str),

    /// Multi-record windowed aggregation is an unimplemented extension point.
    #[error("Windowed aggregation is not supported: increment {0} (only increment 1 is implemented)")]
    UnsupportedIncrement(i64),
}
