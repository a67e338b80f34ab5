//! Construction parameters for the stream buffer.
//!
//! `StreamConfig` can be built programmatically or loaded from a TOML file
//! through the `config` crate. Validation is separate from parsing: a config
//! that parses fine can still be semantically invalid (wrong input rate,
//! unsupported output rate, non-positive duration), and those are reported
//! as distinct `StreamError` variants.

use crate::error::{StreamError, StreamResult};
use crate::filter::{self, INPUT_RATE};
use config::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_input_rate() -> u32 {
    INPUT_RATE
}

fn default_reductions() -> Vec<u32> {
    vec![10, 10, 10]
}

/// Construction parameters for a `StreamBuffer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Retained history duration in seconds.
    pub duration: f64,
    /// Hierarchical reduction factors. Their product is the alignment
    /// granularity for the buffer capacity; this crate uses them for nothing
    /// else.
    #[serde(default = "default_reductions")]
    pub reductions: Vec<u32>,
    /// Input sampling frequency in Hz. Must equal the instrument rate.
    #[serde(default = "default_input_rate")]
    pub input_rate: u32,
    /// Output sampling frequency in Hz. Must be a supported rate.
    pub output_rate: u32,
}

impl StreamConfig {
    /// Config with the default input rate and reduction factors.
    pub fn new(duration: f64, output_rate: u32) -> Self {
        Self {
            duration,
            reductions: default_reductions(),
            input_rate: INPUT_RATE,
            output_rate,
        }
    }

    /// Loads a config from a TOML file.
    ///
    /// # Errors
    /// `StreamError::Config` on file or parse problems. The result is not
    /// yet validated; `StreamBuffer::new` validates on construction.
    pub fn from_file(path: &Path) -> StreamResult<Self> {
        let cfg = Config::builder()
            .add_source(config::File::from(path))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// Validates the parameters.
    ///
    /// # Errors
    /// - `UnsupportedInputRate` when `input_rate` differs from the fixed
    ///   instrument rate.
    /// - `UnsupportedOutputRate` when `output_rate` has no filter
    ///   configuration.
    /// - `Configuration` for a non-positive duration or zero reduction
    ///   factors.
    pub fn validate(&self) -> StreamResult<()> {
        if self.input_rate != INPUT_RATE {
            return Err(StreamError::UnsupportedInputRate(self.input_rate));
        }
        if !filter::is_supported_output_rate(self.output_rate) {
            return Err(StreamError::UnsupportedOutputRate(self.output_rate));
        }
        if self.duration.is_nan() || self.duration <= 0.0 {
            return Err(StreamError::Configuration(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if self.reductions.iter().any(|r| *r == 0) {
            return Err(StreamError::Configuration(
                "reduction factors must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Product of the reduction factors; the capacity alignment step.
    pub fn reduction_step(&self) -> u64 {
        self.reductions.iter().map(|r| u64::from(*r)).product::<u64>().max(1)
    }

    /// Buffer capacity in records: `duration * output_rate` rounded up to a
    /// whole number of reduction steps.
    pub fn capacity(&self) -> u64 {
        let records = (self.duration * f64::from(self.output_rate)).ceil() as u64;
        let records = records.max(1);
        let step = self.reduction_step();
        records.div_ceil(step) * step
    }

    /// Input samples per output record.
    pub fn downsample_m(&self) -> u64 {
        u64::from(self.input_rate / self.output_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn accepts_supported_rates() {
        assert!(StreamConfig::new(1.0, 1_000).validate().is_ok());
        assert!(StreamConfig::new(0.5, 100_000).validate().is_ok());
    }

    #[test]
    fn rejects_wrong_input_rate() {
        let mut config = StreamConfig::new(1.0, 1_000);
        config.input_rate = 1_000_000;
        assert!(matches!(
            config.validate(),
            Err(StreamError::UnsupportedInputRate(1_000_000))
        ));
    }

    #[test]
    fn rejects_unsupported_output_rate() {
        let config = StreamConfig::new(1.0, 48_000);
        assert!(matches!(
            config.validate(),
            Err(StreamError::UnsupportedOutputRate(48_000))
        ));
    }

    #[test]
    fn rejects_non_positive_duration() {
        assert!(StreamConfig::new(0.0, 1_000).validate().is_err());
        assert!(StreamConfig::new(-1.0, 1_000).validate().is_err());
        assert!(StreamConfig::new(f64::NAN, 1_000).validate().is_err());
    }

    #[test]
    fn rejects_zero_reduction_factor() {
        let mut config = StreamConfig::new(1.0, 1_000);
        config.reductions = vec![10, 0];
        assert!(matches!(
            config.validate(),
            Err(StreamError::Configuration(_))
        ));
    }

    #[test]
    fn capacity_aligns_to_reduction_step() {
        let mut config = StreamConfig::new(1.0, 1_000);
        assert_eq!(config.reduction_step(), 1_000);
        assert_eq!(config.capacity(), 1_000);

        // 1.5 s * 1000 Hz = 1500 records, rounded up to 2000.
        config.duration = 1.5;
        assert_eq!(config.capacity(), 2_000);

        config.reductions = vec![7];
        // 1500 -> next multiple of 7.
        assert_eq!(config.capacity(), 1_505);
    }

    #[test]
    fn capacity_is_at_least_one_step() {
        let mut config = StreamConfig::new(1e-6, 1_000);
        config.reductions = vec![50];
        assert_eq!(config.capacity(), 50);
    }

    #[test]
    fn loads_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "duration = 2.0\noutput_rate = 1000\nreductions = [20, 50]"
        )
        .unwrap();

        let config = StreamConfig::from_file(&path).unwrap();
        assert_eq!(config.duration, 2.0);
        assert_eq!(config.output_rate, 1_000);
        assert_eq!(config.input_rate, INPUT_RATE);
        assert_eq!(config.reduction_step(), 1_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "duration = [not toml").unwrap();
        assert!(matches!(
            StreamConfig::from_file(&path),
            Err(StreamError::Config(_))
        ));
    }
}
