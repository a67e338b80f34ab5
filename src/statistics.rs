//! Per-field summary statistics for range queries.
//!
//! A range query returns one `StatsRow` per output row: an array of
//! `FieldStats`, one per record field. `FieldStats` is a generic running
//! accumulator (Welford's online algorithm) so a future windowed-aggregation
//! path can fold many records into one row; the direct-copy path only uses
//! the `single` and `invalid` constructors.

use crate::record::DecimatedRecord;
use serde::{Deserialize, Serialize};

/// Number of statistics fields per output row.
pub const FIELD_COUNT: usize = 6;

/// The fixed field set of a statistics row, in row order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    /// Decimated current, amperes.
    Current,
    /// Decimated voltage, volts.
    Voltage,
    /// Decimated power, watts.
    Power,
    /// Current range metric.
    CurrentRange,
    /// Current LSB metric.
    CurrentLsb,
    /// Voltage LSB metric.
    VoltageLsb,
}

impl Field {
    /// All fields in row order.
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Current,
        Field::Voltage,
        Field::Power,
        Field::CurrentRange,
        Field::CurrentLsb,
        Field::VoltageLsb,
    ];

    /// Column index of this field within a `StatsRow`.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Running summary statistics for one field of one output row.
///
/// `count == 0` marks an invalid row (outside retained history); all float
/// fields are NaN in that case. A single-record row has `count == 1`,
/// `mean` equal to the stored value, zero variance term, and unset (NaN)
/// min/max.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FieldStats {
    /// Number of records folded into this entry.
    pub count: u64,
    /// Welford running variance term (sum of squared deviations).
    pub m2: f64,
    /// Minimum observed value.
    pub min: f64,
    /// Maximum observed value.
    pub max: f64,
    /// Running mean.
    pub mean: f64,
}

impl Default for FieldStats {
    fn default() -> Self {
        Self::invalid()
    }
}

impl FieldStats {
    /// An invalid entry: no contributing records, all fields NaN.
    pub fn invalid() -> Self {
        Self {
            count: 0,
            m2: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
        }
    }

    /// A single-record entry with `mean` set to the stored value.
    pub fn single(value: f64) -> Self {
        Self {
            count: 1,
            m2: 0.0,
            min: f64::NAN,
            max: f64::NAN,
            mean: value,
        }
    }

    /// An empty accumulator ready for `update`.
    pub fn accumulator() -> Self {
        Self {
            count: 0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.0,
        }
    }

    /// Whether at least one record contributed to this entry.
    pub fn is_valid(&self) -> bool {
        self.count > 0
    }

    /// Folds one value into the accumulator (Welford update).
    pub fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Merges another accumulator into this one (Chan parallel combine).
    pub fn merge(&mut self, other: &FieldStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        self.mean += delta * other.count as f64 / total as f64;
        self.m2 += other.m2 + delta * delta * (self.count as f64 * other.count as f64) / total as f64;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count = total;
    }

    /// Population variance, or NaN when no records contributed.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.m2 / self.count as f64
        }
    }
}

/// One output row: per-field statistics in `Field::ALL` order.
pub type StatsRow = [FieldStats; FIELD_COUNT];

/// An invalid row (every field `FieldStats::invalid`).
pub fn invalid_row() -> StatsRow {
    [FieldStats::invalid(); FIELD_COUNT]
}

/// Packages one stored record as a single-sample row.
pub fn record_row(record: &DecimatedRecord) -> StatsRow {
    [
        FieldStats::single(f64::from(record.current)),
        FieldStats::single(f64::from(record.voltage)),
        FieldStats::single(f64::from(record.power)),
        FieldStats::single(f64::from(record.current_range)),
        FieldStats::single(f64::from(record.current_lsb)),
        FieldStats::single(f64::from(record.voltage_lsb)),
    ]
}

/// The table returned by a range query: `rows x FIELD_COUNT` statistics.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsTable {
    /// Output rows, oldest first.
    pub rows: Vec<StatsRow>,
}

impl StatsTable {
    /// A table of `rows` invalid-filled rows.
    pub fn with_invalid_rows(rows: usize) -> Self {
        Self {
            rows: vec![invalid_row(); rows],
        }
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convenience accessor for one field of one row.
    pub fn field(&self, row: usize, field: Field) -> &FieldStats {
        &self.rows[row][field.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_entry_matches_direct_copy_contract() {
        let s = FieldStats::single(5.0);
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, 5.0);
        assert_eq!(s.m2, 0.0);
        assert!(s.min.is_nan());
        assert!(s.max.is_nan());
        assert!(s.is_valid());
    }

    #[test]
    fn invalid_entry_is_all_nan() {
        let s = FieldStats::invalid();
        assert_eq!(s.count, 0);
        assert!(!s.is_valid());
        assert!(s.mean.is_nan());
        assert!(s.min.is_nan());
        assert!(s.max.is_nan());
        assert!(s.variance().is_nan());
    }

    #[test]
    fn welford_matches_naive_statistics() {
        let values = [1.0, 2.0, 4.0, 8.0, 16.0, -3.0];
        let mut acc = FieldStats::accumulator();
        for v in values {
            acc.update(v);
        }
        let naive_mean = values.iter().sum::<f64>() / values.len() as f64;
        let naive_var = values
            .iter()
            .map(|v| (v - naive_mean) * (v - naive_mean))
            .sum::<f64>()
            / values.len() as f64;
        assert!((acc.mean - naive_mean).abs() < 1e-12);
        assert!((acc.variance() - naive_var).abs() < 1e-12);
        assert_eq!(acc.min, -3.0);
        assert_eq!(acc.max, 16.0);
        assert_eq!(acc.count, values.len() as u64);
    }

    #[test]
    fn merge_equals_sequential_update() {
        let values = [0.5, 1.5, 2.5, 3.5, 10.0, -10.0, 7.0];
        let (left, right) = values.split_at(3);

        let mut a = FieldStats::accumulator();
        for v in left {
            a.update(*v);
        }
        let mut b = FieldStats::accumulator();
        for v in right {
            b.update(*v);
        }
        a.merge(&b);

        let mut sequential = FieldStats::accumulator();
        for v in values {
            sequential.update(v);
        }
        assert_eq!(a.count, sequential.count);
        assert!((a.mean - sequential.mean).abs() < 1e-12);
        assert!((a.m2 - sequential.m2).abs() < 1e-9);
        assert_eq!(a.min, sequential.min);
        assert_eq!(a.max, sequential.max);
    }

    #[test]
    fn record_row_maps_fields_in_order() {
        let record = DecimatedRecord {
            current: 1.0,
            voltage: 5.0,
            power: 5.0,
            current_range: 48,
            current_lsb: 255,
            voltage_lsb: 0,
            reserved: 0,
        };
        let row = record_row(&record);
        assert_eq!(row[Field::Current.index()].mean, 1.0);
        assert_eq!(row[Field::Voltage.index()].mean, 5.0);
        assert_eq!(row[Field::Power.index()].mean, 5.0);
        assert_eq!(row[Field::CurrentRange.index()].mean, 48.0);
        assert_eq!(row[Field::CurrentLsb.index()].mean, 255.0);
        assert_eq!(row[Field::VoltageLsb.index()].mean, 0.0);
    }
}
