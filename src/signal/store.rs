use std::ops::Range;
use log::debug;
use crate::signal::inference::TimeUnit;
use crate::signal::numeric::parse_number;
use crate::signal::{SignalError, Table};
/// How a field is reconstructed between two stored samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    /// Continuous quantity: blend linearly.
    Linear,
    /// Changes only at discrete events: hold the earlier sample's value.
    Step,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleField {
    Value,
    RawValue,
    Baseline,
    Resistance,
}
impl SampleField {
    pub const ALL: [SampleField; 4] = [
        SampleField::Value,
        SampleField::RawValue,
        SampleField::Baseline,
        SampleField::Resistance,
    ];
    pub fn interpolation(self) -> Interpolation {
        match self {
            SampleField::Baseline => Interpolation::Step,
            SampleField::Value | SampleField::RawValue | SampleField::Resistance => {
                Interpolation::Linear
            }
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub time_sec: f64,
    /// Primary signal after divisor scaling.
    pub value: f64,
    pub raw_value: f64,
    pub baseline: Option<f64>,
    /// kOhm, unscaled.
    pub resistance: Option<f64>,
}
impl Sample {
    pub fn get(&self, field: SampleField) -> Option<f64> {
        match field {
            SampleField::Value => Some(self.value),
            SampleField::RawValue => Some(self.raw_value),
            SampleField::Baseline => self.baseline,
            SampleField::Resistance => self.resistance,
        }
    }
    pub fn set(&mut self, field: SampleField, value: Option<f64>) {
        match field {
            SampleField::Value => self.value = value.unwrap_or(self.value),
            SampleField::RawValue => self.raw_value = value.unwrap_or(self.raw_value),
            SampleField::Baseline => self.baseline = value,
            SampleField::Resistance => self.resistance = value,
        }
    }
}
/// Which columns feed a [`SampleStore`] and how to scale them.
#[derive(Clone, Copy, Debug)]
pub struct ColumnMapping<'a> {
    pub time_field: &'a str,
    pub value_field: &'a str,
    pub divisor: f64,
    pub time_unit: TimeUnit,
    pub baseline_field: Option<&'a str>,
    pub resistance_field: Option<&'a str>,
}
/// Time-sorted, immutable samples plus the offsets where a baseline regime begins.
#[derive(Clone, Debug)]
pub struct SampleStore {
    samples: Vec<Sample>,
    regime_starts: Vec<usize>,
}
impl SampleStore {
    /// Sorts by time (stable, so equal timestamps keep row order) and indexes regimes.
    pub fn from_samples(mut samples: Vec<Sample>) -> Result<Self, SignalError> {
        if samples.is_empty() {
            return Err(SignalError::EmptyDataset);
        }
        samples.sort_by(|a, b| a.time_sec.total_cmp(&b.time_sec));
        let regime_starts = (0..samples.len())
            .filter(|&i| i == 0 || samples[i].baseline != samples[i - 1].baseline)
            .collect();
        Ok(Self {
            samples,
            regime_starts,
        })
    }
    /// Rows whose time or value does not parse are dropped; baseline and resistance are
    /// attached only where their own cell parses.
    pub fn build(table: &Table, mapping: &ColumnMapping<'_>) -> Result<Self, SignalError> {
        let column = |name: &str| {
            table
                .field_index(name)
                .ok_or_else(|| SignalError::Schema(format!("column {name:?} not found")))
        };
        let time_idx = column(mapping.time_field)?;
        let value_idx = column(mapping.value_field)?;
        let baseline_idx = mapping.baseline_field.map(column).transpose()?;
        let resistance_idx = mapping.resistance_field.map(column).transpose()?;
        let optional = |row: &[String], idx: Option<usize>| {
            idx.and_then(|i| parse_number(Table::cell(row, i)))
        };
        let samples: Vec<Sample> = table
            .rows
            .iter()
            .filter_map(|row| {
                let raw_time = parse_number(Table::cell(row, time_idx))?;
                let raw_value = parse_number(Table::cell(row, value_idx))?;
                Some(Sample {
                    time_sec: raw_time / mapping.time_unit.divisor(),
                    value: raw_value / mapping.divisor,
                    raw_value,
                    baseline: optional(row, baseline_idx),
                    resistance: optional(row, resistance_idx),
                })
            })
            .collect();
        debug!(
            "kept {} of {} rows for {:?}",
            samples.len(),
            table.rows.len(),
            mapping.value_field
        );
        Self::from_samples(samples)
    }
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn first(&self) -> &Sample {
        &self.samples[0]
    }
    pub fn last(&self) -> &Sample {
        &self.samples[self.samples.len() - 1]
    }
    pub fn start_time(&self) -> f64 {
        self.first().time_sec
    }
    pub fn end_time(&self) -> f64 {
        self.last().time_sec
    }
    pub fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }
    /// Offsets of the first sample of every baseline regime, ascending; always starts with 0.
    pub fn regime_starts(&self) -> &[usize] {
        &self.regime_starts
    }
    /// Indices of samples with `from <= time_sec <= to`.
    pub fn range_between(&self, from: f64, to: f64) -> Range<usize> {
        let start = self.samples.partition_point(|s| s.time_sec < from);
        let end = self.samples.partition_point(|s| s.time_sec <= to);
        start..end.max(start)
    }
    /// Number of samples with `time_sec <= t`.
    pub fn count_at_or_before(&self, t: f64) -> usize {
        self.samples.partition_point(|s| s.time_sec <= t)
    }
    pub fn has_baseline(&self) -> bool {
        self.samples.iter().any(|s| s.baseline.is_some())
    }
    pub fn has_resistance(&self) -> bool {
        self.samples.iter().any(|s| s.resistance.is_some())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn sample(t: f64, v: f64, baseline: Option<f64>, resistance: Option<f64>) -> Sample {
        Sample {
            time_sec: t,
            value: v,
            raw_value: v,
            baseline,
            resistance,
        }
    }
    fn mapping<'a>(baseline: Option<&'a str>, resistance: Option<&'a str>) -> ColumnMapping<'a> {
        ColumnMapping {
            time_field: "Time",
            value_field: "Value",
            divisor: 10.0,
            time_unit: TimeUnit::Milliseconds,
            baseline_field: baseline,
            resistance_field: resistance,
        }
    }
    #[test]
    fn build_scales_sorts_and_drops_bad_rows() {
        let table =
            Table::from_bytes(b"Time,Value,Baseline\n2000,40,5\n0,20,5\nx,30,5\n1000,,5\n").unwrap();
        let store = SampleStore::build(&table, &mapping(Some("Baseline"), None)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.first().time_sec, 0.0);
        assert_eq!(store.first().value, 2.0);
        assert_eq!(store.first().raw_value, 20.0);
        assert_eq!(store.last().time_sec, 2.0);
        assert_eq!(store.last().baseline, Some(5.0));
    }
    #[test]
    fn optional_fields_attach_only_when_they_parse() {
        let table =
            Table::from_bytes(b"Time,Value,Resistance\n0,20,56.4\n1000,21,\n").unwrap();
        let store = SampleStore::build(&table, &mapping(None, Some("Resistance"))).unwrap();
        assert_eq!(store.samples()[0].resistance, Some(56.4));
        assert_eq!(store.samples()[1].resistance, None);
        assert_eq!(store.samples()[1].baseline, None);
    }
    #[test]
    fn no_surviving_rows_is_an_empty_dataset() {
        let table = Table::from_bytes(b"Time,Value\nx,1\n2,y\n").unwrap();
        assert!(matches!(
            SampleStore::build(&table, &mapping(None, None)),
            Err(SignalError::EmptyDataset)
        ));
    }
    #[test]
    fn equal_timestamps_keep_row_order() {
        let store = SampleStore::from_samples(vec![
            sample(1.0, 3.0, None, None),
            sample(0.0, 1.0, None, None),
            sample(1.0, 4.0, None, None),
        ])
        .unwrap();
        let values: Vec<f64> = store.samples().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 3.0, 4.0]);
    }
    #[test]
    fn regime_starts_mark_every_baseline_change() {
        let store = SampleStore::from_samples(vec![
            sample(0.0, 0.0, Some(5.0), None),
            sample(1.0, 0.0, Some(5.0), None),
            sample(2.0, 0.0, Some(4.95), None),
            sample(3.0, 0.0, Some(4.95), None),
            sample(4.0, 0.0, Some(5.0), None),
        ])
        .unwrap();
        assert_eq!(store.regime_starts(), &[0, 2, 4]);
    }
    #[test]
    fn range_between_uses_inclusive_bounds() {
        let store = SampleStore::from_samples(
            (0..10).map(|i| sample(i as f64, 0.0, None, None)).collect(),
        )
        .unwrap();
        assert_eq!(store.range_between(2.0, 4.0), 2..5);
        assert_eq!(store.range_between(4.5, 4.6), 5..5);
        assert_eq!(store.count_at_or_before(3.0), 4);
    }
    #[test]
    fn only_baseline_is_step_valued() {
        for field in SampleField::ALL {
            let expected = if field == SampleField::Baseline {
                Interpolation::Step
            } else {
                Interpolation::Linear
            };
            assert_eq!(field.interpolation(), expected);
        }
    }
}
