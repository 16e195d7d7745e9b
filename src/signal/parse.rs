use std::path::Path;
use log::info;
use crate::config::{GaugeConfig, InferenceConfig};
use crate::signal::gauge::project;
use crate::signal::inference::{infer, infer_time_unit, TimeUnit};
use crate::signal::numeric::parse_number;
use crate::signal::query::sample_at;
use crate::signal::store::{ColumnMapping, Sample, SampleStore};
use crate::signal::{SignalError, Table};
/// Everything the views need from one uploaded export. Built once per file and replaced
/// wholesale when another file is loaded.
#[derive(Clone, Debug)]
pub struct ParsedResult {
    pub store: SampleStore,
    /// Inverse of the mean inter-sample interval; `None` with fewer than two samples.
    pub sampling_rate_hz: Option<f64>,
    pub time_field: String,
    pub time_unit: TimeUnit,
    pub value_field: String,
    pub divisor: f64,
    pub value_min: f64,
    pub value_max: f64,
    pub start_time: f64,
    pub end_time: f64,
    pub baseline_field: Option<String>,
    pub resistance_field: Option<String>,
    pub has_baseline: bool,
    pub has_resistance: bool,
    /// Rows that did not yield a sample.
    pub dropped_rows: usize,
}
impl ParsedResult {
    pub fn duration_sec(&self) -> f64 {
        self.end_time - self.start_time
    }
    pub fn sample_at(&self, t: f64) -> Sample {
        sample_at(&self.store, t)
    }
    pub fn gauge_position(&self, sample: &Sample, config: &GaugeConfig) -> f64 {
        project(
            sample,
            &self.store,
            self.has_baseline,
            self.has_resistance,
            config,
        )
    }
}
pub fn parse_path(path: impl AsRef<Path>, config: &InferenceConfig) -> Result<ParsedResult, SignalError> {
    let table = Table::from_path(path)?;
    parse_table(&table, config)
}
pub fn parse_bytes(bytes: &[u8], config: &InferenceConfig) -> Result<ParsedResult, SignalError> {
    let table = Table::from_bytes(bytes)?;
    parse_table(&table, config)
}
pub fn parse_table(table: &Table, config: &InferenceConfig) -> Result<ParsedResult, SignalError> {
    let choice = infer(table, config)?;
    let time_idx = table
        .field_index(&choice.time_field)
        .ok_or_else(|| SignalError::Schema("time column disappeared".into()))?;
    let raw_times: Vec<f64> = table
        .rows
        .iter()
        .filter_map(|row| parse_number(Table::cell(row, time_idx)))
        .collect();
    let time_unit = infer_time_unit(&choice.time_field, &raw_times);
    let baseline_field = table.find_field("baseline").map(|i| table.fields[i].clone());
    let resistance_field = table
        .find_field("resistance")
        .map(|i| table.fields[i].clone());
    let store = SampleStore::build(
        table,
        &ColumnMapping {
            time_field: &choice.time_field,
            value_field: &choice.value_field,
            divisor: choice.divisor,
            time_unit,
            baseline_field: baseline_field.as_deref(),
            resistance_field: resistance_field.as_deref(),
        },
    )?;
    let (value_min, value_max) = store
        .samples()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.value), hi.max(s.value))
        });
    let sampling_rate_hz = sampling_rate(&store);
    let has_baseline = baseline_field.is_some() && store.has_baseline();
    let has_resistance = resistance_field.is_some() && store.has_resistance();
    info!(
        "parsed {} samples: value={:?} divisor={} time={:?} ({:?}) rate={:?} baseline={} resistance={}",
        store.len(),
        choice.value_field,
        choice.divisor,
        choice.time_field,
        time_unit,
        sampling_rate_hz,
        has_baseline,
        has_resistance
    );
    Ok(ParsedResult {
        sampling_rate_hz,
        time_field: choice.time_field,
        time_unit,
        value_field: choice.value_field,
        divisor: choice.divisor,
        value_min,
        value_max,
        start_time: store.start_time(),
        end_time: store.end_time(),
        baseline_field,
        resistance_field,
        has_baseline,
        has_resistance,
        dropped_rows: table.rows.len() - store.len(),
        store,
    })
}
/// Mean successive interval of the sorted samples, inverted.
pub fn sampling_rate(store: &SampleStore) -> Option<f64> {
    if store.len() < 2 {
        return None;
    }
    let mean_interval = store.duration() / (store.len() - 1) as f64;
    (mean_interval > 0.0).then(|| 1.0 / mean_interval)
}
#[cfg(test)]
mod tests {
    use super::*;
    const EXPORT: &str = "Time (ms),Baseline,Resistance\n\
        0,5.00,56.40\n\
        250,5.00,56.30\n\
        500,5.00,56.22\n\
        750,n/a,56.20\n\
        1000,4.95,56.06\n\
        1250,4.95,55.90\n\
        oops,4.95,55.80\n\
        1500,1.50,58.00\n";
    #[test]
    fn parses_a_normalized_export() {
        let result = parse_bytes(EXPORT.as_bytes(), &InferenceConfig::default()).unwrap();
        assert_eq!(result.value_field, "Baseline");
        assert_eq!(result.divisor, 1.0);
        assert_eq!(result.time_unit, TimeUnit::Milliseconds);
        assert_eq!(result.store.len(), 6);
        assert_eq!(result.dropped_rows, 2);
        assert_eq!(result.start_time, 0.0);
        assert_eq!(result.end_time, 1.5);
        assert_eq!(result.value_min, 1.5);
        assert_eq!(result.value_max, 5.0);
        assert!((result.sampling_rate_hz.unwrap() - 3.333_333_333).abs() < 1e-6);
        assert_eq!(result.baseline_field.as_deref(), Some("Baseline"));
        assert_eq!(result.resistance_field.as_deref(), Some("Resistance"));
        assert!(result.has_baseline && result.has_resistance);
    }
    #[test]
    fn gauge_through_the_parsed_result() {
        let result = parse_bytes(EXPORT.as_bytes(), &InferenceConfig::default()).unwrap();
        let config = GaugeConfig::default();
        let at_onset = result.sample_at(1.0);
        assert_eq!(result.gauge_position(&at_onset, &config), 4.95);
        let later = result.sample_at(1.25);
        assert!((result.gauge_position(&later, &config) - 5.03).abs() < 1e-9);
    }
    #[test]
    fn single_sample_has_no_rate() {
        let result =
            parse_bytes(b"Time,Value\n3,4\n", &InferenceConfig::default()).unwrap();
        assert_eq!(result.sampling_rate_hz, None);
        assert_eq!(result.duration_sec(), 0.0);
        assert!(!result.has_baseline);
    }
    #[test]
    fn failures_surface_their_category() {
        let config = InferenceConfig::default();
        assert!(matches!(
            parse_bytes(b"Clock,Value\n1,2\n", &config),
            Err(SignalError::Schema(_))
        ));
        assert!(matches!(
            parse_bytes(b"Time,Value\n1,x\n", &config),
            Err(SignalError::NoNumericColumn)
        ));
        assert!(matches!(
            parse_bytes(b"Time,Value\nx,2\n", &config),
            Err(SignalError::EmptyDataset)
        ));
    }
    #[test]
    fn parses_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.csv");
        std::fs::write(&path, EXPORT).unwrap();
        let result = parse_path(&path, &InferenceConfig::default()).unwrap();
        assert_eq!(result.store.len(), 6);
    }
}
