//! Picks the time column and the signal column of an arbitrary export.
//!
//! Device exports do not agree on column names or units ("GSR in kOhm", a normalised
//! baseline between 1 and 6.5, raw ADC counts...), so the value column is chosen by a
//! scoring heuristic instead of user configuration. Each candidate gets a power-of-ten
//! divisor that brings its median into a legible range, then it is scored on how much of
//! it falls inside the display band, how much it moves, and how well its name matches.
use log::debug;
use crate::config::InferenceConfig;
use crate::signal::numeric::{median, parse_number};
use crate::signal::{SignalError, Table};
/// Name patterns in descending preference with their score bonus.
pub const VALUE_PATTERNS: [(&str, f64); 5] = [
    ("baseline", 0.4),
    ("resistance", 0.25),
    ("conductance", 0.2),
    ("data", 0.15),
    ("value", 0.1),
];
/// Bonus for a candidate whose name matches no pattern.
pub const UNMATCHED_BONUS: f64 = 0.05;
const RANGE_WEIGHT: f64 = 0.6;
const SPREAD_WEIGHT: f64 = 0.25;
const FLAT_PENALTY: f64 = -0.2;
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnChoice {
    pub time_field: String,
    pub value_field: String,
    pub divisor: f64,
    pub observed_min: f64,
    pub observed_max: f64,
}
/// Score breakdown for one candidate column, kept for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateScore {
    pub field: String,
    pub divisor: f64,
    pub score: f64,
    pub parsed: usize,
    pub scaled_min: f64,
    pub scaled_max: f64,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
}
impl TimeUnit {
    /// Divide raw time values by this to get seconds.
    pub fn divisor(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Milliseconds => 1000.0,
        }
    }
}
pub fn infer(table: &Table, config: &InferenceConfig) -> Result<ColumnChoice, SignalError> {
    let time_idx = time_column(table)?;
    let scores = score_candidates(table, time_idx, config);
    let mut best: Option<&CandidateScore> = None;
    for candidate in &scores {
        debug!(
            "candidate {:?}: score {:.3}, divisor {}, {} values",
            candidate.field, candidate.score, candidate.divisor, candidate.parsed
        );
        if best.map_or(true, |b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }
    let best = best.ok_or(SignalError::NoNumericColumn)?;
    Ok(ColumnChoice {
        time_field: table.fields[time_idx].clone(),
        value_field: best.field.clone(),
        divisor: best.divisor,
        observed_min: best.scaled_min,
        observed_max: best.scaled_max,
    })
}
/// First header whose name contains "time", case-insensitively.
pub fn time_column(table: &Table) -> Result<usize, SignalError> {
    table
        .find_field("time")
        .ok_or_else(|| SignalError::Schema("no time-like column in header".into()))
}
/// Scores every candidate column that has at least one parseable value, in header order.
pub fn score_candidates(
    table: &Table,
    time_idx: usize,
    config: &InferenceConfig,
) -> Vec<CandidateScore> {
    let tagged: Vec<(usize, Option<f64>)> = table
        .fields
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != time_idx)
        .map(|(idx, name)| (idx, pattern_bonus(name)))
        .collect();
    let any_matched = tagged.iter().any(|(_, bonus)| bonus.is_some());
    tagged
        .into_iter()
        .filter(|(_, bonus)| !any_matched || bonus.is_some())
        .filter_map(|(idx, bonus)| {
            let values: Vec<f64> = table
                .rows
                .iter()
                .filter_map(|row| parse_number(Table::cell(row, idx)))
                .collect();
            score_column(
                &table.fields[idx],
                &values,
                bonus.unwrap_or(UNMATCHED_BONUS),
                config,
            )
        })
        .collect()
}
fn pattern_bonus(name: &str) -> Option<f64> {
    let lower = name.to_lowercase();
    VALUE_PATTERNS
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, bonus)| *bonus)
}
fn score_column(
    field: &str,
    values: &[f64],
    bonus: f64,
    config: &InferenceConfig,
) -> Option<CandidateScore> {
    let mid = median(values)?;
    let divisor = divisor_for(mid, config);
    let scaled: Vec<f64> = values.iter().map(|v| v / divisor).collect();
    let in_range = scaled
        .iter()
        .filter(|v| **v >= config.in_range_min && **v <= config.in_range_max)
        .count() as f64
        / scaled.len() as f64;
    let lo = scaled.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = hi - lo;
    let spread_score = if spread == 0.0 {
        FLAT_PENALTY
    } else {
        SPREAD_WEIGHT * (spread / config.spread_norm).min(1.0)
    };
    Some(CandidateScore {
        field: field.to_owned(),
        divisor,
        score: RANGE_WEIGHT * in_range + spread_score + bonus,
        parsed: values.len(),
        scaled_min: lo,
        scaled_max: hi,
    })
}
/// Power of ten that brings `median` to at most `target_median`, capped at `max_divisions`.
pub fn divisor_for(median: f64, config: &InferenceConfig) -> f64 {
    let mut scaled = median;
    let mut divisor = 1.0;
    for _ in 0..config.max_divisions {
        if scaled <= config.target_median {
            break;
        }
        scaled /= 10.0;
        divisor *= 10.0;
    }
    divisor
}
/// Header naming ("ms") wins; otherwise a mean step of at least one raw unit means milliseconds.
pub fn infer_time_unit(field_name: &str, raw_times: &[f64]) -> TimeUnit {
    if field_name.to_lowercase().contains("ms") {
        return TimeUnit::Milliseconds;
    }
    if raw_times.len() < 2 {
        return TimeUnit::Seconds;
    }
    let total: f64 = raw_times.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    let mean_step = total / (raw_times.len() - 1) as f64;
    if mean_step >= 1.0 {
        TimeUnit::Milliseconds
    } else {
        TimeUnit::Seconds
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn table(csv: &str) -> Table {
        Table::from_bytes(csv.as_bytes()).unwrap()
    }
    #[test]
    fn baseline_beats_resistance_in_a_normalized_export() {
        let t = table(
            "Time,Baseline,Resistance\n\
             0,5.0,56.40\n100,5.0,56.22\n200,4.95,56.06\n300,3.1,52.0\n400,1.2,50.5\n500,6.5,59.8\n",
        );
        let choice = infer(&t, &InferenceConfig::default()).unwrap();
        assert_eq!(choice.time_field, "Time");
        assert_eq!(choice.value_field, "Baseline");
        assert_eq!(choice.divisor, 1.0);
        assert_eq!(choice.observed_min, 1.2);
        assert_eq!(choice.observed_max, 6.5);
    }
    #[test]
    fn flat_baseline_loses_to_moving_resistance() {
        let t = table("Time,Baseline,Resistance\n0,5,56.4\n1,5,52.0\n2,5,58.1\n");
        let choice = infer(&t, &InferenceConfig::default()).unwrap();
        assert_eq!(choice.value_field, "Resistance");
        assert_eq!(choice.divisor, 10.0);
    }
    #[test]
    fn unmatched_headers_fall_back_to_every_numeric_column() {
        let t = table("timestamp,label,gsr\n0,a,1200\n1,b,1500\n2,c,900\n");
        let choice = infer(&t, &InferenceConfig::default()).unwrap();
        assert_eq!(choice.value_field, "gsr");
        assert_eq!(choice.divisor, 100.0);
    }
    #[test]
    fn pattern_matched_columns_exclude_the_rest() {
        let t = table("Time,Other,Data\n0,3,900\n1,4,950\n2,5,990\n");
        let scores = score_candidates(&t, 0, &InferenceConfig::default());
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].field, "Data");
    }
    #[test]
    fn missing_time_column_is_a_schema_error() {
        let t = table("Clock,Value\n0,1\n");
        assert!(matches!(
            infer(&t, &InferenceConfig::default()),
            Err(SignalError::Schema(_))
        ));
    }
    #[test]
    fn no_parseable_values_is_reported() {
        let t = table("Time,Value\n0,n/a\n1,-\n");
        assert!(matches!(
            infer(&t, &InferenceConfig::default()),
            Err(SignalError::NoNumericColumn)
        ));
    }
    #[test]
    fn divisor_stops_after_max_divisions() {
        let config = InferenceConfig::default();
        assert_eq!(divisor_for(12.0, &config), 1.0);
        assert_eq!(divisor_for(150.0, &config), 10.0);
        assert_eq!(divisor_for(1.0e12, &config), 1.0e6);
    }
    #[test]
    fn ties_keep_the_first_column() {
        let t = table("Time,Value A,Value B\n0,2,2\n1,4,4\n");
        let choice = infer(&t, &InferenceConfig::default()).unwrap();
        assert_eq!(choice.value_field, "Value A");
    }
    #[test]
    fn time_unit_from_header_or_cadence() {
        assert_eq!(infer_time_unit("Time (ms)", &[0.0, 0.1]), TimeUnit::Milliseconds);
        assert_eq!(infer_time_unit("Time", &[0.0, 0.25, 0.5]), TimeUnit::Seconds);
        assert_eq!(infer_time_unit("Time", &[0.0, 250.0, 500.0]), TimeUnit::Milliseconds);
        assert_eq!(infer_time_unit("Time", &[3.0]), TimeUnit::Seconds);
    }
}
