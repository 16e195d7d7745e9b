//! Needle position of the dial.
//!
//! A baseline is a user-driven re-zero of the instrument. What matters after a re-zero is
//! how far resistance has drifted from the value it had when the current baseline took
//! effect, and the relation is inverse: falling resistance moves the needle up-scale.
use crate::config::GaugeConfig;
use crate::signal::store::{Sample, SampleStore};
/// Projects an (interpolated) sample onto the dial. Never fails and always returns a value
/// inside `[display_min, display_max]`:
/// - no baseline: the plain value;
/// - baseline but no resistance or no reference point: the baseline;
/// - both: `baseline + (resistance - reference) * scale_per_kohm`.
pub fn project(
    sample: &Sample,
    store: &SampleStore,
    has_baseline: bool,
    has_resistance: bool,
    config: &GaugeConfig,
) -> f64 {
    let baseline = match sample.baseline {
        Some(baseline) if has_baseline => baseline,
        _ => return config.clamp(sample.value),
    };
    if !has_resistance {
        return config.clamp(baseline);
    }
    let reference = reference_resistance(store, baseline, sample.time_sec);
    match (sample.resistance, reference) {
        (Some(resistance), Some(reference)) => {
            let delta = resistance - reference;
            config.clamp(baseline + delta * config.scale_per_kohm)
        }
        _ => config.clamp(baseline),
    }
}
/// Resistance at the onset of the most recent regime (at or before `t`) holding `baseline`.
///
/// Baseline may return to a value used earlier, so the latest onset is authoritative. If
/// that onset has no resistance reading, the first reading later in the same regime is
/// used. When no onset matches at all, any sample with the same baseline and a resistance
/// reading serves as the reference.
pub fn reference_resistance(store: &SampleStore, baseline: f64, t: f64) -> Option<f64> {
    let samples = store.samples();
    let starts = store.regime_starts();
    let visible = starts.partition_point(|&i| samples[i].time_sec <= t);
    let onset = starts[..visible]
        .iter()
        .rposition(|&i| samples[i].baseline == Some(baseline));
    if let Some(pos) = onset {
        let begin = starts[pos];
        let regime_end = starts.get(pos + 1).copied().unwrap_or(samples.len());
        let end = regime_end.min(store.count_at_or_before(t)).max(begin + 1);
        if let Some(r) = samples[begin..end].iter().find_map(|s| s.resistance) {
            return Some(r);
        }
    }
    samples
        .iter()
        .filter(|s| s.baseline == Some(baseline))
        .find_map(|s| s.resistance)
}
