use crate::signal::store::{Interpolation, Sample, SampleField, SampleStore};
/// Reconstructs the sample at an arbitrary time.
///
/// Times outside the session return the boundary sample untouched. Inside, the bracketing
/// pair is found by binary search and each field is rebuilt according to its
/// [`Interpolation`]: continuous fields blend linearly, the baseline holds the earlier
/// sample's value. A field present on only one side of the bracket takes that side's value.
pub fn sample_at(store: &SampleStore, t: f64) -> Sample {
    let first = store.first();
    let last = store.last();
    if t.is_nan() || t < first.time_sec {
        return *first;
    }
    if t >= last.time_sec {
        return *last;
    }
    let samples = store.samples();
    let (lo, hi) = bracket(samples, t);
    if lo == hi {
        return samples[lo];
    }
    let lower = &samples[lo];
    let upper = &samples[hi];
    let span = upper.time_sec - lower.time_sec;
    let ratio = if span > 0.0 {
        ((t - lower.time_sec) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut out = Sample {
        time_sec: t,
        ..*lower
    };
    for field in SampleField::ALL {
        out.set(field, blend(field, lower, upper, ratio));
    }
    out
}
/// Indices `(lower, upper)` with `lower.time_sec <= t <= upper.time_sec`. Equal when a
/// sample sits exactly at `t`. With duplicate timestamps the last duplicate in file order
/// wins, including at the first and last time of the session. `t` must lie within the
/// session.
pub fn bracket(samples: &[Sample], t: f64) -> (usize, usize) {
    let after = samples.partition_point(|s| s.time_sec <= t);
    let lower = after.saturating_sub(1);
    if samples[lower].time_sec == t || after >= samples.len() {
        (lower, lower)
    } else {
        (lower, after)
    }
}
fn blend(field: SampleField, lower: &Sample, upper: &Sample, ratio: f64) -> Option<f64> {
    let (a, b) = (lower.get(field), upper.get(field));
    match field.interpolation() {
        Interpolation::Step => a.or(b),
        Interpolation::Linear => match (a, b) {
            (Some(a), Some(b)) => Some(a + (b - a) * ratio),
            (a, b) => a.or(b),
        },
    }
}
