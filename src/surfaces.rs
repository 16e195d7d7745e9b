//! Per-session view state shared by the overview chart, the detail chart and the gauge.
//!
//! Everything here is derived from one [`ParsedResult`] and rebuilt when a new file is
//! loaded. Per-frame work is limited to a binary-searched slice for the detail chart and
//! one interpolated query for the gauge, which is skipped while the cursor is unchanged.
use crate::config::{GaugeConfig, ViewConfig};
use crate::playback::{click_to_seek_target, time_to_pixel};
use crate::signal::{ParsedResult, Sample};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaugeReading {
    pub time_sec: f64,
    pub sample: Sample,
    /// Position on the gauge scale, already clamped.
    pub position: f64,
}

pub struct SessionView {
    result: ParsedResult,
    overview: Vec<[f64; 2]>,
    baseline_steps: Vec<[f64; 2]>,
    gauge_cache: Option<(GaugeConfig, GaugeReading)>,
}

impl SessionView {
    pub fn new(result: ParsedResult, view: &ViewConfig) -> Self {
        let overview = decimate(&result, view.overview_buckets);
        let baseline_steps = baseline_steps(&result);
        Self {
            result,
            overview,
            baseline_steps,
            gauge_cache: None,
        }
    }

    pub fn result(&self) -> &ParsedResult {
        &self.result
    }

    /// Min/max-decimated polyline of the whole session.
    pub fn overview_points(&self) -> &[[f64; 2]] {
        &self.overview
    }

    /// Step polyline of the baseline, in the primary signal's time axis. Empty without a
    /// baseline column.
    pub fn baseline_points(&self) -> &[[f64; 2]] {
        &self.baseline_steps
    }

    /// Time span of the detail chart centred on `t`, kept inside the session when the
    /// session is longer than the window.
    pub fn detail_bounds(&self, t: f64, window_sec: f64) -> (f64, f64) {
        let (start, end) = (self.result.start_time, self.result.end_time);
        let half = window_sec.max(0.0) / 2.0;
        if end - start <= window_sec {
            return (start, end);
        }
        let centre = t.clamp(start + half, end - half);
        (centre - half, centre + half)
    }

    pub fn detail_points(&self, t: f64, window_sec: f64) -> Vec<[f64; 2]> {
        let (from, to) = self.detail_bounds(t, window_sec);
        let samples = self.result.store.samples();
        samples[self.result.store.range_between(from, to)]
            .iter()
            .map(|s| [s.time_sec, s.value])
            .collect()
    }

    /// Gauge reading at `t`; recomputed only when the time or the gauge settings change.
    pub fn gauge_reading(&mut self, t: f64, config: &GaugeConfig) -> GaugeReading {
        if let Some((cached_config, reading)) = &self.gauge_cache {
            if reading.time_sec.to_bits() == t.to_bits() && cached_config == config {
                return *reading;
            }
        }
        let sample = self.result.sample_at(t);
        let reading = GaugeReading {
            time_sec: t,
            sample,
            position: self.result.gauge_position(&sample, config),
        };
        self.gauge_cache = Some((*config, reading));
        reading
    }

    /// Horizontal pixel of the cursor on a surface spanning the whole session.
    pub fn cursor_x(&self, t: f64, padding: f64, usable_width: f64) -> f64 {
        time_to_pixel(
            t,
            padding,
            usable_width,
            self.result.start_time,
            self.result.duration_sec(),
        )
    }

    pub fn click_target(&self, pixel_offset: f64, padding: f64, usable_width: f64) -> f64 {
        click_to_seek_target(
            pixel_offset,
            padding,
            usable_width,
            self.result.start_time,
            self.result.duration_sec(),
        )
    }
}

/// Keeps the lowest and highest value of each bucket, in time order, so spikes survive.
fn decimate(result: &ParsedResult, buckets: usize) -> Vec<[f64; 2]> {
    let samples = result.store.samples();
    if buckets == 0 || samples.len() <= buckets * 2 {
        return samples.iter().map(|s| [s.time_sec, s.value]).collect();
    }
    let mut points = Vec::with_capacity(buckets * 2);
    for b in 0..buckets {
        let lo = b * samples.len() / buckets;
        let hi = ((b + 1) * samples.len() / buckets).max(lo + 1);
        let chunk = &samples[lo..hi.min(samples.len())];
        let (mut min_i, mut max_i) = (0, 0);
        for (i, s) in chunk.iter().enumerate() {
            if s.value < chunk[min_i].value {
                min_i = i;
            }
            if s.value > chunk[max_i].value {
                max_i = i;
            }
        }
        let (first, second) = if min_i <= max_i { (min_i, max_i) } else { (max_i, min_i) };
        points.push([chunk[first].time_sec, chunk[first].value]);
        if second != first {
            points.push([chunk[second].time_sec, chunk[second].value]);
        }
    }
    points
}

fn baseline_steps(result: &ParsedResult) -> Vec<[f64; 2]> {
    if !result.has_baseline {
        return Vec::new();
    }
    let samples = result.store.samples();
    let starts = result.store.regime_starts();
    let mut points = Vec::with_capacity(starts.len() * 2);
    for (n, &idx) in starts.iter().enumerate() {
        let Some(baseline) = samples[idx].baseline else {
            continue;
        };
        let until = starts
            .get(n + 1)
            .map_or(result.end_time, |&next| samples[next].time_sec);
        points.push([samples[idx].time_sec, baseline]);
        points.push([until, baseline]);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InferenceConfig;
    use crate::signal::{parse_bytes, synthetic_csv, SessionPlan};

    fn demo_view() -> SessionView {
        let csv = synthetic_csv(&SessionPlan::default());
        let parsed = parse_bytes(csv.as_bytes(), &InferenceConfig::default()).unwrap();
        SessionView::new(parsed, &ViewConfig::default())
    }

    #[test]
    fn overview_is_bounded_and_keeps_extremes() {
        let view = demo_view();
        let points = view.overview_points();
        assert!(points.len() <= ViewConfig::default().overview_buckets * 2);
        let samples = view.result().store.samples();
        let max = samples.iter().map(|s| s.value).fold(f64::NEG_INFINITY, f64::max);
        let min = samples.iter().map(|s| s.value).fold(f64::INFINITY, f64::min);
        assert!(points.iter().any(|p| p[1] == max));
        assert!(points.iter().any(|p| p[1] == min));
        assert!(points.windows(2).all(|w| w[0][0] <= w[1][0]));
    }

    #[test]
    fn detail_window_follows_cursor_inside_session() {
        let view = demo_view();
        let start = view.result().start_time;
        let end = view.result().end_time;
        assert_eq!(view.detail_bounds(start, 30.0), (start, start + 30.0));
        assert_eq!(view.detail_bounds(end, 30.0), (end - 30.0, end));
        let (from, to) = view.detail_bounds(90.0, 30.0);
        assert!((from - 75.0).abs() < 1e-9 && (to - 105.0).abs() < 1e-9);
        let points = view.detail_points(90.0, 30.0);
        assert!(!points.is_empty());
        assert!(points.iter().all(|p| p[0] >= from && p[0] <= to));
    }

    #[test]
    fn short_session_shows_everything() {
        let parsed = parse_bytes(
            b"Time,Resistance\n0,50\n0.5,51\n1.0,52\n",
            &InferenceConfig::default(),
        )
        .unwrap();
        let view = SessionView::new(parsed, &ViewConfig::default());
        assert_eq!(view.detail_bounds(0.5, 30.0), (0.0, 1.0));
        assert_eq!(view.detail_points(0.5, 30.0).len(), 3);
        assert!(view.baseline_points().is_empty());
    }

    #[test]
    fn gauge_reading_is_reused_for_the_same_time() {
        let mut view = demo_view();
        let config = GaugeConfig::default();
        let a = view.gauge_reading(42.0, &config);
        let b = view.gauge_reading(42.0, &config);
        assert_eq!(a, b);
        let c = view.gauge_reading(43.0, &config);
        assert_eq!(c.time_sec, 43.0);
        assert!(c.position >= config.display_min && c.position <= config.display_max);
    }

    #[test]
    fn baseline_steps_cover_each_regime() {
        let view = demo_view();
        let steps = view.baseline_points();
        assert_eq!(steps.len(), view.result().store.regime_starts().len() * 2);
        assert_eq!(steps[0][1], 5.0);
        assert_eq!(steps.last().map(|p| p[0]), Some(view.result().end_time));
    }

    #[test]
    fn cursor_pixel_and_click_are_inverse() {
        let view = demo_view();
        let x = view.cursor_x(60.0, 10.0, 500.0);
        let back = view.click_target(x, 10.0, 500.0);
        assert!((back - 60.0).abs() < 1e-9);
    }
}
