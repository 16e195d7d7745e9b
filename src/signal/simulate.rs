//! Synthetic sessions for the demo mode and tests.
use std::fmt::Write;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[derive(Clone, Debug)]
pub struct SessionPlan {
    pub duration_sec: f64,
    pub rate_hz: f64,
    pub start_resistance_kohm: f64,
    /// `(time_sec, baseline)` normalisation events; the first applies from time zero.
    pub resets: Vec<(f64, f64)>,
    pub seed: u64,
}
impl Default for SessionPlan {
    fn default() -> Self {
        Self {
            duration_sec: 180.0,
            rate_hz: 10.0,
            start_resistance_kohm: 56.4,
            resets: vec![(0.0, 5.0), (60.0, 4.95), (120.0, 3.5)],
            seed: 7,
        }
    }
}
/// Renders the plan as a `Time (ms),Baseline,Resistance` export.
pub fn synthetic_csv(plan: &SessionPlan) -> String {
    let mut rng = StdRng::seed_from_u64(plan.seed);
    let mut out = String::from("Time (ms),Baseline,Resistance\n");
    let total = (plan.duration_sec * plan.rate_hz).floor() as usize;
    let mut resistance = plan.start_resistance_kohm;
    let mut drift = 0.0f64;
    for i in 0..=total {
        let t = i as f64 / plan.rate_hz;
        let baseline = plan
            .resets
            .iter()
            .filter(|(at, _)| *at <= t)
            .last()
            .map(|(_, b)| *b)
            .unwrap_or(5.0);
        drift = (drift + rng.gen_range(-0.002..0.002)).clamp(-0.02, 0.02);
        resistance = (resistance + drift + rng.gen_range(-0.01..0.01)).max(1.0);
        let _ = writeln!(out, "{:.0},{:.2},{:.2}", t * 1000.0, baseline, resistance);
    }
    out
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InferenceConfig;
    use crate::signal::parse::parse_bytes;
    #[test]
    fn synthetic_session_round_trips_through_the_parser() {
        let plan = SessionPlan::default();
        let csv = synthetic_csv(&plan);
        let result = parse_bytes(csv.as_bytes(), &InferenceConfig::default()).unwrap();
        assert_eq!(result.store.len(), 1801);
        assert_eq!(result.end_time, 180.0);
        assert!(result.has_baseline && result.has_resistance);
        assert_eq!(result.store.regime_starts().len(), 3);
        assert_eq!(result.sample_at(61.0).baseline, Some(4.95));
    }
    #[test]
    fn same_seed_same_session() {
        let plan = SessionPlan::default();
        assert_eq!(synthetic_csv(&plan), synthetic_csv(&plan));
    }
}
