//! Event markers produced by the analysis service.
//!
//! The service detects arousal events and summarises what was said around them; this
//! module only consumes its report so the views can mark events and jump between them.
use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;
/// "Previous" skips an event the cursor is within this many seconds after.
pub const PREVIOUS_EVENT_GRACE_SEC: f64 = 0.5;
#[derive(Debug, Error)]
pub enum EventsError {
    #[error("failed to read analysis report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse analysis report: {0}")]
    Json(#[from] serde_json::Error),
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventMarker {
    pub event_id: String,
    pub time_sec: f64,
    pub rule: String,
    #[serde(default)]
    pub delta_kohm: Option<f64>,
    #[serde(default)]
    pub delta_z: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub transcript_excerpt: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamMetadata {
    pub sampling_rate_hz: f64,
    pub duration_sec: f64,
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub events: Vec<EventMarker>,
    #[serde(default)]
    pub gsr_metadata: Option<StreamMetadata>,
    #[serde(default)]
    pub audio_metadata: Option<StreamMetadata>,
}
/// Markers sorted by time.
#[derive(Clone, Debug, Default)]
pub struct EventTimeline {
    markers: Vec<EventMarker>,
}
impl EventTimeline {
    pub fn new(mut markers: Vec<EventMarker>) -> Self {
        markers.retain(|m| m.time_sec.is_finite());
        markers.sort_by(|a, b| a.time_sec.total_cmp(&b.time_sec));
        Self { markers }
    }
    pub fn from_json_str(text: &str) -> Result<Self, EventsError> {
        let report: AnalysisReport = serde_json::from_str(text)?;
        Ok(Self::new(report.events))
    }
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EventsError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
    pub fn markers(&self) -> &[EventMarker] {
        &self.markers
    }
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
    pub fn times(&self) -> Vec<f64> {
        self.markers.iter().map(|m| m.time_sec).collect()
    }
    /// First event strictly after `t`.
    pub fn next_event(&self, t: f64) -> Option<f64> {
        let idx = self.markers.partition_point(|m| m.time_sec <= t);
        self.markers.get(idx).map(|m| m.time_sec)
    }
    /// Last event before `t`, skipping one the cursor has only just passed.
    pub fn previous_event(&self, t: f64) -> Option<f64> {
        let idx = self
            .markers
            .partition_point(|m| m.time_sec < t - PREVIOUS_EVENT_GRACE_SEC);
        idx.checked_sub(1).map(|i| self.markers[i].time_sec)
    }
    /// Most recent event within `window` seconds before or at `t`.
    pub fn active_at(&self, t: f64, window: f64) -> Option<&EventMarker> {
        let idx = self.markers.partition_point(|m| m.time_sec <= t);
        idx.checked_sub(1)
            .map(|i| &self.markers[i])
            .filter(|m| t - m.time_sec <= window)
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscribedWord {
    pub text: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
}
/// Words starting within `[event_time - pre_window, event_time + post_window]` whose
/// confidence (when known) reaches `min_confidence`.
pub fn align_transcript<'a>(
    words: impl IntoIterator<Item = &'a TranscribedWord>,
    event_time: f64,
    pre_window: f64,
    post_window: f64,
    min_confidence: f64,
) -> Vec<&'a TranscribedWord> {
    let start = event_time - pre_window;
    let end = event_time + post_window;
    words
        .into_iter()
        .filter(|w| w.confidence.map_or(true, |c| c >= min_confidence))
        .filter(|w| w.start.map_or(false, |s| s >= start && s <= end))
        .collect()
}
