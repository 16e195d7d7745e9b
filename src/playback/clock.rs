use std::time::Instant;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("playback was rejected: {0}")]
    PlayRejected(String),
    #[error("audio device unavailable: {0}")]
    Device(String),
    #[error("failed to decode audio: {0}")]
    Decode(String),
}
/// External time source the views are locked to (normally the audio player).
pub trait PlaybackClock {
    /// Current media time in seconds.
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn play(&mut self) -> Result<(), ClockError>;
    fn pause(&mut self);
    fn seek(&mut self, time_sec: f64);
    fn has_ended(&self) -> bool {
        self.current_time() >= self.duration()
    }
}
/// Silent wall-clock transport, used when no audio file is loaded.
#[derive(Debug)]
pub struct TransportClock {
    duration: f64,
    offset: f64,
    started_at: Option<Instant>,
}
impl TransportClock {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            offset: 0.0,
            started_at: None,
        }
    }
}
impl PlaybackClock for TransportClock {
    fn current_time(&self) -> f64 {
        let elapsed = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        (self.offset + elapsed).min(self.duration)
    }
    fn duration(&self) -> f64 {
        self.duration
    }
    fn play(&mut self) -> Result<(), ClockError> {
        if self.duration <= 0.0 {
            return Err(ClockError::PlayRejected("nothing to play".into()));
        }
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
        Ok(())
    }
    fn pause(&mut self) {
        self.offset = self.current_time();
        self.started_at = None;
    }
    fn seek(&mut self, time_sec: f64) {
        self.offset = time_sec.clamp(0.0, self.duration);
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
    }
}
/// Deterministic clock driven by hand. Useful for tests and scripted playback.
#[derive(Debug, Default)]
pub struct ManualClock {
    time: f64,
    duration: f64,
    playing: bool,
    reject_play: Option<String>,
    seeks: Vec<f64>,
}
impl ManualClock {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }
    /// Makes every following `play` call fail with `reason`.
    pub fn reject_play(&mut self, reason: impl Into<String>) {
        self.reject_play = Some(reason.into());
    }
    /// Moves time forward while playing, stopping at the end.
    pub fn advance(&mut self, seconds: f64) {
        if self.playing {
            self.time = (self.time + seconds).min(self.duration);
        }
    }
    pub fn is_playing(&self) -> bool {
        self.playing
    }
    /// Every seek the clock received, in order.
    pub fn seeks(&self) -> &[f64] {
        &self.seeks
    }
}
impl PlaybackClock for ManualClock {
    fn current_time(&self) -> f64 {
        self.time
    }
    fn duration(&self) -> f64 {
        self.duration
    }
    fn play(&mut self) -> Result<(), ClockError> {
        if let Some(reason) = &self.reject_play {
            return Err(ClockError::PlayRejected(reason.clone()));
        }
        self.playing = true;
        Ok(())
    }
    fn pause(&mut self) {
        self.playing = false;
    }
    fn seek(&mut self, time_sec: f64) {
        self.time = time_sec;
        self.seeks.push(time_sec);
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn transport_clock_holds_position_while_paused() {
        let mut clock = TransportClock::new(60.0);
        clock.seek(12.5);
        assert_eq!(clock.current_time(), 12.5);
        clock.play().unwrap();
        clock.pause();
        assert!(clock.current_time() >= 12.5);
        clock.seek(100.0);
        assert_eq!(clock.current_time(), 60.0);
        assert!(clock.has_ended());
    }
    #[test]
    fn empty_transport_refuses_to_play() {
        let mut clock = TransportClock::new(0.0);
        assert!(matches!(clock.play(), Err(ClockError::PlayRejected(_))));
    }
    #[test]
    fn manual_clock_only_advances_while_playing() {
        let mut clock = ManualClock::new(10.0);
        clock.advance(1.0);
        assert_eq!(clock.current_time(), 0.0);
        clock.play().unwrap();
        clock.advance(4.0);
        clock.advance(40.0);
        assert_eq!(clock.current_time(), 10.0);
        assert!(clock.has_ended());
    }
}
