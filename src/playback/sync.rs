//! Single writer of the playback cursor.
//!
//! Clock ticks and user seeks both land here; every view reads the published
//! [`PlaybackCursor`] on its next paint. Seeks are applied to the cursor and the clock in
//! the same call, so the following tick always observes them.
use log::{debug, info, warn};
use crate::playback::clock::PlaybackClock;
use crate::playback::cursor::{PlaybackCursor, TransportState};
/// Relative navigation, each resolving to one absolute seek.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Navigation {
    Start,
    End,
    /// Signed jump in seconds from the current position.
    Skip(f64),
    /// Fraction of the total duration, e.g. 0.25.
    Fraction(f64),
}
pub struct PlaybackSynchronizer {
    clock: Box<dyn PlaybackClock>,
    cursor: PlaybackCursor,
    notice: Option<String>,
}
impl PlaybackSynchronizer {
    pub fn new(clock: Box<dyn PlaybackClock>) -> Self {
        let duration = clock.duration().max(0.0);
        let cursor = PlaybackCursor {
            time_sec: clamp_time(clock.current_time(), duration),
            state: TransportState::Stopped,
            duration_sec: duration,
            revision: 0,
        };
        Self {
            clock,
            cursor,
            notice: None,
        }
    }
    /// Swaps the clock (e.g. a new audio file) and rewinds to a stopped cursor at zero.
    pub fn replace_clock(&mut self, clock: Box<dyn PlaybackClock>) {
        self.clock.pause();
        self.clock = clock;
        self.clock.seek(0.0);
        self.publish(0.0, TransportState::Stopped);
    }
    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }
    /// Transient, non-fatal message for the user (e.g. a rejected play request).
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
    /// Reads the clock once per frame and republishes the cursor while playing.
    pub fn tick(&mut self) -> PlaybackCursor {
        let duration = self.clock.duration().max(0.0);
        if duration != self.cursor.duration_sec {
            self.cursor.duration_sec = duration;
            self.cursor.revision += 1;
        }
        if self.cursor.state == TransportState::Playing {
            let now = clamp_time(self.clock.current_time(), duration);
            if self.clock.has_ended() || now >= duration {
                self.clock.pause();
                info!("playback reached the end at {:.2}s", duration);
                self.publish(duration, TransportState::Stopped);
            } else if now != self.cursor.time_sec {
                self.publish(now, TransportState::Playing);
            }
        }
        self.cursor
    }
    /// Stopped/Paused -> Playing. Playing again from the end restarts at zero. A rejected
    /// request leaves the cursor untouched and records a notice.
    pub fn play(&mut self) {
        if self.cursor.state == TransportState::Playing {
            return;
        }
        let previous = self.cursor.time_sec;
        let restart = self.cursor.duration_sec > 0.0 && previous >= self.cursor.duration_sec;
        if restart {
            self.clock.seek(0.0);
        }
        match self.clock.play() {
            Ok(()) => {
                let from = if restart { 0.0 } else { previous };
                self.publish(from, TransportState::Playing);
            }
            Err(err) => {
                warn!("play request failed: {err}");
                if restart {
                    self.clock.seek(previous);
                }
                self.notice = Some(err.to_string());
            }
        }
    }
    /// Playing -> Paused; no effect in the other states.
    pub fn pause(&mut self) {
        if self.cursor.state != TransportState::Playing {
            return;
        }
        self.clock.pause();
        let now = clamp_time(self.clock.current_time(), self.cursor.duration_sec);
        self.publish(now, TransportState::Paused);
    }
    pub fn toggle(&mut self) {
        if self.cursor.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }
    /// Moves the cursor and the clock to `time_sec`, clamped to the timeline. The
    /// playing/paused state is kept.
    pub fn seek(&mut self, time_sec: f64) {
        let target = clamp_time(time_sec, self.cursor.duration_sec);
        debug!("seek to {:.3}s (requested {:.3}s)", target, time_sec);
        self.clock.seek(target);
        self.publish(target, self.cursor.state);
    }
    pub fn navigate(&mut self, nav: Navigation) {
        let target = self.navigation_target(nav);
        self.seek(target);
    }
    /// Absolute time a navigation resolves to, before clamping.
    pub fn navigation_target(&self, nav: Navigation) -> f64 {
        match nav {
            Navigation::Start => 0.0,
            Navigation::End => self.cursor.duration_sec,
            Navigation::Skip(delta) => self.cursor.time_sec + delta,
            Navigation::Fraction(f) => self.cursor.duration_sec * f,
        }
    }
    /// Seek from a click on a horizontal surface; see [`click_to_seek_target`].
    pub fn seek_from_click(
        &mut self,
        pixel_offset: f64,
        padding: f64,
        usable_width: f64,
        start_time: f64,
        duration: f64,
    ) {
        let target = click_to_seek_target(pixel_offset, padding, usable_width, start_time, duration);
        self.seek(target);
    }
    fn publish(&mut self, time_sec: f64, state: TransportState) {
        self.cursor.time_sec = time_sec;
        self.cursor.state = state;
        self.cursor.revision += 1;
    }
}
fn clamp_time(t: f64, duration: f64) -> f64 {
    if t.is_nan() {
        return 0.0;
    }
    t.clamp(0.0, duration.max(0.0))
}
/// `start_time + clamp(pixel_offset - padding, 0, usable_width) / usable_width * duration`.
/// A surface without usable width maps every click to `start_time`.
pub fn click_to_seek_target(
    pixel_offset: f64,
    padding: f64,
    usable_width: f64,
    start_time: f64,
    duration: f64,
) -> f64 {
    if !(usable_width > 0.0) {
        return start_time;
    }
    let x = (pixel_offset - padding).clamp(0.0, usable_width);
    start_time + x / usable_width * duration
}
/// Inverse of [`click_to_seek_target`]: where a time is drawn on the surface.
pub fn time_to_pixel(
    time_sec: f64,
    padding: f64,
    usable_width: f64,
    start_time: f64,
    duration: f64,
) -> f64 {
    if !(duration > 0.0) {
        return padding;
    }
    let fraction = ((time_sec - start_time) / duration).clamp(0.0, 1.0);
    padding + fraction * usable_width
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::clock::{ClockError, ManualClock};
    use std::cell::RefCell;
    use std::rc::Rc;
    /// Lets the test drive a clock the synchronizer owns.
    #[derive(Clone)]
    struct SharedClock(Rc<RefCell<ManualClock>>);
    impl PlaybackClock for SharedClock {
        fn current_time(&self) -> f64 {
            self.0.borrow().current_time()
        }
        fn duration(&self) -> f64 {
            self.0.borrow().duration()
        }
        fn play(&mut self) -> Result<(), ClockError> {
            self.0.borrow_mut().play()
        }
        fn pause(&mut self) {
            self.0.borrow_mut().pause()
        }
        fn seek(&mut self, time_sec: f64) {
            self.0.borrow_mut().seek(time_sec)
        }
    }
    fn setup(duration: f64) -> (PlaybackSynchronizer, Rc<RefCell<ManualClock>>) {
        let clock = Rc::new(RefCell::new(ManualClock::new(duration)));
        let sync = PlaybackSynchronizer::new(Box::new(SharedClock(clock.clone())));
        (sync, clock)
    }
    #[test]
    fn ticks_publish_clock_time_while_playing() {
        let (mut sync, clock) = setup(120.0);
        assert_eq!(sync.cursor().state, TransportState::Stopped);
        sync.play();
        clock.borrow_mut().advance(1.5);
        let cursor = sync.tick();
        assert_eq!(cursor.time_sec, 1.5);
        assert!(cursor.is_playing());
    }
    #[test]
    fn paused_cursor_ignores_ticks() {
        let (mut sync, clock) = setup(120.0);
        sync.play();
        clock.borrow_mut().advance(3.0);
        sync.tick();
        sync.pause();
        let revision = sync.cursor().revision;
        sync.tick();
        assert_eq!(sync.cursor().state, TransportState::Paused);
        assert_eq!(sync.cursor().time_sec, 3.0);
        assert_eq!(sync.cursor().revision, revision);
    }
    #[test]
    fn reaching_the_end_stops_playback() {
        let (mut sync, clock) = setup(10.0);
        sync.play();
        clock.borrow_mut().advance(25.0);
        let cursor = sync.tick();
        assert_eq!(cursor.state, TransportState::Stopped);
        assert_eq!(cursor.time_sec, 10.0);
        assert!(!clock.borrow().is_playing());
    }
    #[test]
    fn playing_from_the_end_restarts() {
        let (mut sync, clock) = setup(10.0);
        sync.seek(10.0);
        sync.play();
        assert_eq!(sync.cursor().time_sec, 0.0);
        assert_eq!(clock.borrow().current_time(), 0.0);
        assert!(sync.cursor().is_playing());
    }
    #[test]
    fn seek_keeps_state_and_clamps() {
        let (mut sync, clock) = setup(100.0);
        sync.seek(-4.0);
        assert_eq!(sync.cursor().time_sec, 0.0);
        sync.play();
        sync.seek(250.0);
        assert_eq!(sync.cursor().time_sec, 100.0);
        assert!(sync.cursor().is_playing());
        sync.pause();
        sync.seek(42.0);
        assert_eq!(sync.cursor().state, TransportState::Paused);
        assert_eq!(clock.borrow().seeks().last(), Some(&42.0));
    }
    #[test]
    fn seek_is_visible_to_the_next_tick() {
        let (mut sync, clock) = setup(100.0);
        sync.play();
        clock.borrow_mut().advance(5.0);
        sync.seek(60.0);
        assert_eq!(sync.tick().time_sec, 60.0);
    }
    #[test]
    fn navigation_resolves_to_absolute_seeks() {
        let (mut sync, clock) = setup(200.0);
        sync.navigate(Navigation::Fraction(0.25));
        assert_eq!(sync.cursor().time_sec, 50.0);
        sync.navigate(Navigation::Skip(10.0));
        assert_eq!(sync.cursor().time_sec, 60.0);
        sync.navigate(Navigation::Skip(-100.0));
        assert_eq!(sync.cursor().time_sec, 0.0);
        sync.navigate(Navigation::End);
        assert_eq!(sync.cursor().time_sec, 200.0);
        sync.navigate(Navigation::Fraction(0.75));
        sync.navigate(Navigation::Start);
        assert_eq!(clock.borrow().seeks(), &[50.0, 60.0, 0.0, 200.0, 150.0, 0.0]);
    }
    #[test]
    fn rejected_play_leaves_cursor_and_reports_notice() {
        let (mut sync, clock) = setup(30.0);
        sync.seek(12.0);
        clock.borrow_mut().reject_play("autoplay blocked");
        let before = sync.cursor();
        sync.play();
        assert_eq!(sync.cursor(), before);
        let notice = sync.take_notice().unwrap();
        assert!(notice.contains("autoplay blocked"));
        assert_eq!(sync.take_notice(), None);
    }
    #[test]
    fn click_maps_pixels_to_session_time() {
        assert_eq!(click_to_seek_target(60.0, 10.0, 100.0, 5.0, 200.0), 105.0);
        assert_eq!(click_to_seek_target(0.0, 10.0, 100.0, 5.0, 200.0), 5.0);
        assert_eq!(click_to_seek_target(500.0, 10.0, 100.0, 5.0, 200.0), 205.0);
        assert_eq!(click_to_seek_target(50.0, 10.0, 0.0, 5.0, 200.0), 5.0);
        assert_eq!(time_to_pixel(105.0, 10.0, 100.0, 5.0, 200.0), 60.0);
    }
    #[test]
    fn click_seeks_through_the_synchronizer() {
        let (mut sync, _clock) = setup(300.0);
        sync.seek_from_click(60.0, 10.0, 100.0, 0.0, 200.0);
        assert_eq!(sync.cursor().time_sec, 100.0);
    }
    #[test]
    fn replacing_the_clock_rewinds() {
        let (mut sync, _clock) = setup(30.0);
        sync.seek(20.0);
        sync.replace_clock(Box::new(ManualClock::new(90.0)));
        let cursor = sync.tick();
        assert_eq!(cursor.time_sec, 0.0);
        assert_eq!(cursor.duration_sec, 90.0);
        assert_eq!(cursor.state, TransportState::Stopped);
    }
}
