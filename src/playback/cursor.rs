#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}
/// Shared playback time. Only the synchronizer writes it; every view reads a copy.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PlaybackCursor {
    pub time_sec: f64,
    pub state: TransportState,
    /// Duration reported by the playback clock.
    pub duration_sec: f64,
    /// Bumped on every published change so readers can skip unchanged frames.
    pub revision: u64,
}
impl PlaybackCursor {
    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }
}
