// src/playback/mod.rs
pub mod audio;
pub mod clock;
pub mod cursor;
pub mod sync;
pub use audio::{AudioClock, AudioMetadata};
pub use clock::{ClockError, ManualClock, PlaybackClock, TransportClock};
pub use cursor::{PlaybackCursor, TransportState};
pub use sync::{click_to_seek_target, time_to_pixel, Navigation, PlaybackSynchronizer};
