//! WAV-backed playback clock.
//!
//! The recording is decoded with `hound` and streamed to the default output device with
//! `cpal`. Media time is the read position of the device callback, so the views follow
//! what is actually being heard.
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};
use crate::playback::clock::{ClockError, PlaybackClock};
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioMetadata {
    pub sampling_rate_hz: f64,
    pub duration_sec: f64,
    pub channels: u16,
}
impl AudioMetadata {
    pub fn from_wav(path: impl AsRef<Path>) -> Result<Self, ClockError> {
        let reader = hound::WavReader::open(path.as_ref()).map_err(decode_err)?;
        Ok(Self::from_spec(reader.spec(), reader.duration()))
    }
    fn from_spec(spec: hound::WavSpec, frames: u32) -> Self {
        let rate = spec.sample_rate as f64;
        Self {
            sampling_rate_hz: rate,
            duration_sec: if rate > 0.0 { frames as f64 / rate } else { 0.0 },
            channels: spec.channels,
        }
    }
}
fn decode_err(err: hound::Error) -> ClockError {
    ClockError::Decode(err.to_string())
}
/// Decodes a WAV file into interleaved `f32` samples in `[-1, 1]`.
pub fn decode_wav(path: impl AsRef<Path>) -> Result<(AudioMetadata, Vec<f32>), ClockError> {
    let mut reader = hound::WavReader::open(path.as_ref()).map_err(decode_err)?;
    let spec = reader.spec();
    let meta = AudioMetadata::from_spec(spec, reader.duration());
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_err)?,
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(decode_err)?
        }
    };
    Ok((meta, samples))
}
/// Read position in source frames, stored as `f64` bits so the callback can update it
/// without locking.
#[derive(Debug, Default)]
struct FramePosition(AtomicU64);
impl FramePosition {
    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }
    fn store(&self, frames: f64) {
        self.0.store(frames.to_bits(), Ordering::Release);
    }
    /// Advances from `from` to `to` unless a seek replaced `from` in the meantime.
    fn advance(&self, from: f64, to: f64) {
        let _ = self.0.compare_exchange(
            from.to_bits(),
            to.to_bits(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}
pub struct AudioClock {
    meta: AudioMetadata,
    total_frames: f64,
    position: Arc<FramePosition>,
    stream: cpal::Stream,
}
impl AudioClock {
    /// Decodes `path` and prepares a paused output stream on the default device.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ClockError> {
        let (meta, samples) = decode_wav(path.as_ref())?;
        let channels = meta.channels.max(1) as usize;
        let total_frames = samples.len() / channels;
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| ClockError::Device("no default output device".into()))?;
        let supported = device
            .default_output_config()
            .map_err(|e| ClockError::Device(e.to_string()))?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(ClockError::Device(format!(
                "unsupported output format {:?}",
                supported.sample_format()
            )));
        }
        let config: cpal::StreamConfig = supported.into();
        let out_channels = config.channels.max(1) as usize;
        // Nearest-frame resampling: source frames consumed per device frame.
        let step = meta.sampling_rate_hz / config.sample_rate.0 as f64;
        let position = Arc::new(FramePosition::default());
        let cb_position = Arc::clone(&position);
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    let start = cb_position.load();
                    let mut pos = start;
                    for frame in data.chunks_mut(out_channels) {
                        let idx = pos as usize;
                        if idx >= total_frames {
                            frame.fill(0.0);
                            continue;
                        }
                        for (ch, out) in frame.iter_mut().enumerate() {
                            *out = samples[idx * channels + ch.min(channels - 1)];
                        }
                        pos += step;
                    }
                    cb_position.advance(start, pos.min(total_frames as f64));
                },
                |err| error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| ClockError::Device(e.to_string()))?;
        stream
            .pause()
            .map_err(|e| ClockError::Device(e.to_string()))?;
        info!(
            "audio ready: {:.1}s at {} Hz, {} channel(s), device rate {} Hz",
            meta.duration_sec, meta.sampling_rate_hz, meta.channels, config.sample_rate.0
        );
        Ok(Self {
            meta,
            total_frames: total_frames as f64,
            position,
            stream,
        })
    }
    pub fn metadata(&self) -> AudioMetadata {
        self.meta
    }
}
impl PlaybackClock for AudioClock {
    fn current_time(&self) -> f64 {
        self.position.load() / self.meta.sampling_rate_hz
    }
    fn duration(&self) -> f64 {
        self.meta.duration_sec
    }
    fn play(&mut self) -> Result<(), ClockError> {
        self.stream
            .play()
            .map_err(|e| ClockError::PlayRejected(e.to_string()))
    }
    fn pause(&mut self) {
        if let Err(err) = self.stream.pause() {
            error!("failed to pause audio stream: {err}");
        }
    }
    fn seek(&mut self, time_sec: f64) {
        let frames = (time_sec * self.meta.sampling_rate_hz).clamp(0.0, self.total_frames);
        self.position.store(frames);
    }
    fn has_ended(&self) -> bool {
        self.position.load() >= self.total_frames
    }
}
