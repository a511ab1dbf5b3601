//! Software mixer
//!
//! Holds every uploaded buffer and every live source. A session and its
//! output backend share one `Mixer` behind an `Arc<Mutex<_>>`: the session
//! mutates it in response to handle operations and the backend's audio
//! callback calls [`Mixer::render`].

use crate::error::{PlaybackError, Result};
use pixel_core::{BufferId, PcmClip, PcmLayout, SourceId};
use std::collections::BTreeMap;
use tracing::trace;

/// Playback state of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceState {
    /// Created or rewound, not yet started
    Initial,
    /// Producing samples
    Playing,
    /// Paused (position retained)
    Paused,
    /// Reached the end of a non-looping buffer
    Stopped,
}

/// A clip converted to interleaved f32
#[derive(Debug, Clone)]
struct Buffer {
    samples: Vec<f32>,
    /// 1 or 2
    channels: usize,
    sample_rate: u32,
}

impl Buffer {
    fn from_clip(clip: &PcmClip) -> Self {
        let mut samples: Vec<f32> = match clip.layout {
            PcmLayout::Mono8 | PcmLayout::Stereo8 => clip
                .data
                .iter()
                .map(|&b| (f32::from(b) - 128.0) / 128.0)
                .collect(),
            PcmLayout::Mono16 | PcmLayout::Stereo16 => clip
                .data
                .chunks_exact(2)
                .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
                .collect(),
        };

        let channels = usize::from(clip.layout.channels());
        samples.truncate(clip.frames() * channels);

        Self {
            samples,
            channels,
            sample_rate: clip.sample_rate.as_hz(),
        }
    }

    fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    fn frame(&self, index: usize) -> (f32, f32) {
        let base = index * self.channels;
        if self.channels == 1 {
            let s = self.samples[base];
            (s, s)
        } else {
            (self.samples[base], self.samples[base + 1])
        }
    }

    /// Linear interpolation between the two frames around `position`
    fn sample_at(&self, position: f64, looping: bool) -> (f32, f32) {
        let len = self.frames();
        let index = position as usize;
        let frac = (position - index as f64) as f32;
        let next = if index + 1 < len {
            index + 1
        } else if looping {
            0
        } else {
            index
        };

        let (l0, r0) = self.frame(index);
        let (l1, r1) = self.frame(next);
        (l0 + (l1 - l0) * frac, r0 + (r1 - r0) * frac)
    }
}

/// A source: one playing instance of a buffer
#[derive(Debug, Clone)]
pub(crate) struct Voice {
    pub(crate) buffer: BufferId,
    pub(crate) state: SourceState,
    /// Fractional frame index into the buffer
    pub(crate) position: f64,
    pub(crate) looping: bool,
    pub(crate) volume: f32,
    pub(crate) pitch: f32,
}

/// Buffer and source tables plus the render loop
#[derive(Debug)]
pub struct Mixer {
    sample_rate: u32,
    channels: usize,
    master_volume: f32,
    buffers: BTreeMap<BufferId, Buffer>,
    voices: BTreeMap<SourceId, Voice>,
    last_buffer: u32,
    last_source: u32,
}

impl Mixer {
    /// Create an empty mixer producing `channels` interleaved channels at
    /// `sample_rate`
    pub fn new(sample_rate: u32, channels: u16, master_volume: f32) -> Self {
        Self {
            sample_rate,
            channels: usize::from(channels),
            master_volume,
            buffers: BTreeMap::new(),
            voices: BTreeMap::new(),
            last_buffer: 0,
            last_source: 0,
        }
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Output channel count
    pub fn channels(&self) -> u16 {
        self.channels as u16
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub(crate) fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume;
    }

    /// Number of uploaded buffers
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of live sources, stopped ones included
    pub fn source_count(&self) -> usize {
        self.voices.len()
    }

    pub fn has_buffer(&self, id: BufferId) -> bool {
        self.buffers.contains_key(&id)
    }

    /// State of a source, `None` for a stale handle
    pub fn source_state(&self, id: SourceId) -> Option<SourceState> {
        self.voices.get(&id).map(|v| v.state)
    }

    /// Playback position of a source in buffer frames
    pub fn position(&self, id: SourceId) -> Option<f64> {
        self.voices.get(&id).map(|v| v.position)
    }

    pub(crate) fn add_buffer(&mut self, clip: &PcmClip) -> BufferId {
        let id = loop {
            self.last_buffer = self.last_buffer.wrapping_add(1).max(1);
            let candidate = BufferId::from_raw(self.last_buffer);
            if !self.buffers.contains_key(&candidate) {
                break candidate;
            }
        };
        self.buffers.insert(id, Buffer::from_clip(clip));
        id
    }

    pub(crate) fn remove_buffer(&mut self, id: BufferId) -> Result<()> {
        if !self.buffers.contains_key(&id) {
            return Err(PlaybackError::UnknownBuffer(id));
        }
        let sources = self.voices.values().filter(|v| v.buffer == id).count();
        if sources > 0 {
            return Err(PlaybackError::BufferInUse { buffer: id, sources });
        }
        self.buffers.remove(&id);
        Ok(())
    }

    /// Attach a new playing source to `buffer`
    pub(crate) fn add_voice(
        &mut self,
        buffer: BufferId,
        looping: bool,
        volume: f32,
        pitch: f32,
    ) -> Result<SourceId> {
        if !self.buffers.contains_key(&buffer) {
            return Err(PlaybackError::UnknownBuffer(buffer));
        }
        let id = loop {
            self.last_source = self.last_source.wrapping_add(1).max(1);
            let candidate = SourceId::from_raw(self.last_source);
            if !self.voices.contains_key(&candidate) {
                break candidate;
            }
        };
        self.voices.insert(
            id,
            Voice {
                buffer,
                state: SourceState::Playing,
                position: 0.0,
                looping,
                volume,
                pitch,
            },
        );
        Ok(id)
    }

    pub(crate) fn voice(&self, id: SourceId) -> Result<&Voice> {
        self.voices.get(&id).ok_or(PlaybackError::UnknownSource(id))
    }

    pub(crate) fn voice_mut(&mut self, id: SourceId) -> Result<&mut Voice> {
        self.voices
            .get_mut(&id)
            .ok_or(PlaybackError::UnknownSource(id))
    }

    pub(crate) fn remove_voice(&mut self, id: SourceId) -> Result<Voice> {
        self.voices
            .remove(&id)
            .ok_or(PlaybackError::UnknownSource(id))
    }

    /// Delete every source in `Stopped` state
    pub(crate) fn prune_stopped(&mut self) -> Vec<SourceId> {
        let stopped: Vec<SourceId> = self
            .voices
            .iter()
            .filter(|(_, v)| v.state == SourceState::Stopped)
            .map(|(&id, _)| id)
            .collect();
        for id in &stopped {
            self.voices.remove(id);
        }
        stopped
    }

    /// Drop all sources and buffers
    pub(crate) fn clear(&mut self) {
        self.voices.clear();
        self.buffers.clear();
    }

    /// Mix every playing source into `out`
    ///
    /// `out` is interleaved at the mixer's channel count; a trailing partial
    /// frame is left silent.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        if self.channels == 0 || self.sample_rate == 0 {
            return;
        }

        let device_rate = f64::from(self.sample_rate);
        let channels = self.channels;

        for (id, voice) in &mut self.voices {
            if voice.state != SourceState::Playing {
                continue;
            }
            let Some(buffer) = self.buffers.get(&voice.buffer) else {
                voice.state = SourceState::Stopped;
                continue;
            };

            let len = buffer.frames();
            if len == 0 || buffer.sample_rate == 0 {
                voice.state = SourceState::Stopped;
                continue;
            }
            let end = len as f64;
            let step = f64::from(buffer.sample_rate) / device_rate * f64::from(voice.pitch);
            // Product of two finite f32 volumes can overflow to inf
            let gain = (f64::from(voice.volume) * f64::from(self.master_volume))
                .min(f64::from(f32::MAX)) as f32;

            for frame in out.chunks_exact_mut(channels) {
                if voice.position >= end {
                    if voice.looping {
                        voice.position %= end;
                    } else {
                        break;
                    }
                }

                let (left, right) = buffer.sample_at(voice.position, voice.looping);
                if buffer.channels == 1 {
                    for s in frame.iter_mut() {
                        *s += left * gain;
                    }
                } else if channels == 1 {
                    frame[0] += (left + right) * 0.5 * gain;
                } else {
                    frame[0] += left * gain;
                    frame[1] += right * gain;
                }

                voice.position += step;
            }

            if !voice.looping && voice.position >= end {
                voice.state = SourceState::Stopped;
                trace!(source = %id, "Source reached end of buffer");
            }
        }

        // clamp passes NaN through
        for s in out.iter_mut() {
            *s = if s.is_nan() { 0.0 } else { s.clamp(-1.0, 1.0) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_core::SampleRate;

    fn mono16(rate: u32, samples: &[i16]) -> PcmClip {
        PcmClip {
            layout: PcmLayout::Mono16,
            sample_rate: SampleRate::new(rate),
            data: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
        }
    }

    #[test]
    fn converts_8bit_unsigned() {
        let clip = PcmClip {
            layout: PcmLayout::Mono8,
            sample_rate: SampleRate::new(8_000),
            data: vec![0, 128, 255],
        };
        let buffer = Buffer::from_clip(&clip);
        assert_eq!(buffer.samples, vec![-1.0, 0.0, 127.0 / 128.0]);
    }

    #[test]
    fn converts_16bit_signed() {
        let buffer = Buffer::from_clip(&mono16(8_000, &[i16::MIN, 0, 16_384]));
        assert_eq!(buffer.samples, vec![-1.0, 0.0, 0.5]);
    }

    #[test]
    fn drops_partial_stereo_frame() {
        let clip = PcmClip {
            layout: PcmLayout::Stereo16,
            sample_rate: SampleRate::new(8_000),
            data: vec![0; 10],
        };
        let buffer = Buffer::from_clip(&clip);
        assert_eq!(buffer.frames(), 2);
        assert_eq!(buffer.samples.len(), 4);
    }

    #[test]
    fn interpolates_between_frames() {
        let buffer = Buffer::from_clip(&mono16(8_000, &[0, 16_384]));
        let (l, r) = buffer.sample_at(0.5, false);
        assert!((l - 0.25).abs() < 1e-6);
        assert_eq!(l, r);
    }

    #[test]
    fn ids_are_distinct_and_nonzero() {
        let mut mixer = Mixer::new(8_000, 1, 1.0);
        let clip = mono16(8_000, &[0; 4]);
        let a = mixer.add_buffer(&clip);
        let b = mixer.add_buffer(&clip);
        assert_ne!(a, b);
        assert_ne!(a.as_raw(), 0);

        let s1 = mixer.add_voice(a, false, 1.0, 1.0).unwrap();
        let s2 = mixer.add_voice(a, false, 1.0, 1.0).unwrap();
        assert_ne!(s1, s2);
    }

    #[test]
    fn renders_silence_without_sources() {
        let mut mixer = Mixer::new(8_000, 2, 1.0);
        let mut out = vec![1.0; 16];
        mixer.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn same_rate_mono_copies_samples_to_every_channel() {
        let mut mixer = Mixer::new(8_000, 2, 1.0);
        let buffer = mixer.add_buffer(&mono16(8_000, &[16_384, -16_384]));
        let source = mixer.add_voice(buffer, false, 1.0, 1.0).unwrap();

        let mut out = vec![0.0; 8];
        mixer.render(&mut out);
        assert_eq!(&out[..4], &[0.5, 0.5, -0.5, -0.5]);
        assert_eq!(&out[4..], &[0.0; 4]);
        assert_eq!(mixer.source_state(source), Some(SourceState::Stopped));
    }

    #[test]
    fn clamps_the_mix() {
        let mut mixer = Mixer::new(8_000, 1, 1.0);
        let buffer = mixer.add_buffer(&mono16(8_000, &[i16::MAX; 4]));
        for _ in 0..3 {
            mixer.add_voice(buffer, true, 1.0, 1.0).unwrap();
        }
        let mut out = vec![0.0; 4];
        mixer.render(&mut out);
        assert!(out.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn extreme_gain_stays_finite() {
        let mut mixer = Mixer::new(8_000, 1, 1e30);
        let clip = PcmClip {
            layout: PcmLayout::Mono8,
            sample_rate: SampleRate::new(8_000),
            data: vec![128; 8],
        };
        let buffer = mixer.add_buffer(&clip);
        mixer.add_voice(buffer, true, 1e30, 1.0).unwrap();

        let mut out = vec![0.0; 4];
        mixer.render(&mut out);
        assert_eq!(out, vec![0.0; 4]);
    }

    #[test]
    fn saturated_voices_stay_in_range() {
        let mut mixer = Mixer::new(8_000, 1, f32::MAX);
        let loud = mixer.add_buffer(&mono16(8_000, &[i16::MAX; 4]));
        let inverted = mixer.add_buffer(&mono16(8_000, &[i16::MIN; 4]));
        for _ in 0..2 {
            mixer.add_voice(loud, true, f32::MAX, 1.0).unwrap();
            mixer.add_voice(inverted, true, f32::MAX, 1.0).unwrap();
        }

        let mut out = vec![0.0; 4];
        mixer.render(&mut out);
        assert!(out.iter().all(|s| s.is_finite() && (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn empty_buffer_stops_immediately() {
        let mut mixer = Mixer::new(8_000, 1, 1.0);
        let buffer = mixer.add_buffer(&mono16(8_000, &[]));
        let source = mixer.add_voice(buffer, true, 1.0, 1.0).unwrap();
        let mut out = vec![0.0; 4];
        mixer.render(&mut out);
        assert_eq!(mixer.source_state(source), Some(SourceState::Stopped));
    }

    #[test]
    fn remove_buffer_in_use() {
        let mut mixer = Mixer::new(8_000, 1, 1.0);
        let buffer = mixer.add_buffer(&mono16(8_000, &[0; 4]));
        let source = mixer.add_voice(buffer, false, 1.0, 1.0).unwrap();

        assert!(matches!(
            mixer.remove_buffer(buffer),
            Err(PlaybackError::BufferInUse { sources: 1, .. })
        ));
        mixer.remove_voice(source).unwrap();
        mixer.remove_buffer(buffer).unwrap();
        assert!(matches!(
            mixer.remove_buffer(buffer),
            Err(PlaybackError::UnknownBuffer(_))
        ));
    }
}
