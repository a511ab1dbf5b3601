/// Audio-related types
use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// 8 kHz telephony rate
    pub const TELEPHONY: Self = Self(8_000);
    /// 44.1 kHz CD rate
    pub const CD_QUALITY: Self = Self(44_100);
    /// 48 kHz DVD rate
    pub const DVD_QUALITY: Self = Self(48_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// Result of decoding a container: format fields plus the raw payload
///
/// `data` is a freshly allocated copy of the container's sample payload,
/// byte-for-byte. The caller owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    /// Number of channels
    pub channels: u16,

    /// Sample rate
    pub sample_rate: SampleRate,

    /// Bits per sample
    pub bits_per_sample: u16,

    /// Raw sample payload (little-endian, interleaved)
    pub data: Vec<u8>,
}

impl DecodedAudio {
    /// Create decoded audio from its parts
    pub fn new(channels: u16, sample_rate: SampleRate, bits_per_sample: u16, data: Vec<u8>) -> Self {
        Self {
            channels,
            sample_rate,
            bits_per_sample,
            data,
        }
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume and return the payload
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// PCM layouts a playback buffer can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PcmLayout {
    /// One channel, unsigned 8-bit
    Mono8,
    /// One channel, signed 16-bit little-endian
    Mono16,
    /// Two interleaved channels, unsigned 8-bit
    Stereo8,
    /// Two interleaved channels, signed 16-bit little-endian
    Stereo16,
}

impl PcmLayout {
    /// Map a (channels, bits per sample) pair onto a layout
    ///
    /// Total over every input: exactly (1,8), (1,16), (2,8) and (2,16) are
    /// accepted, everything else is `UnsupportedLayout`.
    pub fn from_format(channels: u16, bits_per_sample: u16) -> Result<Self, DecodeError> {
        match (channels, bits_per_sample) {
            (1, 8) => Ok(Self::Mono8),
            (1, 16) => Ok(Self::Mono16),
            (2, 8) => Ok(Self::Stereo8),
            (2, 16) => Ok(Self::Stereo16),
            (channels, bits_per_sample) => Err(DecodeError::UnsupportedLayout {
                channels,
                bits_per_sample,
            }),
        }
    }

    /// Number of interleaved channels
    pub fn channels(self) -> u16 {
        match self {
            Self::Mono8 | Self::Mono16 => 1,
            Self::Stereo8 | Self::Stereo16 => 2,
        }
    }

    /// Bits per sample
    pub fn bits_per_sample(self) -> u16 {
        match self {
            Self::Mono8 | Self::Stereo8 => 8,
            Self::Mono16 | Self::Stereo16 => 16,
        }
    }

    /// Bytes in one frame (one sample for every channel)
    pub fn bytes_per_frame(self) -> usize {
        usize::from(self.channels()) * usize::from(self.bits_per_sample() / 8)
    }
}

impl fmt::Display for PcmLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mono8 => "mono 8-bit",
            Self::Mono16 => "mono 16-bit",
            Self::Stereo8 => "stereo 8-bit",
            Self::Stereo16 => "stereo 16-bit",
        };
        f.write_str(name)
    }
}

/// Decoded audio normalized into a playable layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmClip {
    /// Sample layout
    pub layout: PcmLayout,

    /// Sample rate
    pub sample_rate: SampleRate,

    /// Raw sample payload
    pub data: Vec<u8>,
}

impl PcmClip {
    /// Normalize decoded audio into a clip
    ///
    /// # Errors
    /// Returns `UnsupportedLayout` for any channel/bit-depth pair that has
    /// no `PcmLayout`
    pub fn from_decoded(decoded: DecodedAudio) -> Result<Self, DecodeError> {
        let layout = PcmLayout::from_format(decoded.channels, decoded.bits_per_sample)?;
        Ok(Self {
            layout,
            sample_rate: decoded.sample_rate,
            data: decoded.data,
        })
    }

    /// Number of whole frames in the payload
    ///
    /// A trailing partial frame is ignored.
    pub fn frames(&self) -> usize {
        self.data.len() / self.layout.bytes_per_frame()
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate.as_hz() == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate.as_hz() as f64
    }
}
