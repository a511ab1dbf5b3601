//! Error types for playback sessions

use pixel_core::{BufferId, DecodeError, PixelError, SourceId};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Buffer handle does not name a live buffer
    #[error("Unknown buffer: {0}")]
    UnknownBuffer(BufferId),

    /// Source handle does not name a live source
    #[error("Unknown source: {0}")]
    UnknownSource(SourceId),

    /// Buffer is still attached to at least one source
    #[error("{buffer} is still used by {sources} source(s)")]
    BufferInUse { buffer: BufferId, sources: usize },

    /// Too many live sources
    #[error("Source limit reached ({0})")]
    SourceLimit(usize),

    /// Volume must be finite and non-negative
    #[error("Invalid volume: {0}. Must be finite and >= 0.0")]
    InvalidVolume(f32),

    /// Pitch must be finite and positive
    #[error("Invalid pitch: {0}. Must be finite and > 0.0")]
    InvalidPitch(f32),

    /// Session configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Output device failure
    #[error("Device error: {0}")]
    Device(String),

    /// Clip could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl PlaybackError {
    /// Create a device error
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(feature = "cpal-output")]
impl From<cpal::BuildStreamError> for PlaybackError {
    fn from(err: cpal::BuildStreamError) -> Self {
        PlaybackError::Device(format!("Failed to build output stream: {}", err))
    }
}

#[cfg(feature = "cpal-output")]
impl From<cpal::PlayStreamError> for PlaybackError {
    fn from(err: cpal::PlayStreamError) -> Self {
        PlaybackError::Device(format!("Failed to play stream: {}", err))
    }
}

#[cfg(feature = "cpal-output")]
impl From<cpal::DefaultStreamConfigError> for PlaybackError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        PlaybackError::Device(err.to_string())
    }
}

impl From<PlaybackError> for PixelError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Decode(e) => PixelError::Audio(e),
            PlaybackError::InvalidConfig(msg) => PixelError::config(msg),
            other => PixelError::playback(other.to_string()),
        }
    }
}
