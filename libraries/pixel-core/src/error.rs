/// Core error types for Pixel Audio
use thiserror::Error;

/// Result type alias using `PixelError`
pub type Result<T> = std::result::Result<T, PixelError>;

/// Failure while turning container bytes into PCM
///
/// No variant ever carries partial audio: a decode either yields a complete
/// `DecodedAudio` or one of these.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Fewer bytes remain than a field or chunk declares
    #[error("Truncated input: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        /// Bytes the failing read asked for
        needed: usize,
        /// Bytes that were left in the input
        remaining: usize,
    },

    /// A required tag ("RIFF", "WAVE", "fmt ", "data") did not match
    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    /// Audio parsed fine but has no playback representation
    #[error("Unsupported layout: {channels} channel(s) at {bits_per_sample} bits")]
    UnsupportedLayout {
        /// Channel count from the format descriptor
        channels: u16,
        /// Bits per sample from the format descriptor
        bits_per_sample: u16,
    },

    /// No decoder is able to handle the input
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The Ogg Vorbis decoder rejected the stream
    #[error("Vorbis error: {0}")]
    Vorbis(String),

    /// I/O error while reading the source file
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Create an invalid container error
    pub fn invalid_container(msg: impl Into<String>) -> Self {
        Self::InvalidContainer(msg.into())
    }

    /// Create an unsupported format error
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// True when the input ended before the structure it declared
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::TruncatedInput { .. })
    }
}

/// Core error type for Pixel Audio
#[derive(Error, Debug)]
pub enum PixelError {
    /// Decoding errors
    #[error("Audio error: {0}")]
    Audio(#[from] DecodeError),

    /// Playback/device errors
    #[error("Playback error: {0}")]
    Playback(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl PixelError {
    /// Create a playback error
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<std::io::Error> for PixelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_input_message_names_both_counts() {
        let err = DecodeError::TruncatedInput {
            needed: 8,
            remaining: 3,
        };
        assert_eq!(
            err.to_string(),
            "Truncated input: needed 8 bytes, 3 remaining"
        );
        assert!(err.is_truncated());
    }

    #[test]
    fn decode_error_converts_into_pixel_error() {
        let err: PixelError = DecodeError::invalid_container("expected RIFF").into();
        assert!(matches!(
            err,
            PixelError::Audio(DecodeError::InvalidContainer(_))
        ));
    }
}
