//! Pixel Audio Core
//!
//! Platform-agnostic core types, traits, and error handling for Pixel Audio.
//!
//! This crate provides the foundational building blocks shared by the
//! decoders (`pixel-audio`) and the playback layer (`pixel-playback`).
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Audio Types**: `DecodedAudio`, `PcmLayout`, `PcmClip`, `SampleRate`
//! - **Handles**: `BufferId`, `SourceId`
//! - **Core Traits**: `AudioDecoder`
//! - **Error Handling**: `DecodeError`, unified `PixelError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use pixel_core::{DecodedAudio, PcmClip, PcmLayout, SampleRate};
//!
//! let decoded = DecodedAudio::new(1, SampleRate::new(8_000), 16, vec![0x00, 0x01, 0xFF, 0xFE]);
//! let clip = PcmClip::from_decoded(decoded).unwrap();
//!
//! assert_eq!(clip.layout, PcmLayout::Mono16);
//! assert_eq!(clip.frames(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Decode and workspace error types
pub mod error;
/// Decoder trait shared by the format backends
pub mod traits;
/// Audio data types and handles
pub mod types;

// Re-export commonly used types
pub use error::{DecodeError, PixelError, Result};
pub use traits::AudioDecoder;
pub use types::{BufferId, DecodedAudio, PcmClip, PcmLayout, SampleRate, SourceId};
