//! Pixel Audio decoding
//!
//! Turns complete, in-memory audio containers into raw PCM.
//!
//! This crate provides:
//! - A bounds-checked RIFF/WAVE parser (`wav`) built on a little-endian
//!   byte cursor (`cursor`)
//! - Ogg Vorbis decoding via Symphonia
//! - A `Dispatcher` that picks a decoder by extension or magic bytes and
//!   normalizes the result into one of the four playable `PcmLayout`s
//!
//! # Example: Decoding a WAVE buffer
//!
//! ```rust
//! use pixel_audio::decode_wav;
//!
//! let mut wav = Vec::new();
//! wav.extend_from_slice(b"RIFF");
//! wav.extend_from_slice(&40u32.to_le_bytes());
//! wav.extend_from_slice(b"WAVE");
//! wav.extend_from_slice(b"fmt ");
//! wav.extend_from_slice(&16u32.to_le_bytes());
//! wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
//! wav.extend_from_slice(&1u16.to_le_bytes()); // mono
//! wav.extend_from_slice(&8_000u32.to_le_bytes());
//! wav.extend_from_slice(&16_000u32.to_le_bytes());
//! wav.extend_from_slice(&2u16.to_le_bytes());
//! wav.extend_from_slice(&16u16.to_le_bytes());
//! wav.extend_from_slice(b"data");
//! wav.extend_from_slice(&4u32.to_le_bytes());
//! wav.extend_from_slice(&[0x00, 0x01, 0xFF, 0xFE]);
//!
//! let audio = decode_wav(&wav)?;
//! assert_eq!(audio.channels, 1);
//! assert_eq!(audio.sample_rate.as_hz(), 8_000);
//! assert_eq!(audio.bits_per_sample, 16);
//! assert_eq!(audio.data, [0x00, 0x01, 0xFF, 0xFE]);
//! # Ok::<(), pixel_core::DecodeError>(())
//! ```
//!
//! # Example: Loading a file
//!
//! ```rust,no_run
//! use pixel_audio::Dispatcher;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), pixel_core::DecodeError> {
//! let (kind, clip) = Dispatcher::new().load_file(Path::new("sfx/jump.wav"))?;
//! println!("{}: {} at {}", kind, clip.layout, clip.sample_rate);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod cursor;
mod dispatch;
mod vorbis;
pub mod wav;

pub use dispatch::{ContainerKind, Dispatcher};
pub use vorbis::{decode_vorbis, VorbisDecoder};
pub use wav::{decode_wav, WavDecoder};

pub use pixel_core::{DecodeError, DecodedAudio, PcmClip, PcmLayout};
