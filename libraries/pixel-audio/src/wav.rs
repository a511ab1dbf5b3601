//! RIFF/WAVE container parsing
//!
//! Decodes a complete WAVE file held in memory into its format fields and
//! an owned copy of the `data` chunk. Only the canonical layout is
//! understood: a `RIFF`/`WAVE` header, a `fmt ` chunk immediately after it,
//! then any number of chunks of which the first `data` chunk is the payload.
//!
//! Every size read from the input is checked against the bytes actually
//! present before it is acted on.

use crate::cursor::ByteCursor;
use pixel_core::{AudioDecoder, DecodeError, DecodedAudio, SampleRate};
use std::path::Path;
use tracing::{debug, trace, warn};

/// WAV format magic numbers
pub const RIFF_MAGIC: &[u8; 4] = b"RIFF";
pub const WAVE_MAGIC: &[u8; 4] = b"WAVE";
pub const FMT_CHUNK: &[u8; 4] = b"fmt ";
pub const DATA_CHUNK: &[u8; 4] = b"data";

/// Size of the canonical `fmt ` body (everything after tag and size)
pub const CANONICAL_FMT_SIZE: u32 = 16;

/// Top-level RIFF header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiffHeader {
    /// Declared size of everything after the size field (not validated)
    pub size: u32,
}

/// Chunk header (4 byte ID + 4 byte size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: [u8; 4],
    pub size: u32,
}

/// WAV format chunk data
///
/// Only `channels`, `sample_rate` and `bits_per_sample` matter downstream;
/// the rest is kept for diagnostics and never validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatChunk {
    /// Declared chunk size
    pub size: u32,
    /// Format tag (1 = PCM)
    pub format_code: u16,
    /// Number of channels
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Average bytes per second
    pub byte_rate: u32,
    /// Block alignment
    pub block_align: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
}

fn tag_name(tag: [u8; 4]) -> String {
    tag.escape_ascii().to_string()
}

fn expect_tag(found: [u8; 4], expected: [u8; 4]) -> Result<(), DecodeError> {
    if found != expected {
        return Err(DecodeError::invalid_container(format!(
            "expected \"{}\", found \"{}\"",
            tag_name(expected),
            tag_name(found)
        )));
    }
    Ok(())
}

/// Read and verify the 12-byte `RIFF....WAVE` header
pub fn read_riff_header(cursor: &mut ByteCursor<'_>) -> Result<RiffHeader, DecodeError> {
    let id = cursor.read_tag()?;
    let size = cursor.read_u32_le()?;
    let format = cursor.read_tag()?;

    expect_tag(id, *RIFF_MAGIC)?;
    expect_tag(format, *WAVE_MAGIC)?;

    Ok(RiffHeader { size })
}

/// Read a chunk header (tag + declared size)
pub fn read_chunk_header(cursor: &mut ByteCursor<'_>) -> Result<ChunkHeader, DecodeError> {
    let id = cursor.read_tag()?;
    let size = cursor.read_u32_le()?;
    Ok(ChunkHeader { id, size })
}

/// Read the `fmt ` chunk that must directly follow the RIFF header
///
/// Extension bytes beyond the canonical 16-byte body are skipped so the
/// scanner resumes at the next real chunk header.
pub fn read_format_chunk(cursor: &mut ByteCursor<'_>) -> Result<FormatChunk, DecodeError> {
    let header = read_chunk_header(cursor)?;
    let format_code = cursor.read_u16_le()?;
    let channels = cursor.read_u16_le()?;
    let sample_rate = cursor.read_u32_le()?;
    let byte_rate = cursor.read_u32_le()?;
    let block_align = cursor.read_u16_le()?;
    let bits_per_sample = cursor.read_u16_le()?;

    expect_tag(header.id, *FMT_CHUNK)?;

    if header.size > CANONICAL_FMT_SIZE {
        let extra = (header.size - CANONICAL_FMT_SIZE) as usize;
        trace!(extra, "Skipping fmt extension bytes");
        cursor.skip(extra)?;
    } else if header.size < CANONICAL_FMT_SIZE {
        warn!(
            declared = header.size,
            "fmt chunk declares fewer than 16 bytes, reading canonical layout anyway"
        );
    }

    Ok(FormatChunk {
        size: header.size,
        format_code,
        channels,
        sample_rate,
        byte_rate,
        block_align,
        bits_per_sample,
    })
}

/// Walk chunks until the first `data` chunk and return its header
///
/// The cursor is left at the first payload byte. Every other chunk is
/// skipped by exactly its declared size.
pub fn find_data_chunk(cursor: &mut ByteCursor<'_>) -> Result<ChunkHeader, DecodeError> {
    loop {
        let header = read_chunk_header(cursor)?;
        if &header.id == DATA_CHUNK {
            return Ok(header);
        }

        trace!(
            chunk = %tag_name(header.id),
            size = header.size,
            offset = cursor.position(),
            "Skipping chunk"
        );
        cursor.skip(header.size as usize)?;
    }
}

/// Decode a complete WAVE file held in memory
///
/// # Errors
/// - `TruncatedInput` if any field, skipped chunk or the payload runs past
///   the end of `data`
/// - `InvalidContainer` if the `RIFF`, `WAVE` or `fmt ` tags are wrong
pub fn decode_wav(data: &[u8]) -> Result<DecodedAudio, DecodeError> {
    let mut cursor = ByteCursor::new(data);

    read_riff_header(&mut cursor)?;
    let format = read_format_chunk(&mut cursor)?;
    let data_chunk = find_data_chunk(&mut cursor)?;

    let payload = cursor.read_bytes(data_chunk.size as usize)?.to_vec();

    debug!(
        channels = format.channels,
        sample_rate = format.sample_rate,
        bits_per_sample = format.bits_per_sample,
        format_code = format.format_code,
        payload_bytes = payload.len(),
        "Decoded WAVE"
    );

    Ok(DecodedAudio::new(
        format.channels,
        SampleRate::new(format.sample_rate),
        format.bits_per_sample,
        payload,
    ))
}

/// Check for the `RIFF....WAVE` signature
pub fn is_wave(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == RIFF_MAGIC && &data[8..12] == WAVE_MAGIC
}

/// WAVE decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl WavDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for WavDecoder {
    fn name(&self) -> &'static str {
        "wav"
    }

    fn decode(&self, data: &[u8]) -> Result<DecodedAudio, DecodeError> {
        decode_wav(data)
    }

    fn supports_format(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "wav" | "wave"))
    }

    fn sniff(&self, data: &[u8]) -> bool {
        is_wave(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes
    }

    fn fmt_bytes(size: u32, channels: u16, rate: u32, bits: u16) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&size.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&rate.to_le_bytes());
        bytes.extend_from_slice(&(rate * u32::from(channels) * u32::from(bits) / 8).to_le_bytes());
        bytes.extend_from_slice(&(channels * bits / 8).to_le_bytes());
        bytes.extend_from_slice(&bits.to_le_bytes());
        bytes
    }

    #[test]
    fn riff_header_requires_both_tags() {
        let bytes = header_bytes();
        assert!(read_riff_header(&mut ByteCursor::new(&bytes)).is_ok());

        let mut bad = bytes.clone();
        bad[8..12].copy_from_slice(b"AVI ");
        let err = read_riff_header(&mut ByteCursor::new(&bad)).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidContainer(_)));
        assert!(err.to_string().contains("WAVE"));
    }

    #[test]
    fn riff_header_short_input_is_truncated() {
        let bytes = header_bytes();
        let err = read_riff_header(&mut ByteCursor::new(&bytes[..11])).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn format_chunk_fields() {
        let bytes = fmt_bytes(16, 2, 44_100, 16);
        let mut cursor = ByteCursor::new(&bytes);
        let fmt = read_format_chunk(&mut cursor).unwrap();
        assert_eq!(fmt.channels, 2);
        assert_eq!(fmt.sample_rate, 44_100);
        assert_eq!(fmt.bits_per_sample, 16);
        assert_eq!(fmt.block_align, 4);
        assert_eq!(fmt.byte_rate, 176_400);
        assert_eq!(cursor.position(), 24);
    }

    #[test]
    fn format_chunk_skips_extension() {
        let mut bytes = fmt_bytes(18, 1, 8_000, 8);
        bytes.extend_from_slice(&0u16.to_le_bytes()); // cbSize
        bytes.extend_from_slice(b"data");
        let mut cursor = ByteCursor::new(&bytes);
        read_format_chunk(&mut cursor).unwrap();
        assert_eq!(cursor.position(), 26);
        assert_eq!(&cursor.read_tag().unwrap(), b"data");
    }

    #[test]
    fn format_chunk_extension_past_end_is_truncated() {
        let bytes = fmt_bytes(64, 1, 8_000, 8);
        let err = read_format_chunk(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn format_chunk_tag_checked() {
        let mut bytes = fmt_bytes(16, 1, 8_000, 8);
        bytes[0..4].copy_from_slice(b"junk");
        let err = read_format_chunk(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidContainer(_)));
    }

    #[test]
    fn format_chunk_accepts_undersized_declaration() {
        let bytes = fmt_bytes(14, 1, 8_000, 16);
        let fmt = read_format_chunk(&mut ByteCursor::new(&bytes)).unwrap();
        assert_eq!(fmt.size, 14);
        assert_eq!(fmt.bits_per_sample, 16);
    }

    #[test]
    fn scanner_skips_until_data() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&[9, 9, 9]);
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2]);

        let mut cursor = ByteCursor::new(&bytes);
        let data = find_data_chunk(&mut cursor).unwrap();
        assert_eq!(data.size, 2);
        assert_eq!(cursor.position(), 19);
    }

    #[test]
    fn scanner_fails_eagerly_on_oversized_skip() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"junk");
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&[0; 32]);

        let mut cursor = ByteCursor::new(&bytes);
        let err = find_data_chunk(&mut cursor).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedInput { remaining: 32, .. }
        ));
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn scanner_without_data_chunk_is_truncated() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let err = find_data_chunk(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn is_wave_sniff() {
        let mut bytes = header_bytes();
        assert!(is_wave(&bytes));
        bytes[0] = b'X';
        assert!(!is_wave(&bytes));
        assert!(!is_wave(b"RIFF"));
    }

    #[test]
    fn supports_wav_extensions() {
        let decoder = WavDecoder::new();
        assert!(decoder.supports_format(Path::new("boom.wav")));
        assert!(decoder.supports_format(Path::new("BOOM.WAV")));
        assert!(decoder.supports_format(Path::new("boom.wave")));
        assert!(!decoder.supports_format(Path::new("boom.ogg")));
        assert!(!decoder.supports_format(Path::new("boom")));
    }
}
