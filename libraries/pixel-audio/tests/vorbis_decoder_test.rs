//! Ogg Vorbis decoder tests
//!
//! Tests for:
//! - Decoding real Ogg Vorbis streams to interleaved 16-bit PCM
//! - Channel order and byte order of the output
//! - Loading `.ogg` files through the dispatcher
//!
//! The fixtures under `tests/fixtures/` are regenerated with
//! `make_vorbis_fixtures.py`. Each holds one spectral line per channel with
//! 128 frames per audio packet.

use pixel_audio::{decode_vorbis, ContainerKind, Dispatcher, PcmLayout};
use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tempfile::TempDir;

const MONO_8K: &[u8] = include_bytes!("fixtures/tone_mono_8k.ogg");
const STEREO_22K: &[u8] = include_bytes!("fixtures/tone_stereo_22k.ogg");

const MONO_FRAMES: usize = 2_048;
const STEREO_FRAMES: usize = 1_024;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn samples_i16(data: &[u8]) -> Vec<i16> {
    data.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Planar f32 decode of the same stream, one `Vec` per channel
fn reference_planar(data: &[u8]) -> Vec<Vec<f32>> {
    let mss = MediaSourceStream::new(
        Box::new(std::io::Cursor::new(data.to_vec())),
        Default::default(),
    );
    let mut format = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .unwrap()
        .format;
    let track = format.default_track().unwrap();
    let channels = track.codec_params.channels.unwrap().count();
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .unwrap();

    let mut planes = vec![Vec::new(); channels];
    while let Ok(packet) = format.next_packet() {
        let decoded = decoder.decode(&packet).unwrap();
        let frames = decoded.frames();
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buf.copy_planar_ref(decoded);
        for (ch, plane) in planes.iter_mut().enumerate() {
            plane.extend_from_slice(&buf.samples()[ch * frames..(ch + 1) * frames]);
        }
    }
    planes
}

fn peak(samples: impl Iterator<Item = i16>) -> i32 {
    samples.map(|s| i32::from(s).abs()).max().unwrap_or(0)
}

// ============================================================================
// FORMAT
// ============================================================================

#[test]
fn test_mono_stream_format() {
    let audio = decode_vorbis(MONO_8K).unwrap();
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.sample_rate.as_hz(), 8_000);
    assert_eq!(audio.bits_per_sample, 16);
    assert_eq!(audio.data.len(), MONO_FRAMES * 2);
}

#[test]
fn test_stereo_stream_format() {
    let audio = decode_vorbis(STEREO_22K).unwrap();
    assert_eq!(audio.channels, 2);
    assert_eq!(audio.sample_rate.as_hz(), 22_050);
    assert_eq!(audio.bits_per_sample, 16);
    assert_eq!(audio.data.len(), STEREO_FRAMES * 2 * 2);
}

#[test]
fn test_payload_is_whole_frames() {
    for data in [MONO_8K, STEREO_22K] {
        let audio = decode_vorbis(data).unwrap();
        let frame_bytes = usize::from(audio.channels) * 2;
        assert_eq!(audio.data.len() % frame_bytes, 0);
        assert!(!audio.is_empty());
    }
}

// ============================================================================
// SAMPLE LAYOUT
// ============================================================================

#[test]
fn test_output_is_interleaved_little_endian() {
    let audio = decode_vorbis(STEREO_22K).unwrap();
    let samples = samples_i16(&audio.data);
    let planes = reference_planar(STEREO_22K);
    assert_eq!(planes.len(), 2);
    assert_eq!(planes[0].len(), STEREO_FRAMES);

    for (frame, pair) in samples.chunks_exact(2).enumerate() {
        for (ch, &sample) in pair.iter().enumerate() {
            let expected = planes[ch][frame] * 32_768.0;
            assert!(
                (f32::from(sample) - expected).abs() <= 1.0,
                "frame {} channel {}: got {}, expected {}",
                frame,
                ch,
                sample,
                expected
            );
        }
    }
}

#[test]
fn test_stereo_channel_order() {
    // Left carries the louder line
    let audio = decode_vorbis(STEREO_22K).unwrap();
    let samples = samples_i16(&audio.data);
    let left = peak(samples.iter().step_by(2).copied());
    let right = peak(samples.iter().skip(1).step_by(2).copied());

    assert!(right > 500, "right peak {}", right);
    assert!(left > 2 * right, "left peak {} vs right peak {}", left, right);
}

#[test]
fn test_mono_tone_is_audible() {
    let audio = decode_vorbis(MONO_8K).unwrap();
    let samples = samples_i16(&audio.data);
    assert!(peak(samples.iter().copied()) > 4_000);
    assert!(samples.iter().any(|&s| s < 0));
}

#[test]
fn test_truncated_stream_fails() {
    assert!(decode_vorbis(&MONO_8K[..100]).is_err());
    assert!(decode_vorbis(&MONO_8K[..4]).is_err());
}

// ============================================================================
// DISPATCH
// ============================================================================

#[test]
fn test_load_ogg_file_mono() {
    let (kind, clip) = Dispatcher::new()
        .load_file(&fixture_path("tone_mono_8k.ogg"))
        .unwrap();
    assert_eq!(kind, ContainerKind::Vorbis);
    assert_eq!(clip.layout, PcmLayout::Mono16);
    assert_eq!(clip.sample_rate.as_hz(), 8_000);
    assert_eq!(clip.frames(), MONO_FRAMES);
    assert!((clip.duration_secs() - 0.256).abs() < 1e-9);
}

#[test]
fn test_load_ogg_file_stereo() {
    let (kind, clip) = Dispatcher::new()
        .load_file(&fixture_path("tone_stereo_22k.ogg"))
        .unwrap();
    assert_eq!(kind, ContainerKind::Vorbis);
    assert_eq!(clip.layout, PcmLayout::Stereo16);
    assert_eq!(clip.sample_rate.as_hz(), 22_050);
    assert_eq!(clip.frames(), STEREO_FRAMES);
}

#[test]
fn test_ogg_without_extension_is_sniffed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone");
    std::fs::write(&path, STEREO_22K).unwrap();

    let (kind, clip) = Dispatcher::new().load_file(&path).unwrap();
    assert_eq!(kind, ContainerKind::Vorbis);
    assert_eq!(clip.layout, PcmLayout::Stereo16);
}

#[test]
fn test_dispatcher_matches_direct_decode() {
    let direct = decode_vorbis(MONO_8K).unwrap();
    let (_, clip) = Dispatcher::new()
        .load_clip(MONO_8K, Some(ContainerKind::Vorbis))
        .unwrap();
    assert_eq!(clip.data, direct.data);
}
