/// Ogg Vorbis decoding via Symphonia
use pixel_core::{AudioDecoder, DecodeError, DecodedAudio, SampleRate};
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Ogg page capture pattern
pub const OGG_MAGIC: &[u8; 4] = b"OggS";

/// Ogg Vorbis decoder
///
/// Treats Symphonia as an opaque library: the whole stream is decoded up
/// front and returned as interleaved signed 16-bit little-endian PCM.
#[derive(Debug, Default, Clone, Copy)]
pub struct VorbisDecoder;

impl VorbisDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }
}

fn symphonia_err(context: &str, err: &SymphoniaError) -> DecodeError {
    DecodeError::Vorbis(format!("{}: {}", context, err))
}

/// Decode a complete Ogg Vorbis stream held in memory
pub fn decode_vorbis(data: &[u8]) -> Result<DecodedAudio, DecodeError> {
    // Symphonia wants an owned media source
    let source = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(source), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("ogg");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| symphonia_err("Failed to probe stream", &e))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::Vorbis("No audio tracks found".to_string()))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| symphonia_err("Failed to create decoder", &e))?;

    let mut pcm: Vec<u8> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<i16>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(symphonia_err("Error reading packet", &e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping undecodable Vorbis packet: {}", e);
                continue;
            }
            Err(e) => return Err(symphonia_err("Decode error", &e)),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channels = spec.channels.count() as u16;

        // Reuse the conversion buffer unless this packet is larger
        let needed = decoded.capacity() * spec.channels.count();
        if sample_buf.as_ref().map_or(true, |b| b.capacity() < needed) {
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        pcm.reserve(buf.samples().len() * 2);
        for sample in buf.samples() {
            pcm.extend_from_slice(&sample.to_le_bytes());
        }
    }

    if channels == 0 || sample_rate == 0 {
        return Err(DecodeError::Vorbis(
            "Stream did not declare channels or sample rate".to_string(),
        ));
    }

    debug!(
        channels,
        sample_rate,
        payload_bytes = pcm.len(),
        "Decoded Ogg Vorbis"
    );

    Ok(DecodedAudio::new(
        channels,
        SampleRate::new(sample_rate),
        16,
        pcm,
    ))
}

/// Check for the Ogg capture pattern
pub fn is_ogg(data: &[u8]) -> bool {
    data.len() >= 4 && &data[0..4] == OGG_MAGIC
}

impl AudioDecoder for VorbisDecoder {
    fn name(&self) -> &'static str {
        "vorbis"
    }

    fn decode(&self, data: &[u8]) -> Result<DecodedAudio, DecodeError> {
        decode_vorbis(data)
    }

    fn supports_format(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ogg" | "oga"))
    }

    fn sniff(&self, data: &[u8]) -> bool {
        is_ogg(data)
    }
}
