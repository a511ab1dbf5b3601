//! Decoder selection and layout normalization
//!
//! Picks a decoder by file extension, falling back to content sniffing, and
//! turns the decoded result into a `PcmClip` the playback layer can upload.

use crate::vorbis::{self, VorbisDecoder};
use crate::wav::{self, WavDecoder};
use pixel_core::{AudioDecoder, DecodeError, DecodedAudio, PcmClip};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Container formats the dispatcher knows how to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// RIFF/WAVE with linear PCM
    Wav,
    /// Ogg Vorbis
    Vorbis,
}

impl ContainerKind {
    /// Guess the container from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "wav" | "wave" => Some(Self::Wav),
            "ogg" | "oga" => Some(Self::Vorbis),
            _ => None,
        }
    }

    /// Guess the container from its leading bytes
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if wav::is_wave(data) {
            Some(Self::Wav)
        } else if vorbis::is_ogg(data) {
            Some(Self::Vorbis)
        } else {
            None
        }
    }

    /// Extension first, then content
    pub fn detect(path: &Path, data: &[u8]) -> Option<Self> {
        Self::from_path(path).or_else(|| Self::sniff(data))
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wav => f.write_str("wav"),
            Self::Vorbis => f.write_str("ogg/vorbis"),
        }
    }
}

/// Routes container bytes to the matching decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct Dispatcher {
    wav: WavDecoder,
    vorbis: VorbisDecoder,
}

impl Dispatcher {
    /// Create a dispatcher with the built-in decoders
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder responsible for a container kind
    pub fn decoder_for(&self, kind: ContainerKind) -> &dyn AudioDecoder {
        match kind {
            ContainerKind::Wav => &self.wav,
            ContainerKind::Vorbis => &self.vorbis,
        }
    }

    /// Decode with the decoder for `kind`
    pub fn decode(&self, kind: ContainerKind, data: &[u8]) -> Result<DecodedAudio, DecodeError> {
        let decoder = self.decoder_for(kind);
        debug!(decoder = decoder.name(), bytes = data.len(), "Decoding");
        decoder.decode(data)
    }

    /// Decode in-memory bytes into a playable clip
    ///
    /// `hint` wins when given; otherwise the content is sniffed.
    pub fn load_clip(
        &self,
        data: &[u8],
        hint: Option<ContainerKind>,
    ) -> Result<(ContainerKind, PcmClip), DecodeError> {
        let kind = hint
            .or_else(|| ContainerKind::sniff(data))
            .ok_or_else(|| DecodeError::unsupported_format("unrecognized container"))?;
        let decoded = self.decode(kind, data)?;
        Ok((kind, PcmClip::from_decoded(decoded)?))
    }

    /// Read a whole file into memory and decode it into a playable clip
    pub fn load_file(&self, path: &Path) -> Result<(ContainerKind, PcmClip), DecodeError> {
        let data = std::fs::read(path)?;
        let kind = ContainerKind::detect(path, &data).ok_or_else(|| {
            DecodeError::unsupported_format(format!("cannot determine format of {}", path.display()))
        })?;

        let (kind, clip) = self.load_clip(&data, Some(kind))?;
        info!(
            path = %path.display(),
            format = %kind,
            layout = %clip.layout,
            sample_rate = clip.sample_rate.as_hz(),
            frames = clip.frames(),
            "Loaded audio file"
        );
        Ok((kind, clip))
    }
}
