/// Core traits for Pixel Audio
use crate::error::DecodeError;
use crate::types::DecodedAudio;
use std::path::Path;

/// Audio decoder trait
///
/// Implementers decode a complete, in-memory container into a complete
/// in-memory PCM buffer. There is no streaming mode: the input is fully
/// resident before decoding begins.
///
/// Decoders hold no state between calls, so a single instance can be shared
/// across threads.
pub trait AudioDecoder: Send + Sync {
    /// Short human readable name, used in logs
    fn name(&self) -> &'static str;

    /// Decode a complete container held in memory
    ///
    /// # Errors
    /// Returns an error if the bytes are truncated, structurally invalid,
    /// or not in a format this decoder understands
    fn decode(&self, data: &[u8]) -> Result<DecodedAudio, DecodeError>;

    /// Check if the decoder supports the given file by extension
    fn supports_format(&self, path: &Path) -> bool;

    /// Check if the leading bytes look like this decoder's container
    fn sniff(&self, data: &[u8]) -> bool;
}
