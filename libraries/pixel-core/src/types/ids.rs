/// Opaque handle types for playback resources
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an uploaded PCM buffer
///
/// Deliberately not convertible from a bare integer outside this crate's
/// constructors, and distinct from `SourceId`, so a buffer handle can never
/// be passed where a source handle is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BufferId(u32);

impl BufferId {
    /// Create a buffer ID from its raw value
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw value
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

/// Handle to a playing (or paused/stopped) source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(u32);

impl SourceId {
    /// Create a source ID from its raw value
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw value
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}
