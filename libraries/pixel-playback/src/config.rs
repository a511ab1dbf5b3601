/// Session configuration
use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// Settings applied when a session is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of live sources
    pub max_sources: usize,

    /// Gain applied to the whole mix
    pub master_volume: f32,

    /// Volume used by `AudioSession::default_options`
    pub default_volume: f32,

    /// Pitch used by `AudioSession::default_options`
    pub default_pitch: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sources: 64,
            master_volume: 1.0,
            default_volume: 1.0,
            default_pitch: 1.0,
        }
    }
}

impl SessionConfig {
    /// Check every field
    pub fn validate(&self) -> Result<()> {
        if self.max_sources == 0 {
            return Err(PlaybackError::InvalidConfig(
                "max_sources must be at least 1".to_string(),
            ));
        }
        if !is_valid_volume(self.master_volume) {
            return Err(PlaybackError::InvalidConfig(format!(
                "master_volume {} must be finite and >= 0.0",
                self.master_volume
            )));
        }
        if !is_valid_volume(self.default_volume) {
            return Err(PlaybackError::InvalidConfig(format!(
                "default_volume {} must be finite and >= 0.0",
                self.default_volume
            )));
        }
        if !is_valid_pitch(self.default_pitch) {
            return Err(PlaybackError::InvalidConfig(format!(
                "default_pitch {} must be finite and > 0.0",
                self.default_pitch
            )));
        }
        Ok(())
    }
}

pub(crate) fn is_valid_volume(volume: f32) -> bool {
    volume.is_finite() && volume >= 0.0
}

pub(crate) fn is_valid_pitch(pitch: f32) -> bool {
    pitch.is_finite() && pitch > 0.0
}
