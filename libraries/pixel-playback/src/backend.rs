//! Output backend abstraction
//!
//! A backend owns the connection to an audio device. Once started it pulls
//! interleaved f32 frames from the shared [`Mixer`] at its own pace.

use crate::error::Result;
use crate::mixer::Mixer;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Audio output backend trait
pub trait OutputBackend: Send {
    /// Get the backend name
    fn name(&self) -> &'static str;

    /// Device sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Device channel count
    fn channels(&self) -> u16;

    /// Begin pulling frames from `mixer`
    fn start(&mut self, mixer: Arc<Mutex<Mixer>>) -> Result<()>;

    /// Stop pulling frames and release the device
    ///
    /// Calling `stop` on a backend that is not running is a no-op.
    fn stop(&mut self) -> Result<()>;
}

/// Backend without a device
///
/// Nothing is rendered unless the caller pumps [`NullBackend::render`].
/// Used by tests and headless tools.
#[derive(Debug)]
pub struct NullBackend {
    sample_rate: u32,
    channels: u16,
    mixer: Option<Arc<Mutex<Mixer>>>,
}

impl NullBackend {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            mixer: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.mixer.is_some()
    }

    /// Render `frames` frames the way a device callback would
    ///
    /// Returns an empty vector when the backend is not running.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let Some(mixer) = &self.mixer else {
            return Vec::new();
        };
        let mut out = vec![0.0; frames * usize::from(self.channels)];
        mixer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .render(&mut out);
        out
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new(44_100, 2)
    }
}

impl OutputBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn start(&mut self, mixer: Arc<Mutex<Mixer>>) -> Result<()> {
        debug!(sample_rate = self.sample_rate, channels = self.channels, "Null backend started");
        self.mixer = Some(mixer);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.mixer.take().is_some() {
            debug!("Null backend stopped");
        }
        Ok(())
    }
}
