//! Audio session
//!
//! An `AudioSession` is the explicit device context: opening one starts the
//! output backend, closing it (or dropping it) stops the backend and
//! releases every buffer and source created through it.

use crate::backend::OutputBackend;
use crate::config::{is_valid_pitch, is_valid_volume, SessionConfig};
use crate::error::{PlaybackError, Result};
use crate::mixer::{Mixer, SourceState};
use pixel_audio::{ContainerKind, Dispatcher};
use pixel_core::{BufferId, PcmClip, SourceId};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Per-source playback parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayOptions {
    /// Restart from the beginning when the end is reached
    pub looping: bool,
    /// Linear gain, finite and >= 0.0
    pub volume: f32,
    /// Playback speed factor, finite and > 0.0
    pub pitch: f32,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            looping: false,
            volume: 1.0,
            pitch: 1.0,
        }
    }
}

impl PlayOptions {
    #[must_use]
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    #[must_use]
    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    #[must_use]
    pub fn pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }
}

/// Open playback session over an output backend
pub struct AudioSession<B: OutputBackend> {
    config: SessionConfig,
    backend: B,
    mixer: Arc<Mutex<Mixer>>,
    dispatcher: Dispatcher,
    closed: bool,
}

impl<B: OutputBackend> AudioSession<B> {
    /// Open a session and start the backend
    pub fn open(config: SessionConfig, mut backend: B) -> Result<Self> {
        config.validate()?;

        let sample_rate = backend.sample_rate();
        let channels = backend.channels();
        if sample_rate == 0 || channels == 0 {
            return Err(PlaybackError::device(format!(
                "{} backend reports {} Hz with {} channel(s)",
                backend.name(),
                sample_rate,
                channels
            )));
        }

        let mixer = Arc::new(Mutex::new(Mixer::new(
            sample_rate,
            channels,
            config.master_volume,
        )));
        backend.start(Arc::clone(&mixer))?;

        info!(
            backend = backend.name(),
            sample_rate,
            channels,
            max_sources = config.max_sources,
            "Audio session opened"
        );

        Ok(Self {
            config,
            backend,
            mixer,
            dispatcher: Dispatcher::new(),
            closed: false,
        })
    }

    /// Stop the backend and release every buffer and source
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = self.backend.stop();
        let (buffers, sources) = {
            let mut mixer = self.lock();
            let counts = (mixer.buffer_count(), mixer.source_count());
            mixer.clear();
            counts
        };
        info!(buffers, sources, "Audio session closed");
        result
    }

    fn lock(&self) -> MutexGuard<'_, Mixer> {
        self.mixer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Shared mixer handle, as seen by the backend
    pub fn mixer(&self) -> Arc<Mutex<Mixer>> {
        Arc::clone(&self.mixer)
    }

    /// Options built from the configured default volume and pitch
    pub fn default_options(&self) -> PlayOptions {
        PlayOptions {
            looping: false,
            volume: self.config.default_volume,
            pitch: self.config.default_pitch,
        }
    }

    /// Set the gain applied to the whole mix
    pub fn set_master_volume(&mut self, volume: f32) -> Result<()> {
        if !is_valid_volume(volume) {
            return Err(PlaybackError::InvalidVolume(volume));
        }
        self.config.master_volume = volume;
        self.lock().set_master_volume(volume);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Buffers
    // ------------------------------------------------------------------

    /// Upload a clip and return its buffer handle
    pub fn load_clip(&mut self, clip: &PcmClip) -> Result<BufferId> {
        let id = self.lock().add_buffer(clip);
        debug!(
            buffer = %id,
            layout = %clip.layout,
            sample_rate = clip.sample_rate.as_hz(),
            frames = clip.frames(),
            "Buffer loaded"
        );
        Ok(id)
    }

    /// Decode an in-memory container and upload it
    pub fn load_memory(&mut self, data: &[u8], hint: Option<ContainerKind>) -> Result<BufferId> {
        let (_, clip) = self.dispatcher.load_clip(data, hint)?;
        self.load_clip(&clip)
    }

    /// Read, decode and upload a file
    pub fn load_file(&mut self, path: &Path) -> Result<BufferId> {
        let (_, clip) = self.dispatcher.load_file(path)?;
        self.load_clip(&clip)
    }

    /// Release a buffer
    ///
    /// # Errors
    /// `BufferInUse` while any source still references it, `UnknownBuffer`
    /// for a stale handle
    pub fn unload(&mut self, buffer: BufferId) -> Result<()> {
        self.lock().remove_buffer(buffer)?;
        debug!(buffer = %buffer, "Buffer unloaded");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------

    /// Create a source bound to `buffer` and start it
    pub fn play(&mut self, buffer: BufferId, options: PlayOptions) -> Result<SourceId> {
        if !is_valid_volume(options.volume) {
            return Err(PlaybackError::InvalidVolume(options.volume));
        }
        if !is_valid_pitch(options.pitch) {
            return Err(PlaybackError::InvalidPitch(options.pitch));
        }

        let max_sources = self.config.max_sources;
        let mut mixer = self.lock();
        if mixer.source_count() >= max_sources {
            warn!(max_sources, "Source limit reached");
            return Err(PlaybackError::SourceLimit(max_sources));
        }
        let source = mixer.add_voice(buffer, options.looping, options.volume, options.pitch)?;
        debug!(source = %source, buffer = %buffer, looping = options.looping, "Source playing");
        Ok(source)
    }

    /// Pause a playing source; other states are left alone
    pub fn pause(&mut self, source: SourceId) -> Result<()> {
        let mut mixer = self.lock();
        let voice = mixer.voice_mut(source)?;
        if voice.state == SourceState::Playing {
            voice.state = SourceState::Paused;
        }
        Ok(())
    }

    /// Continue a paused source, start an initial one, or restart a
    /// stopped one from the beginning
    pub fn resume(&mut self, source: SourceId) -> Result<()> {
        let mut mixer = self.lock();
        let voice = mixer.voice_mut(source)?;
        match voice.state {
            SourceState::Playing => {}
            SourceState::Paused | SourceState::Initial => voice.state = SourceState::Playing,
            SourceState::Stopped => {
                voice.position = 0.0;
                voice.state = SourceState::Playing;
            }
        }
        Ok(())
    }

    /// Move back to the start; the source is left in `Initial` state
    pub fn rewind(&mut self, source: SourceId) -> Result<()> {
        let mut mixer = self.lock();
        let voice = mixer.voice_mut(source)?;
        voice.position = 0.0;
        voice.state = SourceState::Initial;
        Ok(())
    }

    /// Stop and delete a source; the handle becomes stale
    pub fn stop(&mut self, source: SourceId) -> Result<()> {
        let voice = self.lock().remove_voice(source)?;
        debug!(source = %source, buffer = %voice.buffer, "Source stopped");
        Ok(())
    }

    pub fn volume(&self, source: SourceId) -> Result<f32> {
        Ok(self.lock().voice(source)?.volume)
    }

    pub fn set_volume(&mut self, source: SourceId, volume: f32) -> Result<()> {
        if !is_valid_volume(volume) {
            return Err(PlaybackError::InvalidVolume(volume));
        }
        self.lock().voice_mut(source)?.volume = volume;
        Ok(())
    }

    pub fn is_playing(&self, source: SourceId) -> Result<bool> {
        Ok(self.source_state(source)? == SourceState::Playing)
    }

    pub fn source_state(&self, source: SourceId) -> Result<SourceState> {
        Ok(self.lock().voice(source)?.state)
    }

    /// Delete every source that has reached the end of its buffer
    pub fn prune_stopped(&mut self) -> Vec<SourceId> {
        let pruned = self.lock().prune_stopped();
        if !pruned.is_empty() {
            debug!(count = pruned.len(), "Pruned stopped sources");
        }
        pruned
    }
}

impl<B: OutputBackend> Drop for AudioSession<B> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "Failed to close audio session");
        }
    }
}
