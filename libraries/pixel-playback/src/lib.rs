//! Pixel Audio playback
//!
//! Buffer/source playback on top of the decoders in `pixel-audio`.
//!
//! - `AudioSession`: the device context. Buffers and sources are addressed
//!   by `BufferId` and `SourceId` handles and live until unloaded, stopped
//!   or until the session closes.
//! - `Mixer`: software mixer rendering every playing source at the device
//!   rate, with per-source volume and pitch.
//! - `OutputBackend`: where rendered frames go. `NullBackend` is always
//!   available; `CpalBackend` needs the `cpal-output` feature.
//!
//! # Example
//!
//! ```rust
//! use pixel_core::{PcmClip, PcmLayout, SampleRate};
//! use pixel_playback::{AudioSession, NullBackend, PlayOptions, SessionConfig, SourceState};
//!
//! let mut session = AudioSession::open(SessionConfig::default(), NullBackend::new(8_000, 1))?;
//! let clip = PcmClip {
//!     layout: PcmLayout::Mono8,
//!     sample_rate: SampleRate::new(8_000),
//!     data: vec![128; 4],
//! };
//! let buffer = session.load_clip(&clip)?;
//! let source = session.play(buffer, PlayOptions::default())?;
//!
//! session.backend().render(8);
//! assert_eq!(session.source_state(source)?, SourceState::Stopped);
//!
//! session.close()?;
//! # Ok::<(), pixel_playback::PlaybackError>(())
//! ```

#![forbid(unsafe_code)]

mod backend;
mod config;
#[cfg(feature = "cpal-output")]
mod cpal_backend;
mod error;
mod mixer;
mod session;

pub use backend::{NullBackend, OutputBackend};
pub use config::SessionConfig;
#[cfg(feature = "cpal-output")]
pub use cpal_backend::CpalBackend;
pub use error::{PlaybackError, Result};
pub use mixer::{Mixer, SourceState};
pub use session::{AudioSession, PlayOptions};

pub use pixel_core::{BufferId, SourceId};
