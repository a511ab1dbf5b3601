mod audio;
mod ids;

pub use audio::{DecodedAudio, PcmClip, PcmLayout, SampleRate};
pub use ids::{BufferId, SourceId};
