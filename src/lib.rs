//! Subtitle timing for audio playback: parse SRT cues and keep a display in
//! step with the playback position.

pub mod config;
pub mod error;
pub mod parser;
pub mod replay;
pub mod serialiser;
pub mod srt;
pub mod sync;

pub use crate::config::SyncConfig;
pub use crate::error::SubsyncError;
pub use crate::parser::{parse, Parser};
pub use crate::srt::{Segment, SubtitleSet};
pub use crate::sync::{
    find_active, AnimationPhase, DisplaySink, DisplayState, Frame, PlaybackClock, Synchronizer,
    VisualState,
};
