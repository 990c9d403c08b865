//! Keeps a display in step with audio playback.
//!
//! The host drives a [`Synchronizer`] with one [`Synchronizer::tick`] per
//! display frame while audio plays, plus the `play` and `ended` transport
//! events. Text changes go through a two-step fade: the old text fades out,
//! the new text is swapped in and fades in. Only one change is in flight at
//! a time; changes seen meanwhile are picked up again by a later tick.

use crate::config::SyncConfig;
use crate::error::SubsyncError;
use crate::parser::Parser;
use crate::srt::SubtitleSet;

use std::fmt;
use std::time::Duration;

use tracing::{debug, error, info, trace};

/// Source of the media position.
pub trait PlaybackClock {
    fn current_time(&self) -> Duration;
    /// True when neither paused nor ended.
    fn is_playing(&self) -> bool;
}

/// Where the subtitle text ends up.
pub trait DisplaySink {
    fn set_text(&mut self, text: &str);
    fn set_visual_state(&mut self, state: VisualState);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Active,
    Placeholder,
    FadingOut,
}

impl fmt::Display for VisualState {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            VisualState::Active => "active",
            VisualState::Placeholder => "placeholder",
            VisualState::FadingOut => "fading-out",
        };
        write!(fmt, "{}", name)
    }
}

/// Text of the first segment containing `t`, bounds inclusive. Earlier
/// segments win when intervals overlap.
pub fn find_active(segments: &SubtitleSet, t: Duration) -> Option<&str> {
    segments
        .iter()
        .find(|segment| segment.contains(t))
        .map(|segment| segment.text.as_str())
}

/// Deadlines are host times, not media times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle,
    TransitioningOut {
        target: Option<String>,
        swap_at: Duration,
    },
    TransitioningIn {
        settle_at: Duration,
    },
}

impl AnimationPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, AnimationPhase::Idle)
    }
}

impl Default for AnimationPhase {
    fn default() -> Self {
        AnimationPhase::Idle
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// `None` when nothing, or the placeholder, is shown.
    pub last_shown: Option<String>,
    pub phase: AnimationPhase,
}

/// Whether the host should schedule another tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Continue,
    Stop,
}

pub struct Synchronizer<D> {
    config: SyncConfig,
    parser: Parser,
    segments: SubtitleSet,
    state: DisplayState,
    display: D,
    armed: bool,
    showing_title: bool,
}

impl<D: DisplaySink> Synchronizer<D> {
    /// The display is assumed to show the page title until the first text
    /// change.
    pub fn new(display: D, config: SyncConfig) -> Self {
        Self {
            config,
            parser: Parser::new(),
            segments: SubtitleSet::default(),
            state: DisplayState::default(),
            display,
            armed: false,
            showing_title: true,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn segments(&self) -> &SubtitleSet {
        &self.segments
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn into_display(self) -> D {
        self.display
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Replaces the whole set; later ticks see only the new one.
    pub fn set_segments(&mut self, segments: SubtitleSet) {
        info!("Loaded {} subtitles", segments.len());
        self.segments = segments;
    }

    /// Takes the outcome of fetching the subtitle file. A failure is shown
    /// on the display and not retried.
    pub fn load<E: fmt::Display>(
        &mut self,
        fetched: Result<String, E>,
    ) -> Result<usize, SubsyncError> {
        match fetched {
            Ok(raw) => {
                let segments = self.parser.parse(&raw);
                let count = segments.len();
                self.set_segments(segments);
                Ok(count)
            }
            Err(err) => {
                error!("Subtitle load failed: {}", err);
                self.display.set_text(&self.config.load_failed_message);
                self.showing_title = false;
                Err(SubsyncError::LoadFailed(err.to_string()))
            }
        }
    }

    /// Playback started. Returns true when the host must start requesting
    /// frames; false when a frame loop is already running.
    pub fn on_play(&mut self) -> bool {
        if self.showing_title {
            self.display.set_visual_state(VisualState::Placeholder);
        }
        if self.armed {
            return false;
        }
        info!("Playback started");
        self.armed = true;
        true
    }

    /// Playback reached the end. Overrides whatever is on screen, including
    /// a change in progress.
    pub fn on_ended(&mut self) {
        info!("Playback ended");
        if !self.state.phase.is_idle() {
            debug!("Dropping transition in progress: {:?}", self.state.phase);
        }
        self.state = DisplayState::default();
        self.showing_title = false;
        self.display.set_text(&self.config.ended_message);
        self.display.set_visual_state(VisualState::Placeholder);
    }

    /// One display frame at host time `now`.
    pub fn tick<C: PlaybackClock + ?Sized>(&mut self, clock: &C, now: Duration) -> Frame {
        self.run_due(now);

        if !clock.is_playing() {
            self.armed = false;
            return Frame::Stop;
        }

        let active = find_active(&self.segments, clock.current_time());
        if active == self.state.last_shown.as_deref() {
            return Frame::Continue;
        }
        if !self.state.phase.is_idle() {
            trace!("Change to {:?} deferred, transition in progress", active);
            return Frame::Continue;
        }

        let target = active.map(str::to_owned);
        self.begin_transition(target, now);
        Frame::Continue
    }

    /// Completes every phase whose deadline is at or before `now`. Called by
    /// `tick`; hosts may also call it while paused.
    pub fn run_due(&mut self, now: Duration) {
        loop {
            match std::mem::take(&mut self.state.phase) {
                AnimationPhase::TransitioningOut { target, swap_at } if swap_at <= now => {
                    self.swap_text(target);
                    self.state.phase = AnimationPhase::TransitioningIn {
                        settle_at: swap_at + self.config.fade_in,
                    };
                }
                AnimationPhase::TransitioningIn { settle_at } if settle_at <= now => {
                    trace!("Transition settled at {:?}", settle_at);
                }
                phase => {
                    self.state.phase = phase;
                    return;
                }
            }
        }
    }

    fn begin_transition(&mut self, target: Option<String>, now: Duration) {
        debug!("Transition to {:?} at {:?}", target, now);
        self.display.set_visual_state(VisualState::FadingOut);
        self.state.phase = AnimationPhase::TransitioningOut {
            target,
            swap_at: now + self.config.fade_out,
        };
    }

    fn swap_text(&mut self, target: Option<String>) {
        match &target {
            Some(text) => {
                self.display.set_text(text);
                self.display.set_visual_state(VisualState::Active);
            }
            None => {
                self.display.set_text(&self.config.placeholder);
                self.display.set_visual_state(VisualState::Placeholder);
            }
        }
        self.state.last_shown = target;
        self.showing_title = false;
    }
}
