//! A deterministic host for the synchronizer: a simulated audio transport,
//! a display that writes a transcript, and a frame loop tying them together.

use crate::config::SyncConfig;
use crate::serialiser::format_timestamp;
use crate::sync::{DisplaySink, Frame, PlaybackClock, Synchronizer, VisualState};

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Paused,
    Playing,
    Ended,
}

/// Audio of a fixed length whose position only moves when advanced.
#[derive(Debug, Clone)]
pub struct SimulatedAudio {
    position: Duration,
    length: Duration,
    transport: Transport,
}

impl SimulatedAudio {
    pub fn new(length: Duration) -> Self {
        Self {
            position: Duration::ZERO,
            length,
            transport: Transport::Paused,
        }
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Restarts from the beginning when the audio had ended.
    pub fn play(&mut self) {
        if self.transport == Transport::Ended {
            self.position = Duration::ZERO;
        }
        self.transport = Transport::Playing;
    }

    pub fn pause(&mut self) {
        if self.transport == Transport::Playing {
            self.transport = Transport::Paused;
        }
    }

    /// Moves the position forward while playing. Returns true on the call
    /// that reaches the end.
    pub fn advance(&mut self, by: Duration) -> bool {
        if self.transport != Transport::Playing {
            return false;
        }
        self.position = (self.position + by).min(self.length);
        if self.position == self.length {
            self.transport = Transport::Ended;
            return true;
        }
        false
    }
}

impl PlaybackClock for SimulatedAudio {
    fn current_time(&self) -> Duration {
        self.position
    }

    fn is_playing(&self) -> bool {
        self.transport == Transport::Playing
    }
}

/// Writes one line per display call, stamped with the host time.
pub struct TranscriptDisplay<W: Write> {
    out: W,
    now: Duration,
    error: Option<io::Error>,
}

impl<W: Write> TranscriptDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            now: Duration::ZERO,
            error: None,
        }
    }

    pub fn set_now(&mut self, now: Duration) {
        self.now = now;
    }

    /// Hands back the writer, or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn line(&mut self, what: &str, value: &dyn fmt::Display) {
        if self.error.is_some() {
            return;
        }
        let stamp = format_timestamp(self.now);
        if let Err(err) = writeln!(self.out, "[{}] {:<5} {}", stamp, what, value) {
            self.error = Some(err);
        }
    }
}

impl<W: Write> DisplaySink for TranscriptDisplay<W> {
    fn set_text(&mut self, text: &str) {
        self.line("text", &text);
    }

    fn set_visual_state(&mut self, state: VisualState) {
        self.line("state", &state);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    pub fps: u32,
    /// Extra audio after the last cue ends.
    pub tail: Duration,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            tail: Duration::from_secs(1),
        }
    }
}

/// Plays the loaded file start to finish on a virtual clock and writes the
/// resulting display transcript to `out`.
pub fn replay<W: Write, E: fmt::Display>(
    fetched: Result<String, E>,
    config: SyncConfig,
    opts: ReplayOptions,
    out: W,
) -> Result<W> {
    let mut sync = Synchronizer::new(TranscriptDisplay::new(out), config);
    if let Err(err) = sync.load(fetched) {
        warn!("{}", err);
        return sync
            .into_display()
            .finish()
            .context("Failed to write transcript.");
    }

    let length = sync.segments().last_end().unwrap_or_default() + opts.tail;
    let frame = Duration::from_secs(1) / opts.fps.max(1);
    let mut audio = SimulatedAudio::new(length);
    debug!("Replaying {:?} at {:?} per frame", length, frame);

    audio.play();
    if sync.on_play() {
        let mut now = Duration::ZERO;
        loop {
            sync.display_mut().set_now(now);
            if sync.tick(&audio, now) == Frame::Stop {
                break;
            }
            now += frame;
            if audio.advance(frame) {
                sync.display_mut().set_now(now);
                sync.on_ended();
            }
        }
    }

    sync.into_display()
        .finish()
        .context("Failed to write transcript.")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CUES: &str = "1\n00:00:00,500 --> 00:00:01,000\nHello\n\n\
                            2\n00:00:02,000 --> 00:00:02,500\nWorld\n";

    fn transcript(input: std::result::Result<String, String>, opts: ReplayOptions) -> Vec<String> {
        let out = replay(input, SyncConfig::default(), opts, Vec::new()).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn audio_transport() {
        let mut audio = SimulatedAudio::new(Duration::from_millis(100));

        assert!(!audio.advance(Duration::from_millis(50)));
        assert_eq!(audio.current_time(), Duration::ZERO);

        audio.play();
        assert!(!audio.advance(Duration::from_millis(60)));
        audio.pause();
        assert!(!audio.is_playing());
        audio.play();
        assert!(audio.advance(Duration::from_millis(60)));
        assert_eq!(audio.current_time(), Duration::from_millis(100));
        assert_eq!(audio.transport(), Transport::Ended);

        audio.play();
        assert_eq!(audio.current_time(), Duration::ZERO);
    }

    #[test]
    fn full_session() {
        let opts = ReplayOptions {
            fps: 100,
            tail: Duration::from_millis(500),
        };

        assert_eq!(
            transcript(Ok(TWO_CUES.to_string()), opts),
            vec![
                "[00:00:00,000] state placeholder",
                "[00:00:00,500] state fading-out",
                "[00:00:00,650] text  Hello",
                "[00:00:00,650] state active",
                "[00:00:01,010] state fading-out",
                "[00:00:01,160] text  …",
                "[00:00:01,160] state placeholder",
                "[00:00:02,000] state fading-out",
                "[00:00:02,150] text  World",
                "[00:00:02,150] state active",
                "[00:00:02,510] state fading-out",
                "[00:00:02,660] text  …",
                "[00:00:02,660] state placeholder",
                "[00:00:03,000] text  ▶ Playback finished",
                "[00:00:03,000] state placeholder",
            ]
        );
    }

    #[test]
    fn failed_load_shows_message() {
        assert_eq!(
            transcript(Err("no such file".to_string()), ReplayOptions::default()),
            vec!["[00:00:00,000] text  Failed to load subtitle file"]
        );
    }

    #[test]
    fn write_errors_surface() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "broken pipe"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut display = TranscriptDisplay::new(Broken);
        display.set_text("lost");
        display.set_text("also lost");

        assert!(display.finish().is_err());
    }
}
