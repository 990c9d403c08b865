use std::time::Duration;

/// Timing and fixed texts used by the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Time between starting to remove the old text and swapping in the new one.
    pub fade_out: Duration,
    /// Time the new text takes to settle before another change may start.
    pub fade_in: Duration,
    /// Shown when no cue is active.
    pub placeholder: String,
    pub ended_message: String,
    pub load_failed_message: String,
}

pub const DEFAULT_FADE: Duration = Duration::from_millis(150);

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fade_out: DEFAULT_FADE,
            fade_in: DEFAULT_FADE,
            placeholder: "…".to_string(),
            ended_message: "▶ Playback finished".to_string(),
            load_failed_message: "Failed to load subtitle file".to_string(),
        }
    }
}

impl SyncConfig {
    pub fn with_fades(mut self, fade_out: Duration, fade_in: Duration) -> Self {
        self.fade_out = fade_out;
        self.fade_in = fade_in;
        self
    }

    /// Full length of one text change, from fade-out start to settled.
    pub fn transition_length(&self) -> Duration {
        self.fade_out + self.fade_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SyncConfig::default();

        assert_eq!(config.fade_out, Duration::from_millis(150));
        assert_eq!(config.fade_in, Duration::from_millis(150));
        assert_eq!(config.placeholder, "…");
        assert_eq!(config.transition_length(), Duration::from_millis(300));
    }
}
