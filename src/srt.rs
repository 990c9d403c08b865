use std::time::Duration;

/// One timed cue. `text` is the cue's lines joined by a single space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

impl Segment {
    pub fn new(start: Duration, end: Duration, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, t: Duration) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Segments in source order. Never re-sorted and never mutated after load;
/// a new file produces a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleSet {
    segments: Vec<Segment>,
}

impl SubtitleSet {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Latest end time over all segments.
    pub fn last_end(&self) -> Option<Duration> {
        self.segments.iter().map(|s| s.end).max()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }
}

impl From<Vec<Segment>> for SubtitleSet {
    fn from(segments: Vec<Segment>) -> Self {
        Self::new(segments)
    }
}

impl<'a> IntoIterator for &'a SubtitleSet {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
