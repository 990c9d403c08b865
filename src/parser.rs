use crate::error::SubsyncError;
use crate::srt::{Segment, SubtitleSet};

use std::time::Duration;

use nom::bytes::complete::{tag, take_while, take_while_m_n};
use nom::combinator::{all_consuming, map_res};
use nom::error::{convert_error, VerboseError};
use nom::{Err, IResult};
use regex::Regex;
use tracing::debug;

type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// One or more blank (whitespace-only) lines separate two cues.
const BLOCK_SEPARATOR: &str = r"\n\s*\n";

pub struct Parser {
    block_separator: Regex,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            block_separator: Regex::new(BLOCK_SEPARATOR).expect("block separator is a valid regex"),
        }
    }

    /// Parses SRT text into segments in file order. Never fails: blocks that
    /// are too short or lack a timing line are dropped.
    pub fn parse(&self, input: &str) -> SubtitleSet {
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input).trim();
        if input.is_empty() {
            return SubtitleSet::default();
        }

        let mut segments = Vec::new();
        let mut skipped = 0;
        for (n, block) in self.block_separator.split(input).enumerate() {
            match cue(block) {
                Some(segment) => segments.push(segment),
                None => {
                    debug!("Skipping malformed block #{}: {:?}", n + 1, block);
                    skipped += 1;
                }
            }
        }

        debug!("Parsed {} cues ({} skipped)", segments.len(), skipped);
        SubtitleSet::new(segments)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse(input: &str) -> SubtitleSet {
    Parser::new().parse(input)
}

/// Parses a single `HH:MM:SS,mmm` timestamp, rejecting anything around it.
pub fn parse_timestamp(input: &str) -> Result<Duration, SubsyncError> {
    match all_consuming(timestamp)(input) {
        Ok((_, ts)) => Ok(ts),
        Err(Err::Error(err)) | Err(Err::Failure(err)) => {
            Err(SubsyncError::ParseError(convert_error(input, err)))
        }
        Err(Err::Incomplete(_)) => {
            unreachable!("Incomplete data received by non-streaming parser.")
        }
    }
}

fn cue(block: &str) -> Option<Segment> {
    let lines: Vec<&str> = block
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    if lines.len() < 3 {
        return None;
    }
    // lines[0] is the cue number, which plays no part in timing.
    let (start, end) = find_show_hide(lines[1])?;
    Some(Segment::new(start, end, lines[2..].join(" ")))
}

/// The timing range may appear anywhere on the line; the first match wins.
fn find_show_hide(line: &str) -> Option<(Duration, Duration)> {
    line.char_indices()
        .find_map(|(i, _)| show_hide(&line[i..]).ok().map(|(_, range)| range))
}

fn show_hide(input: &str) -> ParseResult<(Duration, Duration)> {
    let (input, show_at) = timestamp(input)?;
    let (input, _) = whitespace0(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = whitespace0(input)?;
    let (input, hide_at) = timestamp(input)?;

    Ok((input, (show_at, hide_at)))
}

fn whitespace0(input: &str) -> ParseResult<&str> {
    take_while(char::is_whitespace)(input)
}

fn digits(input: &str, count: usize) -> ParseResult<u64> {
    map_res(
        take_while_m_n(count, count, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u64>(),
    )(input)
}

fn timestamp(input: &str) -> ParseResult<Duration> {
    let (input, hours) = digits(input, 2)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = digits(input, 2)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = digits(input, 2)?;
    let (input, _) = tag(",")(input)?;
    let (input, millis) = digits(input, 3)?;

    Ok((
        input,
        Duration::from_millis(
            millis + seconds * 1000 + minutes * 60 * 1000 + hours * 60 * 60 * 1000,
        ),
    ))
}
