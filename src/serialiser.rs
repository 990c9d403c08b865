use crate::srt::{Segment, SubtitleSet};

use std::io::{BufWriter, Write};
use std::time::Duration;

use anyhow::{Context, Result};

/// Writes the set as SRT, numbering cues from 1.
pub fn serialise<W: Write>(subs: &SubtitleSet, output: W) -> Result<()> {
    let mut writer = BufWriter::new(output);
    write_subs(&mut writer, subs).context("Failed to write subtitles.")?;
    writer.flush().context("Failed to write subtitles.")?;
    Ok(())
}

fn write_subs<W: Write>(buf: &mut W, subs: &SubtitleSet) -> Result<()> {
    for (i, sub) in subs.iter().enumerate() {
        write_sub(buf, i + 1, sub)?;
    }
    Ok(())
}

fn write_sub<W: Write>(buf: &mut W, seq: usize, sub: &Segment) -> Result<()> {
    writeln!(buf, "{}", seq)?;
    write_ts(buf, sub.start)?;
    write!(buf, " --> ")?;
    write_ts(buf, sub.end)?;
    writeln!(buf)?;
    writeln!(buf, "{}", sub.text)?;
    writeln!(buf)?;
    Ok(())
}

pub fn format_timestamp(timestamp: Duration) -> String {
    let total_secs = timestamp.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = timestamp.subsec_millis();
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

fn write_ts<W: Write>(buf: &mut W, timestamp: Duration) -> Result<()> {
    write!(buf, "{}", format_timestamp(timestamp))?;
    Ok(())
}
