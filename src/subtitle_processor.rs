use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::database::models::{NewSegment, Segment};
use crate::errors::SubtitleError;

// @module: SRT subtitle parsing and writing

// @const: SRT cue timing line regex
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2},\d{3})").unwrap()
});

// @const: Single SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2}):(\d{2}):(\d{2}),(\d{3})$").unwrap());

// @const: Cue separator regex; blank lines may carry stray whitespace
static BLOCK_SPLIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Parse an "HH:MM:SS,mmm" timestamp into milliseconds
pub fn parse_time_to_ms(value: &str) -> Result<i64, SubtitleError> {
    let caps = TIMESTAMP_REGEX
        .captures(value)
        .ok_or_else(|| SubtitleError::BadTimestamp(value.to_string()))?;

    // Captures are all-digit groups, parsing cannot fail
    let hh: i64 = caps[1].parse().unwrap();
    let mm: i64 = caps[2].parse().unwrap();
    let ss: i64 = caps[3].parse().unwrap();
    let ms: i64 = caps[4].parse().unwrap();

    Ok(((hh * 60 + mm) * 60 + ss) * 1000 + ms)
}

/// Format milliseconds as an "HH:MM:SS,mmm" timestamp
pub fn ms_to_time(ms: i64) -> String {
    let clamped = ms.max(0);
    let hh = clamped / 3_600_000;
    let rem = clamped - hh * 3_600_000;
    let mm = rem / 60_000;
    let rem = rem - mm * 60_000;
    let ss = rem / 1000;
    let mmm = rem - ss * 1000;
    format!("{:02}:{:02}:{:02},{:03}", hh, mm, ss, mmm)
}

/// Parse SRT text into indexed, timed segments.
///
/// Cue index lines are optional and ignored when present; indices are
/// reassigned contiguously from 0 in document order. Blocks without a valid
/// timing line are skipped rather than failing the whole file, since SRT
/// files in the wild frequently carry stray metadata blocks.
pub fn parse_srt(text: &str) -> Result<Vec<NewSegment>> {
    let normalized = text.replace('\r', "");
    let mut segments = Vec::new();
    let mut idx: i64 = 0;

    for block in BLOCK_SPLIT_REGEX.split(normalized.trim()) {
        let lines: Vec<&str> = block
            .split('\n')
            .map(|line| line.trim_end())
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() < 2 {
            continue;
        }

        // Tolerate a leading numeric cue-index line
        let timing_line_idx = usize::from(lines[0].chars().all(|c| c.is_ascii_digit()));
        let Some(timing_line) = lines.get(timing_line_idx) else {
            continue;
        };
        let Some(caps) = TIMING_REGEX.captures(timing_line) else {
            continue;
        };

        let start_ms = parse_time_to_ms(&caps[1])?;
        let end_ms = parse_time_to_ms(&caps[2])?;
        if end_ms < start_ms {
            return Err(SubtitleError::InvalidTimeRange { start_ms, end_ms }.into());
        }

        let cue_text = lines[timing_line_idx + 1..].join("\n").trim().to_string();
        segments.push(NewSegment {
            idx,
            start_ms,
            end_ms,
            source_text: cue_text,
        });
        idx += 1;
    }

    Ok(segments)
}

/// Pick the text to export for a segment: final, then draft, then source
pub fn export_text(segment: &Segment) -> &str {
    segment
        .final_text
        .as_deref()
        .or(segment.draft_text.as_deref())
        .unwrap_or(&segment.source_text)
}

/// Write segments back out as SRT text, numbering cues from 1
pub fn write_srt(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (n, segment) in segments.iter().enumerate() {
        out.push_str(&(n + 1).to_string());
        out.push('\n');
        out.push_str(&format!(
            "{} --> {}\n",
            ms_to_time(segment.start_ms),
            ms_to_time(segment.end_ms)
        ));
        out.push_str(export_text(segment).trim());
        out.push_str("\n\n");
    }
    out
}
