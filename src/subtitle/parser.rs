//! SRT block parser.
//!
//! Blocks are read with a three-state machine over an immutable slice of
//! lines. Each state has its own transition function taking the current
//! cursor and returning a [`Step`]; [`parse_blocks`] just threads the cursor
//! through them until the input runs out. Malformed blocks are skipped and
//! never abort the parse.

use super::timestamp::{parse_timestamp, TIMESTAMP_PATTERN};
use super::{Segment, TimeSpan};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

const BOM: char = '\u{feff}';

fn time_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let ts = TIMESTAMP_PATTERN;
        // Trailing content after the end timestamp (position tags etc.) is ignored
        Regex::new(&format!(r"^({ts})\s+-->\s+({ts})")).expect("time range regex is valid")
    })
}

/// Parser state between transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseState {
    /// Looking for the numeric sequence line that opens a block.
    SeekIndex,
    /// Index read; the next line must be `start --> end`.
    SeekTimeRange { sequence_id: u64 },
    /// Timing read; gathering text lines until a blank line.
    CollectText { sequence_id: u64, span: TimeSpan },
    /// Input exhausted.
    Finished,
}

/// Result of a single transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Index of the next unread line.
    pub cursor: usize,
    pub state: ParseState,
    pub emitted: Option<Segment>,
}

impl Step {
    fn to(cursor: usize, state: ParseState) -> Self {
        Self {
            cursor,
            state,
            emitted: None,
        }
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Any run of ASCII digits is an index. Values past `u64::MAX` saturate.
fn parse_index_line(line: &str) -> Option<u64> {
    let line = line.trim();
    if line.is_empty() || !line.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(line.parse().unwrap_or(u64::MAX))
}

/// Bracketed notes such as `[Música]` or `[door slams]`.
fn is_annotation(line: &str) -> bool {
    line.starts_with('[') && line.ends_with(']')
}

fn parse_time_range(line: &str) -> Option<TimeSpan> {
    let caps = time_range_regex().captures(line.trim())?;
    let start = parse_timestamp(&caps[1]).ok()?;
    let end = parse_timestamp(&caps[6]).ok()?;
    if end < start {
        warn!(
            "Subtitle ends before it starts ({} --> {}), clamping end to start",
            &caps[1], &caps[6]
        );
    }
    Some(TimeSpan::new(start, end))
}

/// Skip blank and stray lines until a numeric index line.
pub fn seek_index<S: AsRef<str>>(lines: &[S], mut cursor: usize) -> Step {
    while let Some(line) = lines.get(cursor) {
        let line = line.as_ref();
        cursor += 1;
        if is_blank(line) {
            continue;
        }
        match parse_index_line(line) {
            Some(sequence_id) => return Step::to(cursor, ParseState::SeekTimeRange { sequence_id }),
            None => debug!("Skipping stray line {}: {:?}", cursor, line.trim()),
        }
    }
    Step::to(cursor, ParseState::Finished)
}

/// Read the `start --> end` line of the current block.
///
/// A malformed line is consumed and the block (including its index) is
/// abandoned.
pub fn seek_time_range<S: AsRef<str>>(lines: &[S], cursor: usize, sequence_id: u64) -> Step {
    let Some(line) = lines.get(cursor) else {
        return Step::to(cursor, ParseState::Finished);
    };
    let line = line.as_ref();

    match parse_time_range(line) {
        Some(span) => Step::to(cursor + 1, ParseState::CollectText { sequence_id, span }),
        None => {
            warn!(
                "Skipping block {}: malformed time range {:?}",
                sequence_id,
                line.trim()
            );
            Step::to(cursor + 1, ParseState::SeekIndex)
        }
    }
}

/// Gather the block's text lines, dropping bracketed annotations, and emit a
/// segment if any text remains.
pub fn collect_text<S: AsRef<str>>(
    lines: &[S],
    mut cursor: usize,
    sequence_id: u64,
    span: TimeSpan,
) -> Step {
    let mut text_lines: Vec<&str> = Vec::new();

    while let Some(line) = lines.get(cursor) {
        let line = line.as_ref().trim();
        cursor += 1;
        if line.is_empty() {
            break;
        }
        if is_annotation(line) {
            continue;
        }
        text_lines.push(line);
    }

    let emitted = if text_lines.is_empty() {
        debug!("Dropping block {}: no text after annotations", sequence_id);
        None
    } else {
        Some(Segment::new(sequence_id, span, text_lines.join(" ")))
    };

    Step {
        cursor,
        state: ParseState::SeekIndex,
        emitted,
    }
}

/// Apply the transition for `state` at `cursor`.
pub fn step<S: AsRef<str>>(lines: &[S], cursor: usize, state: ParseState) -> Step {
    match state {
        ParseState::SeekIndex => seek_index(lines, cursor),
        ParseState::SeekTimeRange { sequence_id } => seek_time_range(lines, cursor, sequence_id),
        ParseState::CollectText { sequence_id, span } => {
            collect_text(lines, cursor, sequence_id, span)
        }
        ParseState::Finished => Step::to(cursor, ParseState::Finished),
    }
}

/// Parse a sequence of raw lines into timed segments, in input order.
pub fn parse_blocks<S: AsRef<str>>(lines: &[S]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut state = ParseState::SeekIndex;

    while state != ParseState::Finished {
        let next = step(lines, cursor, state);
        if let Some(segment) = next.emitted {
            segments.push(segment);
        }
        cursor = next.cursor;
        state = next.state;
    }

    segments
}

/// Parse the full text of an SRT file. Handles a leading BOM and CRLF endings.
pub fn parse_srt(content: &str) -> Vec<Segment> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let lines: Vec<&str> = content.lines().collect();
    parse_blocks(&lines)
}
