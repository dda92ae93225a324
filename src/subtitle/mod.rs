pub mod dedup;
pub mod filter;
pub mod parser;
pub mod timestamp;

pub use dedup::dedup_segments;
pub use filter::{filter_noise, is_noise, NoiseRules};
pub use parser::{parse_blocks, parse_srt};
pub use timestamp::{format_timestamp, parse_timestamp};

use std::time::Duration;

/// Display window of a subtitle block. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: Duration,
    pub end: Duration,
}

impl TimeSpan {
    /// Build a span, clamping an end that precedes the start.
    pub fn new(start: Duration, end: Duration) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }

    /// Point halfway through the display window.
    pub fn midpoint(&self) -> Duration {
        self.start + self.duration() / 2
    }
}

/// A timed piece of subtitle text reconstructed from one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Ordinal from the source file; not guaranteed contiguous or unique.
    pub sequence_id: u64,
    pub span: TimeSpan,
    pub text: String,
}

impl Segment {
    pub fn new(sequence_id: u64, span: TimeSpan, text: impl Into<String>) -> Self {
        Self {
            sequence_id,
            span,
            text: text.into(),
        }
    }
}
