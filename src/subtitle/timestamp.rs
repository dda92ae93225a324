// SRT timestamp codec: `HH:MM:SS,mmm`
use crate::error::{Result, SubcardsError};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Unanchored timestamp pattern, shared with the block parser's time-range line.
pub(crate) const TIMESTAMP_PATTERN: &str = r"([0-9]{2}):([0-9]{2}):([0-9]{2}),([0-9]{3})";

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("^{TIMESTAMP_PATTERN}$")).expect("timestamp regex is valid")
    })
}

/// Parse an exact `HH:MM:SS,mmm` string into an offset from zero.
///
/// Hours are not clamped to a day; anything two digits wide is accepted.
pub fn parse_timestamp(text: &str) -> Result<Duration> {
    let caps = timestamp_regex()
        .captures(text)
        .ok_or_else(|| SubcardsError::Format(text.to_string()))?;

    let field = |i: usize| -> Result<u64> {
        caps[i]
            .parse::<u64>()
            .map_err(|_| SubcardsError::Format(text.to_string()))
    };

    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    let millis = field(4)?;

    let total_ms = ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis;
    Ok(Duration::from_millis(total_ms))
}

/// Format an offset as `HH:MM:SS,mmm`. Inverse of [`parse_timestamp`] for
/// whole-millisecond values below 100 hours.
pub fn format_timestamp(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = d.subsec_millis();
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}
