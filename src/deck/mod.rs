//! Flashcard assembly: one card per surviving segment, with an optional
//! screenshot taken at the middle of the segment's display window.

pub mod export;

pub use export::{header, write_cards, write_cards_to};

use crate::subtitle::Segment;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use unicode_normalization::UnicodeNormalization;

/// An output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub source_text: String,
    pub translated_text: String,
    /// Inline `<img>` tag; present only when screenshots are captured.
    pub image_reference: Option<String>,
}

/// Screenshot to take for one card.
#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    /// Bare file name, no directory component.
    pub file_name: String,
    pub timestamp: Duration,
}

/// A segment scheduled to become a card, before translation and capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CardPlan {
    /// 1-based position in the deck.
    pub position: usize,
    pub segment: Segment,
    pub shot: Option<Shot>,
}

impl CardPlan {
    pub fn into_card(self, translated_text: String) -> Card {
        Card {
            source_text: self.segment.text,
            translated_text,
            image_reference: self.shot.map(|shot| image_tag(&shot.file_name)),
        }
    }
}

/// `{prefix}-{position:04}.jpg`. Positions past 9999 simply get wider.
pub fn image_name(prefix: &str, position: usize) -> String {
    format!("{prefix}-{position:04}.jpg")
}

/// Minimal image tag referencing a file beside the CSV at import time.
pub fn image_tag(file_name: &str) -> String {
    format!("<img src='{file_name}'>")
}

/// Number the segments and, when `image_prefix` is set, schedule a shot at
/// each segment's midpoint.
pub fn plan_cards(segments: Vec<Segment>, image_prefix: Option<&str>) -> Vec<CardPlan> {
    segments
        .into_iter()
        .enumerate()
        .map(|(i, segment)| {
            let position = i + 1;
            let shot = image_prefix.map(|prefix| Shot {
                file_name: image_name(prefix, position),
                timestamp: segment.span.midpoint(),
            });
            CardPlan {
                position,
                segment,
                shot,
            }
        })
        .collect()
}

fn dash_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\x{2010}-\x{2015}\x{2212}\x{FE58}\x{FE63}\x{FF0D}]").expect("dash regex is valid")
    })
}

fn forbidden_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("forbidden char regex is valid"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex is valid"))
}

fn hyphen_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-+").expect("hyphen regex is valid"))
}

/// Make a title usable as a file name prefix on every common filesystem.
pub fn sanitize_title(title: &str) -> String {
    // NFKC folds full-width forms into their ASCII counterparts
    let title: String = title.nfkc().collect();
    let s = dash_regex().replace_all(&title, "-");
    let s = forbidden_regex().replace_all(&s, "-");
    let s = whitespace_regex().replace_all(&s, " ");
    let s = hyphen_run_regex().replace_all(s.trim(), "-");
    s.trim_end_matches([' ', '.']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::TimeSpan;

    fn seg(id: u64, start_ms: u64, end_ms: u64, text: &str) -> Segment {
        Segment::new(
            id,
            TimeSpan::new(Duration::from_millis(start_ms), Duration::from_millis(end_ms)),
            text,
        )
    }

    #[test]
    fn test_image_name_padding() {
        assert_eq!(image_name("ep1", 1), "ep1-0001.jpg");
        assert_eq!(image_name("ep1", 7), "ep1-0007.jpg");
        assert_eq!(image_name("ep1", 9999), "ep1-9999.jpg");
        assert_eq!(image_name("ep1", 10000), "ep1-10000.jpg");
    }

    #[test]
    fn test_image_tag() {
        assert_eq!(image_tag("ep1-0001.jpg"), "<img src='ep1-0001.jpg'>");
    }

    #[test]
    fn test_plan_cards_without_images() {
        let plans = plan_cards(vec![seg(4, 0, 1000, "Uno"), seg(9, 0, 1000, "Dos")], None);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].position, 1);
        assert_eq!(plans[1].position, 2);
        assert!(plans.iter().all(|p| p.shot.is_none()));
    }

    #[test]
    fn test_plan_cards_uses_position_not_sequence_id() {
        let segments = (0..7)
            .map(|i| seg(100 + i, i * 1000, i * 1000 + 500, "texto"))
            .collect();
        let plans = plan_cards(segments, Some("ep1"));
        let shot = plans[6].shot.as_ref().unwrap();
        assert_eq!(shot.file_name, "ep1-0007.jpg");
        assert_eq!(shot.timestamp, Duration::from_millis(6250));
    }

    #[test]
    fn test_into_card() {
        let plan = plan_cards(vec![seg(1, 1000, 3000, "Hola mundo")], Some("clip"))
            .pop()
            .unwrap();
        assert_eq!(plan.shot.as_ref().unwrap().timestamp, Duration::from_secs(2));

        let card = plan.into_card("Hello world".to_string());
        assert_eq!(card.source_text, "Hola mundo");
        assert_eq!(card.translated_text, "Hello world");
        assert_eq!(card.image_reference.as_deref(), Some("<img src='clip-0001.jpg'>"));
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Plain title"), "Plain title");
        assert_eq!(sanitize_title("Who? What: Why/How"), "Who- What- Why-How");
        assert_eq!(sanitize_title("A \u{2014} B"), "A - B");
        assert_eq!(sanitize_title("a<>|b"), "a-b");
        assert_eq!(sanitize_title("  spaced   out.  "), "spaced out");
        assert_eq!(sanitize_title("Episode 1 [dQw4w9WgXcQ]"), "Episode 1 [dQw4w9WgXcQ]");
    }

    #[test]
    fn test_sanitize_title_folds_full_width() {
        assert_eq!(sanitize_title("Ｑ＆Ａ：Parte １"), "Q&A-Parte 1");
        assert_eq!(sanitize_title("Capítulo\u{3000}２／３"), "Capítulo 2-3");
    }
}
