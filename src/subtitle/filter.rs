//! Noise filtering for subtitle text.
//!
//! Interjections ("Ah.", "¿Eh?"), lone letters and speaker labels ("María:")
//! make useless flashcards. Matching is deliberately narrow so that short
//! real dialogue survives. What counts as noise is described by a
//! [`NoiseRules`] value rather than hard-coded branches.

use super::Segment;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const SPANISH_INTERJECTIONS: &[&str] = &["ah", "eh", "uh", "oh", "mm", "mmm", "hmm", "m"];
const SPANISH_LOWER: &str = "áéíóúñ";
const SPANISH_UPPER: &str = "ÁÉÍÓÚÑ";

/// Leading dialogue dashes and trailing punctuation ignored by the checks.
const EDGE_MARKS: &str = r"^[\-—–_\s]+|[\s\.,!\?…·•;:¡¿]+$";

/// Language-specific description of what counts as noise.
#[derive(Debug, Clone)]
pub struct NoiseRules {
    interjections: HashSet<String>,
    edge_marks: Regex,
    single_letter: Regex,
    proper_name: Regex,
    speaker_tag: Regex,
    word: Regex,
}

impl NoiseRules {
    /// Build a ruleset from an interjection list and the letters the
    /// language adds on top of ASCII `a-z` / `A-Z`.
    pub fn new(interjections: &[&str], extra_lower: &str, extra_upper: &str) -> Self {
        let escape_class = |letters: &str| -> String {
            letters
                .chars()
                .map(|c| regex::escape(&c.to_string()))
                .collect()
        };
        let lower = format!("a-z{}", escape_class(extra_lower));
        let upper = format!("A-Z{}", escape_class(extra_upper));

        let compile = |pattern: String| Regex::new(&pattern).expect("noise pattern is valid");

        Self {
            interjections: interjections.iter().map(|s| s.to_lowercase()).collect(),
            edge_marks: compile(EDGE_MARKS.to_string()),
            single_letter: compile(format!(r"^[{lower}]\.?$")),
            proper_name: compile(format!(r"^[{upper}][{lower}]+$")),
            speaker_tag: compile(format!(r"^[{upper}][{lower}]+:$")),
            word: compile(format!(r"[{upper}{lower}]+")),
        }
    }

    pub fn spanish() -> Self {
        Self::new(SPANISH_INTERJECTIONS, SPANISH_LOWER, SPANISH_UPPER)
    }

    /// Ruleset for a source language code. Only Spanish has a dedicated
    /// alphabet; other codes fall back to plain ASCII letters.
    pub fn for_language(code: &str) -> Self {
        let primary = code.split(['-', '_']).next().unwrap_or(code);
        if primary.eq_ignore_ascii_case("es") {
            Self::spanish()
        } else {
            Self::new(SPANISH_INTERJECTIONS, "", "")
        }
    }

    /// Interjection, optionally followed by a single period.
    fn is_interjection(&self, word: &str) -> bool {
        self.interjections.contains(word)
            || word
                .strip_suffix('.')
                .is_some_and(|w| self.interjections.contains(w))
    }

    fn strip_edges<'a>(&self, text: &'a str) -> std::borrow::Cow<'a, str> {
        self.edge_marks.replace_all(text, "")
    }

    /// Whether `text` is filler rather than dialogue worth a card.
    pub fn is_noise(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return true;
        }

        let lower = text.to_lowercase();
        let lower_stripped = self.strip_edges(&lower);
        if lower_stripped.is_empty() {
            return true;
        }
        if self.is_interjection(&lower) || self.is_interjection(&lower_stripped) {
            return true;
        }
        if self.single_letter.is_match(&lower_stripped) {
            return true;
        }

        // Bare name or speaker label
        if self.proper_name.is_match(&self.strip_edges(text)) || self.speaker_tag.is_match(text) {
            return true;
        }

        let tokens: Vec<String> = self
            .word
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect();
        tokens.len() <= 2 && self.interjections.contains(&tokens.join(" "))
    }
}

impl Default for NoiseRules {
    fn default() -> Self {
        Self::spanish()
    }
}

/// [`NoiseRules::is_noise`] with the built-in Spanish rules.
pub fn is_noise(text: &str) -> bool {
    static RULES: OnceLock<NoiseRules> = OnceLock::new();
    RULES.get_or_init(NoiseRules::spanish).is_noise(text)
}

/// Drop noise segments, keeping the survivors in order.
pub fn filter_noise(mut segments: Vec<Segment>, rules: &NoiseRules) -> Vec<Segment> {
    segments.retain(|s| !rules.is_noise(&s.text));
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::TimeSpan;
    use std::time::Duration;

    #[test]
    fn test_interjections_are_noise() {
        for text in ["Ah.", "ah", "Eh", "¿Eh?", "Oh!", "Mmm...", "Hmm.", "UH", "- Ah."] {
            assert!(is_noise(text), "{text:?} should be noise");
        }
    }

    #[test]
    fn test_single_letters_are_noise() {
        for text in ["M", "M.", "a", "ñ", "É."] {
            assert!(is_noise(text), "{text:?} should be noise");
        }
    }

    #[test]
    fn test_names_and_speaker_tags_are_noise() {
        for text in ["María:", "Pedro", "Ángel!", "-Lucía.", "Tomás?"] {
            assert!(is_noise(text), "{text:?} should be noise");
        }
    }

    #[test]
    fn test_empty_and_punctuation_only_are_noise() {
        for text in ["", "   ", "...", "- ¡!"] {
            assert!(is_noise(text), "{text:?} should be noise");
        }
    }

    #[test]
    fn test_two_token_interjections() {
        // Tokens joined with a space must hit the set exactly; "ah ah" does not
        assert!(!is_noise("Ah, ah"));
        assert!(is_noise("¡¿Oh?!"));
    }

    #[test]
    fn test_dialogue_is_kept() {
        for text in [
            "Hola, ¿cómo estás?",
            "No sé.",
            "Ven aquí.",
            "Oh, no",
            "MARÍA",
            "maría:",
            "Te quiero, María.",
        ] {
            assert!(!is_noise(text), "{text:?} should be kept");
        }
    }

    #[test]
    fn test_custom_rules() {
        let rules = NoiseRules::new(&["ouch", "wow"], "", "");
        assert!(rules.is_noise("Wow!"));
        assert!(rules.is_noise("ouch."));
        assert!(!rules.is_noise("eh"));
        // Accented capitals are not letters in a plain ASCII ruleset
        assert!(!rules.is_noise("Ángel"));
    }

    #[test]
    fn test_for_language() {
        assert!(NoiseRules::for_language("es-419").is_noise("Ángel"));
        assert!(NoiseRules::for_language("ES").is_noise("Ñ"));
        assert!(!NoiseRules::for_language("en").is_noise("Ángel"));
    }

    #[test]
    fn test_filter_noise_preserves_order() {
        let span = TimeSpan::new(Duration::ZERO, Duration::from_secs(1));
        let segments = vec![
            Segment::new(1, span, "¿Dónde está?"),
            Segment::new(2, span, "Ah."),
            Segment::new(3, span, "María:"),
            Segment::new(4, span, "Allí, en la mesa."),
        ];
        let kept = filter_noise(segments, &NoiseRules::spanish());
        let ids: Vec<u64> = kept.iter().map(|s| s.sequence_id).collect();
        assert_eq!(ids, vec![1, 4]);
    }
}
