//! Language-specific heading patterns.

use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern score for text that matches no heading pattern.
pub const DEFAULT_PATTERN_SCORE: f32 = 0.5;

/// Pattern score for text with a recognized heading prefix.
pub const MATCHED_PATTERN_SCORE: f32 = 1.5;

static ENGLISH_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Chapter|Section|\d+\.\d*|(?:I{1,3}|IV|V|VI{0,3}|IX|X)\b)")
        .expect("valid English heading regex")
});

static JAPANESE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:第|節|[\x{30A0}-\x{30FF}\x{3040}-\x{309F}])")
        .expect("valid Japanese heading regex")
});

/// Heading prefix rules for one language.
pub trait PatternStrategy: Send + Sync {
    /// Check whether cleaned text starts like a heading.
    fn matches(&self, text: &str) -> bool;

    /// Pattern contribution to the heading score.
    fn pattern_score(&self, text: &str) -> f32 {
        if self.matches(text) {
            MATCHED_PATTERN_SCORE
        } else {
            DEFAULT_PATTERN_SCORE
        }
    }
}

/// `Chapter`, `Section`, dotted numbering and Roman numerals.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishPatterns;

impl PatternStrategy for EnglishPatterns {
    fn matches(&self, text: &str) -> bool {
        ENGLISH_HEADING.is_match(text)
    }
}

/// `第`, `節`, or a leading kana character.
#[derive(Debug, Clone, Copy, Default)]
pub struct JapanesePatterns;

impl PatternStrategy for JapanesePatterns {
    fn matches(&self, text: &str) -> bool {
        JAPANESE_HEADING.is_match(text)
    }
}

/// Languages without heading rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPatterns;

impl PatternStrategy for NoPatterns {
    fn matches(&self, _text: &str) -> bool {
        false
    }
}

/// Pick the pattern strategy for a language code.
pub fn strategy_for(language: &str) -> &'static dyn PatternStrategy {
    match language {
        "en" => &EnglishPatterns,
        "ja" => &JapanesePatterns,
        _ => &NoPatterns,
    }
}

/// Languages whose span text is only trimmed, never filtered.
pub fn is_cjk(language: &str) -> bool {
    matches!(language, "ja" | "zh" | "ko")
}
