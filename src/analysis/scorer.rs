//! Per-span heading scoring.
//!
//! Each span is scored independently from four signals: its size relative
//! to the body font, its weight, how close it sits to the top of the page,
//! and whether its text opens like a heading in the document's language.

use once_cell::sync::Lazy;
use regex::Regex;

use super::patterns::{is_cjk, strategy_for, PatternStrategy};
use crate::model::{HeadingCandidate, HeadingLevel, Span};
use crate::options::OutlineOptions;

static NON_HEADING_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^\w\s.,;:\-'"()]"#).expect("valid cleaning regex"));

/// Minimum cleaned length, in characters, for a span to be scored.
const MIN_HEADING_CHARS: usize = 2;

/// Spans lower on the page than this fraction get no extra position credit.
const POSITION_CUTOFF: f32 = 0.2;

/// Clean span text for scoring.
///
/// CJK text is only trimmed; other languages also lose every character that
/// is not a word character, whitespace, or common punctuation.
pub fn clean_text(text: &str, language: &str) -> String {
    if is_cjk(language) {
        text.trim().to_string()
    } else {
        NON_HEADING_CHARS.replace_all(text, "").trim().to_string()
    }
}

/// The individual signals behind a heading score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Span size divided by body font size
    pub size_ratio: f32,
    /// Whether the span is bold
    pub bold: bool,
    /// `1.0 - min(y_ratio, 0.2) * 3`
    pub position: f32,
    /// Language pattern contribution
    pub pattern: f32,
}

impl ScoreBreakdown {
    /// Composite score.
    pub fn total(&self) -> f32 {
        let bold = if self.bold { 2.0 } else { 0.0 };
        self.size_ratio * 3.0 + bold + self.position + self.pattern
    }
}

/// Scores spans against the body font and assigns nominal heading levels.
#[derive(Debug, Clone)]
pub struct HeadingScorer {
    confidence_threshold: f32,
    h1_threshold: f32,
    h2_threshold: f32,
    h3_threshold: f32,
    max_heading_chars: usize,
    default_body_size: f32,
}

impl HeadingScorer {
    /// Create a scorer from outline options.
    pub fn new(options: &OutlineOptions) -> Self {
        Self {
            confidence_threshold: options.confidence_threshold,
            h1_threshold: options.h1_threshold,
            h2_threshold: options.h2_threshold,
            h3_threshold: options.h3_threshold,
            max_heading_chars: options.max_heading_chars,
            default_body_size: options.default_body_size,
        }
    }

    /// Break down the score of already-cleaned text.
    pub fn breakdown(
        &self,
        span: &Span,
        text: &str,
        body_font: f32,
        patterns: &dyn PatternStrategy,
    ) -> ScoreBreakdown {
        let body_font = if body_font.is_finite() && body_font > 0.0 {
            body_font
        } else {
            self.default_body_size
        };

        ScoreBreakdown {
            size_ratio: span.size / body_font,
            bold: span.bold,
            position: 1.0 - span.y_ratio.min(POSITION_CUTOFF) * 3.0,
            pattern: patterns.pattern_score(text),
        }
    }

    /// Nominal level for a score, or `None` if the score falls below the
    /// confidence floor or outside every level band.
    ///
    /// Scores between the floor and the H3 bound pass the floor but still
    /// get no level.
    pub fn level_for(&self, score: f32) -> Option<HeadingLevel> {
        if score < self.confidence_threshold {
            None
        } else if score > self.h1_threshold {
            Some(HeadingLevel::H1)
        } else if score > self.h2_threshold {
            Some(HeadingLevel::H2)
        } else if score > self.h3_threshold {
            Some(HeadingLevel::H3)
        } else {
            None
        }
    }

    /// Score a single span.
    pub fn score_span(
        &self,
        span: &Span,
        body_font: f32,
        language: &str,
    ) -> Option<HeadingCandidate> {
        let text = clean_text(&span.text, language);
        if text.chars().count() < MIN_HEADING_CHARS {
            return None;
        }

        let score = self
            .breakdown(span, &text, body_font, strategy_for(language))
            .total();
        let level = self.level_for(score)?;

        Some(HeadingCandidate {
            text: text.chars().take(self.max_heading_chars).collect(),
            level,
            page: span.page_number(),
            score,
        })
    }

    /// Score every span of one page, keeping span order.
    pub fn score_page(
        &self,
        spans: &[Span],
        body_font: f32,
        language: &str,
    ) -> Vec<HeadingCandidate> {
        spans
            .iter()
            .filter_map(|span| self.score_span(span, body_font, language))
            .collect()
    }
}

impl Default for HeadingScorer {
    fn default() -> Self {
        Self::new(&OutlineOptions::default())
    }
}
