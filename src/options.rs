//! Outline inference options and thresholds.

use crate::error::{Error, Result};

/// Options controlling outline inference for a single document.
///
/// The defaults reproduce the tuned heuristics; most callers never need to
/// touch them.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineOptions {
    /// Documents with more pages than this are rejected
    pub max_pages: usize,

    /// Page count above which font sampling switches to a fixed subset
    pub sample_size: usize,

    /// Body size used when no span could be sampled
    pub default_body_size: f32,

    /// Candidates scoring below this are discarded outright
    pub confidence_threshold: f32,

    /// Scores strictly above this become H1
    pub h1_threshold: f32,

    /// Scores strictly above this become H2
    pub h2_threshold: f32,

    /// Scores strictly above this become H3
    pub h3_threshold: f32,

    /// Heading text is truncated to this many characters
    pub max_heading_chars: usize,

    /// Title text is truncated to this many characters
    pub max_title_chars: usize,

    /// Language samples shorter than this (after trimming) skip detection
    pub min_language_sample: usize,

    /// Language samples are truncated to this many characters
    pub max_language_sample: usize,

    /// Language assumed when detection is skipped
    pub default_language: String,

    /// Number of histogram entries kept for diagnostics
    pub histogram_top_n: usize,
}

impl OutlineOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page-count ceiling.
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    /// Set the font sampling size.
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Set the fallback body size.
    pub fn with_default_body_size(mut self, size: f32) -> Self {
        self.default_body_size = size;
        self
    }

    /// Set the confidence floor.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the three level bands (H1, H2, H3 lower bounds).
    pub fn with_level_thresholds(mut self, h1: f32, h2: f32, h3: f32) -> Self {
        self.h1_threshold = h1;
        self.h2_threshold = h2;
        self.h3_threshold = h3;
        self
    }

    /// Set the heading text length cap.
    pub fn with_max_heading_chars(mut self, chars: usize) -> Self {
        self.max_heading_chars = chars;
        self
    }

    /// Set the language used when detection is skipped.
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// Set how many histogram entries are reported.
    pub fn with_histogram_top_n(mut self, n: usize) -> Self {
        self.histogram_top_n = n;
        self
    }

    /// Check that every threshold is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(Error::InvalidOption("max_pages must be positive".into()));
        }
        if self.default_body_size <= 0.0 {
            return Err(Error::InvalidOption(
                "default_body_size must be positive".into(),
            ));
        }
        if !(self.h1_threshold > self.h2_threshold && self.h2_threshold > self.h3_threshold) {
            return Err(Error::InvalidOption(format!(
                "level thresholds must descend: {} > {} > {}",
                self.h1_threshold, self.h2_threshold, self.h3_threshold
            )));
        }
        if self.default_language.is_empty() {
            return Err(Error::InvalidOption(
                "default_language must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            max_pages: 50,
            sample_size: 5,
            default_body_size: 12.0,
            confidence_threshold: 2.5,
            h1_threshold: 6.0,
            h2_threshold: 4.5,
            h3_threshold: 3.0,
            max_heading_chars: 200,
            max_title_chars: 200,
            min_language_sample: 10,
            max_language_sample: 500,
            default_language: "en".to_string(),
            histogram_top_n: 10,
        }
    }
}
