//! Heading levels, scored candidates, and corrected headings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading level in the inferred outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// Top-level heading
    H1,
    /// Section heading
    H2,
    /// Subsection heading
    H3,
}

impl HeadingLevel {
    /// Numeric depth (H1 = 1).
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Level for a numeric depth, clamped into `1..=3`.
    pub fn from_depth(depth: u8) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// A span that scored high enough to be considered a heading.
///
/// The score is kept for diagnostics only and does not reach the output.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    /// Cleaned, truncated heading text
    pub text: String,
    /// Nominal level from the score band
    pub level: HeadingLevel,
    /// Page number (1-indexed)
    pub page: usize,
    /// Composite score
    pub score: f32,
}

/// A heading after hierarchy correction; the public outline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectedHeading {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// Page number (1-indexed)
    pub page: usize,
}

impl CorrectedHeading {
    /// Create a new corrected heading.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: usize) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}
