//! Normalized text spans.

use serde::{Deserialize, Serialize};

/// A run of text with uniform font attributes on a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content, as decoded by the page source
    pub text: String,

    /// Font size in points
    pub size: f32,

    /// Whether the font weight flag marks this run as bold
    pub bold: bool,

    /// Vertical position of the span's top edge as a fraction of page
    /// height, measured from the top (0.0 = top, 1.0 = bottom)
    pub y_ratio: f32,

    /// Page index (0-indexed)
    pub page_index: usize,
}

impl Span {
    /// Create a regular-weight span.
    pub fn new(text: impl Into<String>, size: f32, y_ratio: f32, page_index: usize) -> Self {
        Self {
            text: text.into(),
            size,
            bold: false,
            y_ratio,
            page_index,
        }
    }

    /// Mark the span as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Set the bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// 1-indexed page number.
    pub fn page_number(&self) -> usize {
        self.page_index + 1
    }
}
