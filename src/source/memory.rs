//! In-memory page source.

use crate::error::{Error, Result};
use crate::model::Span;

use super::PageSource;

#[derive(Debug, Clone)]
enum MemoryPage {
    Spans(Vec<Span>),
    Failing(String),
}

/// A [`PageSource`] built from spans held in memory.
///
/// Useful when spans come from an external extractor, and for simulating
/// pages whose extraction fails.
///
/// # Example
///
/// ```
/// use pdfoutline::model::Span;
/// use pdfoutline::source::{MemorySource, PageSource};
///
/// let source = MemorySource::new("report")
///     .with_page(vec![Span::new("1. Introduction", 24.0, 0.05, 0).bold()])
///     .with_failing_page("broken content stream");
///
/// assert_eq!(source.page_count(), 2);
/// assert!(source.page_spans(1).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    title: Option<String>,
    pages: Vec<MemoryPage>,
}

impl MemorySource {
    /// Create an empty source with the given base name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            pages: Vec::new(),
        }
    }

    /// Set the metadata title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a page. Span page indices are rewritten to the page's position.
    pub fn with_page(mut self, spans: Vec<Span>) -> Self {
        self.push_page(spans);
        self
    }

    /// Append a page whose extraction fails with `reason`.
    pub fn with_failing_page(mut self, reason: impl Into<String>) -> Self {
        self.pages.push(MemoryPage::Failing(reason.into()));
        self
    }

    /// Append a page in place.
    pub fn push_page(&mut self, mut spans: Vec<Span>) {
        let index = self.pages.len();
        for span in &mut spans {
            span.page_index = index;
        }
        self.pages.push(MemoryPage::Spans(spans));
    }
}

impl PageSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_spans(&self, index: usize) -> Result<Vec<Span>> {
        match self.pages.get(index) {
            Some(MemoryPage::Spans(spans)) => Ok(spans.clone()),
            Some(MemoryPage::Failing(reason)) => Err(Error::TextExtract(format!(
                "Page {}: {}",
                index + 1,
                reason
            ))),
            None => Err(Error::PageOutOfRange(index, self.pages.len())),
        }
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }
}
