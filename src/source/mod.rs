//! Page sources: the boundary between document parsing and outline inference.
//!
//! A [`PageSource`] hands out normalized [`Span`]s one page at a time, so the
//! inference engine never sees a concrete PDF library type. Page-level calls
//! return `Result`s individually; a failing page does not poison the source.

mod memory;
mod pdf;

pub use memory::MemorySource;
pub use pdf::{is_pdf_bytes, PdfSource};

use crate::error::Result;
use crate::model::Span;

/// Abstract interface for paginated document access.
pub trait PageSource {
    /// Base name of the input without extension, used as a title fallback.
    fn name(&self) -> &str;

    /// Total number of pages.
    fn page_count(&self) -> usize;

    /// Spans on a page (0-indexed), in content order.
    fn page_spans(&self, index: usize) -> Result<Vec<Span>>;

    /// Plain text of a page (0-indexed), used as a language sample.
    ///
    /// The default joins the page's span texts with newlines.
    fn page_text(&self, index: usize) -> Result<String> {
        let spans = self.page_spans(index)?;
        Ok(spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Title from document metadata, if any.
    fn title(&self) -> Option<String>;
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn page_spans(&self, index: usize) -> Result<Vec<Span>> {
        (**self).page_spans(index)
    }

    fn page_text(&self, index: usize) -> Result<String> {
        (**self).page_text(index)
    }

    fn title(&self) -> Option<String> {
        (**self).title()
    }
}
