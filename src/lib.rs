//! # pdfoutline
//!
//! Infer a document outline (title plus H1/H2/H3 headings) from the visual
//! layout of a PDF.
//!
//! Headings are found without relying on embedded bookmarks: the body font
//! is estimated from a sampled font-size histogram, every text span is scored
//! on size, weight, position and language-specific prefixes, and the
//! resulting levels are repaired so the outline never skips a depth.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_outline, LinguaModel};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     // Load the language model once and reuse it
//!     let model = LinguaModel::load()?;
//!
//!     let result = extract_outline("document.pdf", &model)?;
//!     for heading in &result.outline {
//!         println!("{} {} (p. {})", heading.level, heading.text, heading.page);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Layout-based**: works on any text PDF, bookmarks or not
//! - **Language-aware**: English and Japanese heading prefixes
//! - **Pluggable input**: anything implementing [`PageSource`]
//! - **Batch processing**: directory runs on a bounded Rayon pool

pub mod analysis;
pub mod batch;
pub mod error;
pub mod model;
pub mod options;
pub mod pipeline;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use analysis::{LanguageDetector, LanguageModel, LinguaModel, Prediction};
pub use batch::{run_batch, run_batch_with_progress, BatchOptions, BatchReport, FileReport, FileStatus};
pub use error::{Error, Result};
pub use model::{
    CorrectedHeading, DocumentResult, FontDistribution, HeadingCandidate, HeadingLevel, Outline,
    OutlineMetadata, PageStage, PageWarning, Span,
};
pub use options::OutlineOptions;
pub use pipeline::{DocumentOutcome, OutlinePipeline};
pub use render::JsonFormat;
pub use source::{is_pdf_bytes, MemorySource, PageSource, PdfSource};

use std::path::Path;

/// Infer the outline of a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{extract_outline, LinguaModel};
///
/// let model = LinguaModel::load().unwrap();
/// let result = extract_outline("document.pdf", &model).unwrap();
/// println!("{}: {} headings", result.title, result.heading_count());
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P, model: &dyn LanguageModel) -> Result<DocumentResult> {
    PdfOutline::new().process(path, model).map(|o| o.result)
}

/// Infer the outline of a PDF held in memory.
///
/// `name` is used as the title when the document has no usable metadata
/// title.
pub fn extract_outline_from_bytes(
    data: &[u8],
    name: &str,
    model: &dyn LanguageModel,
) -> Result<DocumentResult> {
    PdfOutline::new()
        .process_bytes(data, name, model)
        .map(|o| o.result)
}

/// Infer the outline of a PDF file and render it as JSON.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{to_json, JsonFormat, LinguaModel};
///
/// let model = LinguaModel::load().unwrap();
/// let json = to_json("document.pdf", &model, JsonFormat::Pretty).unwrap();
/// std::fs::write("document.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(
    path: P,
    model: &dyn LanguageModel,
    format: JsonFormat,
) -> Result<String> {
    let result = extract_outline(path, model)?;
    render::to_json(&result, format)
}

/// Builder for outline extraction.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{JsonFormat, LinguaModel, PdfOutline};
///
/// let model = LinguaModel::with_languages(&["en", "ja"])?;
/// let json = PdfOutline::new()
///     .with_max_pages(100)
///     .with_sample_size(8)
///     .process("document.pdf", &model)?
///     .to_json(JsonFormat::Compact)?;
/// # Ok::<(), pdfoutline::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfOutline {
    options: OutlineOptions,
}

impl PdfOutline {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all options.
    pub fn with_options(mut self, options: OutlineOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the page-count ceiling.
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.options = self.options.with_max_pages(pages);
        self
    }

    /// Set the font sampling size.
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.options = self.options.with_sample_size(size);
        self
    }

    /// Set the language assumed when detection is skipped.
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.options = self.options.with_default_language(language);
        self
    }

    /// Process any page source.
    pub fn process_source<S: PageSource + ?Sized>(
        &self,
        source: &S,
        model: &dyn LanguageModel,
    ) -> Result<DocumentOutcome> {
        self.options.validate()?;
        OutlinePipeline::with_options(model, self.options.clone()).process(source)
    }

    /// Process a PDF file.
    pub fn process<P: AsRef<Path>>(
        &self,
        path: P,
        model: &dyn LanguageModel,
    ) -> Result<DocumentOutcome> {
        let source = PdfSource::open(path)?;
        self.process_source(&source, model)
    }

    /// Process a PDF from bytes.
    pub fn process_bytes(
        &self,
        data: &[u8],
        name: &str,
        model: &dyn LanguageModel,
    ) -> Result<DocumentOutcome> {
        let source = PdfSource::from_bytes(data, name)?;
        self.process_source(&source, model)
    }
}

impl DocumentOutcome {
    /// Render the result as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.result, format)
    }
}
