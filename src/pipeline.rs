//! Single-document outline pipeline.
//!
//! A run is strictly sequential: detect the language from the first page,
//! estimate the body font from a page sample, score every page in order,
//! correct the hierarchy once over the whole candidate list, and assemble
//! the result. Per-page failures are collected as warnings; anything else
//! aborts the document without a partial result.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::{correct, FontAnalyzer, HeadingScorer, LanguageDetector, LanguageModel};
use crate::error::{Error, Result};
use crate::model::{DocumentResult, OutlineMetadata, PageStage, PageWarning};
use crate::options::OutlineOptions;
use crate::source::PageSource;

static NON_TITLE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid title regex"));

/// A finished document together with the pages it had to skip.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOutcome {
    /// The inferred outline and metadata
    pub result: DocumentResult,
    /// Pages that contributed nothing to some stage
    pub warnings: Vec<PageWarning>,
}

impl DocumentOutcome {
    /// Check if every page was processed without problems.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Clean a metadata title, falling back to `fallback` when nothing usable
/// remains.
///
/// Keeps word characters, whitespace and hyphens, then truncates to
/// `max_chars` characters.
pub fn clean_title(title: Option<&str>, fallback: &str, max_chars: usize) -> String {
    let cleaned: String = title
        .map(|t| NON_TITLE_CHARS.replace_all(t, "").chars().take(max_chars).collect())
        .unwrap_or_default();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Turns a [`PageSource`] into a [`DocumentResult`].
///
/// The language model is borrowed, so one model instance can serve any
/// number of pipelines and threads.
pub struct OutlinePipeline<'m> {
    model: &'m dyn LanguageModel,
    options: OutlineOptions,
}

impl<'m> OutlinePipeline<'m> {
    /// Create a pipeline with default options.
    pub fn new(model: &'m dyn LanguageModel) -> Self {
        Self::with_options(model, OutlineOptions::default())
    }

    /// Create a pipeline with custom options.
    pub fn with_options(model: &'m dyn LanguageModel, options: OutlineOptions) -> Self {
        Self { model, options }
    }

    /// Options in effect.
    pub fn options(&self) -> &OutlineOptions {
        &self.options
    }

    /// Build the outline for one document.
    pub fn process<S: PageSource + ?Sized>(&self, source: &S) -> Result<DocumentOutcome> {
        let page_count = source.page_count();
        if page_count > self.options.max_pages {
            return Err(Error::PageLimitExceeded {
                pages: page_count,
                limit: self.options.max_pages,
            });
        }
        log::debug!("Processing {} ({} pages)", source.name(), page_count);

        let mut warnings = Vec::new();

        let language = self.detect_language(source, &mut warnings)?;

        let analysis = FontAnalyzer::new(self.options.sample_size)
            .with_default_body_size(self.options.default_body_size)
            .analyze(source);
        warnings.extend(analysis.warnings.iter().cloned());

        let scorer = HeadingScorer::new(&self.options);
        let mut candidates = Vec::new();
        for index in 0..page_count {
            match source.page_spans(index) {
                Ok(spans) => {
                    candidates.extend(scorer.score_page(&spans, analysis.body_size, &language));
                }
                Err(e) => {
                    log::warn!("Page {} skipped - {}", index, e);
                    warnings.push(PageWarning::new(index, PageStage::Scoring, e.to_string()));
                }
            }
        }
        log::debug!(
            "{} heading candidates in {} (language {}, body {}pt)",
            candidates.len(),
            source.name(),
            language,
            analysis.body_size
        );

        let outline = correct(candidates);
        let title = clean_title(
            source.title().as_deref(),
            source.name(),
            self.options.max_title_chars,
        );

        Ok(DocumentOutcome {
            result: DocumentResult {
                title,
                outline,
                metadata: OutlineMetadata {
                    page_count,
                    body_font_size: analysis.body_size,
                    font_distribution: analysis.histogram.top(self.options.histogram_top_n),
                    detected_language: language,
                },
            },
            warnings,
        })
    }

    fn detect_language<S: PageSource + ?Sized>(
        &self,
        source: &S,
        warnings: &mut Vec<PageWarning>,
    ) -> Result<String> {
        let detector = LanguageDetector::with_options(self.model, &self.options);
        if source.page_count() == 0 {
            return detector.detect("");
        }

        let text = match source.page_text(0) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Page 0 skipped - {}", e);
                warnings.push(PageWarning::new(0, PageStage::Language, e.to_string()));
                String::new()
            }
        };
        detector.detect(&text)
    }
}
