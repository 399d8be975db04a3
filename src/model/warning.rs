//! Recoverable per-page problems.

use std::fmt;

/// Processing stage during which a page was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStage {
    /// Reading the language sample from the first page
    Language,
    /// Sampling font sizes for the body-font estimate
    Sampling,
    /// Scoring heading candidates
    Scoring,
}

impl fmt::Display for PageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageStage::Language => "language",
            PageStage::Sampling => "sampling",
            PageStage::Scoring => "scoring",
        };
        f.write_str(name)
    }
}

/// A page that contributed nothing to one stage of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWarning {
    /// Page index (0-indexed)
    pub page_index: usize,
    /// Stage that skipped the page
    pub stage: PageStage,
    /// Why the page was skipped
    pub reason: String,
}

impl PageWarning {
    /// Create a new warning.
    pub fn new(page_index: usize, stage: PageStage, reason: impl Into<String>) -> Self {
        Self {
            page_index,
            stage,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Page {} skipped during {} - {}",
            self.page_index, self.stage, self.reason
        )
    }
}
