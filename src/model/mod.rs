//! Data model for outline inference.
//!
//! Spans flow in from a [`crate::source::PageSource`], heading candidates are
//! produced by the scorer, and a [`DocumentResult`] is what gets serialized.
//! Every value here is owned by the single document run that created it.

mod heading;
mod result;
mod span;
mod warning;

pub use heading::{CorrectedHeading, HeadingCandidate, HeadingLevel};
pub use result::{DocumentResult, FontDistribution, Outline, OutlineMetadata};
pub use span::Span;
pub use warning::{PageStage, PageWarning};
