//! Outline inference stages.
//!
//! - [`font`]: body-font estimation from a sampled size histogram
//! - [`language`]: language identification for pattern selection
//! - [`patterns`]: per-language heading prefix rules
//! - [`scorer`]: per-span heading scoring and level bands
//! - [`hierarchy`]: outline level correction

pub mod font;
pub mod hierarchy;
pub mod language;
pub mod patterns;
pub mod scorer;

pub use font::{FontAnalysis, FontAnalyzer, FontHistogram};
pub use hierarchy::correct;
pub use language::{LanguageDetector, LanguageModel, LinguaModel, Prediction};
pub use patterns::{EnglishPatterns, JapanesePatterns, NoPatterns, PatternStrategy};
pub use scorer::{HeadingScorer, ScoreBreakdown};
