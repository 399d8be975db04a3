//! Language detection for picking heading pattern rules.
//!
//! The identification model is a capability object: build it once at
//! startup and pass it by reference into every document run. It is never
//! mutated after construction, so sharing it across worker threads needs no
//! locking.

use std::str::FromStr;

use lingua::{IsoCode639_1, LanguageDetectorBuilder};

use crate::error::{Error, Result};
use crate::options::OutlineOptions;

/// Prefix some identification models put in front of language codes.
pub const LABEL_PREFIX: &str = "__label__";

/// A single language prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Language label, possibly carrying [`LABEL_PREFIX`]
    pub label: String,
    /// Model confidence in `0.0..=1.0`
    pub confidence: f64,
}

impl Prediction {
    /// Create a new prediction.
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// The bare language code.
    pub fn code(&self) -> &str {
        strip_label(&self.label)
    }
}

/// Strip [`LABEL_PREFIX`] from a model label.
pub fn strip_label(label: &str) -> &str {
    label.strip_prefix(LABEL_PREFIX).unwrap_or(label)
}

/// A language identification model.
pub trait LanguageModel: Send + Sync {
    /// Return up to `k` predictions for `text`, most likely first.
    fn predict(&self, text: &str, k: usize) -> Result<Vec<Prediction>>;
}

impl<T: LanguageModel + ?Sized> LanguageModel for &T {
    fn predict(&self, text: &str, k: usize) -> Result<Vec<Prediction>> {
        (**self).predict(text, k)
    }
}

/// [`LanguageModel`] backed by the lingua n-gram detector.
pub struct LinguaModel {
    detector: lingua::LanguageDetector,
}

impl LinguaModel {
    /// Load a model covering every language lingua knows.
    pub fn load() -> Result<Self> {
        let detector = LanguageDetectorBuilder::from_all_languages().build();
        Ok(Self { detector })
    }

    /// Load a model restricted to the given ISO 639-1 codes.
    ///
    /// Fails when a code is unknown or fewer than two languages are given.
    pub fn with_languages<S: AsRef<str>>(codes: &[S]) -> Result<Self> {
        let isos = codes
            .iter()
            .map(|code| {
                let code = code.as_ref().trim();
                IsoCode639_1::from_str(code)
                    .map_err(|_| Error::LanguageModel(format!("unknown language code '{}'", code)))
            })
            .collect::<Result<Vec<_>>>()?;

        if isos.len() < 2 {
            return Err(Error::LanguageModel(
                "at least two languages are required".to_string(),
            ));
        }

        let detector = LanguageDetectorBuilder::from_iso_codes_639_1(&isos).build();
        Ok(Self { detector })
    }
}

impl LanguageModel for LinguaModel {
    fn predict(&self, text: &str, k: usize) -> Result<Vec<Prediction>> {
        Ok(self
            .detector
            .compute_language_confidence_values(text)
            .into_iter()
            .filter(|(_, confidence)| *confidence > 0.0)
            .take(k)
            .map(|(language, confidence)| {
                Prediction::new(language.iso_code_639_1().to_string(), confidence)
            })
            .collect())
    }
}

/// Maps a text sample to a language code.
pub struct LanguageDetector<'m> {
    model: &'m dyn LanguageModel,
    min_sample: usize,
    max_sample: usize,
    default_language: String,
}

impl<'m> LanguageDetector<'m> {
    /// Create a detector with default sample bounds.
    pub fn new(model: &'m dyn LanguageModel) -> Self {
        Self::with_options(model, &OutlineOptions::default())
    }

    /// Create a detector using the sample bounds from `options`.
    pub fn with_options(model: &'m dyn LanguageModel, options: &OutlineOptions) -> Self {
        Self {
            model,
            min_sample: options.min_language_sample,
            max_sample: options.max_language_sample,
            default_language: options.default_language.clone(),
        }
    }

    /// Detect the language of `text`.
    ///
    /// Samples shorter than the minimum (after trimming) return the default
    /// language without consulting the model. Only a model failure is an error.
    pub fn detect(&self, text: &str) -> Result<String> {
        if text.trim().chars().count() < self.min_sample {
            return Ok(self.default_language.clone());
        }

        let sample: String = text
            .replace(['\r', '\n'], " ")
            .chars()
            .take(self.max_sample)
            .collect();

        let predictions = self.model.predict(&sample, 1)?;
        match predictions.first().map(Prediction::code) {
            Some(code) if !code.is_empty() => Ok(code.to_string()),
            _ => {
                log::debug!("No language prediction, assuming {}", self.default_language);
                Ok(self.default_language.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Model that records its input and answers with a fixed label.
    struct FixedModel {
        label: Option<&'static str>,
        seen: Mutex<Vec<String>>,
    }

    impl FixedModel {
        fn new(label: Option<&'static str>) -> Self {
            Self {
                label,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl LanguageModel for FixedModel {
        fn predict(&self, text: &str, k: usize) -> Result<Vec<Prediction>> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(self
                .label
                .iter()
                .take(k)
                .map(|l| Prediction::new(*l, 0.9))
                .collect())
        }
    }

    struct BrokenModel;

    impl LanguageModel for BrokenModel {
        fn predict(&self, _text: &str, _k: usize) -> Result<Vec<Prediction>> {
            Err(Error::LanguageModel("model file missing".into()))
        }
    }

    #[test]
    fn test_short_text_defaults_to_english() {
        let model = FixedModel::new(Some("__label__ja"));
        let detector = LanguageDetector::new(&model);

        for text in ["", "   ", "短い", "hello", "  123456789  "] {
            assert_eq!(detector.detect(text).unwrap(), "en");
        }
        assert!(model.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_short_text_never_hits_broken_model() {
        let detector = LanguageDetector::new(&BrokenModel);
        assert_eq!(detector.detect("tiny").unwrap(), "en");
        assert!(matches!(
            detector.detect("long enough sample text"),
            Err(Error::LanguageModel(_))
        ));
    }

    #[test]
    fn test_label_prefix_stripped() {
        let model = FixedModel::new(Some("__label__ja"));
        let detector = LanguageDetector::new(&model);
        assert_eq!(detector.detect("第1章: 導入 人工知能の基本概念").unwrap(), "ja");

        let model = FixedModel::new(Some("de"));
        let detector = LanguageDetector::new(&model);
        assert_eq!(detector.detect("Das ist ein deutscher Satz.").unwrap(), "de");
    }

    #[test]
    fn test_sample_is_flattened_and_truncated() {
        let model = FixedModel::new(Some("en"));
        let detector = LanguageDetector::new(&model);
        let text = format!("line one\nline two\n{}", "x".repeat(1000));
        detector.detect(&text).unwrap();

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].contains('\n'));
        assert!(seen[0].starts_with("line one line two "));
        assert_eq!(seen[0].chars().count(), 500);
    }

    #[test]
    fn test_no_prediction_falls_back() {
        let model = FixedModel::new(None);
        let options = OutlineOptions::new().with_default_language("fr");
        let detector = LanguageDetector::with_options(&model, &options);
        assert_eq!(detector.detect("0123456789 0123456789").unwrap(), "fr");
    }

    #[test]
    fn test_strip_label() {
        assert_eq!(strip_label("__label__en"), "en");
        assert_eq!(strip_label("zh"), "zh");
        assert_eq!(Prediction::new("__label__ko", 0.5).code(), "ko");
    }

    #[test]
    fn test_lingua_model_rejects_bad_languages() {
        assert!(matches!(
            LinguaModel::with_languages(&["en"]),
            Err(Error::LanguageModel(_))
        ));
        assert!(matches!(
            LinguaModel::with_languages(&["en", "not-a-code"]),
            Err(Error::LanguageModel(_))
        ));
    }

    #[test]
    fn test_lingua_model_predicts() {
        let model = LinguaModel::with_languages(&["en", "de", "ja"]).unwrap();
        let detector = LanguageDetector::new(&model);
        let text = "This is a reasonably long English sentence about document outlines.";
        assert_eq!(detector.detect(text).unwrap(), "en");

        let predictions = model.predict(text, 2).unwrap();
        assert!(predictions.len() <= 2);
        assert_eq!(predictions[0].code(), "en");
    }
}
