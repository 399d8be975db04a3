//! JSON rendering for outline results.

use crate::error::{Error, Result};
use crate::model::DocumentResult;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with two-space indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an outline result to JSON.
///
/// Non-ASCII text is written as-is, never `\u` escaped.
pub fn to_json(result: &DocumentResult, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(result),
        JsonFormat::Compact => serde_json::to_string(result),
    };

    json.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Parse an outline result previously written by [`to_json`].
pub fn from_json(json: &str) -> Result<DocumentResult> {
    serde_json::from_str(json).map_err(|e| Error::Render(format!("JSON parse error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CorrectedHeading, FontDistribution, HeadingLevel, OutlineMetadata};

    fn sample() -> DocumentResult {
        DocumentResult {
            title: "報告書".to_string(),
            outline: vec![CorrectedHeading::new(HeadingLevel::H1, "1. Introduction", 1)],
            metadata: OutlineMetadata {
                page_count: 3,
                body_font_size: 10.5,
                font_distribution: FontDistribution(vec![(10.5, 40), (18.0, 2)]),
                detected_language: "ja".to_string(),
            },
        }
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.starts_with("{\n  \"title\": \"報告書\","));
        assert!(json.contains("\"level\": \"H1\""));
        assert!(json.contains("\"10.5\": 40"));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains(r#""outline":[{"level":"H1","text":"1. Introduction","page":1}]"#));
    }

    #[test]
    fn test_key_order() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        let title = json.find("\"title\"").unwrap();
        let outline = json.find("\"outline\"").unwrap();
        let metadata = json.find("\"metadata\"").unwrap();
        assert!(title < outline && outline < metadata);

        let keys = ["page_count", "body_font_size", "font_distribution", "detected_language"];
        let positions: Vec<_> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_from_json() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert_eq!(from_json(&json).unwrap(), sample());
        assert!(matches!(from_json("{"), Err(Error::Render(_))));
    }
}
