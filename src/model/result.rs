//! Document-level result types.

use super::CorrectedHeading;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered headings; insertion order is the document's structural order.
pub type Outline = Vec<CorrectedHeading>;

/// The outline inferred for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Document title (metadata title or file stem)
    pub title: String,

    /// Corrected headings in reading order
    pub outline: Outline,

    /// Diagnostics gathered while building the outline
    pub metadata: OutlineMetadata,
}

impl DocumentResult {
    /// Number of headings in the outline.
    pub fn heading_count(&self) -> usize {
        self.outline.len()
    }
}

/// Diagnostic metadata attached to a [`DocumentResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineMetadata {
    /// Total number of pages in the document
    pub page_count: usize,

    /// Estimated body text size in points
    pub body_font_size: f32,

    /// Most frequent rounded font sizes with their counts
    pub font_distribution: FontDistribution,

    /// Language code used to pick heading patterns
    pub detected_language: String,
}

/// Most frequent font sizes, ordered by descending count.
///
/// Serialized as a JSON object whose keys are the sizes with one decimal
/// (`"12.0"`, `"10.5"`), keeping entry order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontDistribution(pub Vec<(f32, usize)>);

impl FontDistribution {
    /// Check if the distribution is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct sizes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Count recorded for a size, if present.
    pub fn count(&self, size: f32) -> Option<usize> {
        self.0
            .iter()
            .find(|(s, _)| (*s - size).abs() < f32::EPSILON)
            .map(|(_, c)| *c)
    }

    /// Iterate over `(size, count)` entries.
    pub fn iter(&self) -> impl Iterator<Item = &(f32, usize)> {
        self.0.iter()
    }
}

impl Serialize for FontDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (size, count) in &self.0 {
            map.serialize_entry(&format!("{:.1}", size), count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FontDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = FontDistribution;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of font size to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, count)) = access.next_entry::<String, usize>()? {
                    let size = key.parse::<f32>().map_err(serde::de::Error::custom)?;
                    entries.push((size, count));
                }
                Ok(FontDistribution(entries))
            }
        }

        deserializer.deserialize_map(DistributionVisitor)
    }
}
