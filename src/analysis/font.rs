//! Body-font estimation from a sampled font-size histogram.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{FontDistribution, PageStage, PageWarning};
use crate::source::PageSource;

/// Occurrence counts of font sizes rounded to the nearest 0.5pt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontHistogram {
    /// Keyed by size in half points (12.5pt -> 25)
    counts: BTreeMap<u32, usize>,
}

impl FontHistogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a font size observation. Non-finite and non-positive sizes are ignored.
    pub fn add(&mut self, size: f32) {
        if !size.is_finite() || size <= 0.0 {
            return;
        }
        *self.counts.entry(half_points(size)).or_insert(0) += 1;
    }

    /// Check if no size was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct rounded sizes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Total number of observations.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Count for a size (rounded the same way as [`FontHistogram::add`]).
    pub fn count(&self, size: f32) -> usize {
        self.counts.get(&half_points(size)).copied().unwrap_or(0)
    }

    /// Iterate over `(size, count)` in ascending size order.
    pub fn iter(&self) -> impl Iterator<Item = (f32, usize)> + '_ {
        self.counts.iter().map(|(k, c)| (*k as f32 / 2.0, *c))
    }

    /// The most common size; the smallest one wins a tie.
    pub fn mode(&self) -> Option<f32> {
        let mut best: Option<(u32, usize)> = None;
        for (&key, &count) in &self.counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((key, count));
            }
        }
        best.map(|(key, _)| key as f32 / 2.0)
    }

    /// The `n` most common sizes, by descending count then ascending size.
    pub fn top(&self, n: usize) -> FontDistribution {
        let mut entries: Vec<(f32, usize)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.total_cmp(&b.0)));
        entries.truncate(n);
        FontDistribution(entries)
    }
}

/// Size in half points, with exact quarter points going to the even key.
fn half_points(size: f32) -> u32 {
    (size * 2.0).round_ties_even() as u32
}

/// Round a size to the nearest 0.5; ties go to the even half point.
pub fn round_half(size: f32) -> f32 {
    half_points(size) as f32 / 2.0
}

/// Pages sampled for the histogram.
///
/// Documents longer than `sample_size` are sampled at the first two, the
/// middle and the last two pages; shorter ones are sampled in full.
pub fn sample_indices(page_count: usize, sample_size: usize) -> Vec<usize> {
    if page_count > sample_size {
        let picks: BTreeSet<usize> = [
            0,
            1,
            page_count / 2,
            page_count.saturating_sub(2),
            page_count - 1,
        ]
        .into_iter()
        .filter(|&i| i < page_count)
        .collect();
        picks.into_iter().collect()
    } else {
        (0..page_count).collect()
    }
}

/// Result of font distribution analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct FontAnalysis {
    /// Estimated body text size
    pub body_size: f32,
    /// Histogram over every sampled span
    pub histogram: FontHistogram,
    /// Pages that were sampled (0-indexed)
    pub sampled_pages: Vec<usize>,
    /// Sampled pages that could not be read
    pub warnings: Vec<PageWarning>,
}

/// Samples a bounded set of pages and estimates the body font size.
#[derive(Debug, Clone)]
pub struct FontAnalyzer {
    sample_size: usize,
    default_body_size: f32,
}

impl FontAnalyzer {
    /// Create an analyzer with the given sample size.
    pub fn new(sample_size: usize) -> Self {
        Self {
            sample_size,
            default_body_size: 12.0,
        }
    }

    /// Set the size returned when no span could be sampled.
    pub fn with_default_body_size(mut self, size: f32) -> Self {
        self.default_body_size = size;
        self
    }

    /// Build the histogram and pick its mode as the body size.
    pub fn analyze<S: PageSource + ?Sized>(&self, source: &S) -> FontAnalysis {
        let sampled_pages = sample_indices(source.page_count(), self.sample_size);
        let mut histogram = FontHistogram::new();
        let mut warnings = Vec::new();

        for &index in &sampled_pages {
            match source.page_spans(index) {
                Ok(spans) => {
                    for span in &spans {
                        histogram.add(span.size);
                    }
                }
                Err(e) => {
                    log::warn!("Page {} skipped - {}", index, e);
                    warnings.push(PageWarning::new(index, PageStage::Sampling, e.to_string()));
                }
            }
        }

        let body_size = histogram.mode().unwrap_or(self.default_body_size);
        log::debug!(
            "Body font {}pt from {} spans on {} sampled pages",
            body_size,
            histogram.total(),
            sampled_pages.len()
        );

        FontAnalysis {
            body_size,
            histogram,
            sampled_pages,
            warnings,
        }
    }
}

impl Default for FontAnalyzer {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Span;
    use crate::source::MemorySource;

    fn page(sizes: &[f32]) -> Vec<Span> {
        sizes
            .iter()
            .map(|&size| Span::new("text", size, 0.5, 0))
            .collect()
    }

    #[test]
    fn test_histogram_rounding() {
        let mut histogram = FontHistogram::new();
        histogram.add(11.8);
        histogram.add(12.1);
        histogram.add(10.3);
        histogram.add(f32::NAN);
        histogram.add(0.0);

        assert_eq!(histogram.count(12.0), 2);
        assert_eq!(histogram.count(10.5), 1);
        assert_eq!(histogram.total(), 3);
        assert_eq!(round_half(10.74), 10.5);
        assert_eq!(round_half(10.76), 11.0);
    }

    #[test]
    fn test_quarter_points_round_to_even() {
        assert_eq!(round_half(12.25), 12.0);
        assert_eq!(round_half(12.75), 13.0);
        assert_eq!(round_half(10.25), 10.0);
        assert_eq!(round_half(10.75), 11.0);

        let mut histogram = FontHistogram::new();
        histogram.add(12.25);
        histogram.add(12.25);
        histogram.add(12.5);
        assert_eq!(histogram.mode(), Some(12.0));
        assert_eq!(histogram.count(12.0), 2);
        assert_eq!(histogram.count(12.25), 2);
    }

    #[test]
    fn test_mode_is_maximal_key() {
        let mut histogram = FontHistogram::new();
        for size in [12.0, 12.0, 12.0, 18.0, 9.0, 9.0, 24.0] {
            histogram.add(size);
        }
        let mode = histogram.mode().unwrap();
        let mode_count = histogram.count(mode);
        assert_eq!(mode, 12.0);
        assert!(histogram.iter().all(|(_, count)| mode_count >= count));
    }

    #[test]
    fn test_mode_tie_picks_smallest() {
        let mut histogram = FontHistogram::new();
        for size in [14.0, 10.0, 14.0, 10.0] {
            histogram.add(size);
        }
        assert_eq!(histogram.mode(), Some(10.0));
        assert_eq!(FontHistogram::new().mode(), None);
    }

    #[test]
    fn test_top_ordering() {
        let mut histogram = FontHistogram::new();
        for size in [12.0, 12.0, 12.0, 18.0, 9.0, 9.0, 24.0] {
            histogram.add(size);
        }
        let top = histogram.top(3);
        assert_eq!(top.0, vec![(12.0, 3), (9.0, 2), (18.0, 1)]);
    }

    #[test]
    fn test_sample_indices_small_document() {
        assert_eq!(sample_indices(0, 5), Vec::<usize>::new());
        assert_eq!(sample_indices(3, 5), vec![0, 1, 2]);
        assert_eq!(sample_indices(5, 5), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_sample_indices_large_document() {
        assert_eq!(sample_indices(6, 5), vec![0, 1, 3, 4, 5]);
        assert_eq!(sample_indices(50, 5), vec![0, 1, 25, 48, 49]);
        // Degenerate sample sizes still stay in range.
        assert_eq!(sample_indices(1, 0), vec![0]);
        assert_eq!(sample_indices(2, 0), vec![0, 1]);
    }

    #[test]
    fn test_analyze_skips_failing_page() {
        let source = MemorySource::new("doc")
            .with_page(page(&[12.0, 12.0, 18.0]))
            .with_failing_page("bad stream")
            .with_page(page(&[12.0, 10.0]));

        let analysis = FontAnalyzer::default().analyze(&source);
        assert_eq!(analysis.body_size, 12.0);
        assert_eq!(analysis.sampled_pages, vec![0, 1, 2]);
        assert_eq!(analysis.histogram.total(), 5);
        assert_eq!(analysis.warnings.len(), 1);
        assert_eq!(analysis.warnings[0].page_index, 1);
        assert_eq!(analysis.warnings[0].stage, PageStage::Sampling);
    }

    #[test]
    fn test_analyze_empty_sample_uses_default() {
        let source = MemorySource::new("doc").with_page(vec![]);
        let analysis = FontAnalyzer::new(5)
            .with_default_body_size(11.0)
            .analyze(&source);
        assert_eq!(analysis.body_size, 11.0);
        assert!(analysis.histogram.is_empty());
    }

    #[test]
    fn test_analyze_only_reads_sampled_pages() {
        let mut source = MemorySource::new("long");
        for i in 0..10 {
            // Page 7 is never sampled, so its oversized body text must not count.
            let size = if i == 7 { 30.0 } else { 11.0 };
            source.push_page(page(&[size, size, size, size]));
        }
        let analysis = FontAnalyzer::default().analyze(&source);
        assert_eq!(analysis.sampled_pages, vec![0, 1, 5, 8, 9]);
        assert_eq!(analysis.body_size, 11.0);
        assert_eq!(analysis.histogram.count(30.0), 0);
    }
}
