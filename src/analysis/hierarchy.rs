//! Outline level correction.

use crate::model::{CorrectedHeading, HeadingCandidate, HeadingLevel};

impl From<HeadingCandidate> for CorrectedHeading {
    fn from(candidate: HeadingCandidate) -> Self {
        CorrectedHeading::new(candidate.level, candidate.text, candidate.page)
    }
}

/// Clamp heading levels so the outline never skips a depth.
///
/// Each heading may be at most one level deeper than the heading before it;
/// the first heading is therefore always H1. Shallower jumps are kept as-is.
/// Running the correction on its own output changes nothing.
pub fn correct<I, T>(headings: I) -> Vec<CorrectedHeading>
where
    I: IntoIterator<Item = T>,
    T: Into<CorrectedHeading>,
{
    let mut current = 0u8;
    headings
        .into_iter()
        .map(|heading| {
            let mut heading = heading.into();
            let depth = heading.level.depth().min(current + 1);
            heading.level = HeadingLevel::from_depth(depth);
            current = depth;
            heading
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use HeadingLevel::{H1, H2, H3};

    fn headings(levels: &[HeadingLevel]) -> Vec<CorrectedHeading> {
        levels
            .iter()
            .enumerate()
            .map(|(i, &level)| CorrectedHeading::new(level, format!("Heading {}", i), i + 1))
            .collect()
    }

    fn levels(outline: &[CorrectedHeading]) -> Vec<HeadingLevel> {
        outline.iter().map(|h| h.level).collect()
    }

    #[test]
    fn test_first_heading_becomes_h1() {
        let outline = correct(headings(&[H3, H3, H2]));
        assert_eq!(levels(&outline), vec![H1, H2, H2]);
    }

    #[test]
    fn test_skipped_depth_is_clamped() {
        let outline = correct(headings(&[H1, H3, H1, H3, H3]));
        assert_eq!(levels(&outline), vec![H1, H2, H1, H2, H3]);
    }

    #[test]
    fn test_steps_never_exceed_one() {
        let patterns: [&[HeadingLevel]; 5] = [
            &[H3, H1, H3, H2, H3, H3],
            &[H2, H2, H3, H1, H3],
            &[H1, H2, H3, H3, H2, H1],
            &[H3],
            &[],
        ];
        for pattern in patterns {
            let outline = correct(headings(pattern));
            for pair in outline.windows(2) {
                assert!(pair[1].level.depth() <= pair[0].level.depth() + 1);
            }
            if let Some(first) = outline.first() {
                assert_eq!(first.level, H1);
            }
        }
    }

    #[test]
    fn test_correction_is_idempotent() {
        let once = correct(headings(&[H2, H3, H1, H3, H2, H3]));
        let twice = correct(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_candidates_keep_text_and_page() {
        let candidates = vec![
            HeadingCandidate {
                text: "Methods".into(),
                level: H3,
                page: 4,
                score: 3.9,
            },
            HeadingCandidate {
                text: "Overview".into(),
                level: H1,
                page: 5,
                score: 9.1,
            },
        ];
        let outline = correct(candidates);
        assert_eq!(
            outline,
            vec![
                CorrectedHeading::new(H1, "Methods", 4),
                CorrectedHeading::new(H1, "Overview", 5),
            ]
        );
    }
}
