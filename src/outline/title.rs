//! Title selection from the first page.

use crate::config::OutlineConfig;
use crate::model::{LayoutLine, PageLayout, TitleCandidate, UNKNOWN_TITLE};

use super::normalize::normalize_text;

/// Picks the document title among the first page's oversized lines.
pub struct TitleSelector<'a> {
    config: &'a OutlineConfig,
}

impl<'a> TitleSelector<'a> {
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self { config }
    }

    /// Lines of `page` that qualify as title candidates, in page order.
    pub fn candidates(&self, page: &PageLayout, average_font_size: f32) -> Vec<TitleCandidate> {
        let threshold = average_font_size * self.config.title_size_ratio;
        page.lines()
            .filter_map(|line| {
                let size = line_text_size(line);
                let text = normalize_text(&line.text());
                let length = text.chars().count();
                let qualifies = length > self.config.min_title_chars
                    && length <= self.config.max_title_chars
                    && size > threshold;
                qualifies.then(|| TitleCandidate::new(text, size))
            })
            .collect()
    }

    /// The best candidate's text, or "Unknown".
    ///
    /// Larger fonts win; among equal sizes the shorter text wins, and full
    /// ties keep the earliest line.
    pub fn select(&self, first_page: Option<&PageLayout>, average_font_size: f32) -> String {
        let Some(page) = first_page else {
            return UNKNOWN_TITLE.to_string();
        };

        self.candidates(page, average_font_size)
            .into_iter()
            .min_by(|a, b| a.rank(b))
            .map(|c| c.text)
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
    }
}

/// Largest size among the spans that carry visible text.
fn line_text_size(line: &LayoutLine) -> f32 {
    line.spans
        .iter()
        .filter(|s| !s.text.trim().is_empty())
        .map(|s| s.size)
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StyledSpan;

    fn page(lines: &[(&str, f32)]) -> PageLayout {
        PageLayout::from_lines(
            lines
                .iter()
                .map(|(t, s)| LayoutLine::single(StyledSpan::new(*t, *s)))
                .collect(),
        )
    }

    #[test]
    fn test_largest_font_wins() {
        let config = OutlineConfig::default();
        let selector = TitleSelector::new(&config);
        let p = page(&[("Subtitle here", 18.0), ("Main Title", 24.0), ("Body", 10.0)]);
        assert_eq!(selector.select(Some(&p), 10.0), "Main Title");
    }

    #[test]
    fn test_shorter_text_breaks_ties() {
        let config = OutlineConfig::default();
        let selector = TitleSelector::new(&config);
        let p = page(&[("A Much Longer Heading", 24.0), ("Short One", 24.0)]);
        assert_eq!(selector.select(Some(&p), 10.0), "Short One");
    }

    #[test]
    fn test_equal_candidates_keep_first() {
        let config = OutlineConfig::default();
        let selector = TitleSelector::new(&config);
        let p = page(&[("Alpha", 24.0), ("Omega", 24.0)]);
        for _ in 0..3 {
            assert_eq!(selector.select(Some(&p), 10.0), "Alpha");
        }
    }

    #[test]
    fn test_size_threshold_is_strict() {
        let config = OutlineConfig::default();
        let selector = TitleSelector::new(&config);
        let average = 10.0;
        let p = page(&[("Borderline", average * 1.2)]);
        assert_eq!(selector.select(Some(&p), average), "Unknown");
    }

    #[test]
    fn test_length_bounds() {
        let config = OutlineConfig::default();
        let selector = TitleSelector::new(&config);
        let too_long = "x".repeat(151);
        let max_len = "y".repeat(150);
        let p = page(&[("Abc", 30.0), (too_long.as_str(), 30.0), (max_len.as_str(), 20.0)]);
        assert_eq!(selector.select(Some(&p), 10.0), max_len);
    }

    #[test]
    fn test_multi_span_line_joined() {
        let config = OutlineConfig::default();
        let selector = TitleSelector::new(&config);
        let p = PageLayout::from_lines(vec![LayoutLine::new(vec![
            StyledSpan::new(" Annual ", 22.0),
            StyledSpan::new("", 40.0),
            StyledSpan::new("Report", 20.0),
        ])]);
        let candidates = selector.candidates(&p, 10.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "Annual Report");
        assert_eq!(candidates[0].font_size, 22.0);
    }

    #[test]
    fn test_missing_page() {
        let config = OutlineConfig::default();
        let selector = TitleSelector::new(&config);
        assert_eq!(selector.select(None, 10.0), "Unknown");
    }
}
