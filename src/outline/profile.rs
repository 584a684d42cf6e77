//! Per-document font profile.

use crate::config::OutlineConfig;
use crate::lang::{self, LanguageDetector};
use crate::model::{DocumentProfile, PageLayout};

/// Samples the leading pages of a document to build a [`DocumentProfile`].
pub struct ProfileBuilder<'a> {
    config: &'a OutlineConfig,
    detector: &'a dyn LanguageDetector,
}

impl<'a> ProfileBuilder<'a> {
    pub fn new(config: &'a OutlineConfig, detector: &'a dyn LanguageDetector) -> Self {
        Self { config, detector }
    }

    /// Build the profile from `pages`, reading at most `profile_pages` of them.
    ///
    /// Every run whose trimmed text is long enough contributes its size to the
    /// average and its text to the language sample. With no qualifying run
    /// the profile falls back to the default size, no ranks, and the default
    /// language.
    pub fn build(&self, pages: &[PageLayout]) -> DocumentProfile {
        let mut sizes: Vec<f32> = Vec::new();
        let mut sample = String::new();

        for page in pages.iter().take(self.config.profile_pages) {
            for span in page.spans() {
                let text = span.text.trim();
                if text.chars().count() >= self.config.min_profile_run_chars {
                    sizes.push(span.size);
                    sample.push_str(text);
                    sample.push(' ');
                }
            }
        }

        let average = if sizes.is_empty() {
            self.config.default_font_size
        } else {
            sizes.iter().sum::<f32>() / sizes.len() as f32
        };

        let language = self.detect_language(&sample);
        let profile = DocumentProfile::new(average, &sizes, language)
            .with_mixed_script(lang::is_mixed_script(&sample));

        log::debug!(
            "Font profile: {} runs, average {:.2}pt, {} distinct sizes, language {}{}",
            sizes.len(),
            profile.average_font_size(),
            profile.font_size_ranks().len(),
            profile.language(),
            if profile.is_mixed_script() { " (mixed scripts)" } else { "" }
        );
        profile
    }

    fn detect_language(&self, sample: &str) -> String {
        if sample.trim().is_empty() {
            return self.config.default_language.clone();
        }

        let head: String = sample
            .chars()
            .take(self.config.language_sample_chars)
            .collect();

        match self.detector.detect(&head) {
            Ok(code) => code,
            Err(e) => {
                log::debug!(
                    "Language detection failed ({}), using {}",
                    e,
                    self.config.default_language
                );
                self.config.default_language.clone()
            }
        }
    }
}
