//! Per-document outline extraction.

use std::path::Path;
use std::sync::Arc;

use crate::config::{ErrorMode, OutlineConfig};
use crate::error::Result;
use crate::lang::{LanguageDetector, WhatlangDetector};
use crate::model::{DocumentProfile, ExtractionResult, HeadingRecord, PageLayout, StyledLine};
use crate::parser::{PageSource, PdfDocument};

use super::classify::HeadingClassifier;
use super::level::LevelAssigner;
use super::normalize::{normalize_text, strip_heading_numbers};
use super::profile::ProfileBuilder;
use super::title::TitleSelector;

/// Extracts a title and H1-H3 outline from documents.
///
/// One extractor can serve any number of documents, also from several
/// threads at once. Nothing is carried over between documents: every call
/// builds a fresh [`DocumentProfile`].
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{OutlineConfig, OutlineExtractor};
///
/// let extractor = OutlineExtractor::new(OutlineConfig::default());
/// let result = extractor.extract_file("report.pdf");
/// println!("{}: {} headings", result.title, result.outline.len());
/// ```
pub struct OutlineExtractor {
    config: Arc<OutlineConfig>,
    detector: Box<dyn LanguageDetector>,
    classifier: HeadingClassifier,
    assigner: LevelAssigner,
}

impl OutlineExtractor {
    /// Create an extractor using the statistical language detector.
    pub fn new(config: OutlineConfig) -> Self {
        Self::with_detector(config, WhatlangDetector::new())
    }

    /// Create an extractor with a custom language detector.
    pub fn with_detector<D>(config: OutlineConfig, detector: D) -> Self
    where
        D: LanguageDetector + 'static,
    {
        let config = Arc::new(config);
        Self {
            classifier: HeadingClassifier::new(Arc::clone(&config)),
            assigner: LevelAssigner::new(),
            detector: Box::new(detector),
            config,
        }
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Build the font profile for a document.
    pub fn profile(&self, pages: &[PageLayout]) -> DocumentProfile {
        ProfileBuilder::new(&self.config, self.detector.as_ref()).build(pages)
    }

    /// Classify every line of every page against `profile`.
    ///
    /// Records come out in page order, then in line order within a page.
    pub fn headings(&self, pages: &[PageLayout], profile: &DocumentProfile) -> Vec<HeadingRecord> {
        let average = profile.average_font_size();
        let language = profile.language();
        let mut outline = Vec::new();

        for (index, page) in pages.iter().enumerate() {
            let page_number = index as u32 + 1;

            for line in page.lines() {
                let styled = StyledLine::from_spans(&line.spans, self.config.bold_flag);
                if styled.text.is_empty() {
                    continue;
                }

                let Some(cue) = self.classifier.classify(
                    &styled.text,
                    styled.max_font_size,
                    styled.is_bold,
                    average,
                    language,
                ) else {
                    continue;
                };

                let level = self.assigner.assign(
                    &styled.text,
                    styled.max_font_size,
                    profile.font_size_ranks(),
                    language,
                );

                let text = if self.config.strip_heading_numbers {
                    strip_heading_numbers(&styled.text, language)
                } else {
                    normalize_text(&styled.text)
                };
                if text.is_empty() {
                    continue;
                }

                log::debug!(
                    "Page {}: {} \"{}\" ({}, {:.1}pt)",
                    page_number,
                    level,
                    text,
                    cue,
                    styled.max_font_size
                );
                outline.push(HeadingRecord::new(level, text, page_number));
            }
        }

        outline
    }

    /// Extract from already-analyzed pages.
    pub fn extract_pages(&self, pages: &[PageLayout]) -> ExtractionResult {
        let profile = self.profile(pages);
        let title = TitleSelector::new(&self.config)
            .select(pages.first(), profile.average_font_size());
        let outline = self.headings(pages, &profile);

        log::info!("Extracted \"{}\" with {} headings", title, outline.len());
        ExtractionResult::new(title, outline)
    }

    /// Load every page of `source`, then extract.
    ///
    /// In strict mode the first page failure is returned. In lenient mode a
    /// failed page is logged and treated as empty, so page numbers stay
    /// aligned with the source.
    pub fn extract_source<S>(&self, source: &S) -> Result<ExtractionResult>
    where
        S: PageSource + ?Sized,
    {
        let pages = self.load_pages(source)?;
        Ok(self.extract_pages(&pages))
    }

    /// Open a PDF and extract, returning any open or parse failure.
    pub fn try_extract_file<P: AsRef<Path>>(&self, path: P) -> Result<ExtractionResult> {
        let document = PdfDocument::open(path)?;
        self.extract_source(&document)
    }

    /// Open a PDF and extract.
    ///
    /// Never fails: unreadable documents are logged and yield
    /// [`ExtractionResult::fallback`].
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> ExtractionResult {
        let path = path.as_ref();
        match self.try_extract_file(path) {
            Ok(result) => result,
            Err(e) => {
                log::error!("Failed to process {}: {}", path.display(), e);
                ExtractionResult::fallback()
            }
        }
    }

    /// Extract from PDF bytes held in memory.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<ExtractionResult> {
        let document = PdfDocument::from_bytes(data)?;
        self.extract_source(&document)
    }

    fn load_pages<S>(&self, source: &S) -> Result<Vec<PageLayout>>
    where
        S: PageSource + ?Sized,
    {
        let count = source.page_count();
        let mut pages = Vec::with_capacity(count);

        for index in 0..count {
            match source.page(index) {
                Ok(page) => pages.push(page),
                Err(e) if self.config.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", index + 1, e);
                    pages.push(PageLayout::default());
                }
                Err(e) => return Err(e),
            }
        }

        Ok(pages)
    }
}

impl Default for OutlineExtractor {
    fn default() -> Self {
        Self::new(OutlineConfig::default())
    }
}
