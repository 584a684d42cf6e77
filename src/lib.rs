//! # pdfoutline
//!
//! Title and heading outline extraction for PDF documents.
//!
//! The outline is inferred from the text layer, not read from bookmarks:
//! each document gets a font profile (average size, distinct size ranks,
//! language), the largest qualifying line on page 1 becomes the title, and
//! every line that stands out by size and by a textual cue becomes an H1,
//! H2 or H3 entry.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_file, render, JsonFormat};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let result = extract_file("report.pdf");
//!     println!("{}", render::to_json(&result, JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Bookmark-free**: works on any PDF with a text layer
//! - **Multilingual**: heading vocabulary and numbering for CJK and
//!   European languages
//! - **Failure isolation**: unreadable documents degrade to
//!   `{"title": "Unknown", "outline": []}`
//! - **Batch mode**: one JSON file per input PDF, optionally in parallel

pub mod batch;
pub mod config;
pub mod detect;
pub mod error;
pub mod lang;
pub mod model;
pub mod outline;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use batch::{run_batch, BatchOptions, BatchReport, FileReport};
pub use config::{ErrorMode, KeywordTable, OutlineConfig};
pub use detect::{is_pdf, sniff_bytes, sniff_path, PdfHeader};
pub use error::{Error, Result};
pub use lang::{FixedLanguage, LanguageDetector, WhatlangDetector};
pub use model::{
    DocumentProfile, ExtractionResult, HeadingLevel, HeadingRecord, LayoutBlock, LayoutLine,
    PageLayout, StyledLine, StyledSpan, TitleCandidate,
};
pub use outline::{clean_title, normalize_text, strip_heading_numbers, OutlineExtractor};
pub use parser::{PageSource, PdfDocument};
pub use render::JsonFormat;

use std::path::Path;

/// Extract the outline of a PDF file with default settings.
///
/// Never fails: an unreadable file yields the fallback result.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_file;
///
/// let result = extract_file("document.pdf");
/// for heading in &result.outline {
///     println!("{} {} (p. {})", heading.level, heading.text, heading.page);
/// }
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> ExtractionResult {
    OutlineExtractor::default().extract_file(path)
}

/// Extract the outline of a PDF file with custom configuration.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{extract_file_with_options, OutlineConfig};
///
/// let config = OutlineConfig::new()
///     .extended_keywords()
///     .with_strip_heading_numbers(true);
/// let result = extract_file_with_options("document.pdf", config);
/// ```
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    config: OutlineConfig,
) -> ExtractionResult {
    OutlineExtractor::new(config).extract_file(path)
}

/// Extract the outline of a PDF held in memory.
///
/// Unlike [`extract_file`], load failures are returned to the caller.
pub fn extract_bytes(data: &[u8]) -> Result<ExtractionResult> {
    OutlineExtractor::default().extract_bytes(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_file_missing() {
        let result = extract_file("/nonexistent/file.pdf");
        assert_eq!(result, ExtractionResult::fallback());
    }

    #[test]
    fn test_extract_bytes_not_pdf() {
        assert!(matches!(
            extract_bytes(b"plain text"),
            Err(Error::UnknownFormat)
        ));
    }
}
