//! Layout input types and outline output types.
//!
//! The input side ([`StyledSpan`], [`LayoutLine`], [`LayoutBlock`],
//! [`PageLayout`]) mirrors what a PDF text layer yields per page. The output
//! side ([`HeadingRecord`], [`ExtractionResult`]) is what gets serialized.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Span flag bit for superscript text.
pub const FLAG_SUPERSCRIPT: u32 = 1;
/// Span flag bit for italic text.
pub const FLAG_ITALIC: u32 = 2;
/// Span flag bit for serif fonts.
pub const FLAG_SERIF: u32 = 4;
/// Span flag bit for monospaced fonts.
pub const FLAG_MONOSPACE: u32 = 8;
/// Span flag bit for bold text.
pub const FLAG_BOLD: u32 = 16;

/// Title reported when no candidate qualifies.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// A run of text sharing one font style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledSpan {
    /// Text content, as extracted
    pub text: String,
    /// Font size in points (0 when unknown)
    pub size: f32,
    /// Style bitmask (see the `FLAG_*` constants)
    pub flags: u32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl StyledSpan {
    /// Create a regular-weight span.
    pub fn new(text: impl Into<String>, size: f32) -> Self {
        Self {
            text: text.into(),
            size,
            flags: 0,
            font_name: String::new(),
        }
    }

    /// Set the style flags.
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Set the font name.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    /// Mark the span bold.
    pub fn bold(mut self) -> Self {
        self.flags |= FLAG_BOLD;
        self
    }

    /// Whether the bold bit is set.
    pub fn is_bold(&self) -> bool {
        self.flags & FLAG_BOLD != 0
    }
}

/// One visual line: a sequence of spans in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutLine {
    pub spans: Vec<StyledSpan>,
}

impl LayoutLine {
    pub fn new(spans: Vec<StyledSpan>) -> Self {
        Self { spans }
    }

    /// Single-span line.
    pub fn single(span: StyledSpan) -> Self {
        Self { spans: vec![span] }
    }

    /// Trimmed span texts joined by single spaces, empty spans skipped.
    pub fn text(&self) -> String {
        join_span_text(&self.spans)
    }
}

fn join_span_text(spans: &[StyledSpan]) -> String {
    spans
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A group of lines the layout analysis kept together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub lines: Vec<LayoutLine>,
}

impl LayoutBlock {
    pub fn new(lines: Vec<LayoutLine>) -> Self {
        Self { lines }
    }
}

/// Text layout of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub blocks: Vec<LayoutBlock>,
}

impl PageLayout {
    pub fn new(blocks: Vec<LayoutBlock>) -> Self {
        Self { blocks }
    }

    /// A page whose lines each form their own block.
    pub fn from_lines(lines: Vec<LayoutLine>) -> Self {
        Self {
            blocks: lines.into_iter().map(|l| LayoutBlock::new(vec![l])).collect(),
        }
    }

    /// Lines in block order, then line order within each block.
    pub fn lines(&self) -> impl Iterator<Item = &LayoutLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    /// All spans on the page in traversal order.
    pub fn spans(&self) -> impl Iterator<Item = &StyledSpan> {
        self.lines().flat_map(|l| l.spans.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.spans().all(|s| s.text.trim().is_empty())
    }
}

/// A line flattened to its text and the style of its dominant span.
///
/// The dominant span is the one with the largest size; ties keep the first
/// seen. Spans without a positive size never become dominant, so a line
/// with no size information reports `max_font_size == 0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledLine {
    pub text: String,
    pub max_font_size: f32,
    pub font_flags: u32,
    pub font_name: String,
    pub is_bold: bool,
}

impl StyledLine {
    /// Derive a styled line from its spans, reading bold from `bold_flag`.
    pub fn from_spans(spans: &[StyledSpan], bold_flag: u32) -> Self {
        let mut line = Self {
            text: join_span_text(spans),
            max_font_size: 0.0,
            font_flags: 0,
            font_name: String::new(),
            is_bold: false,
        };

        for span in spans {
            if span.size > line.max_font_size {
                line.max_font_size = span.size;
                line.font_flags = span.flags;
                line.font_name = span.font_name.clone();
                line.is_bold = span.flags & bold_flag != 0;
            }
        }
        line
    }
}

/// Per-document font and language summary.
///
/// Built once per document and read by every later stage.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentProfile {
    average_font_size: f32,
    font_size_ranks: Vec<f32>,
    language: String,
    mixed_script: bool,
}

impl DocumentProfile {
    /// Create a profile. `sizes` is deduplicated and sorted descending.
    pub fn new(average_font_size: f32, sizes: &[f32], language: impl Into<String>) -> Self {
        let mut ranks: Vec<f32> = sizes.to_vec();
        ranks.sort_by(|a, b| b.total_cmp(a));
        ranks.dedup();
        Self {
            average_font_size,
            font_size_ranks: ranks,
            language: language.into(),
            mixed_script: false,
        }
    }

    /// Mark the sampled text as mixing writing systems.
    pub fn with_mixed_script(mut self, mixed: bool) -> Self {
        self.mixed_script = mixed;
        self
    }

    pub fn average_font_size(&self) -> f32 {
        self.average_font_size
    }

    /// Distinct sizes, largest first.
    pub fn font_size_ranks(&self) -> &[f32] {
        &self.font_size_ranks
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether the sample mixes Latin, CJK, Arabic or Cyrillic text, in
    /// which case the detected language covers only part of it.
    pub fn is_mixed_script(&self) -> bool {
        self.mixed_script
    }
}

/// Outline depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingRecord {
    pub level: HeadingLevel,
    pub text: String,
    /// 1-based page number
    pub page: u32,
}

impl HeadingRecord {
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// A first-page line considered for the document title.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleCandidate {
    pub text: String,
    pub font_size: f32,
    /// Length of `text` in characters
    pub length: usize,
}

impl TitleCandidate {
    pub fn new(text: String, font_size: f32) -> Self {
        let length = text.chars().count();
        Self {
            text,
            font_size,
            length,
        }
    }

    /// Ranking order: larger font first, then shorter text.
    pub fn rank(&self, other: &Self) -> Ordering {
        other
            .font_size
            .total_cmp(&self.font_size)
            .then(self.length.cmp(&other.length))
    }
}

/// Title plus outline for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    pub outline: Vec<HeadingRecord>,
}

impl ExtractionResult {
    pub fn new(title: impl Into<String>, outline: Vec<HeadingRecord>) -> Self {
        Self {
            title: title.into(),
            outline,
        }
    }

    /// The result reported for documents that could not be processed.
    pub fn fallback() -> Self {
        Self::new(UNKNOWN_TITLE, Vec::new())
    }

    /// True when neither a title nor any heading was found.
    pub fn is_fallback(&self) -> bool {
        self.title == UNKNOWN_TITLE && self.outline.is_empty()
    }
}

impl Default for ExtractionResult {
    fn default() -> Self {
        Self::fallback()
    }
}
