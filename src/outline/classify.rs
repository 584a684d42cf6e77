//! Heading detection.
//!
//! A line is judged a heading by an ordered series of checks. Two rejects
//! run first (text shape, then font size) and override everything else;
//! after that the first matching cue accepts the line.

use regex::Regex;
use std::fmt;
use std::sync::Arc;

use crate::config::{is_cjk_language, OutlineConfig};

/// The check that accepted a line as a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingCue {
    /// Outline numbering prefix ("1.2 ", "IV. ", "(a) ", "第三章")
    Numbering,
    /// Heading vocabulary for the document language
    Keyword,
    /// Bold dominant run
    Bold,
    /// Entirely upper-case text
    AllCaps,
    /// Most words capitalized
    TitleCase,
}

impl fmt::Display for HeadingCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeadingCue::Numbering => "numbering",
            HeadingCue::Keyword => "keyword",
            HeadingCue::Bold => "bold",
            HeadingCue::AllCaps => "all-caps",
            HeadingCue::TitleCase => "title-case",
        };
        f.write_str(name)
    }
}

const NUMBERING_PATTERNS: &[&str] = &[
    r"^\d+\.?\s+",
    r"^\d+\.\d+\.?\s+",
    r"^\d+\.\d+\.\d+\.?\s+",
    r"^[IVXLCDM]+\.?\s+",
    r"^[A-Z]\.\s+",
    r"^\([a-z]\)\s+",
];

const CJK_NUMBERING_PATTERNS: &[&str] = &[
    r"^第[一二三四五六七八九十百千万]+章\s*",
    r"^第[0-9]+章\s*",
    r"^[一二三四五六七八九十百千万]+[、．]\s*",
];

/// Decides whether a line of text is a heading.
#[derive(Debug, Clone)]
pub struct HeadingClassifier {
    config: Arc<OutlineConfig>,
    numbering: Vec<Regex>,
    cjk_numbering: Vec<Regex>,
}

impl HeadingClassifier {
    pub fn new(config: Arc<OutlineConfig>) -> Self {
        Self {
            config,
            numbering: compile(NUMBERING_PATTERNS),
            cjk_numbering: compile(CJK_NUMBERING_PATTERNS),
        }
    }

    /// Returns true if the line should appear in the outline.
    pub fn is_heading(
        &self,
        text: &str,
        font_size: f32,
        is_bold: bool,
        average_font_size: f32,
        language: &str,
    ) -> bool {
        self.classify(text, font_size, is_bold, average_font_size, language)
            .is_some()
    }

    /// Like [`is_heading`](Self::is_heading), reporting which cue accepted.
    pub fn classify(
        &self,
        text: &str,
        font_size: f32,
        is_bold: bool,
        average_font_size: f32,
        language: &str,
    ) -> Option<HeadingCue> {
        let text = text.trim();
        let length = text.chars().count();
        if length < self.config.min_heading_chars
            || length > self.config.max_heading_chars
            || text.ends_with('.')
        {
            return None;
        }

        if font_size <= average_font_size * self.config.heading_size_ratio {
            return None;
        }

        if self.has_numbering(text, language) {
            return Some(HeadingCue::Numbering);
        }

        let lower = text.to_lowercase();
        if self
            .config
            .keywords
            .for_language(language)
            .iter()
            .any(|k| lower.contains(k.as_str()))
        {
            return Some(HeadingCue::Keyword);
        }

        if is_bold {
            return Some(HeadingCue::Bold);
        }

        if length > self.config.min_caps_chars && is_all_caps(text) {
            return Some(HeadingCue::AllCaps);
        }

        if self.is_title_case(text) {
            return Some(HeadingCue::TitleCase);
        }

        None
    }

    fn has_numbering(&self, text: &str, language: &str) -> bool {
        if self.numbering.iter().any(|re| re.is_match(text)) {
            return true;
        }
        is_cjk_language(language) && self.cjk_numbering.iter().any(|re| re.is_match(text))
    }

    fn is_title_case(&self, text: &str) -> bool {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() < 2 {
            return false;
        }
        let capitalized = words
            .iter()
            .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
            .count();
        capitalized as f32 / words.len() as f32 >= self.config.title_case_ratio
    }
}

/// At least one cased letter and no lower-case ones.
fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}
