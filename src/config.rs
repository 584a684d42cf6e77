//! Extraction configuration.
//!
//! All thresholds used by the profile builder, title selector, heading
//! classifier and level assigner live in one immutable [`OutlineConfig`]
//! value that is handed to [`crate::OutlineExtractor`] at construction.

use std::collections::HashMap;

/// Language code used when detection fails or no keyword set exists.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Languages that get the East-Asian numbering patterns.
pub const CJK_LANGUAGES: &[&str] = &["ja", "zh", "ko"];

/// Returns true for language codes that use East-Asian chapter markers.
pub fn is_cjk_language(language: &str) -> bool {
    CJK_LANGUAGES.contains(&language)
}

/// Heading vocabulary keyed by language code.
///
/// Lookups for an unknown code return the English list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    entries: HashMap<String, Vec<String>>,
}

impl KeywordTable {
    /// The heading vocabulary used by default: en, ja, zh, es, fr, de.
    pub fn standard() -> Self {
        let mut table = Self {
            entries: HashMap::new(),
        };
        table.insert(
            "en",
            &[
                "chapter",
                "section",
                "introduction",
                "conclusion",
                "abstract",
                "summary",
                "overview",
                "background",
            ],
        );
        table.insert(
            "ja",
            &["章", "節", "項", "序論", "結論", "概要", "背景", "まとめ"],
        );
        table.insert(
            "zh",
            &["章", "节", "部分", "引言", "结论", "摘要", "概述", "背景"],
        );
        table.insert(
            "es",
            &["capítulo", "sección", "introducción", "conclusión", "resumen"],
        );
        table.insert(
            "fr",
            &["chapitre", "section", "introduction", "conclusion", "résumé"],
        );
        table.insert(
            "de",
            &[
                "kapitel",
                "abschnitt",
                "einleitung",
                "schluss",
                "zusammenfassung",
            ],
        );
        table
    }

    /// Standard vocabulary plus Korean, Arabic and Russian.
    pub fn extended() -> Self {
        let mut table = Self::standard();
        table.insert(
            "ko",
            &["장", "절", "항", "서론", "결론", "요약", "개요", "배경"],
        );
        table.insert(
            "ar",
            &["فصل", "قسم", "مقدمة", "خاتمة", "ملخص", "نظرة عامة"],
        );
        table.insert(
            "ru",
            &[
                "глава",
                "раздел",
                "введение",
                "заключение",
                "резюме",
                "обзор",
            ],
        );
        table
    }

    /// Add or replace the keyword list for a language.
    pub fn insert(&mut self, language: &str, keywords: &[&str]) {
        self.entries.insert(
            language.to_string(),
            keywords.iter().map(|k| k.to_lowercase()).collect(),
        );
    }

    /// Keywords for `language`, falling back to English.
    pub fn for_language(&self, language: &str) -> &[String] {
        self.entries
            .get(language)
            .or_else(|| self.entries.get(FALLBACK_LANGUAGE))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns true if `language` has its own entry.
    pub fn has_language(&self, language: &str) -> bool {
        self.entries.contains_key(language)
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// How page-level failures are handled during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Any page failure degrades the whole document to the fallback result
    #[default]
    Strict,
    /// Skip pages that fail to load and keep going
    Lenient,
}

/// Immutable configuration for one extraction run.
#[derive(Debug, Clone)]
pub struct OutlineConfig {
    /// Leading pages sampled by the font profile builder
    pub profile_pages: usize,
    /// Characters of accumulated text handed to the language detector
    pub language_sample_chars: usize,
    /// Minimum trimmed run length (in chars) for a run to count in the profile
    pub min_profile_run_chars: usize,
    /// Average font size used when no run qualifies
    pub default_font_size: f32,
    /// Language used when detection fails
    pub default_language: String,

    /// Title candidates must exceed the average size by this factor
    pub title_size_ratio: f32,
    /// Title text must be longer than this (chars)
    pub min_title_chars: usize,
    /// Title text must be at most this long (chars)
    pub max_title_chars: usize,

    /// Headings must exceed the average size by this factor
    pub heading_size_ratio: f32,
    /// Headings shorter than this are rejected (chars)
    pub min_heading_chars: usize,
    /// Headings longer than this are rejected (chars)
    pub max_heading_chars: usize,
    /// Share of capitalized words for the title-case rule
    pub title_case_ratio: f32,
    /// All-caps text must be longer than this (chars)
    pub min_caps_chars: usize,

    /// Span flag bit that marks bold text
    pub bold_flag: u32,

    /// Heading vocabulary per language
    pub keywords: KeywordTable,

    /// Remove numbering prefixes from outline entries
    pub strip_heading_numbers: bool,

    /// Page failure handling
    pub error_mode: ErrorMode,
}

impl OutlineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of leading pages sampled for the font profile.
    pub fn with_profile_pages(mut self, pages: usize) -> Self {
        self.profile_pages = pages;
        self
    }

    /// Set the maximum title length in characters.
    pub fn with_max_title_chars(mut self, chars: usize) -> Self {
        self.max_title_chars = chars;
        self
    }

    /// Replace the keyword table.
    pub fn with_keywords(mut self, keywords: KeywordTable) -> Self {
        self.keywords = keywords;
        self
    }

    /// Use the extended keyword table.
    pub fn extended_keywords(self) -> Self {
        self.with_keywords(KeywordTable::extended())
    }

    /// Strip numbering prefixes from outline text.
    pub fn with_strip_heading_numbers(mut self, strip: bool) -> Self {
        self.strip_heading_numbers = strip;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Skip unreadable pages instead of failing the document.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            profile_pages: 5,
            language_sample_chars: 1000,
            min_profile_run_chars: 3,
            default_font_size: 12.0,
            default_language: FALLBACK_LANGUAGE.to_string(),
            title_size_ratio: 1.2,
            min_title_chars: 3,
            max_title_chars: 150,
            heading_size_ratio: 1.1,
            min_heading_chars: 2,
            max_heading_chars: 200,
            title_case_ratio: 0.7,
            min_caps_chars: 3,
            bold_flag: 16,
            keywords: KeywordTable::standard(),
            strip_heading_numbers: false,
            error_mode: ErrorMode::Strict,
        }
    }
}
