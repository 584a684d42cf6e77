//! Language identification.
//!
//! Detection sits behind the [`LanguageDetector`] trait so the profile
//! builder can be driven by a fixed language in tests or from the command
//! line. The default [`WhatlangDetector`] reports ISO 639-1 codes where one
//! exists ("en", "ja", "zh", ...) and the ISO 639-3 code otherwise.

use thiserror::Error;

/// Why a sample could not be classified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// The sample had no text.
    #[error("empty sample")]
    Empty,
    /// The sample had no features the detector could use.
    #[error("no language features in sample")]
    Undetermined,
}

/// Maps a text sample to a language code.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, sample: &str) -> Result<String, DetectError>;
}

/// Statistical detector backed by the `whatlang` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl WhatlangDetector {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, sample: &str) -> Result<String, DetectError> {
        if sample.trim().is_empty() {
            return Err(DetectError::Empty);
        }
        let info = whatlang::detect(sample).ok_or(DetectError::Undetermined)?;
        let code = info.lang().code();
        log::trace!(
            "whatlang: {} (confidence {:.2}, reliable {})",
            code,
            info.confidence(),
            info.is_reliable()
        );
        Ok(iso639_1(code).unwrap_or(code).to_string())
    }
}

/// Always reports the same language. Empty samples still fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedLanguage(pub String);

impl FixedLanguage {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl LanguageDetector for FixedLanguage {
    fn detect(&self, sample: &str) -> Result<String, DetectError> {
        if sample.trim().is_empty() {
            return Err(DetectError::Empty);
        }
        Ok(self.0.clone())
    }
}

fn iso639_1(code: &str) -> Option<&'static str> {
    let short = match code {
        "eng" => "en",
        "jpn" => "ja",
        "cmn" => "zh",
        "kor" => "ko",
        "spa" => "es",
        "fra" => "fr",
        "deu" => "de",
        "ara" => "ar",
        "rus" => "ru",
        "ita" => "it",
        "por" => "pt",
        "nld" => "nl",
        "swe" => "sv",
        "dan" => "da",
        "nob" => "no",
        "fin" => "fi",
        "pol" => "pl",
        "tur" => "tr",
        "ukr" => "uk",
        "ces" => "cs",
        "hun" => "hu",
        "ell" => "el",
        "heb" => "he",
        "hin" => "hi",
        "vie" => "vi",
        "tha" => "th",
        "ind" => "id",
        _ => return None,
    };
    Some(short)
}

/// Writing systems counted by [`is_mixed_script`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Latin,
    Cjk,
    Arabic,
    Cyrillic,
}

fn script_of(c: char) -> Option<Script> {
    match c {
        'a'..='z' | 'A'..='Z' => Some(Script::Latin),
        '\u{4E00}'..='\u{9FFF}' | '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' => {
            Some(Script::Cjk)
        }
        '\u{0600}'..='\u{06FF}' => Some(Script::Arabic),
        '\u{0400}'..='\u{04FF}' => Some(Script::Cyrillic),
        _ => None,
    }
}

/// Scripts present in `text`, in first-seen order.
fn scripts(text: &str) -> Vec<Script> {
    let mut found = Vec::new();
    for script in text.chars().filter_map(script_of) {
        if !found.contains(&script) {
            found.push(script);
        }
    }
    found
}

/// Whether `text` uses more than one of Latin, CJK, Arabic and Cyrillic.
pub fn is_mixed_script(text: &str) -> bool {
    scripts(text).len() > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatlang_empty_sample_fails() {
        let detector = WhatlangDetector::new();
        assert_eq!(detector.detect(""), Err(DetectError::Empty));
        assert_eq!(detector.detect("   \n"), Err(DetectError::Empty));
    }

    #[test]
    fn test_whatlang_no_features_fails() {
        let detector = WhatlangDetector::new();
        assert_eq!(detector.detect("1234 5678 ..."), Err(DetectError::Undetermined));
    }

    #[test]
    fn test_whatlang_reports_short_codes() {
        let detector = WhatlangDetector::new();
        let english = "This document describes the architecture of the system and \
                       explains how the individual components work together in practice.";
        assert_eq!(detector.detect(english).unwrap(), "en");

        let german = "Dieses Dokument beschreibt die Architektur des Systems und erklärt, \
                      wie die einzelnen Komponenten in der Praxis zusammenarbeiten.";
        assert_eq!(detector.detect(german).unwrap(), "de");
    }

    #[test]
    fn test_fixed_language() {
        let detector = FixedLanguage::new("ja");
        assert_eq!(detector.detect("anything").unwrap(), "ja");
        assert!(detector.detect("").is_err());
    }

    #[test]
    fn test_iso_mapping() {
        assert_eq!(iso639_1("cmn"), Some("zh"));
        assert_eq!(iso639_1("jpn"), Some("ja"));
        assert_eq!(iso639_1("xyz"), None);
    }

    #[test]
    fn test_mixed_script() {
        assert!(is_mixed_script("PDF 出力の概要"));
        assert!(!is_mixed_script("Plain English"));
        assert!(!is_mixed_script(""));
        assert_eq!(scripts("Привет world"), vec![Script::Cyrillic, Script::Latin]);
    }
}
