//! Text normalization for extracted runs.

use regex::Regex;
use std::sync::OnceLock;

use crate::config::is_cjk_language;
use crate::model::UNKNOWN_TITLE;

/// Collapse whitespace runs to one space, trim, and drop control characters.
///
/// Removed characters are U+0000–U+0008, U+000E–U+001F and U+007F. Vertical
/// tab and form feed count as whitespace and are collapsed instead. Control
/// characters are dropped before whitespace is collapsed so the output is a
/// fixed point: `normalize_text(&normalize_text(s)) == normalize_text(s)`.
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let cleaned: String = text.chars().filter(|&c| !is_pdf_artifact(c)).collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_pdf_artifact(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

fn numbering_prefixes() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"^\d+\.\d+\.\d+\.?\s+",
            r"^\d+\.\d+\.?\s+",
            r"^\d+\.?\s+",
            r"^[IVXLCDM]+\.?\s+",
            r"^[A-Z]\.\s+",
            r"^\([a-z]\)\s+",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn cjk_numbering_prefixes() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"^第[一二三四五六七八九十百千万]+[章節节項项]\s*",
            r"^第[0-9]+[章節节項项]\s*",
            r"^[一二三四五六七八九十百千万]+[、．]\s*",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

/// Remove one leading numbering prefix ("2.1 ", "IV. ", "(a) ", "第三章").
///
/// The deepest matching pattern wins, so "1.2.3 Scope" loses the whole
/// "1.2.3 " rather than just "1.". Text that is nothing but a prefix is
/// returned unchanged.
pub fn strip_heading_numbers(text: &str, language: &str) -> String {
    let normalized = normalize_text(text);

    let mut patterns: Vec<&Regex> = Vec::new();
    if is_cjk_language(language) {
        patterns.extend(cjk_numbering_prefixes());
    }
    patterns.extend(numbering_prefixes());

    for re in patterns {
        if let Some(m) = re.find(&normalized) {
            let rest = normalized[m.end()..].trim();
            if !rest.is_empty() {
                return rest.to_string();
            }
            break;
        }
    }
    normalized
}

fn title_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| Regex::new(r"(?i)^(?:title|subject|document)\b:?\s*").unwrap())
}

/// Tidy a title for display.
///
/// Drops a leading "Title:", "Subject:" or "Document:" label and shortens
/// text longer than `max_chars` at a word boundary, appending "...".
pub fn clean_title(text: &str, max_chars: usize) -> String {
    let normalized = normalize_text(text);
    let title = title_prefix().replace(&normalized, "").trim().to_string();

    let title = if title.chars().count() > max_chars {
        let cut: String = title.chars().take(max_chars).collect();
        let head = match cut.rfind(' ') {
            Some(idx) => &cut[..idx],
            None => cut.as_str(),
        };
        format!("{}...", head.trim_end())
    } else {
        title
    };

    if title.trim().is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        title
    }
}
