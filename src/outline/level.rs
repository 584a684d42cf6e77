//! Heading level assignment.

use regex::Regex;

use crate::config::is_cjk_language;
use crate::model::HeadingLevel;

/// Maps an accepted heading to H1, H2 or H3.
///
/// The base level comes from the heading's font size rank in the document.
/// Explicit numbering then replaces it: "1. " is H1, "1.1. " is H2 and
/// "1.1.1. " is H3 (the trailing period is required). In CJK documents a
/// leading chapter, section or item marker ("第三章", "第二節", "第一項")
/// takes precedence over both.
#[derive(Debug, Clone)]
pub struct LevelAssigner {
    numbered: [(Regex, HeadingLevel); 3],
    cjk_marked: [(Regex, HeadingLevel); 3],
}

impl LevelAssigner {
    pub fn new() -> Self {
        Self {
            numbered: [
                (Regex::new(r"^\d+\.\s+").unwrap(), HeadingLevel::H1),
                (Regex::new(r"^\d+\.\d+\.\s+").unwrap(), HeadingLevel::H2),
                (Regex::new(r"^\d+\.\d+\.\d+\.\s+").unwrap(), HeadingLevel::H3),
            ],
            cjk_marked: [
                (
                    Regex::new(r"^第[一二三四五六七八九十百千万]+章").unwrap(),
                    HeadingLevel::H1,
                ),
                (
                    Regex::new(r"^第[一二三四五六七八九十百千万]+[節节]").unwrap(),
                    HeadingLevel::H2,
                ),
                (
                    Regex::new(r"^第[一二三四五六七八九十百千万]+[項项]").unwrap(),
                    HeadingLevel::H3,
                ),
            ],
        }
    }

    /// Level for `text` at `font_size`, given the document's size ranks
    /// (distinct sizes, largest first).
    pub fn assign(
        &self,
        text: &str,
        font_size: f32,
        font_size_ranks: &[f32],
        language: &str,
    ) -> HeadingLevel {
        let text = text.trim();
        let mut level = rank_level(font_size, font_size_ranks);

        if let Some(numbered) = first_match(&self.numbered, text) {
            level = numbered;
        }

        if is_cjk_language(language) {
            if let Some(marked) = first_match(&self.cjk_marked, text) {
                level = marked;
            }
        }

        level
    }
}

impl Default for LevelAssigner {
    fn default() -> Self {
        Self::new()
    }
}

/// Level implied by where `font_size` falls among the ranked sizes.
pub fn rank_level(font_size: f32, ranks: &[f32]) -> HeadingLevel {
    match ranks {
        [top, second, _, ..] => {
            if font_size >= *top {
                HeadingLevel::H1
            } else if font_size >= *second {
                HeadingLevel::H2
            } else {
                HeadingLevel::H3
            }
        }
        [top, _] => {
            if font_size >= *top {
                HeadingLevel::H1
            } else {
                HeadingLevel::H2
            }
        }
        _ => HeadingLevel::H1,
    }
}

fn first_match(rules: &[(Regex, HeadingLevel)], text: &str) -> Option<HeadingLevel> {
    rules
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, level)| *level)
}
