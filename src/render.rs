//! JSON rendering for extraction results.
//!
//! Output is UTF-8 with non-ASCII characters left unescaped. The pretty
//! format indents by two spaces.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::ExtractionResult;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a result to a JSON string.
pub fn to_json(result: &ExtractionResult, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(result),
        JsonFormat::Compact => serde_json::to_string(result),
    };

    json.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Serialize a result and write it to `path`.
pub fn write_json<P: AsRef<Path>>(
    result: &ExtractionResult,
    path: P,
    format: JsonFormat,
) -> Result<()> {
    let json = to_json(result, format)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, HeadingRecord};

    fn sample() -> ExtractionResult {
        ExtractionResult::new(
            "Rapport annuel",
            vec![
                HeadingRecord::new(HeadingLevel::H1, "Résumé", 1),
                HeadingRecord::new(HeadingLevel::H2, "第一章 概要", 2),
            ],
        )
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.starts_with("{\n  \"title\": \"Rapport annuel\",\n  \"outline\": ["));
        assert!(json.contains("\"level\": \"H2\""));
        assert!(json.contains("\"page\": 2"));
    }

    #[test]
    fn test_non_ascii_unescaped() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(json.contains("Résumé"));
        assert!(json.contains("第一章 概要"));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn test_fallback_shape() {
        let json = to_json(&ExtractionResult::fallback(), JsonFormat::Compact).unwrap();
        assert_eq!(json, r#"{"title":"Unknown","outline":[]}"#);
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&sample(), &path, JsonFormat::Pretty).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: ExtractionResult = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, sample());
    }
}
