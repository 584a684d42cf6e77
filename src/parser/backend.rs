//! PDF backend abstraction layer.
//!
//! The layout analyzer only talks to [`PdfBackend`], which keeps lopdf out
//! of the span and line grouping code and lets tests feed content streams
//! directly.

use std::collections::HashMap;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Encoding, Object};

use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Font resource as seen by the layout analyzer.
#[derive(Debug, Clone, Default)]
pub struct BackendFontInfo {
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
    /// `/Flags` from the font descriptor, when present.
    pub descriptor_flags: Option<i64>,
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value of an integer or real operand.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Numeric operand at `index`, or `default` if missing or not a number.
    pub fn number(&self, index: usize, default: f32) -> f32 {
        self.operands
            .get(index)
            .and_then(PdfValue::as_number)
            .unwrap_or(default)
    }
}

/// Read access to a PDF document's pages.
pub trait PdfBackend {
    /// Page ids in document order.
    fn page_ids(&self) -> Vec<PageId>;

    /// Fonts of a page, keyed by resource name (e.g., `F1`).
    fn page_fonts(&self, page: PageId) -> Result<HashMap<Vec<u8>, BackendFontInfo>>;

    /// The decompressed content stream of a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse content stream bytes into operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Resolve the text decoder for a font resource of a page.
    fn font_decoder(&self, page: PageId, font: &[u8]) -> TextDecoder<'_>;
}

/// Decodes string operands shown with one font.
#[derive(Debug)]
pub struct TextDecoder<'a> {
    encoding: Option<Encoding<'a>>,
}

impl TextDecoder<'_> {
    /// A decoder without a font encoding; see [`decode_text_simple`].
    pub fn simple() -> Self {
        Self { encoding: None }
    }

    /// Decode with the font's encoding, falling back to [`decode_text_simple`].
    pub fn decode(&self, bytes: &[u8]) -> String {
        if let Some(encoding) = &self.encoding {
            if let Ok(text) = LopdfDocument::decode_text(encoding, bytes) {
                return text;
            }
        }
        decode_text_simple(bytes)
    }
}

/// Decoding used when no font encoding is available.
///
/// UTF-16BE with BOM, then UTF-8, then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Ok(Self { doc })
    }

    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self { doc })
    }

    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Decrypt with the empty user password, which is how documents that
    /// only restrict permissions are protected.
    pub fn decrypt_with_empty_password(&mut self) -> Result<()> {
        if !self.doc.is_encrypted() {
            return Ok(());
        }
        self.doc.decrypt("").map_err(|e| {
            log::debug!("Empty user password rejected: {}", e);
            Error::Encrypted
        })
    }

    fn descriptor_flags(&self, font: &Dictionary) -> Option<i64> {
        let descriptor = match font.get(b"FontDescriptor").ok()? {
            Object::Reference(id) => self.doc.get_dictionary(*id).ok()?,
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        descriptor.get(b"Flags").ok()?.as_i64().ok()
    }
}

impl PdfBackend for LopdfBackend {
    fn page_ids(&self) -> Vec<PageId> {
        self.doc.get_pages().into_values().collect()
    }

    fn page_fonts(&self, page: PageId) -> Result<HashMap<Vec<u8>, BackendFontInfo>> {
        let fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(fonts
            .into_iter()
            .map(|(name, dict)| {
                let base_font = dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_default();
                let info = BackendFontInfo {
                    base_font,
                    descriptor_flags: self.descriptor_flags(dict),
                };
                (name, info)
            })
            .collect())
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without /Contents is blank
            Err(_) => return Ok(Vec::new()),
        };

        let refs: Vec<PageId> = match contents {
            Object::Reference(r) => vec![*r],
            Object::Array(arr) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
            _ => return Err(Error::PdfParse("Invalid content stream".to_string())),
        };

        let mut content = Vec::new();
        for r in refs {
            match self.doc.get_object(r) {
                Ok(Object::Stream(s)) => {
                    let data = s
                        .decompressed_content()
                        .unwrap_or_else(|_| s.content.clone());
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
                _ => log::debug!("Content reference {:?} is not a stream", r),
            }
        }
        Ok(content)
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operands: op.operands.iter().map(convert_object).collect(),
                operator: op.operator,
            })
            .collect())
    }

    fn font_decoder(&self, page: PageId, font: &[u8]) -> TextDecoder<'_> {
        let encoding = self
            .doc
            .get_page_fonts(page)
            .ok()
            .and_then(|fonts| fonts.get(font).copied())
            .and_then(|dict| dict.get_font_encoding(&self.doc).ok());
        TextDecoder { encoding }
    }
}

fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}
