//! PDF text layer.
//!
//! [`PageSource`] is what the outline extractor reads from. [`PdfDocument`]
//! implements it over lopdf; plain `PageLayout` slices implement it for
//! callers that already have analyzed pages.

mod backend;
mod layout;

pub use backend::{
    decode_text_simple, BackendFontInfo, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue,
    TextDecoder,
};
pub use layout::{font_style_flags, PageAnalyzer};

use std::path::Path;

use crate::detect::{sniff_bytes, sniff_path};
use crate::error::{Error, Result};
use crate::model::PageLayout;

/// A document that can hand out analyzed pages.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Layout of the page at 0-based `index`.
    fn page(&self, index: usize) -> Result<PageLayout>;
}

impl PageSource for [PageLayout] {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page(&self, index: usize) -> Result<PageLayout> {
        self.get(index)
            .cloned()
            .ok_or(Error::PageOutOfRange(index + 1, self.len()))
    }
}

impl PageSource for Vec<PageLayout> {
    fn page_count(&self) -> usize {
        self.as_slice().page_count()
    }

    fn page(&self, index: usize) -> Result<PageLayout> {
        self.as_slice().page(index)
    }
}

/// A PDF file opened for layout analysis.
pub struct PdfDocument {
    backend: LopdfBackend,
    pages: Vec<PageId>,
}

impl PdfDocument {
    /// Open a PDF file.
    ///
    /// The header is checked before lopdf sees the file, so non-PDF input
    /// fails with [`Error::UnknownFormat`]. Encrypted documents are opened
    /// when the user password is empty and rejected otherwise.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let header = sniff_path(path)?;
        log::debug!("Opening {} ({})", path.display(), header);
        Self::from_backend(LopdfBackend::load_file(path)?)
    }

    /// Load a PDF held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        sniff_bytes(data)?;
        Self::from_backend(LopdfBackend::load_bytes(data)?)
    }

    fn from_backend(mut backend: LopdfBackend) -> Result<Self> {
        if backend.is_encrypted() {
            backend.decrypt_with_empty_password()?;
            log::debug!("Decrypted with the empty user password");
        }
        let pages = backend.page_ids();
        Ok(Self { backend, pages })
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<PageLayout> {
        let id = self
            .pages
            .get(index)
            .ok_or(Error::PageOutOfRange(index + 1, self.pages.len()))?;
        PageAnalyzer::new(&self.backend).analyze(*id)
    }
}
