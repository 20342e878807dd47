//! PDF span source abstraction.
//!
//! The outline extractor only needs "per-page text spans with font size,
//! boldness and horizontal extent". [`SpanSource`] is that seam; the lopdf
//! implementation lives behind it so classification can be tested without PDFs.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, ObjectId};

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::{Error, Result};
use crate::model::Span;

use super::content::{collect_spans, decode_text_simple, FontTable};
use super::options::{ErrorMode, ExtractOptions};

/// Anything that can report a document's text spans in reading order.
pub trait SpanSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// All non-blank spans of the document, page by page.
    fn spans(&self) -> Result<Vec<Span>>;
}

/// Spans already in memory.
impl SpanSource for [Span] {
    fn page_count(&self) -> u32 {
        self.iter().map(|s| s.page_number).max().unwrap_or(0)
    }

    fn spans(&self) -> Result<Vec<Span>> {
        Ok(self.iter().filter(|s| !s.is_blank()).cloned().collect())
    }
}

/// [`SpanSource`] backed by `lopdf::Document`.
pub struct LopdfSource {
    doc: LopdfDocument,
    options: ExtractOptions,
}

impl LopdfSource {
    /// Load from a file path.
    pub fn open<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let path = path.as_ref();
        detect_format_from_path(path)?;
        let doc = LopdfDocument::load(path).map_err(load_error)?;
        Ok(Self::with_document(doc, options))
    }

    /// Load from an in-memory byte slice.
    pub fn from_bytes(data: &[u8], options: ExtractOptions) -> Result<Self> {
        detect_format_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data).map_err(load_error)?;
        Ok(Self::with_document(doc, options))
    }

    fn with_document(doc: LopdfDocument, options: ExtractOptions) -> Self {
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; text may not decode");
        }
        Self { doc, options }
    }

    /// PDF version string from the header.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Spans of a single page (1-based).
    pub fn page_spans(&self, page_number: u32) -> Result<Vec<Span>> {
        let pages = self.doc.get_pages();
        let page_id = pages
            .get(&page_number)
            .ok_or(Error::PageOutOfRange(page_number, pages.len() as u32))?;
        self.spans_for_page(page_number, *page_id)
    }

    fn spans_for_page(&self, page_number: u32, page_id: ObjectId) -> Result<Vec<Span>> {
        let fonts = PageFonts {
            doc: &self.doc,
            fonts: self
                .doc
                .get_page_fonts(page_id)
                .map_err(|e| Error::PdfParse(e.to_string()))?,
        };

        let data = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let content = Content::decode(&data).map_err(|e| Error::PdfParse(e.to_string()))?;

        let spans = collect_spans(&content.operations, page_number, &fonts);
        log::debug!("Page {}: {} spans", page_number, spans.len());
        Ok(spans)
    }
}

impl SpanSource for LopdfSource {
    fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    fn spans(&self) -> Result<Vec<Span>> {
        let mut spans = Vec::new();

        for (page_number, page_id) in self.doc.get_pages() {
            match self.spans_for_page(page_number, page_id) {
                Ok(mut page_spans) => spans.append(&mut page_spans),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", page_number, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(spans)
    }
}

fn load_error(err: lopdf::Error) -> Error {
    match err {
        lopdf::Error::Decryption(_) => Error::Encrypted,
        _ => Error::from(err),
    }
}

/// Font dictionaries of one page.
struct PageFonts<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
}

impl FontTable for PageFonts<'_> {
    fn base_font(&self, resource: &[u8]) -> Option<String> {
        self.fonts
            .get(resource)
            .and_then(|font| font.get(b"BaseFont").ok())
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
    }

    fn decode(&self, resource: &[u8], bytes: &[u8]) -> String {
        if let Some(font) = self.fonts.get(resource) {
            if let Ok(encoding) = font.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_filters_blank_spans() {
        let spans = vec![
            Span::new("Title", 18.0, true, 1),
            Span::new("  ", 12.0, false, 1),
            Span::new("Body", 12.0, false, 4),
        ];
        let source: &[Span] = &spans;
        assert_eq!(source.page_count(), 4);
        assert_eq!(source.spans().unwrap().len(), 2);
    }

    #[test]
    fn test_from_bytes_rejects_non_pdf() {
        let result = LopdfSource::from_bytes(b"not a pdf at all", ExtractOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_from_bytes_rejects_truncated_pdf() {
        let result = LopdfSource::from_bytes(b"%PDF-1.7\n1 0 obj\n", ExtractOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let result = LopdfSource::open("/nonexistent/file.pdf", ExtractOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
