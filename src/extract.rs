//! Outline extraction: font-size ranking of bold spans into title and headings.
//!
//! Levels are decided once per document from the distinct font sizes of all
//! non-blank spans, largest first. Only bold spans are ever emitted:
//!
//! - the first bold span of the largest size becomes the title;
//! - every later bold span of a size ranked 0, 1 or 2 becomes H1, H2 or H3;
//! - smaller sizes and non-bold spans produce nothing.

use std::path::Path;

use crate::error::Result;
use crate::model::{Heading, HeadingLevel, Outline, Span};
use crate::parser::{ExtractOptions, LopdfSource, SpanSource};

/// Number of size ranks that map to heading levels.
const HEADING_RANKS: usize = 3;

/// Classify spans (in reading order) into an outline.
pub fn classify_spans(spans: &[Span]) -> Outline {
    let ranked = ranked_sizes(spans);
    let Some(&largest) = ranked.first() else {
        return Outline::empty();
    };

    let mut outline = Outline::empty();

    for span in spans.iter().filter(|s| s.is_bold && !s.is_blank()) {
        let text = span.text.trim();

        if span.font_size == largest && outline.title.is_empty() {
            outline.title = text.to_string();
            continue;
        }

        let level = ranked
            .iter()
            .position(|&size| size == span.font_size)
            .and_then(HeadingLevel::from_rank);

        if let Some(level) = level {
            outline.push(Heading::new(level, text, span.page_number));
        }
    }

    outline
}

/// Distinct sizes of all non-blank spans, largest first, truncated to the heading ranks.
fn ranked_sizes(spans: &[Span]) -> Vec<f32> {
    let mut sizes: Vec<f32> = spans
        .iter()
        .filter(|s| !s.is_blank())
        .map(|s| s.font_size)
        .collect();
    sizes.sort_by(|a, b| b.total_cmp(a));
    sizes.dedup();
    sizes.truncate(HEADING_RANKS);
    sizes
}

/// Extracts outlines from PDFs.
#[derive(Debug, Clone, Default)]
pub struct OutlineExtractor {
    options: ExtractOptions,
}

impl OutlineExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract the outline of a PDF file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<Outline> {
        let source = LopdfSource::open(path, self.options.clone())?;
        self.extract_from(&source)
    }

    /// Extract the outline of an in-memory PDF.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<Outline> {
        let source = LopdfSource::from_bytes(data, self.options.clone())?;
        self.extract_from(&source)
    }

    /// Extract the outline from any span source.
    pub fn extract_from<S: SpanSource + ?Sized>(&self, source: &S) -> Result<Outline> {
        let spans = source.spans()?;
        let outline = classify_spans(&spans);
        log::debug!(
            "{} pages, {} spans -> title {:?}, {} headings",
            source.page_count(),
            spans.len(),
            outline.title,
            outline.headings.len()
        );
        Ok(outline)
    }
}
