//! # pdfoutline
//!
//! Heading outline extraction from PDF documents, with persona-driven
//! ranking of the extracted sections.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::extract_outline;
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let outline = extract_outline("document.pdf")?;
//!     println!("{}", outline.title);
//!     for heading in &outline.headings {
//!         println!("{} {} (p. {})", heading.level, heading.text, heading.page_number);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## How it works
//!
//! - **Outline**: the distinct font sizes of a document are ranked; the first
//!   bold span of the largest size is the title and bold spans of the top three
//!   sizes become H1/H2/H3 headings.
//! - **Ranking**: headings are scored by how many persona/job keywords they
//!   contain and ranked within each document.
//! - **Batch**: a directory of PDFs becomes one outline JSON per file plus a
//!   combined `persona_analysis.json`.

pub mod batch;
pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod rank;
pub mod render;

// Re-export commonly used types
pub use batch::{BatchProcessor, BatchReport, DocumentOutcome, ANALYSIS_FILE_NAME};
pub use config::{Directories, PersonaConfig, PersonaFile, PersonaSources};
pub use detect::{detect_format_from_bytes, detect_format_from_path, has_pdf_extension};
pub use error::{Error, Result};
pub use extract::{classify_spans, OutlineExtractor};
pub use model::{
    AnalysisMetadata, AnalysisResult, ExtractedSection, Heading, HeadingLevel, Outline, Span,
    SubsectionAnalysis,
};
pub use parser::{ErrorMode, ExtractOptions, LopdfSource, SpanSource};
pub use rank::{keywords, rank_outline, score, PersonaRanker};
pub use render::JsonFormat;

use std::path::Path;

/// Extract the outline of a PDF file with default options.
///
/// ```no_run
/// let outline = pdfoutline::extract_outline("report.pdf").unwrap();
/// println!("{}", serde_json::to_string_pretty(&outline).unwrap());
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<Outline> {
    OutlineExtractor::default().extract_file(path)
}

/// Extract the outline of a PDF file, skipping pages that fail to decode.
pub fn extract_outline_lenient<P: AsRef<Path>>(path: P) -> Result<Outline> {
    OutlineExtractor::new(ExtractOptions::new().lenient()).extract_file(path)
}

/// Extract the outline of an in-memory PDF.
pub fn extract_outline_bytes(data: &[u8]) -> Result<Outline> {
    OutlineExtractor::default().extract_bytes(data)
}

/// Rank a set of named outlines for a persona and job.
///
/// ```
/// use pdfoutline::{rank_documents, Heading, HeadingLevel, Outline, PersonaConfig};
///
/// let outline = Outline {
///     title: "Guide".into(),
///     headings: vec![Heading::new(HeadingLevel::H1, "Research methods", 1)],
/// };
/// let config = PersonaConfig {
///     persona: "Researcher".into(),
///     job: "Compare methods".into(),
/// };
/// let result = rank_documents([("guide.pdf", &outline)], &config);
/// assert_eq!(result.extracted_sections[0].importance_rank, 1);
/// ```
pub fn rank_documents<'a, I>(documents: I, config: &PersonaConfig) -> AnalysisResult
where
    I: IntoIterator<Item = (&'a str, &'a Outline)>,
{
    let mut ranker = PersonaRanker::new(config);
    for (name, outline) in documents {
        ranker.add_document(name, outline);
    }
    ranker.finish()
}
