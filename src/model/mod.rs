//! Data model shared by the outline extractor and the persona ranker.
//!
//! Spans come out of the PDF layer, outlines are written per document and
//! read back by the ranker, and the analysis is the final combined output.

mod analysis;
mod outline;
mod span;

pub use analysis::{AnalysisMetadata, AnalysisResult, ExtractedSection, SubsectionAnalysis};
pub use outline::{Heading, HeadingLevel, Outline};
pub use span::{is_bold_font, Span};
