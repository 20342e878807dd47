//! PDF text layer: turns page content streams into font-attributed spans.

mod backend;
mod content;
mod options;

pub use backend::{LopdfSource, SpanSource};
pub use content::{collect_spans, decode_text_simple, FontTable};
pub use options::{ErrorMode, ExtractOptions};
