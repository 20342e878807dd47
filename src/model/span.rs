//! Text spans reported by the PDF text layer.

/// A run of text sharing one font size and weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// The text content, trimmed
    pub text: String,
    /// Effective font size in points
    pub font_size: f32,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// 1-based page number
    pub page_number: u32,
    /// Left edge in text space
    pub left_x: f32,
    /// Right edge in text space (estimated)
    pub right_x: f32,
}

impl Span {
    /// Create a span with an explicit boldness flag.
    pub fn new(text: impl Into<String>, font_size: f32, is_bold: bool, page_number: u32) -> Self {
        Self {
            text: text.into(),
            font_size,
            is_bold,
            page_number,
            left_x: 0.0,
            right_x: 0.0,
        }
    }

    /// Create a span whose boldness is inferred from the font name.
    pub fn from_font(
        text: impl Into<String>,
        font_size: f32,
        font_name: &str,
        page_number: u32,
    ) -> Self {
        Self::new(text, font_size, is_bold_font(font_name), page_number)
    }

    /// Set the horizontal extent.
    pub fn with_extent(mut self, left_x: f32, right_x: f32) -> Self {
        self.left_x = left_x;
        self.right_x = right_x;
        self
    }

    /// Whether the span carries any visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Whether a base font name denotes a bold weight (e.g. "Helvetica-Bold", "Arial-Black").
pub fn is_bold_font(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    lower.contains("bold") || lower.contains("black") || lower.contains("heavy")
}
