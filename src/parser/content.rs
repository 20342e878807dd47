//! Content stream walking.
//!
//! Tracks just enough graphics and text state (CTM, font, size, text matrix,
//! leading) to turn text-showing operators into [`Span`]s in content-stream
//! order. Consecutive shows in the same font that continue one baseline are
//! merged into a single span.

use lopdf::content::Operation;
use lopdf::Object;

use crate::model::Span;

const DEFAULT_FONT_SIZE: f32 = 12.0;

/// TJ adjustments above this (in 1/1000 text space units) read as word breaks.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Glyph widths are not resolved; advance is estimated from the font size.
const AVG_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Baseline drift allowed within one line, as a fraction of the font size.
const LINE_Y_TOLERANCE_RATIO: f32 = 0.3;

/// Largest horizontal gap bridged when merging shows, as a fraction of the font size.
const MERGE_GAP_RATIO: f32 = 0.3;

/// Gaps wider than this (fraction of the font size) become a word space.
const WORD_GAP_RATIO: f32 = 0.1;

/// Font lookups for the page whose content is being walked.
pub trait FontTable {
    /// Base font name for a resource key (e.g. `F1` -> `Helvetica-Bold`).
    fn base_font(&self, resource: &[u8]) -> Option<String>;

    /// Decode a string operand with the resource's encoding.
    fn decode(&self, resource: &[u8], bytes: &[u8]) -> String;
}

/// Walk decoded operations and collect spans for one page.
pub fn collect_spans<F>(operations: &[Operation], page_number: u32, fonts: &F) -> Vec<Span>
where
    F: FontTable + ?Sized,
{
    let mut state = TextState::default();
    let mut saved: Vec<GraphicsState> = Vec::new();
    let mut spans = Vec::new();

    for op in operations {
        match op.operator.as_str() {
            "q" => saved.push(state.graphics.clone()),
            "Q" => {
                if let Some(graphics) = saved.pop() {
                    state.graphics = graphics;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(&op.operands) {
                    state.graphics.ctm = m.multiply(&state.graphics.ctm);
                }
            }
            "BT" => {
                state.in_text = true;
                state.matrix = Matrix::default();
                state.line_matrix = Matrix::default();
                state.run = None;
            }
            "ET" => {
                state.in_text = false;
                state.run = None;
            }
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Object::Name(resource) = &op.operands[0] {
                        state.graphics.font_name = fonts
                            .base_font(resource)
                            .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string());
                        state.graphics.font_resource = resource.clone();
                    }
                    state.graphics.font_size =
                        get_number(&op.operands[1]).unwrap_or(DEFAULT_FONT_SIZE);
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(get_number) {
                    state.graphics.leading = leading;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.graphics.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operands(&op.operands) {
                    state.matrix = m;
                    state.line_matrix = m;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    let text = fonts.decode(&state.graphics.font_resource, bytes);
                    state.show(&text, page_number, &mut spans);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    let text = decode_tj_array(items, &state.graphics.font_resource, fonts);
                    state.show(&text, page_number, &mut spans);
                }
            }
            "'" | "\"" => {
                state.next_line();
                let text_idx = if op.operator == "\"" { 2 } else { 0 };
                if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                    let text = fonts.decode(&state.graphics.font_resource, bytes);
                    state.show(&text, page_number, &mut spans);
                }
            }
            _ => {}
        }
    }

    spans
}

/// Join the strings of a TJ array, turning wide negative kerning into spaces.
fn decode_tj_array<F>(items: &[Object], resource: &[u8], fonts: &F) -> String
where
    F: FontTable + ?Sized,
{
    let mut combined = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => combined.push_str(&fonts.decode(resource, bytes)),
            Object::Integer(_) | Object::Real(_) => {
                let adjustment = -get_number(item).unwrap_or(0.0);
                let needs_space = adjustment > TJ_SPACE_THRESHOLD
                    && combined
                        .chars()
                        .last()
                        .is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c));
                if needs_space {
                    combined.push(' ');
                }
            }
            _ => {}
        }
    }
    combined
}

/// The part of the graphics state saved by `q` and restored by `Q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font_resource: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::default(),
            font_resource: Vec::new(),
            font_name: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            leading: 0.0,
        }
    }
}

/// The span most recently emitted, kept open for continuation.
#[derive(Debug)]
struct Run {
    font_name: String,
    size: f32,
    baseline: f32,
    /// Device x where the last show ended, trailing whitespace included
    end_x: f32,
    trailing_space: bool,
}

#[derive(Debug, Default)]
struct TextState {
    graphics: GraphicsState,
    matrix: Matrix,
    /// Start of the current line; Td, TD and T* move relative to it
    line_matrix: Matrix,
    in_text: bool,
    run: Option<Run>,
}

impl TextState {
    fn next_line(&mut self) {
        // TL is rarely set by producers that rely on T*; fall back to the font size
        let leading = if self.graphics.leading != 0.0 {
            self.graphics.leading
        } else {
            self.graphics.font_size
        };
        self.move_line(0.0, -leading);
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix.translate(tx, ty);
        self.matrix = self.line_matrix;
    }

    /// Text rendering matrix without the font size: Tm x CTM.
    fn rendering_matrix(&self) -> Matrix {
        self.matrix.multiply(&self.graphics.ctm)
    }

    fn show(&mut self, text: &str, page_number: u32, spans: &mut Vec<Span>) {
        if !self.in_text {
            return;
        }
        let font_size = self.graphics.font_size;
        let rendering = self.rendering_matrix();
        let size = font_size * rendering.vertical_scale();
        let h_scale = rendering.horizontal_scale();
        let left_x = rendering.e;
        let baseline = rendering.f;

        let raw_advance = text.chars().count() as f32 * font_size * AVG_CHAR_WIDTH_RATIO;
        let end_x = left_x + raw_advance * h_scale;
        let trimmed = text.trim();
        let trailing_space = text.ends_with(char::is_whitespace);
        self.matrix.advance(raw_advance);

        if trimmed.is_empty() {
            if let Some(run) = self.run.as_mut() {
                if !text.is_empty() {
                    run.end_x = end_x;
                    run.trailing_space = true;
                }
            }
            return;
        }

        let trimmed_advance = trimmed.chars().count() as f32 * font_size * AVG_CHAR_WIDTH_RATIO;
        let right_x = left_x + trimmed_advance * h_scale;

        if let (Some(run), Some(last)) = (self.run.as_mut(), spans.last_mut()) {
            let gap = left_x - run.end_x;
            let continues = run.font_name == self.graphics.font_name
                && run.size == size
                && (run.baseline - baseline).abs() <= size * LINE_Y_TOLERANCE_RATIO
                && gap >= -size * MERGE_GAP_RATIO
                && gap <= size * MERGE_GAP_RATIO;
            if continues {
                if run.trailing_space
                    || text.starts_with(char::is_whitespace)
                    || gap > size * WORD_GAP_RATIO
                {
                    last.text.push(' ');
                }
                last.text.push_str(trimmed);
                last.right_x = right_x;
                run.end_x = end_x;
                run.trailing_space = trailing_space;
                log::trace!("span p{} continued: {}", page_number, last.text);
                return;
            }
        }

        log::trace!(
            "span p{} {:.1}pt {:?}: {}",
            page_number,
            size,
            self.graphics.font_name,
            trimmed
        );
        spans.push(
            Span::from_font(trimmed, size, &self.graphics.font_name, page_number)
                .with_extent(left_x, right_x),
        );
        self.run = Some(Run {
            font_name: self.graphics.font_name.clone(),
            size,
            baseline,
            end_x,
            trailing_space,
        });
    }
}

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl Matrix {
    /// `self x other`: apply `self` first, then `other`.
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    /// Move along the baseline by a distance in unscaled text space.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

fn matrix_operands(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let n = |i: usize, default: f32| get_number(&operands[i]).unwrap_or(default);
    Some(Matrix {
        a: n(0, 1.0),
        b: n(1, 0.0),
        c: n(2, 0.0),
        d: n(3, 1.0),
        e: n(4, 0.0),
        f: n(5, 0.0),
    })
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Scripts written without word spaces (Chinese and Japanese; Hangul uses spaces).
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF       // CJK Unified Ideographs
        | 0x3400..=0x4DBF     // Extension A
        | 0x20000..=0x2EBEF   // Extensions B-F
        | 0x3040..=0x309F     // Hiragana
        | 0x30A0..=0x30FF     // Katakana
        | 0x3000..=0x303F     // CJK Symbols and Punctuation
    )
}

/// Decode string bytes when no font encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
