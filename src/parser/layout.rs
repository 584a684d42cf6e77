//! Layout analysis for PDF pages.
//!
//! Walks a page's content stream, places every shown string on the page,
//! then groups the resulting spans into lines (shared baseline) and the
//! lines into blocks (spacing, size and indentation breaks).

use std::collections::HashMap;

use crate::error::Result;
use crate::model::{
    LayoutBlock, LayoutLine, PageLayout, StyledSpan, FLAG_BOLD, FLAG_ITALIC, FLAG_MONOSPACE,
    FLAG_SERIF,
};

use super::backend::{
    decode_text_simple, BackendFontInfo, ContentOp, PageId, PdfBackend, PdfValue, TextDecoder,
};

const DEFAULT_FONT_SIZE: f32 = 12.0;
/// Average glyph advance as a share of the font size.
const GLYPH_WIDTH_RATIO: f32 = 0.5;
/// TJ adjustments beyond this (thousandths of an em) mark a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

// Font descriptor /Flags bits
const DESCRIPTOR_FIXED_PITCH: i64 = 1;
const DESCRIPTOR_SERIF: i64 = 1 << 1;
const DESCRIPTOR_ITALIC: i64 = 1 << 6;
const DESCRIPTOR_FORCE_BOLD: i64 = 1 << 18;

/// Style flags for a font, from its base name and descriptor flags.
pub fn font_style_flags(base_font: &str, descriptor_flags: Option<i64>) -> u32 {
    let name = base_font.to_lowercase();
    let mut flags = 0;

    if ["bold", "black", "heavy", "semibold", "demi"]
        .iter()
        .any(|k| name.contains(k))
    {
        flags |= FLAG_BOLD;
    }
    if name.contains("italic") || name.contains("oblique") {
        flags |= FLAG_ITALIC;
    }
    if name.contains("courier") || name.contains("mono") {
        flags |= FLAG_MONOSPACE;
    }

    if let Some(d) = descriptor_flags {
        if d & DESCRIPTOR_FORCE_BOLD != 0 {
            flags |= FLAG_BOLD;
        }
        if d & DESCRIPTOR_ITALIC != 0 {
            flags |= FLAG_ITALIC;
        }
        if d & DESCRIPTOR_FIXED_PITCH != 0 {
            flags |= FLAG_MONOSPACE;
        }
        if d & DESCRIPTOR_SERIF != 0 {
            flags |= FLAG_SERIF;
        }
    }

    flags
}

/// A span with its position on the page.
#[derive(Debug, Clone)]
struct PlacedSpan {
    span: StyledSpan,
    x: f32,
    y: f32,
    width: f32,
}

impl PlacedSpan {
    fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[derive(Debug, Clone)]
struct PlacedLine {
    spans: Vec<PlacedSpan>,
    x: f32,
    y: f32,
    /// Character-weighted font size
    font_size: f32,
}

impl PlacedLine {
    fn from_spans(mut spans: Vec<PlacedSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        let spans = merge_runs(spans);

        let total_chars: usize = spans.iter().map(|s| s.span.text.chars().count()).sum();
        let weighted: f32 = spans
            .iter()
            .map(|s| s.span.size * s.span.text.chars().count() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            spans.first().map_or(0.0, |s| s.span.size)
        };

        Self {
            x: spans.first().map_or(0.0, |s| s.x),
            y: spans.first().map_or(0.0, |s| s.y),
            font_size,
            spans,
        }
    }

    fn into_layout_line(self) -> LayoutLine {
        LayoutLine::new(self.spans.into_iter().map(|s| s.span).collect())
    }
}

/// Join neighbouring spans that share font, size and flags into one run.
fn merge_runs(spans: Vec<PlacedSpan>) -> Vec<PlacedSpan> {
    let mut merged: Vec<PlacedSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(prev) = merged.last_mut() {
            if same_style(&prev.span, &span.span) {
                if needs_space(prev, &span) {
                    prev.span.text.push(' ');
                }
                prev.span.text.push_str(&span.span.text);
                prev.width = (span.right() - prev.x).max(prev.width);
                continue;
            }
        }
        merged.push(span);
    }
    merged
}

fn same_style(a: &StyledSpan, b: &StyledSpan) -> bool {
    a.flags == b.flags && a.font_name == b.font_name && (a.size - b.size).abs() < 0.01
}

/// Whether a space belongs between two adjacent runs on a line.
fn needs_space(prev: &PlacedSpan, next: &PlacedSpan) -> bool {
    let gap = next.x - prev.right();
    if gap <= next.span.size * GLYPH_WIDTH_RATIO * 0.2 {
        return false;
    }

    let last = prev.span.text.chars().last();
    let first = next.span.text.chars().next();
    if last.is_some_and(char::is_whitespace) || first.is_some_and(char::is_whitespace) {
        return false;
    }
    !(last.is_some_and(is_spaceless_script_char) && first.is_some_and(is_spaceless_script_char))
}

/// Scripts written without spaces between words (Han, kana).
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{20000}'..='\u{2EBEF}'
        | '\u{3040}'..='\u{309F}'
        | '\u{30A0}'..='\u{30FF}'
        | '\u{3000}'..='\u{303F}')
}

/// Text matrix and line matrix of the current text object.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    /// Move to the start of the next line, offset from the current line start.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    fn next_line(&mut self, leading: f32) {
        self.translate(0.0, -leading);
    }

    /// Move along the baseline after showing text.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

#[derive(Debug, Clone)]
struct TextState {
    matrix: TextMatrix,
    in_text: bool,
    font_resource: Vec<u8>,
    font_name: String,
    font_flags: u32,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: TextMatrix::default(),
            in_text: false,
            font_resource: Vec::new(),
            font_name: String::new(),
            font_flags: 0,
            font_size: DEFAULT_FONT_SIZE,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn next_line(&mut self) {
        // Without TL, assume single spacing
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size
        };
        self.matrix.next_line(leading);
    }
}

/// Turns one page of a [`PdfBackend`] into a [`PageLayout`].
pub struct PageAnalyzer<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: PdfBackend + ?Sized> PageAnalyzer<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Analyze a page into blocks of lines of styled spans.
    pub fn analyze(&self, page: PageId) -> Result<PageLayout> {
        let fonts = self.backend.page_fonts(page)?;
        let content = self.backend.page_content(page)?;
        if content.is_empty() {
            return Ok(PageLayout::default());
        }

        let ops = self.backend.decode_content(&content)?;
        let spans = self.collect_spans(page, &fonts, &ops);
        let span_count = spans.len();
        let lines = group_spans_into_lines(spans);
        let blocks = group_lines_into_blocks(lines);

        log::debug!(
            "Page {:?}: {} spans in {} blocks",
            page,
            span_count,
            blocks.len()
        );
        Ok(PageLayout::new(blocks))
    }

    fn collect_spans(
        &self,
        page: PageId,
        fonts: &HashMap<Vec<u8>, BackendFontInfo>,
        ops: &[ContentOp],
    ) -> Vec<PlacedSpan> {
        let mut state = TextState::default();
        let mut spans = Vec::new();
        // Resolved on first Tf of each font resource
        let mut decoders: HashMap<Vec<u8>, TextDecoder<'a>> = HashMap::new();

        for op in ops {
            match op.operator.as_str() {
                "BT" => {
                    state.in_text = true;
                    state.matrix = TextMatrix::default();
                }
                "ET" => state.in_text = false,
                "Tf" => {
                    if let Some(PdfValue::Name(resource)) = op.operands.first() {
                        let info = fonts.get(resource);
                        state.font_name = info
                            .map(|f| f.base_font.clone())
                            .filter(|n| !n.is_empty())
                            .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string());
                        state.font_flags = font_style_flags(
                            &state.font_name,
                            info.and_then(|f| f.descriptor_flags),
                        );
                        if !decoders.contains_key(resource) {
                            let decoder = self.backend.font_decoder(page, resource);
                            decoders.insert(resource.clone(), decoder);
                        }
                        state.font_resource = resource.clone();
                    }
                    state.font_size = op.number(1, state.font_size);
                }
                "TL" => state.leading = op.number(0, 0.0),
                "Td" => state.matrix.translate(op.number(0, 0.0), op.number(1, 0.0)),
                "TD" => {
                    let ty = op.number(1, 0.0);
                    state.leading = -ty;
                    state.matrix.translate(op.number(0, 0.0), ty);
                }
                "Tm" => state.matrix.set(
                    op.number(0, 1.0),
                    op.number(1, 0.0),
                    op.number(2, 0.0),
                    op.number(3, 1.0),
                    op.number(4, 0.0),
                    op.number(5, 0.0),
                ),
                "T*" => state.next_line(),
                "Tj" => {
                    if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                        let text = decode(decoders.get(&state.font_resource), bytes);
                        show(&mut state, text, 0.0, &mut spans);
                    }
                }
                "TJ" => {
                    if let Some(PdfValue::Array(items)) = op.operands.first() {
                        let decoder = decoders.get(&state.font_resource);
                        let (text, shift) = decode_array(decoder, items);
                        show(&mut state, text, shift, &mut spans);
                    }
                }
                "'" | "\"" => {
                    state.next_line();
                    let index = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(PdfValue::Str(bytes)) = op.operands.get(index) {
                        let text = decode(decoders.get(&state.font_resource), bytes);
                        show(&mut state, text, 0.0, &mut spans);
                    }
                }
                _ => {}
            }
        }

        spans
    }
}

fn decode(decoder: Option<&TextDecoder<'_>>, bytes: &[u8]) -> String {
    decoder.map_or_else(|| decode_text_simple(bytes), |d| d.decode(bytes))
}

/// Decode a TJ array. Returns the text and the summed positioning
/// adjustment in thousandths of an em (positive moves right).
fn decode_array(decoder: Option<&TextDecoder<'_>>, items: &[PdfValue]) -> (String, f32) {
    let mut text = String::new();
    let mut shift = 0.0;

    for item in items {
        if let PdfValue::Str(bytes) = item {
            text.push_str(&decode(decoder, bytes));
        } else if let Some(n) = item.as_number() {
            shift -= n;
            let word_gap = -n > TJ_SPACE_THRESHOLD;
            let last = text.chars().last();
            if word_gap && last.is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c))
            {
                text.push(' ');
            }
        }
    }

    (text, shift)
}

/// Place shown text at the current position and advance past it.
fn show(state: &mut TextState, text: String, shift: f32, spans: &mut Vec<PlacedSpan>) {
    if !state.in_text {
        return;
    }

    let advance = text.chars().count() as f32 * state.font_size * GLYPH_WIDTH_RATIO
        + shift / 1000.0 * state.font_size;
    let scale = state.matrix.vertical_scale();

    if !text.trim().is_empty() {
        let (x, y) = state.matrix.position();
        // Rounded so sizes that differ only by matrix noise compare equal
        let size = (state.font_size * scale * 100.0).round() / 100.0;
        spans.push(PlacedSpan {
            span: StyledSpan::new(text, size)
                .with_flags(state.font_flags)
                .with_font(state.font_name.clone()),
            x,
            y,
            width: advance * scale,
        });
    }

    state.matrix.advance(advance);
}

/// Group spans into lines by baseline, top to bottom.
fn group_spans_into_lines(mut spans: Vec<PlacedSpan>) -> Vec<PlacedLine> {
    // PDF y grows upwards
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines = Vec::new();
    let mut current: Vec<PlacedSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.span.size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(PlacedLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(PlacedLine::from_spans(current));
    }
    lines
}

/// Group lines into blocks, breaking on large gaps, size changes and
/// indentation shifts.
fn group_lines_into_blocks(lines: Vec<PlacedLine>) -> Vec<LayoutBlock> {
    let avg_spacing = average_line_spacing(&lines);
    let mut blocks = Vec::new();
    let mut current: Vec<PlacedLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(into_block(std::mem::take(&mut current)));
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(into_block(current));
    }
    blocks
}

fn into_block(lines: Vec<PlacedLine>) -> LayoutBlock {
    LayoutBlock::new(lines.into_iter().map(PlacedLine::into_layout_line).collect())
}

fn average_line_spacing(lines: &[PlacedLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return DEFAULT_FONT_SIZE;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &PlacedLine, curr: &PlacedLine, avg_spacing: f32) -> bool {
    (prev.y - curr.y).abs() > avg_spacing * 1.5
        || (prev.font_size - curr.font_size).abs() > 1.0
        || (prev.x - curr.x).abs() > 20.0
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct MockBackend {
        fonts: HashMap<Vec<u8>, BackendFontInfo>,
        ops: Vec<ContentOp>,
        resolved: RefCell<Vec<Vec<u8>>>,
    }

    impl MockBackend {
        fn new(ops: Vec<ContentOp>) -> Self {
            let mut fonts = HashMap::new();
            for (resource, base_font) in [("F1", "Helvetica"), ("F2", "Helvetica-Bold")] {
                fonts.insert(
                    resource.as_bytes().to_vec(),
                    BackendFontInfo {
                        base_font: base_font.to_string(),
                        descriptor_flags: None,
                    },
                );
            }
            Self {
                fonts,
                ops,
                resolved: RefCell::new(Vec::new()),
            }
        }
    }

    impl PdfBackend for MockBackend {
        fn page_ids(&self) -> Vec<PageId> {
            vec![(3, 0)]
        }

        fn page_fonts(&self, _page: PageId) -> Result<HashMap<Vec<u8>, BackendFontInfo>> {
            Ok(self.fonts.clone())
        }

        fn page_content(&self, _page: PageId) -> Result<Vec<u8>> {
            Ok(b"mock".to_vec())
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(self.ops.clone())
        }

        fn font_decoder(&self, _page: PageId, font: &[u8]) -> TextDecoder<'_> {
            self.resolved.borrow_mut().push(font.to_vec());
            TextDecoder::simple()
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn name(n: &str) -> PdfValue {
        PdfValue::Name(n.as_bytes().to_vec())
    }

    fn s(text: &str) -> PdfValue {
        PdfValue::Str(text.as_bytes().to_vec())
    }

    fn num(n: f32) -> PdfValue {
        PdfValue::Real(n)
    }

    fn analyze(ops: Vec<ContentOp>) -> PageLayout {
        let backend = MockBackend::new(ops);
        PageAnalyzer::new(&backend).analyze((3, 0)).unwrap()
    }

    fn line_texts(page: &PageLayout) -> Vec<String> {
        page.lines().map(|l| l.text()).collect()
    }

    #[test]
    fn test_lines_and_blocks() {
        let page = analyze(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F2"), num(18.0)]),
            op("Td", vec![num(72.0), num(700.0)]),
            op("Tj", vec![s("Overview")]),
            op("ET", vec![]),
            op("BT", vec![]),
            op("Tf", vec![name("F1"), num(10.0)]),
            op("Td", vec![num(72.0), num(670.0)]),
            op("Tj", vec![s("Body one")]),
            op("Td", vec![num(0.0), num(-12.0)]),
            op("Tj", vec![s("Body two")]),
            op("ET", vec![]),
        ]);

        assert_eq!(line_texts(&page), vec!["Overview", "Body one", "Body two"]);
        assert_eq!(page.blocks.len(), 2);

        let heading = &page.blocks[0].lines[0].spans[0];
        assert_eq!(heading.size, 18.0);
        assert!(heading.is_bold());
        assert_eq!(heading.font_name, "Helvetica-Bold");
        assert!(!page.blocks[1].lines[0].spans[0].is_bold());
    }

    #[test]
    fn test_consecutive_runs_merge() {
        let page = analyze(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), num(12.0)]),
            op("Td", vec![num(72.0), num(700.0)]),
            op("Tj", vec![s("Hello")]),
            op("Tj", vec![s(" World")]),
            op("Tf", vec![name("F2"), num(12.0)]),
            op("Tj", vec![s("Strong")]),
            op("ET", vec![]),
        ]);

        let line = &page.blocks[0].lines[0];
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[0].text, "Hello World");
        assert_eq!(line.spans[1].text, "Strong");
    }

    #[test]
    fn test_tj_array_word_gap() {
        let page = analyze(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), num(12.0)]),
            op("Td", vec![num(72.0), num(700.0)]),
            op(
                "TJ",
                vec![PdfValue::Array(vec![
                    s("Data"),
                    PdfValue::Integer(-300),
                    s("Set"),
                    PdfValue::Integer(-20),
                    s("s"),
                ])],
            ),
            op("ET", vec![]),
        ]);
        assert_eq!(line_texts(&page), vec!["Data Sets"]);
    }

    #[test]
    fn test_leading_operators() {
        let page = analyze(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), num(10.0)]),
            op("TL", vec![num(14.0)]),
            op("Td", vec![num(72.0), num(700.0)]),
            op("Tj", vec![s("First line")]),
            op("T*", vec![]),
            op("Tj", vec![s("Second line")]),
            op("'", vec![s("Third line")]),
            op("ET", vec![]),
        ]);
        assert_eq!(
            line_texts(&page),
            vec!["First line", "Second line", "Third line"]
        );
    }

    #[test]
    fn test_text_matrix_scales_font_size() {
        let page = analyze(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), num(10.0)]),
            op(
                "Tm",
                vec![num(2.0), num(0.0), num(0.0), num(2.0), num(72.0), num(700.0)],
            ),
            op("Tj", vec![s("Scaled")]),
            op("ET", vec![]),
        ]);
        assert_eq!(page.spans().next().map(|s| s.size), Some(20.0));
    }

    #[test]
    fn test_font_decoder_resolved_once_per_resource() {
        let backend = MockBackend::new(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), num(10.0)]),
            op("Td", vec![num(72.0), num(700.0)]),
            op("Tj", vec![s("One")]),
            op("Tj", vec![s(" two")]),
            op("Tf", vec![name("F2"), num(10.0)]),
            op("TJ", vec![PdfValue::Array(vec![s("Three"), s("Four")])]),
            op("Tf", vec![name("F1"), num(12.0)]),
            op("'", vec![s("Five")]),
            op("ET", vec![]),
        ]);
        let page = PageAnalyzer::new(&backend).analyze((3, 0)).unwrap();

        assert_eq!(line_texts(&page), vec!["One two ThreeFour", "Five"]);
        assert_eq!(
            *backend.resolved.borrow(),
            vec![b"F1".to_vec(), b"F2".to_vec()]
        );
    }

    #[test]
    fn test_text_outside_text_object_ignored() {
        let page = analyze(vec![
            op("Tf", vec![name("F1"), num(10.0)]),
            op("Tj", vec![s("Stray")]),
        ]);
        assert!(page.is_empty());
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn test_font_style_flags() {
        assert_eq!(font_style_flags("Helvetica-Bold", None), FLAG_BOLD);
        assert_eq!(font_style_flags("Arial-BlackItalic", None), FLAG_BOLD | FLAG_ITALIC);
        assert_eq!(font_style_flags("Courier", None), FLAG_MONOSPACE);
        assert_eq!(font_style_flags("Arial", Some(1 << 18)), FLAG_BOLD);
        assert_eq!(font_style_flags("Georgia", Some(2)), FLAG_SERIF);
        assert_eq!(font_style_flags("Helvetica", Some(32)), 0);
    }
}
