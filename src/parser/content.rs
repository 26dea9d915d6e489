//! Content stream interpretation.
//!
//! Walks a page's operators, tracking the graphics state (CTM) and the text
//! state, and collects what table finding needs: positioned text spans and
//! the straight segments of painted paths. Form XObjects drawn with `Do` are
//! interpreted in place.

use std::collections::HashMap;

use crate::error::Result;

use super::backend::{
    BackendFontInfo, ContentOp, FormXObject, ObjectId, PageId, PdfBackend, PdfValue,
    ResourceScope,
};
use super::layout::{is_spaceless_script_char, Glyph, TextSpan};

/// TJ adjustments beyond this (thousandths of an em) read as word spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Guard against runaway `q` nesting in malformed streams.
const MAX_STATE_DEPTH: usize = 64;

/// Form XObjects nested deeper than this are skipped.
const MAX_FORM_DEPTH: usize = 12;

/// A 2D affine transform `[a b c d e f]` as used by PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix(pub [f32; 6]);

impl Matrix {
    pub const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Pure translation.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    /// Map a point through the transform.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    /// Length of the transformed unit Y vector.
    fn vertical_scale(&self) -> f32 {
        let [_, _, c, d, _, _] = self.0;
        (c * c + d * d).sqrt()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::IDENTITY
    }
}

/// A straight piece of a painted path, in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Segment {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// Everything table finding needs from one page.
#[derive(Debug, Clone, Default)]
pub struct PageObjects {
    /// Text spans in drawing order
    pub spans: Vec<TextSpan>,
    /// Painted path segments
    pub segments: Vec<Segment>,
}

/// Text state parameters (PDF 32000-1, 9.3).
#[derive(Debug, Clone)]
struct TextState {
    font: Vec<u8>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: Vec::new(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// Saved by `q`, restored by `Q`.
#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

/// Path under construction.
#[derive(Debug, Default)]
struct PathBuilder {
    subpaths: Vec<Subpath>,
}

#[derive(Debug, Default)]
struct Subpath {
    points: Vec<(f32, f32)>,
    closed: bool,
}

impl PathBuilder {
    fn move_to(&mut self, p: (f32, f32)) {
        self.subpaths.push(Subpath {
            points: vec![p],
            closed: false,
        });
    }

    /// After `h` the current point is the closed subpath's start, so a new
    /// subpath begins there.
    fn line_to(&mut self, p: (f32, f32)) {
        let start = match self.subpaths.last_mut() {
            Some(sub) if !sub.closed => {
                sub.points.push(p);
                return;
            }
            Some(sub) => sub.points.first().copied(),
            None => None,
        };
        match start {
            Some(start) => self.subpaths.push(Subpath {
                points: vec![start, p],
                closed: false,
            }),
            None => self.move_to(p),
        }
    }

    /// Curves contribute no straight edges; only the current point moves.
    fn curve_to(&mut self, p: (f32, f32)) {
        self.move_to(p);
    }

    fn close(&mut self) {
        if let Some(sub) = self.subpaths.last_mut() {
            sub.closed = true;
        }
    }

    /// Drain the path into segments. Filled paths close implicitly.
    fn finish(&mut self, close_all: bool, out: &mut Vec<Segment>) {
        for sub in self.subpaths.drain(..) {
            for pair in sub.points.windows(2) {
                out.push(Segment::new(pair[0].0, pair[0].1, pair[1].0, pair[1].1));
            }
            if (sub.closed || close_all) && sub.points.len() > 2 {
                let (first, last) = (sub.points[0], sub.points[sub.points.len() - 1]);
                if first != last {
                    out.push(Segment::new(last.0, last.1, first.0, first.1));
                }
            }
        }
    }

    fn discard(&mut self) {
        self.subpaths.clear();
    }
}

/// Fonts by resource name, with the scope each was declared in.
type FontTable = HashMap<Vec<u8>, (ResourceScope, BackendFontInfo)>;

fn font_table(scope: ResourceScope, fonts: Vec<BackendFontInfo>) -> FontTable {
    fonts
        .into_iter()
        .map(|f| (f.name.clone(), (scope, f)))
        .collect()
}

/// Interprets one page's content stream against a backend.
pub struct ContentInterpreter<'a, B: PdfBackend> {
    backend: &'a B,
    page: PageId,
    /// Scope for `Do` lookups: the page, or the innermost form with resources
    scope: ResourceScope,
    fonts: FontTable,
    /// Forms being drawn, outermost first
    forms: Vec<ObjectId>,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    path: PathBuilder,
    objects: PageObjects,
}

impl<'a, B: PdfBackend> ContentInterpreter<'a, B> {
    /// Prepare an interpreter for the given page.
    pub fn new(backend: &'a B, page: PageId) -> Result<Self> {
        let scope = ResourceScope::Page(page);
        let fonts = font_table(scope, backend.fonts(scope)?);

        Ok(Self {
            backend,
            page,
            scope,
            fonts,
            forms: Vec::new(),
            state: GraphicsState::default(),
            stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            path: PathBuilder::default(),
            objects: PageObjects::default(),
        })
    }

    /// Run the page's content stream and return the collected objects.
    pub fn run(mut self) -> Result<PageObjects> {
        let content = self.backend.page_content(self.page)?;
        if content.is_empty() {
            return Ok(self.objects);
        }
        let ops = self.backend.decode_content(&content)?;
        for op in &ops {
            self.execute(op);
        }
        log::debug!(
            "page {:?}: {} operators, {} spans, {} segments",
            self.page,
            ops.len(),
            self.objects.spans.len(),
            self.objects.segments.len()
        );
        Ok(self.objects)
    }

    fn execute(&mut self, op: &ContentOp) {
        match op.operator.as_str() {
            // Graphics state
            "q" => {
                if self.stack.len() < MAX_STATE_DEPTH {
                    self.stack.push(self.state.clone());
                }
            }
            "Q" => {
                if let Some(saved) = self.stack.pop() {
                    self.state = saved;
                }
            }
            "cm" => {
                if let Some(m) = op.numbers::<6>() {
                    self.state.ctm = Matrix(m).then(&self.state.ctm);
                }
            }

            // Path construction
            "m" => {
                if let Some([x, y]) = op.numbers::<2>() {
                    self.path.move_to(self.state.ctm.apply(x, y));
                }
            }
            "l" => {
                if let Some([x, y]) = op.numbers::<2>() {
                    self.path.line_to(self.state.ctm.apply(x, y));
                }
            }
            "c" => {
                if let Some([_, _, _, _, x, y]) = op.numbers::<6>() {
                    self.path.curve_to(self.state.ctm.apply(x, y));
                }
            }
            "v" | "y" => {
                if let Some([_, _, x, y]) = op.numbers::<4>() {
                    self.path.curve_to(self.state.ctm.apply(x, y));
                }
            }
            "re" => {
                if let Some([x, y, w, h]) = op.numbers::<4>() {
                    let ctm = self.state.ctm;
                    self.path.move_to(ctm.apply(x, y));
                    self.path.line_to(ctm.apply(x + w, y));
                    self.path.line_to(ctm.apply(x + w, y + h));
                    self.path.line_to(ctm.apply(x, y + h));
                    self.path.close();
                }
            }
            "h" => self.path.close(),

            // Path painting
            "S" => self.path.finish(false, &mut self.objects.segments),
            "s" => {
                self.path.close();
                self.path.finish(false, &mut self.objects.segments);
            }
            "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                self.path.finish(true, &mut self.objects.segments)
            }
            "n" => self.path.discard(),

            // Text objects
            "BT" => {
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "ET" => {}

            // External objects
            "Do" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    if let Some(form) = self.backend.form_xobject(self.scope, name) {
                        self.draw_form(form);
                    }
                }
            }

            // Text state
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.state.text.font = name.clone();
                }
                if let Some(size) = op.number(1) {
                    self.state.text.font_size = size;
                }
            }
            "Tc" => {
                if let Some(v) = op.number(0) {
                    self.state.text.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = op.number(0) {
                    self.state.text.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = op.number(0) {
                    self.state.text.horizontal_scale = v / 100.0;
                }
            }
            "TL" => {
                if let Some(v) = op.number(0) {
                    self.state.text.leading = v;
                }
            }
            "Ts" => {
                if let Some(v) = op.number(0) {
                    self.state.text.rise = v;
                }
            }

            // Text positioning
            "Td" => {
                if let Some([tx, ty]) = op.numbers::<2>() {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = op.numbers::<2>() {
                    self.state.text.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = op.numbers::<6>() {
                    self.text_matrix = Matrix(m);
                    self.line_matrix = Matrix(m);
                }
            }
            "T*" => self.next_line(),

            // Text showing
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show(&[PdfValue::Str(bytes.clone())]);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    self.show(items);
                }
            }
            "'" => {
                self.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show(&[PdfValue::Str(bytes.clone())]);
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (op.number(0), op.number(1)) {
                    self.state.text.word_spacing = aw;
                    self.state.text.char_spacing = ac;
                }
                self.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                    self.show(&[PdfValue::Str(bytes.clone())]);
                }
            }
            _ => {}
        }
    }

    /// Interpret a form's content under its matrix, then restore the
    /// graphics and text state.
    fn draw_form(&mut self, form: FormXObject) {
        if self.forms.contains(&form.id) || self.forms.len() >= MAX_FORM_DEPTH {
            log::warn!("skipping nested form XObject {:?}", form.id);
            return;
        }
        let ops = match self.backend.decode_content(&form.content) {
            Ok(ops) => ops,
            Err(e) => {
                log::warn!("form XObject {:?}: {}", form.id, e);
                return;
            }
        };

        let saved_state = self.state.clone();
        let saved_depth = self.stack.len();
        let saved_text = (self.text_matrix, self.line_matrix);
        let saved_scope = self.scope;
        let mut saved_fonts = None;

        if form.has_resources {
            let scope = ResourceScope::Form(form.id);
            match self.backend.fonts(scope) {
                Ok(fonts) => {
                    // Names the form does not declare fall back to the enclosing fonts.
                    let mut table = self.fonts.clone();
                    table.extend(font_table(scope, fonts));
                    saved_fonts = Some(std::mem::replace(&mut self.fonts, table));
                }
                Err(e) => log::warn!("form XObject {:?} fonts: {}", form.id, e),
            }
            self.scope = scope;
        }

        self.state.ctm = Matrix(form.matrix).then(&self.state.ctm);
        self.forms.push(form.id);
        for op in &ops {
            self.execute(op);
        }
        self.forms.pop();

        self.stack.truncate(saved_depth);
        self.state = saved_state;
        (self.text_matrix, self.line_matrix) = saved_text;
        self.scope = saved_scope;
        if let Some(fonts) = saved_fonts {
            self.fonts = fonts;
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.state.text.leading;
        self.move_line(0.0, -leading);
    }

    /// Current glyph origin and size in user space.
    fn rendering_origin(&self) -> ((f32, f32), f32) {
        let ts = &self.state.text;
        let trm = Matrix::translation(0.0, ts.rise)
            .then(&self.text_matrix)
            .then(&self.state.ctm);
        (trm.apply(0.0, 0.0), ts.font_size * trm.vertical_scale())
    }

    /// Show a TJ-style array of strings and adjustments as one span,
    /// recording where each glyph lands.
    fn show(&mut self, items: &[PdfValue]) {
        let (scope, font) = self
            .fonts
            .get(&self.state.text.font)
            .cloned()
            .unwrap_or_else(|| {
                let name = String::from_utf8_lossy(&self.state.text.font).to_string();
                (self.scope, BackendFontInfo::simple(&self.state.text.font, &name))
            });

        let (start, font_size) = self.rendering_origin();
        let mut text = String::new();
        let mut glyphs = Vec::new();

        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    let decoded = self.backend.decode_glyphs(scope, &font, bytes);
                    for (chunk, glyph_text) in font.code_chunks(bytes).zip(decoded) {
                        let (glyph_advance, spacing) =
                            self.glyph_advance(&font, BackendFontInfo::code(chunk));
                        let (origin, _) = self.rendering_origin();
                        self.advance(glyph_advance);
                        let (end, _) = self.rendering_origin();
                        self.advance(spacing);

                        text.push_str(&glyph_text);
                        glyphs.push(Glyph::new(glyph_text, origin.0, end.0 - origin.0));
                    }
                }
                other => {
                    let Some(adjust) = other.as_number() else {
                        continue;
                    };
                    let ts = &self.state.text;
                    let tx = -adjust / 1000.0 * ts.font_size * ts.horizontal_scale;
                    self.advance(tx);

                    let last = text.chars().last();
                    if -adjust > TJ_SPACE_THRESHOLD
                        && last.is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c))
                    {
                        text.push(' ');
                    }
                }
            }
        }

        if text.trim().is_empty() {
            return;
        }

        let (end, _) = self.rendering_origin();
        let width = (end.0 - start.0).hypot(end.1 - start.1);
        self.objects.spans.push(
            TextSpan::new(text, start.0, start.1, width, font_size)
                .with_font(font.base_font)
                .with_glyphs(glyphs),
        );
    }

    /// Move the text matrix along the baseline by `tx` text space units.
    fn advance(&mut self, tx: f32) {
        self.text_matrix = Matrix::translation(tx, 0.0).then(&self.text_matrix);
    }

    /// Horizontal advance of one character code, split into the glyph's own
    /// width and the character and word spacing after it.
    fn glyph_advance(&self, font: &BackendFontInfo, code: u32) -> (f32, f32) {
        let ts = &self.state.text;
        let w0 = font.glyph_width(code) / 1000.0;
        // Word spacing applies to single-byte code 32 only.
        let word = if font.code_len == 1 && code == 32 {
            ts.word_spacing
        } else {
            0.0
        };
        (
            w0 * ts.font_size * ts.horizontal_scale,
            (ts.char_spacing + word) * ts.horizontal_scale,
        )
    }
}

/// Interpret a page and collect its spans and path segments.
pub fn interpret_page<B: PdfBackend>(backend: &B, page: PageId) -> Result<PageObjects> {
    ContentInterpreter::new(backend, page)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// A form XObject served by [`OpsBackend`].
    struct Form {
        id: ObjectId,
        matrix: [f32; 6],
        ops: Vec<ContentOp>,
        /// Fonts of the form's own resources, if it has any
        fonts: Option<Vec<BackendFontInfo>>,
    }

    /// Backend serving pre-decoded operators for a single page and its
    /// form XObjects.
    struct OpsBackend {
        ops: Vec<ContentOp>,
        forms: HashMap<Vec<u8>, Form>,
    }

    impl PdfBackend for OpsBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (1, 0))])
        }

        fn media_box(&self, _page: PageId) -> [f32; 4] {
            [0.0, 0.0, 612.0, 792.0]
        }

        fn fonts(&self, scope: ResourceScope) -> Result<Vec<BackendFontInfo>> {
            Ok(match scope {
                ResourceScope::Page(_) => vec![BackendFontInfo::simple(b"F1", "Courier")],
                ResourceScope::Form(id) => self
                    .forms
                    .values()
                    .find(|f| f.id == id)
                    .and_then(|f| f.fonts.clone())
                    .unwrap_or_default(),
            })
        }

        fn page_content(&self, _page: PageId) -> Result<Vec<u8>> {
            Ok(b"page".to_vec())
        }

        fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
            if data == b"page" {
                return Ok(self.ops.clone());
            }
            Ok(self.forms.get(data).map(|f| f.ops.clone()).unwrap_or_default())
        }

        fn form_xobject(&self, _scope: ResourceScope, name: &[u8]) -> Option<FormXObject> {
            self.forms.get(name).map(|f| FormXObject {
                id: f.id,
                matrix: f.matrix,
                content: name.to_vec(),
                has_resources: f.fonts.is_some(),
            })
        }
    }

    fn num(v: f32) -> PdfValue {
        PdfValue::Real(v)
    }

    fn op(operator: &str, operands: &[f32]) -> ContentOp {
        ContentOp::new(operator, operands.iter().map(|v| num(*v)).collect())
    }

    fn text(s: &str) -> PdfValue {
        PdfValue::Str(s.as_bytes().to_vec())
    }

    fn run(ops: Vec<ContentOp>) -> PageObjects {
        run_with_forms(ops, Vec::new())
    }

    fn run_with_forms(ops: Vec<ContentOp>, forms: Vec<(&str, Form)>) -> PageObjects {
        let forms = forms
            .into_iter()
            .map(|(name, form)| (name.as_bytes().to_vec(), form))
            .collect();
        interpret_page(&OpsBackend { ops, forms }, (1, 0)).unwrap()
    }

    fn name(n: &str) -> PdfValue {
        PdfValue::Name(n.as_bytes().to_vec())
    }

    fn show_text(font: &str, s: &str, x: f32, y: f32) -> Vec<ContentOp> {
        vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![name(font), num(10.0)]),
            op("Td", &[x, y]),
            ContentOp::new("Tj", vec![text(s)]),
            ContentOp::new("ET", vec![]),
        ]
    }

    #[test]
    fn test_matrix_composition() {
        let scale = Matrix([2.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
        let shift = Matrix::translation(10.0, 5.0);
        // scale first, then shift
        assert_eq!(scale.then(&shift).apply(1.0, 1.0), (12.0, 7.0));
        // shift first, then scale
        assert_eq!(shift.then(&scale).apply(1.0, 1.0), (22.0, 12.0));
    }

    #[test]
    fn test_tj_position_and_width() {
        let objects = run(vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            op("Td", &[100.0, 700.0]),
            ContentOp::new("Tj", vec![text("abc")]),
            ContentOp::new("ET", vec![]),
        ]);

        assert_eq!(objects.spans.len(), 1);
        let span = &objects.spans[0];
        assert_eq!(span.text, "abc");
        assert_eq!((span.x, span.y), (100.0, 700.0));
        // Courier: 600/1000 * 10pt * 3 glyphs
        assert!((span.width - 18.0).abs() < 1e-3);
        assert_eq!(span.font_size, 10.0);
        assert_eq!(span.font_name, "Courier");
    }

    #[test]
    fn test_consecutive_tj_advance() {
        let objects = run(vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            op("Td", &[0.0, 0.0]),
            ContentOp::new("Tj", vec![text("ab")]),
            ContentOp::new("Tj", vec![text("cd")]),
            ContentOp::new("ET", vec![]),
        ]);
        assert_eq!(objects.spans[1].x, 12.0);
    }

    #[test]
    fn test_tj_array_inserts_space_for_large_gap() {
        let objects = run(vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            ContentOp::new(
                "TJ",
                vec![PdfValue::Array(vec![
                    text("Net"),
                    PdfValue::Integer(-50),
                    text("Pay"),
                    PdfValue::Integer(-400),
                    text("Total"),
                ])],
            ),
            ContentOp::new("ET", vec![]),
        ]);
        assert_eq!(objects.spans[0].text, "NetPay Total");
        // 11 glyphs at 6pt plus 0.5pt and 4pt of adjustment
        assert!((objects.spans[0].width - 70.5).abs() < 1e-3);
    }

    #[test]
    fn test_ctm_scales_text() {
        let objects = run(vec![
            op("cm", &[2.0, 0.0, 0.0, 2.0, 10.0, 20.0]),
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(5.0)]),
            op("Tm", &[1.0, 0.0, 0.0, 1.0, 50.0, 100.0]),
            ContentOp::new("Tj", vec![text("x")]),
            ContentOp::new("ET", vec![]),
        ]);
        let span = &objects.spans[0];
        assert_eq!((span.x, span.y), (110.0, 220.0));
        assert_eq!(span.font_size, 10.0);
    }

    #[test]
    fn test_leading_and_next_line() {
        let objects = run(vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10.0)]),
            op("TD", &[72.0, -14.0]),
            ContentOp::new("Tj", vec![text("one")]),
            ContentOp::new("T*", vec![]),
            ContentOp::new("Tj", vec![text("two")]),
            ContentOp::new("'", vec![text("three")]),
            ContentOp::new("ET", vec![]),
        ]);
        let ys: Vec<f32> = objects.spans.iter().map(|s| s.y).collect();
        assert_eq!(ys, vec![-14.0, -28.0, -42.0]);
        assert!(objects.spans.iter().all(|s| s.x == 72.0));
    }

    #[test]
    fn test_whitespace_only_text_is_skipped() {
        let objects = run(vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tj", vec![text("   ")]),
            ContentOp::new("ET", vec![]),
        ]);
        assert!(objects.spans.is_empty());
    }

    #[test]
    fn test_rectangle_stroke_segments() {
        let objects = run(vec![op("re", &[10.0, 20.0, 100.0, 50.0]), op("S", &[])]);
        assert_eq!(
            objects.segments,
            vec![
                Segment::new(10.0, 20.0, 110.0, 20.0),
                Segment::new(110.0, 20.0, 110.0, 70.0),
                Segment::new(110.0, 70.0, 10.0, 70.0),
                Segment::new(10.0, 70.0, 10.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_lines_under_transform_and_state_restore() {
        let objects = run(vec![
            ContentOp::new("q", vec![]),
            op("cm", &[1.0, 0.0, 0.0, 1.0, 5.0, 5.0]),
            op("m", &[0.0, 0.0]),
            op("l", &[50.0, 0.0]),
            op("S", &[]),
            ContentOp::new("Q", vec![]),
            op("m", &[0.0, 0.0]),
            op("l", &[0.0, 30.0]),
            op("S", &[]),
        ]);
        assert_eq!(
            objects.segments,
            vec![
                Segment::new(5.0, 5.0, 55.0, 5.0),
                Segment::new(0.0, 0.0, 0.0, 30.0),
            ]
        );
    }

    #[test]
    fn test_unpainted_path_is_discarded() {
        let objects = run(vec![op("re", &[0.0, 0.0, 10.0, 10.0]), op("n", &[])]);
        assert!(objects.segments.is_empty());
    }

    #[test]
    fn test_line_after_close_starts_at_subpath_start() {
        let objects = run(vec![
            op("m", &[0.0, 0.0]),
            op("l", &[10.0, 0.0]),
            op("l", &[10.0, 10.0]),
            op("h", &[]),
            op("l", &[0.0, 20.0]),
            op("S", &[]),
        ]);
        assert_eq!(
            objects.segments,
            vec![
                Segment::new(0.0, 0.0, 10.0, 0.0),
                Segment::new(10.0, 0.0, 10.0, 10.0),
                Segment::new(10.0, 10.0, 0.0, 0.0),
                Segment::new(0.0, 0.0, 0.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_tj_offsets_recorded_per_glyph() {
        let objects = run(vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tf", vec![name("F1"), num(10.0)]),
            op("Td", &[105.0, 686.0]),
            ContentOp::new(
                "TJ",
                vec![PdfValue::Array(vec![text("a"), PdfValue::Integer(-9400), text("b")])],
            ),
            ContentOp::new("ET", vec![]),
        ]);

        let span = &objects.spans[0];
        assert_eq!(span.text, "a b");
        let glyphs: Vec<(&str, f32, f32)> = span
            .glyphs
            .iter()
            .map(|g| (g.text.as_str(), g.x, g.width))
            .collect();
        assert_eq!(glyphs.len(), 2);
        assert_eq!((glyphs[0].0, glyphs[0].1), ("a", 105.0));
        assert!((glyphs[0].2 - 6.0).abs() < 1e-3);
        assert_eq!(glyphs[1].0, "b");
        assert!((glyphs[1].1 - 205.0).abs() < 1e-3);
    }

    #[test]
    fn test_form_xobject_drawn_under_its_matrix() {
        let mut form_ops = vec![op("re", &[0.0, 0.0, 50.0, 20.0]), op("S", &[])];
        form_ops.extend(show_text("F1", "x", 5.0, 5.0));
        let form = Form {
            id: (7, 0),
            matrix: [1.0, 0.0, 0.0, 1.0, 100.0, 200.0],
            ops: form_ops,
            fonts: None,
        };

        let objects = run_with_forms(
            vec![
                ContentOp::new("Do", vec![name("Fm1")]),
                op("m", &[0.0, 0.0]),
                op("l", &[10.0, 0.0]),
                op("S", &[]),
            ],
            vec![("Fm1", form)],
        );

        assert_eq!(objects.segments.len(), 5);
        assert_eq!(objects.segments[0], Segment::new(100.0, 200.0, 150.0, 200.0));
        // the page's own path is back in page space
        assert_eq!(objects.segments[4], Segment::new(0.0, 0.0, 10.0, 0.0));
        assert_eq!(objects.spans[0].text, "x");
        assert_eq!((objects.spans[0].x, objects.spans[0].y), (105.0, 205.0));
    }

    #[test]
    fn test_form_fonts_fall_back_to_enclosing() {
        let mut form_ops = show_text("F2", "ab", 0.0, 100.0);
        form_ops.extend(show_text("F1", "ab", 0.0, 50.0));
        let form = Form {
            id: (7, 0),
            matrix: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            ops: form_ops,
            fonts: Some(vec![BackendFontInfo::simple(b"F2", "Helvetica")]),
        };

        let objects = run_with_forms(
            vec![ContentOp::new("Do", vec![name("Fm1")])],
            vec![("Fm1", form)],
        );

        let fonts: Vec<(&str, f32)> = objects
            .spans
            .iter()
            .map(|s| (s.font_name.as_str(), s.width))
            .collect();
        assert_eq!(fonts, vec![("Helvetica", 10.0), ("Courier", 12.0)]);
    }

    #[test]
    fn test_self_referencing_form_is_drawn_once() {
        let form = Form {
            id: (7, 0),
            matrix: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            ops: vec![
                op("m", &[0.0, 0.0]),
                op("l", &[10.0, 0.0]),
                op("S", &[]),
                ContentOp::new("Do", vec![name("Fm1")]),
            ],
            fonts: None,
        };

        let objects = run_with_forms(
            vec![ContentOp::new("Do", vec![name("Fm1")])],
            vec![("Fm1", form)],
        );
        assert_eq!(objects.segments, vec![Segment::new(0.0, 0.0, 10.0, 0.0)]);
    }

    #[test]
    fn test_unknown_xobject_is_ignored() {
        let objects = run(vec![ContentOp::new("Do", vec![name("Im1")])]);
        assert!(objects.spans.is_empty());
        assert!(objects.segments.is_empty());
    }
}
