//! Text layout: positioned spans, lines, and page text reconstruction.
//!
//! Spans come out of the content interpreter in drawing order. Page text
//! (and the text of individual table cells) is rebuilt by grouping spans
//! into baselines, ordering lines top to bottom and spans left to right.

use std::cmp::Ordering;

/// One shown character code, placed along its span's baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub text: String,
    /// Left edge in user space
    pub x: f32,
    pub width: f32,
}

impl Glyph {
    pub fn new(text: impl Into<String>, x: f32, width: f32) -> Self {
        Self {
            text: text.into(),
            x,
            width,
        }
    }

    fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// A text span with position and font information.
///
/// Coordinates are PDF user space: origin bottom-left, Y grows upward.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Advance width of the text
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Per-glyph positions, empty when unknown
    pub glyphs: Vec<Glyph>,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            font_size,
            font_name: String::new(),
            glyphs: Vec::new(),
        }
    }

    /// Set the font name.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    /// Attach glyph positions.
    pub fn with_glyphs(mut self, glyphs: Vec<Glyph>) -> Self {
        self.glyphs = glyphs;
        self
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom Y coordinate (approximate, based on font size).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2 // Approximate descender
    }

    /// Get the top Y coordinate (approximate, based on font size).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8 // Approximate ascender
    }

    /// Centre of the span's box.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, (self.bottom() + self.top()) / 2.0)
    }

    /// The parts of this span whose glyph centres satisfy `keep`.
    ///
    /// Kept glyphs form one piece per consecutive run; a run also breaks
    /// where two glyphs are a word gap apart. A span without glyph
    /// positions is kept or dropped whole by its own centre.
    pub fn pieces_where(&self, keep: impl Fn(f32) -> bool) -> Vec<TextSpan> {
        if self.glyphs.is_empty() {
            return if keep(self.center().0) {
                vec![self.clone()]
            } else {
                Vec::new()
            };
        }
        if self.glyphs.iter().all(|g| keep(g.center_x())) {
            return vec![self.clone()];
        }

        let mut pieces = Vec::new();
        let mut run: Vec<Glyph> = Vec::new();
        for glyph in &self.glyphs {
            let kept = keep(glyph.center_x());
            let word_gap = run
                .last()
                .is_some_and(|prev| glyph.x - (prev.x + prev.width) > prev.width * 0.2);
            if (!kept || word_gap) && !run.is_empty() {
                pieces.push(self.piece(std::mem::take(&mut run)));
            }
            if kept {
                run.push(glyph.clone());
            }
        }
        if !run.is_empty() {
            pieces.push(self.piece(run));
        }
        pieces
    }

    /// A span made of some of this span's glyphs.
    fn piece(&self, glyphs: Vec<Glyph>) -> TextSpan {
        let x = glyphs.first().map_or(self.x, |g| g.x);
        let right = glyphs.last().map_or(x, |g| g.x + g.width);
        TextSpan {
            text: glyphs.iter().map(|g| g.text.as_str()).collect(),
            x,
            y: self.y,
            width: right - x,
            font_size: self.font_size,
            font_name: self.font_name.clone(),
            glyphs,
        }
    }
}

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline of the first span)
    pub y: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        let y = spans.first().map(|s| s.y).unwrap_or(0.0);
        Self { spans, y }
    }

    /// Get the combined text of all spans with appropriate spacing.
    ///
    /// Inserts spaces between spans based on their X coordinate gaps.
    /// No space is inserted between adjacent CJK ideographs.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 && needs_space(&self.spans[i - 1], span) {
                result.push(' ');
            }
            result.push_str(&span.text);
        }

        result
    }
}

/// Whether a space separates two neighbouring spans on one line.
fn needs_space(prev: &TextSpan, span: &TextSpan) -> bool {
    if prev.text.ends_with([' ', '\u{00A0}']) || span.text.starts_with([' ', '\u{00A0}']) {
        return false;
    }

    let char_count = span.text.chars().count();
    let avg_char_width = if char_count > 0 && span.width > 0.0 {
        span.width / char_count as f32
    } else {
        span.font_size * 0.5
    };

    // More than a fifth of a glyph apart reads as a word break.
    let gap = span.x - prev.right();
    if gap <= avg_char_width * 0.2 {
        return false;
    }

    let prev_cjk = prev.text.chars().last().is_some_and(is_spaceless_script_char);
    let curr_cjk = span.text.chars().next().is_some_and(is_spaceless_script_char);
    !(prev_cjk && curr_cjk)
}

/// Group spans into lines, top to bottom.
///
/// Spans whose baselines differ by at most 30% of their font size share a
/// line.
pub fn group_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    // PDF Y is bottom-up, so descending Y reads top-down.
    spans.sort_by(|a, b| match b.y.total_cmp(&a.y) {
        Ordering::Equal => a.x.total_cmp(&b.x),
        other => other,
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Rebuild plain text from spans: one output line per baseline.
pub fn spans_to_text(spans: Vec<TextSpan>) -> String {
    group_into_lines(spans)
        .iter()
        .map(|line| line.text().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
