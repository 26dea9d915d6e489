//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from content interpretation and
//! table finding. Resource names (fonts, form XObjects) are resolved within
//! a [`ResourceScope`]: the page itself or a form XObject drawn on it.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Object identifier: (object number, generation number).
pub type ObjectId = (u32, u16);

/// Page identifier.
pub type PageId = ObjectId;

/// Default page size (US Letter) when no media box can be resolved.
pub const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Font information returned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
    /// First character code covered by `widths`.
    pub first_char: u32,
    /// Glyph widths in 1/1000 text space units, starting at `first_char`.
    pub widths: Vec<f32>,
    /// Width used for codes outside `widths`.
    pub default_width: f32,
    /// Per-CID widths of a Type0 font (its descendant's `/W`).
    pub cid_widths: BTreeMap<u32, f32>,
    /// Bytes per character code (2 for Type0 fonts).
    pub code_len: usize,
}

impl BackendFontInfo {
    /// Font info for a simple font with no width table.
    pub fn simple(name: &[u8], base_font: &str) -> Self {
        Self {
            name: name.to_vec(),
            base_font: base_font.to_string(),
            first_char: 0,
            widths: Vec::new(),
            default_width: standard_width(base_font),
            cid_widths: BTreeMap::new(),
            code_len: 1,
        }
    }

    /// Width of a character code in 1/1000 text space units.
    pub fn glyph_width(&self, code: u32) -> f32 {
        if self.code_len == 2 {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.default_width)
    }

    /// Split a shown string into its character codes, as byte chunks.
    pub fn code_chunks<'b>(&self, bytes: &'b [u8]) -> std::slice::Chunks<'b, u8> {
        bytes.chunks(self.code_len.max(1))
    }

    /// Big-endian value of one character code.
    pub fn code(chunk: &[u8]) -> u32 {
        chunk.iter().fold(0, |acc, &b| (acc << 8) | u32::from(b))
    }
}

/// Approximate advance width for standard-14 fonts lacking `/Widths`.
fn standard_width(base_font: &str) -> f32 {
    if base_font.contains("Courier") {
        600.0
    } else {
        500.0
    }
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value of an integer or real operand.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// Where resource names are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceScope {
    /// The page's own (possibly inherited) resources
    Page(PageId),
    /// The resources of a form XObject
    Form(ObjectId),
}

/// A form XObject referenced by a `Do` operator.
#[derive(Debug, Clone, PartialEq)]
pub struct FormXObject {
    pub id: ObjectId,
    /// Form space to user space, `/Matrix` (identity when absent)
    pub matrix: [f32; 6],
    /// Decompressed content stream
    pub content: Vec<u8>,
    /// Whether the form carries its own `/Resources`
    pub has_resources: bool,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Build an operation from an operator and operands.
    pub fn new(operator: &str, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }

    /// Numeric operand at `idx`, if present.
    pub fn number(&self, idx: usize) -> Option<f32> {
        self.operands.get(idx).and_then(PdfValue::as_number)
    }

    /// All operands as numbers, or `None` when fewer than `n` are numeric.
    pub fn numbers<const N: usize>(&self) -> Option<[f32; N]> {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.number(i)?;
        }
        Some(out)
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, page geometry, font info,
/// content stream decoding and text decoding without exposing any concrete
/// PDF library types.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return the page's media box as `[x0, y0, x1, y1]`.
    fn media_box(&self, page: PageId) -> [f32; 4];

    /// Return the fonts declared in a resource scope.
    fn fonts(&self, scope: ResourceScope) -> Result<Vec<BackendFontInfo>>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a shown string into one piece of text per character code,
    /// using the encoding of `font` as declared in `scope`.
    ///
    /// The default decodes each code with [`decode_text_simple`].
    fn decode_glyphs(
        &self,
        _scope: ResourceScope,
        font: &BackendFontInfo,
        bytes: &[u8],
    ) -> Vec<String> {
        font.code_chunks(bytes).map(decode_text_simple).collect()
    }

    /// Look up a form XObject by resource name. Image XObjects and
    /// unresolvable names give `None`.
    fn form_xobject(&self, _scope: ResourceScope, _name: &[u8]) -> Option<FormXObject> {
        None
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with byte order mark
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

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

use lopdf::{Dictionary, Document as LopdfDocument, Object};

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Ok(Self { doc })
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self { doc })
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Follow a reference, or return the object itself.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    /// Look up a page attribute, following `/Parent` for inherited keys.
    fn inherited<'a>(&'a self, page: PageId, key: &[u8]) -> Option<&'a Object> {
        let mut dict = self.doc.get_dictionary(page).ok()?;
        // Bounded walk guards against cyclic page trees.
        for _ in 0..32 {
            if let Ok(value) = dict.get(key) {
                return self.resolve(value);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn font_info(&self, name: &[u8], font: &Dictionary) -> BackendFontInfo {
        let base_font = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let mut info = BackendFontInfo::simple(name, &base_font);

        let is_type0 = font
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Type0");

        if is_type0 {
            info.code_len = 2;
            let descendant = font
                .get(b"DescendantFonts")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(|o| o.as_array().ok())
                .and_then(|arr| arr.first())
                .and_then(|o| self.resolve(o))
                .and_then(|o| o.as_dict().ok());
            info.default_width = descendant
                .and_then(|d| d.get(b"DW").ok())
                .and_then(|o| self.number(o))
                .unwrap_or(1000.0);
            if let Some(w) = descendant
                .and_then(|d| d.get(b"W").ok())
                .and_then(|o| self.resolve(o))
                .and_then(|o| o.as_array().ok())
            {
                info.cid_widths = self.cid_widths(w);
            }
            return info;
        }

        if let Some(first) = font.get(b"FirstChar").ok().and_then(|o| o.as_i64().ok()) {
            info.first_char = first.max(0) as u32;
        }
        if let Some(widths) = font
            .get(b"Widths")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())
        {
            info.widths = widths
                .iter()
                .map(|w| self.number(w).unwrap_or(0.0))
                .collect();
        }
        info
    }

    fn number(&self, obj: &Object) -> Option<f32> {
        self.resolve(obj).and_then(|o| o.as_float().ok())
    }

    /// Parse a CIDFont `/W` array. Entries are either `c [w1 w2 ...]`,
    /// giving consecutive CIDs from `c`, or `c_first c_last w`.
    fn cid_widths(&self, w: &[Object]) -> BTreeMap<u32, f32> {
        let mut widths = BTreeMap::new();
        let mut i = 0;

        while let Some(first) = w
            .get(i)
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_i64().ok())
        {
            // CIDs are at most two bytes
            let first = first.clamp(0, 0xFFFF) as u32;
            match w.get(i + 1).and_then(|o| self.resolve(o)) {
                Some(Object::Array(list)) => {
                    for (cid, width) in (first..).zip(list) {
                        if let Some(width) = self.number(width) {
                            widths.insert(cid, width);
                        }
                    }
                    i += 2;
                }
                Some(last) => {
                    let (Ok(last), Some(width)) =
                        (last.as_i64(), w.get(i + 2).and_then(|o| self.number(o)))
                    else {
                        break;
                    };
                    let last = last.clamp(0, 0xFFFF) as u32;
                    for cid in first..=last {
                        widths.insert(cid, width);
                    }
                    i += 3;
                }
                None => break,
            }
        }
        widths
    }

    /// The resource dictionary of a scope.
    fn resources(&self, scope: ResourceScope) -> Option<&Dictionary> {
        let obj = match scope {
            ResourceScope::Page(page) => self.inherited(page, b"Resources")?,
            ResourceScope::Form(id) => {
                let stream = self.doc.get_object(id).ok()?.as_stream().ok()?;
                self.resolve(stream.dict.get(b"Resources").ok()?)?
            }
        };
        obj.as_dict().ok()
    }

    /// A resource category such as `/Font` or `/XObject`.
    fn resource_entries(&self, scope: ResourceScope, category: &[u8]) -> Option<&Dictionary> {
        let entries = self.resources(scope)?.get(category).ok()?;
        self.resolve(entries)?.as_dict().ok()
    }

    /// Font dictionaries of a scope by resource name.
    fn font_dicts(&self, scope: ResourceScope) -> Result<BTreeMap<Vec<u8>, &Dictionary>> {
        match scope {
            ResourceScope::Page(page) => self
                .doc
                .get_page_fonts(page)
                .map_err(|e| Error::PdfParse(e.to_string())),
            ResourceScope::Form(_) => {
                let mut fonts = BTreeMap::new();
                if let Some(entries) = self.resource_entries(scope, b"Font") {
                    for (name, obj) in entries.iter() {
                        if let Some(font) = self.resolve(obj).and_then(|o| o.as_dict().ok()) {
                            fonts.insert(name.clone(), font);
                        }
                    }
                }
                Ok(fonts)
            }
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn media_box(&self, page: PageId) -> [f32; 4] {
        let Some(array) = self
            .inherited(page, b"MediaBox")
            .and_then(|o| o.as_array().ok())
        else {
            return DEFAULT_MEDIA_BOX;
        };
        if array.len() < 4 {
            return DEFAULT_MEDIA_BOX;
        }

        let mut rect = [0.0; 4];
        for (slot, obj) in rect.iter_mut().zip(array) {
            match self.resolve(obj).and_then(|o| o.as_float().ok()) {
                Some(v) => *slot = v,
                None => return DEFAULT_MEDIA_BOX,
            }
        }
        [
            rect[0].min(rect[2]),
            rect[1].min(rect[3]),
            rect[0].max(rect[2]),
            rect[1].max(rect[3]),
        ]
    }

    fn fonts(&self, scope: ResourceScope) -> Result<Vec<BackendFontInfo>> {
        Ok(self
            .font_dicts(scope)?
            .iter()
            .map(|(name, font_dict)| self.font_info(name, font_dict))
            .collect())
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id).map_err(|_| {
            Error::MissingObject(format!("page object {} {}", page_id.0, page_id.1))
        })?;

        // A page without /Contents is blank.
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => s
                    .decompressed_content()
                    .or_else(|_| Ok(s.content.clone())),
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_glyphs(
        &self,
        scope: ResourceScope,
        font: &BackendFontInfo,
        bytes: &[u8],
    ) -> Vec<String> {
        // Resolved once per string; a ToUnicode CMap is parsed here.
        let encoding = self
            .font_dicts(scope)
            .ok()
            .and_then(|fonts| fonts.get(font.name.as_slice()).copied())
            .and_then(|dict| dict.get_font_encoding(&self.doc).ok());

        font.code_chunks(bytes)
            .map(|chunk| {
                encoding
                    .as_ref()
                    .and_then(|enc| LopdfDocument::decode_text(enc, chunk).ok())
                    .unwrap_or_else(|| decode_text_simple(chunk))
            })
            .collect()
    }

    fn form_xobject(&self, scope: ResourceScope, name: &[u8]) -> Option<FormXObject> {
        let Ok(Object::Reference(id)) = self.resource_entries(scope, b"XObject")?.get(name) else {
            return None;
        };
        let stream = self.doc.get_object(*id).ok()?.as_stream().ok()?;
        let is_form = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Form");
        if !is_form {
            return None;
        }

        let mut matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        if let Some(values) = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())
            .filter(|values| values.len() == 6)
        {
            for (slot, value) in matrix.iter_mut().zip(values) {
                if let Some(v) = self.number(value) {
                    *slot = v;
                }
            }
        }

        let content = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        Some(FormXObject {
            id: *id,
            matrix,
            content,
            has_resources: stream.dict.has(b"Resources"),
        })
    }
}

impl LopdfBackend {
    /// Concatenate an array of content stream references.
    fn concat_streams(&self, arr: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in arr {
            if let Some(Object::Stream(s)) = self.resolve(obj) {
                match s.decompressed_content() {
                    Ok(data) => content.extend_from_slice(&data),
                    Err(_) => content.extend_from_slice(&s.content),
                }
                content.push(b'\n');
            }
        }
        content
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}
