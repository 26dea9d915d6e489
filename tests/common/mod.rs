//! In-memory PDF fixtures built with lopdf.

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

/// Identity ToUnicode map for two-byte codes covering printable ASCII.
const TO_UNICODE: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS)
/Supplement 0
>> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
1 beginbfrange
<0020> <007E> <0020>
endbfrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

/// Content of one page, drawn with 10pt fonts: Helvetica as `F1` and a
/// two-byte Identity-H font as `F2` whose glyphs are all 500 units wide.
#[derive(Default, Clone)]
pub struct PageBuilder {
    ops: Vec<Operation>,
    /// Form XObjects drawn by this page, with their matrices
    forms: Vec<(PageBuilder, [f32; 6])>,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` with its baseline starting at (x, y).
    pub fn text(mut self, text: &str, x: f32, y: f32) -> Self {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), Object::Real(10.0)]),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]);
        self
    }

    /// Show a `TJ` array (strings and adjustments) starting at (x, y).
    pub fn text_array(mut self, items: Vec<Object>, x: f32, y: f32) -> Self {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), Object::Real(10.0)]),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new("TJ", vec![Object::Array(items)]),
            Operation::new("ET", vec![]),
        ]);
        self
    }

    /// Show `text` in the two-byte font `F2`, one code per character.
    pub fn cid_text(mut self, text: &str, x: f32, y: f32) -> Self {
        let codes: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F2".into(), Object::Real(10.0)]),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new("Tj", vec![Object::String(codes, StringFormat::Hexadecimal)]),
            Operation::new("ET", vec![]),
        ]);
        self
    }

    /// Draw `form` as a form XObject placed by `matrix`. Forms nested in
    /// `form` are not drawn.
    pub fn form(mut self, form: PageBuilder, matrix: [f32; 6]) -> Self {
        let name = format!("Fm{}", self.forms.len() + 1);
        self.ops.push(Operation::new("Do", vec![name.as_str().into()]));
        self.forms.push((form, matrix));
        self
    }

    fn encode(&self) -> Vec<u8> {
        Content {
            operations: self.ops.clone(),
        }
        .encode()
        .expect("encode content")
    }

    /// Stroke a straight line.
    pub fn line(mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        self.ops.extend([
            Operation::new("m", vec![Object::Real(x0), Object::Real(y0)]),
            Operation::new("l", vec![Object::Real(x1), Object::Real(y1)]),
            Operation::new("S", vec![]),
        ]);
        self
    }

    /// Stroke a rectangle.
    pub fn rect(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.ops.extend([
            Operation::new(
                "re",
                vec![Object::Real(x), Object::Real(y), Object::Real(w), Object::Real(h)],
            ),
            Operation::new("S", vec![]),
        ]);
        self
    }

    /// Rule a full grid: horizontal lines at every `ys`, vertical at every `xs`.
    pub fn grid(mut self, xs: &[f32], ys: &[f32]) -> Self {
        let (left, right) = (xs[0], xs[xs.len() - 1]);
        let (top, bottom) = (ys[0], ys[ys.len() - 1]);
        for &y in ys {
            self = self.line(left, y, right, y);
        }
        for &x in xs {
            self = self.line(x, top, x, bottom);
        }
        self
    }

    /// A ruled 2x2 table at x 100/200/300, y 700/680/660 filled row by row.
    pub fn table_2x2(self, cells: [&str; 4]) -> Self {
        let positions = [(105.0, 686.0), (205.0, 686.0), (105.0, 666.0), (205.0, 666.0)];
        let mut page = self.grid(&[100.0, 200.0, 300.0], &[700.0, 680.0, 660.0]);
        for (text, (x, y)) in cells.into_iter().zip(positions) {
            if !text.is_empty() {
                page = page.text(text, x, y);
            }
        }
        page
    }
}

/// Assembles pages into a PDF document.
#[derive(Default)]
pub struct PdfBuilder {
    pages: Vec<PageBuilder>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: PageBuilder) -> Self {
        self.pages.push(page);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let to_unicode_id = doc.add_object(Stream::new(Dictionary::new(), TO_UNICODE.to_vec()));
        let descendant_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => "NotoSans",
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "DW" => 1000,
            "W" => vec![Object::Integer(32), Object::Integer(126), Object::Integer(500)],
        });
        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "NotoSans",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(descendant_id)],
            "ToUnicode" => to_unicode_id,
        });
        let fonts = dictionary! { "F1" => font_id, "F2" => cid_font_id };

        let mut kids: Vec<Object> = Vec::new();
        for page in &self.pages {
            let mut xobjects = Dictionary::new();
            for (i, (form, matrix)) in page.forms.iter().enumerate() {
                let form_id = doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Form",
                        "BBox" => vec![
                            Object::Integer(0),
                            Object::Integer(0),
                            Object::Integer(612),
                            Object::Integer(792),
                        ],
                        "Matrix" => matrix.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
                        "Resources" => dictionary! { "Font" => fonts.clone() },
                    },
                    form.encode(),
                ));
                xobjects.set(format!("Fm{}", i + 1), form_id);
            }

            let content_id = doc.add_object(Stream::new(Dictionary::new(), page.encode()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => fonts.clone(),
                    "XObject" => xobjects,
                },
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).expect("save pdf");
        data
    }

    pub fn save(&self, path: &Path) {
        std::fs::write(path, self.build()).expect("write pdf");
    }
}
