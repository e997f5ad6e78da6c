//! Quotation PDF rendering.
//!
//! Produces a plain A4 document using the built-in Courier fonts, so no
//! font files are embedded and line wrapping can be done by character count.
//! Text is encoded as WinAnsi; characters outside Latin-1 render as `?`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use catalog_core::quote::{wrap_text, Quotation};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const TITLE_SIZE: i64 = 14;
const BODY_SIZE: i64 = 10;
/// Courier glyphs are 0.6 em wide: 495pt of usable width at 10pt.
const WRAP_COLUMNS: usize = 82;
const FOOTER_Y: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

struct Line {
    font: Font,
    size: i64,
    text: String,
}

impl Line {
    fn body(text: impl Into<String>) -> Self {
        Line {
            font: Font::Regular,
            size: BODY_SIZE,
            text: text.into(),
        }
    }

    fn leading(&self) -> i64 {
        self.size + self.size / 2
    }
}

fn winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 0x100 { c as u32 as u8 } else { b'?' })
        .collect()
}

fn layout(quotation: &Quotation, issued: NaiveDate) -> Vec<Line> {
    let mut lines = vec![
        Line {
            font: Font::Bold,
            size: TITLE_SIZE,
            text: quotation.title.clone(),
        },
        Line::body(format!("Date: {}", issued.format("%Y-%m-%d"))),
        Line::body(""),
    ];
    for quote_line in &quotation.lines {
        for wrapped in wrap_text(&quote_line.text, WRAP_COLUMNS) {
            lines.push(Line::body(wrapped));
        }
    }
    lines.push(Line::body(""));
    lines.push(Line {
        font: Font::Bold,
        size: BODY_SIZE,
        text: quotation.total_line(),
    });
    lines
}

fn paginate(lines: Vec<Line>) -> Vec<Vec<(i64, Line)>> {
    let mut pages = Vec::new();
    let mut page = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;
    for line in lines {
        let next_y = y - line.leading();
        if next_y < MARGIN && !page.is_empty() {
            pages.push(std::mem::take(&mut page));
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= line.leading();
        page.push((y, line));
    }
    if !page.is_empty() {
        pages.push(page);
    }
    pages
}

fn text_ops(ops: &mut Vec<Operation>, font: Font, size: i64, x: i64, y: i64, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.resource_name().as_bytes().to_vec()), Object::Integer(size)],
    ));
    ops.push(Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(winansi(text))]));
    ops.push(Operation::new("ET", vec![]));
}

fn font_object(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Render a quotation to PDF bytes.
pub fn render_quotation(quotation: &Quotation, issued: NaiveDate) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = font_object(&mut doc, "Courier");
    let bold = font_object(&mut doc, "Courier-Bold");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let pages = paginate(layout(quotation, issued));
    let page_total = pages.len();
    let mut kids = Vec::with_capacity(page_total);

    for (index, page) in pages.into_iter().enumerate() {
        let mut ops = Vec::new();
        for (y, line) in &page {
            text_ops(&mut ops, line.font, line.size, MARGIN, *y, &line.text);
        }
        text_ops(
            &mut ops,
            Font::Regular,
            8,
            PAGE_WIDTH - MARGIN - 80,
            FOOTER_Y,
            &format!("Page {} of {}", index + 1, page_total),
        );

        let encoded = Content { operations: ops }
            .encode()
            .context("Failed to encode page content")?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_total as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).context("Failed to serialize PDF")?;
    Ok(out)
}
