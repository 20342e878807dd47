//! Helpers for building small PDFs with known fonts.

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, StringFormat, Stream};

/// Font resource key for Helvetica.
pub const REGULAR: &str = "F1";
/// Font resource key for Helvetica-Bold.
pub const BOLD: &str = "F2";

/// One line of text: font resource key, size, text.
pub type Line<'a> = (&'a str, i64, &'a str);

fn name(n: &str) -> Object {
    Object::Name(n.as_bytes().to_vec())
}

fn font(base_font: &str) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", name("Font")),
        ("Subtype", name("Type1")),
        ("BaseFont", name(base_font)),
        ("Encoding", name("WinAnsiEncoding")),
    ])
}

fn show(font_key: &str, size: i64, text: &str) -> [Operation; 2] {
    [
        Operation::new("Tf", vec![name(font_key), Object::Integer(size)]),
        Operation::new(
            "Tj",
            vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
        ),
    ]
}

fn move_to(x: i64, y: i64) -> Operation {
    Operation::new("Tm", ints([1, 0, 0, 1, x, y]))
}

fn ints(values: [i64; 6]) -> Vec<Object> {
    values.iter().map(|v| Object::Integer(*v)).collect()
}

/// One text object placing each line 30pt below the previous one.
pub fn lines(lines: &[Line<'_>]) -> Vec<Operation> {
    let mut operations = vec![Operation::new("BT", vec![])];
    for (i, (font_key, size, text)) in lines.iter().enumerate() {
        operations.push(move_to(72, 740 - 30 * i as i64));
        operations.extend(show(font_key, *size, text));
    }
    operations.push(Operation::new("ET", vec![]));
    operations
}

/// One visual line at height `y` drawn with a separate show per part.
pub fn split_line(y: i64, parts: &[Line<'_>]) -> Vec<Operation> {
    let mut operations = vec![Operation::new("BT", vec![]), move_to(72, y)];
    for (font_key, size, text) in parts {
        operations.extend(show(font_key, *size, text));
    }
    operations.push(Operation::new("ET", vec![]));
    operations
}

/// Wrap operations in `q scale 0 0 scale 0 0 cm ... Q`.
pub fn scaled(scale: i64, operations: Vec<Operation>) -> Vec<Operation> {
    let mut wrapped = vec![
        Operation::new("q", vec![]),
        Operation::new("cm", ints([scale, 0, 0, scale, 0, 0])),
    ];
    wrapped.extend(operations);
    wrapped.push(Operation::new("Q", vec![]));
    wrapped
}

/// Build a PDF where each inner slice is one page of lines.
pub fn build_pdf(pages: &[&[Line<'_>]]) -> Vec<u8> {
    let pages: Vec<Vec<Operation>> = pages.iter().map(|page| lines(page)).collect();
    build_pdf_from_operations(&pages)
}

/// Build a PDF where each entry is the full content stream of one page.
pub fn build_pdf_from_operations(pages: &[Vec<Operation>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let fonts = Dictionary::from_iter(vec![
        (REGULAR, Object::Reference(regular_id)),
        (BOLD, Object::Reference(bold_id)),
    ]);
    let resources = Dictionary::from_iter(vec![("Font", Object::Dictionary(fonts))]);

    let mut page_ids = Vec::new();
    for operations in pages {
        let content = Content {
            operations: operations.clone(),
        };
        let content_id =
            doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let page = Dictionary::from_iter(vec![
            ("Type", name("Page")),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources.clone())),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", name("Pages")),
        ("Count", Object::Integer(page_ids.len() as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog = Dictionary::from_iter(vec![
        ("Type", name("Catalog")),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Build a PDF and write it to `path`.
pub fn write_pdf(path: &Path, pages: &[&[Line<'_>]]) {
    std::fs::write(path, build_pdf(pages)).unwrap();
}
