//! Integration tests for pdfstitch.
//!
//! Fixture PDFs are constructed programmatically with lopdf and written
//! to a scratch directory, so the tests exercise the full file-based
//! flow without binary fixtures in the repository.

use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use std::path::PathBuf;
use tempfile::TempDir;

/// A4 portrait in points.
pub const A4_PORTRAIT_PT: (f64, f64) = (595.2756, 841.8898);

/// A4 landscape in points.
pub const A4_LANDSCAPE_PT: (f64, f64) = (841.8898, 595.2756);

/// US Letter portrait in points.
pub const LETTER_PT: (f64, f64) = (612.0, 792.0);

/// Build a valid PDF with one page per entry in `page_sizes`.
pub fn pdf_with_pages(page_sizes: &[(f64, f64)]) -> Document {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for (index, (width, height)) in page_sizes.iter().enumerate() {
        let ops = format!("BT /F1 12 Tf 72 72 Td (page {}) Tj ET", index + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), ops.into_bytes()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(*width as f32),
                Object::Real(*height as f32),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = page_sizes.len() as i64;
    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }
        .into(),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Write a fixture PDF into the scratch directory and return its path.
pub fn write_fixture(dir: &TempDir, name: &str, page_sizes: &[(f64, f64)]) -> PathBuf {
    let path = dir.path().join(name);
    let mut doc = pdf_with_pages(page_sizes);
    doc.save(&path).expect("Failed to write fixture PDF");
    path
}

/// Read back a page's MediaBox dimensions (width, height) in points.
pub fn page_dims(doc: &Document, page: u32) -> (f64, f64) {
    let pages = doc.get_pages();
    let id = pages[&page];
    let dict = doc.get_dictionary(id).expect("page dictionary");
    let Object::Array(values) = dict.get(b"MediaBox").expect("MediaBox") else {
        panic!("MediaBox is not an array");
    };
    let x0 = values[0].as_float().unwrap() as f64;
    let y0 = values[1].as_float().unwrap() as f64;
    let x1 = values[2].as_float().unwrap() as f64;
    let y1 = values[3].as_float().unwrap() as f64;
    (x1 - x0, y1 - y0)
}

/// Assert two dimensions match within a small tolerance.
pub fn assert_dims_eq(actual: (f64, f64), expected: (f64, f64)) {
    assert!(
        (actual.0 - expected.0).abs() < 0.01 && (actual.1 - expected.1).abs() < 0.01,
        "dimensions {actual:?} do not match expected {expected:?}"
    );
}
