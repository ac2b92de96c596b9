//! End-to-end merge flows against real files on disk.

use pdfstitch::config::{ComposerOptions, Metadata, Orientation};
use pdfstitch::error::PdfStitchError;
use pdfstitch::io::PdfReader;
use pdfstitch::merge::PdfMerger;
use tempfile::TempDir;

use crate::common::{
    A4_LANDSCAPE_PT, A4_PORTRAIT_PT, LETTER_PT, assert_dims_eq, page_dims, write_fixture,
};

#[test]
fn test_merge_all_round_trips_page_geometry() {
    let dir = TempDir::new().unwrap();
    let sizes = [A4_PORTRAIT_PT, A4_LANDSCAPE_PT, LETTER_PT];
    let input = write_fixture(&dir, "mixed.pdf", &sizes);

    let mut merger = PdfMerger::new(ComposerOptions::default());
    merger.add_pdf(&input, "all", None).unwrap();

    let result = merger.merge(None, &Metadata::default()).unwrap();

    // Same page count, and every output page keeps its source bounding
    // box under default (auto-detected) orientation.
    assert_eq!(result.statistics.total_pages, sizes.len());
    for (index, expected) in sizes.iter().enumerate() {
        assert_dims_eq(page_dims(&result.document, index as u32 + 1), *expected);
    }
}

#[test]
fn test_duplex_merge_yields_padded_sequence() {
    let dir = TempDir::new().unwrap();

    // Document A: two portrait pages. Document B: one landscape page.
    let a = write_fixture(&dir, "a.pdf", &[A4_PORTRAIT_PT, A4_PORTRAIT_PT]);
    let b = write_fixture(&dir, "b.pdf", &[A4_LANDSCAPE_PT]);

    let mut merger = PdfMerger::new(ComposerOptions::default());
    merger.add_pdf(&a, "all", None).unwrap();
    merger.add_pdf(&b, "all", None).unwrap();

    let result = merger.duplex_merge(None, &Metadata::default()).unwrap();

    // A-p1, A-p2, B-p1, plus one blank landscape page: 3 is odd, so the
    // padding page closes document B's sheet.
    assert_eq!(result.statistics.total_pages, 4);
    assert_eq!(result.statistics.blank_pages_added, 1);

    assert_dims_eq(page_dims(&result.document, 1), A4_PORTRAIT_PT);
    assert_dims_eq(page_dims(&result.document, 2), A4_PORTRAIT_PT);
    assert_dims_eq(page_dims(&result.document, 3), A4_LANDSCAPE_PT);
    assert_dims_eq(page_dims(&result.document, 4), A4_LANDSCAPE_PT);
}

#[test]
fn test_merge_empty_job_produces_no_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("never.pdf");

    let mut merger = PdfMerger::new(ComposerOptions::default());
    let err = merger.merge(None, &Metadata::default()).unwrap_err();

    assert!(matches!(err, PdfStitchError::EmptyJob));
    assert!(!output.exists());
}

#[test]
fn test_missing_page_names_page_and_file() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "three.pdf", &[A4_PORTRAIT_PT; 3]);

    let mut merger = PdfMerger::new(ComposerOptions::default());
    merger.add_pdf(&input, "5", None).unwrap();

    let err = merger.merge(None, &Metadata::default()).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("page '5'"));
    assert!(msg.contains("three.pdf"));
}

#[test]
fn test_page_selection_concatenates_in_spec_order() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(
        &dir,
        "four.pdf",
        &[A4_PORTRAIT_PT, A4_LANDSCAPE_PT, LETTER_PT, A4_PORTRAIT_PT],
    );

    let mut merger = PdfMerger::new(ComposerOptions::default());
    merger.add_pdf(&input, "3,1-2", None).unwrap();

    let result = merger.merge(None, &Metadata::default()).unwrap();
    assert_eq!(result.statistics.total_pages, 3);

    assert_dims_eq(page_dims(&result.document, 1), LETTER_PT);
    assert_dims_eq(page_dims(&result.document, 2), A4_PORTRAIT_PT);
    assert_dims_eq(page_dims(&result.document, 3), A4_LANDSCAPE_PT);
}

#[test]
fn test_forced_orientation_applies_to_every_page() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "mixed.pdf", &[A4_PORTRAIT_PT, A4_LANDSCAPE_PT]);

    let mut merger = PdfMerger::new(ComposerOptions::default());
    merger.add_pdf(&input, "all", None).unwrap();

    let result = merger
        .merge(Some(Orientation::Landscape), &Metadata::default())
        .unwrap();

    for page in 1..=2 {
        let (w, h) = page_dims(&result.document, page);
        assert!(w > h, "page {page} should be landscape, got {w}x{h}");
    }
}

#[test]
fn test_metadata_with_unknown_key_sets_title_only() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "a.pdf", &[A4_PORTRAIT_PT]);
    let output = dir.path().join("merged.pdf");

    let mut merger = PdfMerger::new(ComposerOptions::default());
    merger.add_pdf(&input, "all", None).unwrap();

    // The unknown key is silently dropped; no error is raised.
    let meta = Metadata::from_pairs([("title", "Report"), ("bogusKey", "x")]);
    let result = merger.merge(None, &meta).unwrap();

    let mut sink = Vec::new();
    result.save(&output, "file", &mut sink).unwrap();

    // The written file parses again and carries the title.
    let reloaded = lopdf::Document::load(&output).unwrap();
    let info_id = reloaded.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = reloaded.get_dictionary(info_id).unwrap();
    let lopdf::Object::String(title, _) = info.get(b"Title").unwrap() else {
        panic!("Title is not a string");
    };
    assert_eq!(title, b"Report");
}

#[test]
fn test_merged_output_is_a_loadable_pdf() {
    let dir = TempDir::new().unwrap();
    let a = write_fixture(&dir, "a.pdf", &[A4_PORTRAIT_PT, A4_PORTRAIT_PT]);
    let b = write_fixture(&dir, "b.pdf", &[LETTER_PT]);
    let output = dir.path().join("merged.pdf");

    let mut merger = PdfMerger::new(ComposerOptions::default());
    merger.add_pdf(&a, "all", None).unwrap();
    merger.add_pdf(&b, "all", None).unwrap();

    let result = merger.merge(None, &Metadata::default()).unwrap();

    let mut sink = Vec::new();
    result.save(&output, "file", &mut sink).unwrap();

    let reloaded = PdfReader::new().open(&output).unwrap();
    assert_eq!(reloaded.page_count(), 3);
}

#[test]
fn test_job_reuse_requires_reset() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "a.pdf", &[A4_PORTRAIT_PT]);

    let mut merger = PdfMerger::new(ComposerOptions::default());
    merger.add_pdf(&input, "all", None).unwrap();
    merger.merge(None, &Metadata::default()).unwrap();

    // A composed job is terminal until re-initialized.
    assert!(matches!(
        merger.merge(None, &Metadata::default()),
        Err(PdfStitchError::AlreadyComposed)
    ));

    merger.reset();
    merger.add_pdf(&input, "1", None).unwrap();
    let result = merger.merge(None, &Metadata::default()).unwrap();
    assert_eq!(result.statistics.total_pages, 1);
}
