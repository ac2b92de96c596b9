//! Save-mode delivery behavior.

use pdfstitch::config::{ComposerOptions, Metadata};
use pdfstitch::merge::{MergeResult, PdfMerger};
use pdfstitch::output::Delivery;
use tempfile::TempDir;

use crate::common::{A4_PORTRAIT_PT, write_fixture};

fn compose_single_page(dir: &TempDir) -> MergeResult {
    let input = write_fixture(dir, "single.pdf", &[A4_PORTRAIT_PT]);
    let mut merger = PdfMerger::new(ComposerOptions::default());
    merger.add_pdf(&input, "all", None).unwrap();
    merger.merge(None, &Metadata::default()).unwrap()
}

#[test]
fn test_string_mode_returns_bytes_without_writing() {
    let dir = TempDir::new().unwrap();
    let result = compose_single_page(&dir);
    let destination = dir.path().join("untouched.pdf");

    let mut sink = Vec::new();
    let delivery = result.save(&destination, "string", &mut sink).unwrap();

    let Delivery::Bytes(bytes) = delivery else {
        panic!("string mode should return bytes");
    };
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(!destination.exists(), "string mode must not touch the path");
    assert!(sink.is_empty(), "string mode must not touch the sink");
}

#[test]
fn test_file_mode_writes_destination() {
    let dir = TempDir::new().unwrap();
    let result = compose_single_page(&dir);
    let destination = dir.path().join("merged.pdf");

    let mut sink = Vec::new();
    let delivery = result.save(&destination, "file", &mut sink).unwrap();

    let Delivery::Written { path } = delivery else {
        panic!("file mode should report the written path");
    };
    assert_eq!(path, destination);
    assert!(destination.exists());
    assert!(sink.is_empty());
}

#[test]
fn test_download_mode_streams_attachment() {
    let dir = TempDir::new().unwrap();
    let result = compose_single_page(&dir);
    let destination = dir.path().join("bundle.pdf");

    let mut sink = Vec::new();
    let delivery = result.save(&destination, "Download", &mut sink).unwrap();

    let Delivery::Attachment {
        filename,
        bytes_written,
    } = delivery
    else {
        panic!("download mode should stream an attachment");
    };
    assert_eq!(filename, "bundle.pdf");
    assert_eq!(bytes_written as usize, sink.len());
    assert!(sink.starts_with(b"%PDF-"));
    assert!(!destination.exists(), "download mode must not write files");
}

#[test]
fn test_unrecognized_mode_falls_back_to_inline() {
    let dir = TempDir::new().unwrap();
    let result = compose_single_page(&dir);
    let destination = dir.path().join("nope.pdf");

    // The permissive default: a mode typo displays inline instead of
    // failing the request.
    let mut sink = Vec::new();
    let delivery = result.save(&destination, "attachment?", &mut sink).unwrap();

    let Delivery::Inline { bytes_written } = delivery else {
        panic!("unknown modes should fall back to inline display");
    };
    assert_eq!(bytes_written as usize, sink.len());
    assert!(sink.starts_with(b"%PDF-"));
    assert!(!destination.exists());
}

#[test]
fn test_inline_bytes_match_string_bytes() {
    let dir = TempDir::new().unwrap();
    let result = compose_single_page(&dir);
    let destination = dir.path().join("x.pdf");

    let mut sink = Vec::new();
    result.save(&destination, "inline", &mut sink).unwrap();

    let Delivery::Bytes(bytes) = result.save(&destination, "string", &mut Vec::new()).unwrap()
    else {
        panic!("string mode should return bytes");
    };
    assert_eq!(sink, bytes);
}
