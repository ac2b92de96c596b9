//! PDF reading and source-document sessions.
//!
//! Opening a file establishes a per-file session: one parsed object
//! graph that stays consistent across any number of page lookups, in
//! any order. The parser handles PDFs produced by arbitrary conforming
//! writers, not just this crate's own output.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::io::PdfReader;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let source = reader.open(Path::new("a.pdf"))?;
//! println!("PDF has {} pages", source.page_count());
//! # Ok(())
//! # }
//! ```

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{PdfStitchError, Result};

/// Guard against malformed page trees with circular Parent links.
const MAX_TREE_DEPTH: usize = 64;

/// An opened source document: a parsed object graph plus its page map.
///
/// Dropped as soon as all required pages have been templated, releasing
/// the object graph.
#[derive(Debug)]
pub struct SourceDocument {
    document: Document,
    path: PathBuf,
    pages: BTreeMap<u32, ObjectId>,
    file_size: u64,
}

impl SourceDocument {
    /// Path this document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Size of the backing file in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// The underlying object graph.
    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    /// Look up the object id of a 1-based page number.
    ///
    /// # Errors
    ///
    /// [`PdfStitchError::PageNotFound`] naming the page and this file if
    /// the number is out of range.
    pub fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or_else(|| PdfStitchError::page_not_found(page, &self.path))
    }

    /// Fetch the page dictionary for a 1-based page number.
    pub fn page_dict(&self, page: u32) -> Result<&Dictionary> {
        let id = self.page_id(page)?;
        self.document
            .get_dictionary(id)
            .map_err(|_| PdfStitchError::page_not_found(page, &self.path))
    }

    /// Resolve a page attribute, walking up the Parent chain.
    ///
    /// MediaBox and Resources are inheritable in the page tree; a page
    /// that omits them takes the value from the nearest ancestor.
    pub fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut current = page_id;

        for _ in 0..MAX_TREE_DEPTH {
            let dict = self.document.get_dictionary(current).ok()?;

            if let Ok(value) = dict.get(key) {
                // Inherited attributes may themselves be indirect.
                if let Object::Reference(id) = value {
                    return self.document.get_object(*id).ok().cloned();
                }
                return Some(value.clone());
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent)) => current = *parent,
                _ => return None,
            }
        }

        None
    }

    /// The page's bounding box as `[x0, y0, x1, y1]` in points.
    ///
    /// # Errors
    ///
    /// [`PdfStitchError::PageNotFound`] if the page has no resolvable
    /// MediaBox anywhere in its Parent chain, or the box is malformed.
    pub fn media_box(&self, page: u32) -> Result<[f64; 4]> {
        let id = self.page_id(page)?;

        let media_box = self
            .inherited_attribute(id, b"MediaBox")
            .ok_or_else(|| PdfStitchError::page_not_found(page, &self.path))?;

        let Object::Array(values) = media_box else {
            return Err(PdfStitchError::page_not_found(page, &self.path));
        };

        if values.len() < 4 {
            return Err(PdfStitchError::page_not_found(page, &self.path));
        }

        let mut bbox = [0.0; 4];
        for (slot, value) in bbox.iter_mut().zip(values.iter()) {
            *slot = value
                .as_float()
                .map_err(|_| PdfStitchError::page_not_found(page, &self.path))?
                as f64;
        }

        Ok(bbox)
    }

    /// The page's resource dictionary, resolved through inheritance.
    ///
    /// Pages without resources get an empty dictionary.
    pub fn resources(&self, page: u32) -> Result<Dictionary> {
        let id = self.page_id(page)?;

        match self.inherited_attribute(id, b"Resources") {
            Some(Object::Dictionary(dict)) => Ok(dict),
            Some(_) => Err(PdfStitchError::page_not_found(page, &self.path)),
            None => Ok(Dictionary::new()),
        }
    }

    /// Collect the page's content stream data, decompressed.
    ///
    /// Contents may be a single stream, a reference, or an array of
    /// references; multiple streams are concatenated with newline
    /// separators as the PDF model prescribes. A page without Contents
    /// is a legal empty page and yields an empty buffer.
    pub fn content_bytes(&self, page: u32) -> Result<Vec<u8>> {
        let dict = self.page_dict(page)?;

        let contents = match dict.get(b"Contents") {
            Ok(contents) => contents.clone(),
            Err(_) => return Ok(Vec::new()),
        };

        let mut data = Vec::new();
        self.append_content(&contents, &mut data, 0)?;
        Ok(data)
    }

    fn append_content(&self, object: &Object, data: &mut Vec<u8>, depth: usize) -> Result<()> {
        if depth > MAX_TREE_DEPTH {
            return Err(PdfStitchError::compose_failed(
                "content stream reference chain too deep",
            ));
        }

        match object {
            Object::Reference(id) => {
                let resolved = self.document.get_object(*id)?;
                self.append_content(resolved, data, depth + 1)?;
            }
            Object::Array(items) => {
                for item in items {
                    self.append_content(item, data, depth + 1)?;
                    data.push(b'\n');
                }
            }
            Object::Stream(stream) => {
                let content = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                data.extend_from_slice(&content);
            }
            _ => {}
        }

        Ok(())
    }
}

/// PDF reader with configurable loading behavior.
#[derive(Debug, Clone)]
pub struct PdfReader {
    /// Whether to verify the document has pages after loading.
    verify: bool,
}

impl PdfReader {
    /// Create a new PDF reader with default settings.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that skips verification (faster but less safe).
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Open a source document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist ([`PdfStitchError::FileNotFound`])
    /// - The file is not a parseable PDF
    ///   ([`PdfStitchError::FailedToLoadPdf`])
    /// - Verification is enabled and the document has no pages
    pub fn open(&self, path: &Path) -> Result<SourceDocument> {
        if !path.exists() {
            return Err(PdfStitchError::file_not_found(path));
        }

        let document = Document::load(path)
            .map_err(|e| PdfStitchError::failed_to_load_pdf(path, e.to_string()))?;

        let pages = document.get_pages();

        if self.verify && pages.is_empty() {
            return Err(PdfStitchError::failed_to_load_pdf(path, "PDF has no pages"));
        }

        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        Ok(SourceDocument {
            document,
            path: path.to_path_buf(),
            pages,
            file_size,
        })
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}
