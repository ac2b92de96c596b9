//! Input validation for pdfstitch.
//!
//! Pre-merge validation of source PDFs: existence, parseability, page
//! count and first-page dimensions. The CLI's dry-run mode is built on
//! this; merging itself revalidates lazily as pages are fetched.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::validation::Validator;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let validator = Validator::new();
//! let result = validator.validate_file(Path::new("test.pdf"))?;
//! println!("PDF has {} pages", result.page_count);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::io::PdfReader;

/// Result of validating a single PDF file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Path to the validated file.
    pub path: PathBuf,

    /// Number of pages in the PDF.
    pub page_count: usize,

    /// PDF version (major, minor).
    pub version: Option<(u8, u8)>,

    /// Size of the file in bytes.
    pub file_size: u64,

    /// First-page dimensions (width, height) in points, if available.
    pub page_dimensions: Option<(f64, f64)>,
}

/// Summary of validation results for multiple files.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Number of files that validated successfully.
    pub files_validated: usize,

    /// Number of files that failed validation.
    pub files_failed: usize,

    /// Total pages across valid files.
    pub total_pages: usize,

    /// Total size of valid files in bytes.
    pub total_size: u64,
}

/// Validator for merge inputs.
pub struct Validator {
    reader: PdfReader,
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self {
            reader: PdfReader::new(),
        }
    }

    /// Validate a single file.
    ///
    /// # Errors
    ///
    /// Returns the same errors opening the file for a merge would:
    /// missing path, unparseable PDF, empty document.
    pub fn validate_file(&self, path: &Path) -> Result<ValidationResult> {
        let source = self.reader.open(path)?;

        let version = source
            .document()
            .version
            .split_once('.')
            .map(|(major, minor)| {
                (
                    major.parse::<u8>().unwrap_or_default(),
                    minor.parse::<u8>().unwrap_or_default(),
                )
            });

        let page_dimensions = source.media_box(1).ok().map(|bbox| {
            (bbox[2] - bbox[0], bbox[3] - bbox[1])
        });

        Ok(ValidationResult {
            path: path.to_path_buf(),
            page_count: source.page_count() as usize,
            version,
            file_size: source.file_size(),
            page_dimensions,
        })
    }

    /// Validate a list of files, collecting per-file outcomes and an
    /// aggregate summary.
    pub fn validate_all(
        &self,
        paths: &[PathBuf],
    ) -> (Vec<Result<ValidationResult>>, ValidationSummary) {
        let results: Vec<Result<ValidationResult>> =
            paths.iter().map(|p| self.validate_file(p)).collect();

        let mut summary = ValidationSummary {
            files_validated: 0,
            files_failed: 0,
            total_pages: 0,
            total_size: 0,
        };

        for result in &results {
            match result {
                Ok(valid) => {
                    summary.files_validated += 1;
                    summary.total_pages += valid.page_count;
                    summary.total_size += valid.file_size;
                }
                Err(_) => summary.files_failed += 1,
            }
        }

        (results, summary)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
