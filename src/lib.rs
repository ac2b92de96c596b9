//! pdfstitch - Merge PDF files or page ranges into a single document.
//!
//! This library composes pages from multiple source PDFs into one output
//! document. It supports:
//!
//! - Page-range selection per input (`"1,3,6,12-16"` or `"all"`)
//! - Duplex padding: blank pages inserted so every document starts on a
//!   fresh sheet side when printed double-sided
//! - Document metadata (title, author, subject, keywords, creator)
//! - Per-entry or per-job orientation, with per-page auto-detection
//! - Header/footer decoration hooks
//! - Four delivery modes: file, raw bytes, attachment stream, inline
//!
//! # Examples
//!
//! ## Basic merge
//!
//! ```no_run
//! use pdfstitch::config::{ComposerOptions, Metadata};
//! use pdfstitch::merge::PdfMerger;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut merger = PdfMerger::new(ComposerOptions::default());
//! merger.add_pdf("report.pdf", "all", None)?;
//! merger.add_pdf("appendix.pdf", "1,4-6", None)?;
//!
//! let meta = Metadata::from_pairs([("title", "Bundle"), ("author", "Ops")]);
//! let result = merger.duplex_merge(None, &meta)?;
//!
//! let mut sink = Vec::new();
//! result.save(Path::new("bundle.pdf"), "file", &mut sink)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using individual components
//!
//! ```no_run
//! use pdfstitch::io::PdfReader;
//! use pdfstitch::merge::PageSpec;
//! use pdfstitch::validation::Validator;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Validate input
//! let validator = Validator::new();
//! let result = validator.validate_file(Path::new("input.pdf"))?;
//! println!("PDF has {} pages", result.page_count);
//!
//! // Parse a page spec
//! let spec = PageSpec::parse("1,3,12-16")?;
//!
//! // Open a source session
//! let reader = PdfReader::new();
//! let source = reader.open(Path::new("input.pdf"))?;
//! let pages = spec.resolve(source.page_count());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use config::{ComposerOptions, Metadata, Orientation};
pub use error::{PdfStitchError, Result};
pub use merge::{MergeResult, PdfMerger};
pub use output::{Delivery, SaveMode};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
