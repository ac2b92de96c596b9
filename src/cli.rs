//! CLI argument parsing for pdfstitch.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Merging {} inputs", cli.inputs.len());
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{ComposerOptions, EngineKind, Metadata, Orientation, PageFormat, Unit};
use crate::error::Result;

/// Merge PDF files or page ranges into a single document.
///
/// pdfstitch composes pages from multiple source PDFs into one output
/// document, with optional duplex padding, metadata, and header/footer
/// decoration.
#[derive(Parser, Debug)]
#[command(name = "pdfstitch")]
#[command(version)]
#[command(about = "Merge PDF files or page ranges into a single document", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files or glob patterns (merged in order)
    ///
    /// Specify multiple files or use glob patterns.
    /// Files are merged in the order provided.
    ///
    /// Examples:
    ///   pdfstitch file1.pdf file2.pdf -o output.pdf
    ///   pdfstitch 'chapter*.pdf' -o book.pdf
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    ///
    /// Target path in file mode; suggested filename in download mode.
    #[arg(short, long, value_name = "FILE", default_value = "newfile.pdf")]
    pub output: PathBuf,

    /// Page spec applied to each input (e.g. "1,3,6,12-16")
    ///
    /// Page numbers are 1-indexed. Single pages and hyphenated ranges
    /// may be combined with commas; "all" selects every page.
    #[arg(long, value_name = "RANGE", default_value = "all")]
    pub pages: String,

    /// Force page orientation for every page
    ///
    /// Without this flag each page keeps its natural orientation,
    /// detected from its own dimensions.
    #[arg(long, value_name = "ORIENT")]
    #[arg(value_parser = ["portrait", "landscape"])]
    pub orientation: Option<String>,

    /// Insert blank pages so each document starts on a fresh sheet side
    ///
    /// After any input that ends on an odd output page, one blank page
    /// matching the last page's size is appended. Useful when the
    /// merged result is printed double-sided.
    #[arg(short, long)]
    pub duplex: bool,

    /// Set title metadata for the output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for the output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for the output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for the output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Set creator metadata for the output PDF
    #[arg(long, value_name = "TEXT")]
    pub creator: Option<String>,

    /// Delivery mode: download, file, string, or inline
    ///
    /// "file" writes to the output path; "string" prints the raw PDF
    /// bytes to stdout; "download" and anything unrecognized stream to
    /// stdout (inline display is the permissive default).
    #[arg(long, value_name = "MODE", default_value = "file")]
    pub mode: String,

    /// Working unit for page dimensions
    #[arg(long, value_name = "UNIT", default_value = "mm")]
    #[arg(value_parser = ["pt", "mm", "cm", "in"])]
    pub unit: String,

    /// Default page format for pages created without a source template
    #[arg(long, value_name = "FORMAT", default_value = "a4")]
    #[arg(value_parser = ["a3", "a4", "a5", "letter", "legal"])]
    pub format: String,

    /// Compose engine backend
    ///
    /// "template" places each source page as an isolated Form XObject;
    /// "direct" re-emits source content streams onto the new pages.
    #[arg(long, value_name = "ENGINE", default_value = "template")]
    #[arg(value_parser = ["template", "direct"])]
    pub engine: String,

    /// Emit PDF/A-oriented output (PDF 1.4, uncompressed streams)
    #[arg(long)]
    pub pdfa: bool,

    /// Render the built-in header (document title) on every page
    #[arg(long)]
    pub default_header: bool,

    /// Render the built-in footer (page number) on every page
    #[arg(long)]
    pub default_footer: bool,

    /// Read additional entries from a JSON manifest
    ///
    /// The manifest is an array of records:
    ///   [{"path": "a.pdf", "pages": "1-5", "orientation": "landscape"}]
    /// Manifest entries are merged before the positional inputs.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Dry run - validate inputs and preview the merge without output
    ///
    /// Validates that all input files exist and are readable PDFs,
    /// then displays what the merge operation would do without
    /// actually creating the output file.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the dry-run report as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose output - show detailed information about each PDF
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the composer options selected by the flags.
    ///
    /// # Errors
    ///
    /// Returns an error if any enumerated flag value fails to parse;
    /// with the clap value lists in place this only happens when the
    /// struct is constructed by hand.
    pub fn composer_options(&self) -> Result<ComposerOptions> {
        let orientation = self
            .orientation
            .as_deref()
            .map(Orientation::from_str)
            .transpose()?;

        Ok(ComposerOptions {
            orientation,
            unit: Unit::from_str(&self.unit)?,
            format: PageFormat::from_str(&self.format)?,
            pdfa: self.pdfa,
            use_default_header: self.default_header,
            use_default_footer: self.default_footer,
            engine: EngineKind::from_str(&self.engine)?,
            ..Default::default()
        })
    }

    /// Build the output metadata from the flags.
    pub fn metadata(&self) -> Metadata {
        Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
            self.creator.clone(),
        )
    }
}
