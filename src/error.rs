//! Error types for pdfstitch.
//!
//! This module defines all error types that can occur during merge
//! operations. Errors are raised synchronously at the point of detection
//! and propagate to the caller unchanged: the library never retries,
//! never reports partial success and never logs on its own.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pdfstitch operations.
pub type Result<T> = std::result::Result<T, PdfStitchError>;

/// Main error type for pdfstitch operations.
#[derive(Debug, Error)]
pub enum PdfStitchError {
    /// An input file was not found when it was added to the job.
    #[error("Could not locate PDF at {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// An input file exists but could not be parsed as a PDF.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A page-range token has a start page greater than its end page.
    #[error("Starting page '{start}' is greater than ending page '{end}'")]
    InvalidRange {
        /// First page of the offending range.
        start: u32,
        /// Last page of the offending range.
        end: u32,
    },

    /// A page-spec token could not be parsed at all.
    #[error("Invalid page spec token '{token}'. Expected a page number or a range like '12-16'")]
    InvalidPageSpec {
        /// The token that failed to parse.
        token: String,
    },

    /// A requested page does not exist in its document, or the page
    /// object is malformed.
    #[error("Could not load page '{page}' in PDF '{}'. Check that the page exists", path.display())]
    PageNotFound {
        /// The 1-based page number that was requested.
        page: u32,
        /// Path to the source document.
        path: PathBuf,
    },

    /// Merge was invoked on a job with no entries.
    #[error("No PDFs to merge")]
    EmptyJob,

    /// Merge was invoked on a job that has already been composed.
    #[error("Merge job already composed; call reset() to start a new job")]
    AlreadyComposed,

    /// Composition of the output document failed.
    #[error("Merge operation failed: {reason}")]
    ComposeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Failed to create the output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to the output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Serialization or sink delivery of the output failed.
    #[error("Error outputting PDF: {reason}")]
    OutputFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl From<io::Error> for PdfStitchError {
    fn from(err: io::Error) -> Self {
        Self::Io { source: err }
    }
}

impl From<lopdf::Error> for PdfStitchError {
    fn from(err: lopdf::Error) -> Self {
        Self::compose_failed(err.to_string())
    }
}

impl PdfStitchError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a PageNotFound error.
    pub fn page_not_found(page: u32, path: impl Into<PathBuf>) -> Self {
        Self::PageNotFound {
            page,
            path: path.into(),
        }
    }

    /// Create a ComposeFailed error.
    pub fn compose_failed(reason: impl Into<String>) -> Self {
        Self::ComposeFailed {
            reason: reason.into(),
        }
    }

    /// Create an OutputFailed error.
    pub fn output_failed(reason: impl Into<String>) -> Self {
        Self::OutputFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Get the process exit code for this error.
    ///
    /// Used by the CLI to translate library failures into exit codes.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::InvalidRange { .. } => 1,
            Self::InvalidPageSpec { .. } => 1,
            Self::PageNotFound { .. } => 3,
            Self::EmptyJob => 1,
            Self::AlreadyComposed => 1,
            Self::ComposeFailed { .. } => 6,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::OutputFailed { .. } => 5,
            Self::InvalidConfig { .. } => 1,
            Self::Io { .. } => 5,
        }
    }
}
