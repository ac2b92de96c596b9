//! PDF writing and saving operations.
//!
//! This module provides safe PDF writing with:
//! - Atomic writes (write to temp file, then rename)
//! - Byte-buffer serialization for in-memory delivery
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::io::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(&doc, Path::new("output.pdf"))?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{PdfStitchError, Result};

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Compress streams before writing.
    pub compress: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compress: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Whether compression was applied.
    pub compressed: bool,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self {
            options: WriteOptions::default(),
        }
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer without atomic writes (faster but less safe).
    pub fn non_atomic() -> Self {
        Self {
            options: WriteOptions {
                atomic: false,
                ..Default::default()
            },
        }
    }

    /// Create a writer without compression (faster but larger files).
    pub fn without_compression() -> Self {
        Self {
            options: WriteOptions {
                compress: false,
                ..Default::default()
            },
        }
    }

    /// Save a PDF document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output directory doesn't exist
    /// - Insufficient permissions
    /// - Disk full
    /// - Write operation fails
    pub fn save(&self, doc: &Document, path: &Path) -> Result<()> {
        let _stats = self.save_with_stats(doc, path)?;
        Ok(())
    }

    /// Save a PDF and return statistics about the operation.
    pub fn save_with_stats(&self, doc: &Document, path: &Path) -> Result<WriteStatistics> {
        // lopdf serialization mutates offsets, so work on a clone and
        // leave the composed document untouched.
        let mut doc = doc.clone();

        if self.options.compress {
            doc.compress();
        }

        let write_path = if self.options.atomic {
            path.with_extension("tmp")
        } else {
            path.to_path_buf()
        };

        let file = std::fs::File::create(&write_path).map_err(|e| {
            PdfStitchError::FailedToCreateOutput {
                path: write_path.clone(),
                source: e,
            }
        })?;

        let mut writer = std::io::BufWriter::with_capacity(self.options.buffer_size, file);

        doc.save_to(&mut writer)
            .map_err(|e| PdfStitchError::FailedToWrite {
                path: write_path.clone(),
                source: std::io::Error::other(e),
            })?;

        writer.flush().map_err(|e| PdfStitchError::FailedToWrite {
            path: write_path.clone(),
            source: e,
        })?;

        if self.options.atomic {
            std::fs::rename(&write_path, path).map_err(|e| PdfStitchError::FailedToWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        Ok(WriteStatistics {
            file_size,
            output_path: path.to_path_buf(),
            compressed: self.options.compress,
        })
    }

    /// Serialize a PDF document to an in-memory byte buffer.
    ///
    /// # Errors
    ///
    /// [`PdfStitchError::OutputFailed`] if serialization fails.
    pub fn to_bytes(&self, doc: &Document) -> Result<Vec<u8>> {
        let mut doc = doc.clone();

        if self.options.compress {
            doc.compress();
        }

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PdfStitchError::output_failed(e.to_string()))?;

        Ok(buffer)
    }

    /// Serialize a PDF document and stream the bytes into a sink.
    ///
    /// Returns the number of bytes written.
    pub fn write_to(&self, doc: &Document, sink: &mut dyn Write) -> Result<u64> {
        let bytes = self.to_bytes(doc)?;
        sink.write_all(&bytes)
            .map_err(|e| PdfStitchError::output_failed(e.to_string()))?;
        Ok(bytes.len() as u64)
    }

    /// Check if a file can be written to the given path.
    ///
    /// Performs pre-flight checks without actually writing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory doesn't exist
    /// - Parent directory is not writable
    pub fn can_write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            if !parent.exists() {
                return Err(PdfStitchError::invalid_config(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                )));
            }

            let metadata = std::fs::metadata(parent)?;
            if metadata.permissions().readonly() {
                return Err(PdfStitchError::invalid_config(format!(
                    "Output directory is not writable: {}",
                    parent.display()
                )));
            }
        }

        Ok(())
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format file size as human-readable string.
fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
