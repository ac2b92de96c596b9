//! Output modes and delivery of the merged document.
//!
//! Four delivery mechanisms exist, selected by a mode string:
//!
//! - `"download"`: stream the bytes to a caller-provided sink as an
//!   attachment (the caller forwards disposition hints to its channel)
//! - `"file"`: write to the destination path on persistent storage
//! - `"string"`: return the raw bytes instead of writing anywhere
//! - anything else: stream to the sink for inline display
//!
//! Mode strings are matched case-insensitively, and an unrecognized
//! mode deliberately falls back to inline display rather than failing.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::io::{PdfWriter, WriteOptions};
use crate::merge::MergeResult;

/// Delivery mechanism for a composed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Deliver to the sink as an attachment.
    Download,
    /// Write to the destination path.
    File,
    /// Return the serialized bytes.
    Buffer,
    /// Deliver to the sink for inline display.
    Inline,
}

impl SaveMode {
    /// Parse a mode string.
    ///
    /// Matching is case-insensitive; anything unrecognized maps to
    /// [`SaveMode::Inline`] by design, so callers never fail on a mode
    /// typo -- they just get inline display.
    pub fn parse(mode: &str) -> Self {
        match mode.to_lowercase().as_str() {
            "download" => Self::Download,
            "file" => Self::File,
            "string" => Self::Buffer,
            _ => Self::Inline,
        }
    }
}

/// What a save operation produced.
#[derive(Debug)]
pub enum Delivery {
    /// The document was written to this path.
    Written {
        /// Path of the written file.
        path: PathBuf,
    },
    /// The serialized document, returned to the caller.
    Bytes(Vec<u8>),
    /// The document was streamed to the sink as an attachment.
    Attachment {
        /// Suggested filename for the attachment.
        filename: String,
        /// Number of bytes streamed.
        bytes_written: u64,
    },
    /// The document was streamed to the sink for inline display.
    Inline {
        /// Number of bytes streamed.
        bytes_written: u64,
    },
}

impl MergeResult {
    /// Deliver the composed document.
    ///
    /// # Arguments
    ///
    /// * `destination` - Output path (`file` mode) or suggested filename
    ///   (`download` mode)
    /// * `mode` - Mode string, resolved by [`SaveMode::parse`]
    /// * `sink` - Response channel for the streaming modes; untouched by
    ///   `file` and `string`
    ///
    /// # Errors
    ///
    /// Any underlying write or serialization failure surfaces as one of
    /// the output error kinds; no partial delivery is reported.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pdfstitch::config::{ComposerOptions, Metadata};
    /// use pdfstitch::merge::PdfMerger;
    /// use pdfstitch::output::Delivery;
    /// use std::path::Path;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut merger = PdfMerger::new(ComposerOptions::default());
    /// merger.add_pdf("a.pdf", "all", None)?;
    /// let result = merger.merge(None, &Metadata::default())?;
    ///
    /// let mut sink = Vec::new();
    /// match result.save(Path::new("merged.pdf"), "file", &mut sink)? {
    ///     Delivery::Written { path } => println!("wrote {}", path.display()),
    ///     _ => unreachable!(),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn save(
        &self,
        destination: &Path,
        mode: &str,
        sink: &mut dyn Write,
    ) -> Result<Delivery> {
        let writer = PdfWriter::with_options(WriteOptions {
            compress: self.compress,
            ..Default::default()
        });

        match SaveMode::parse(mode) {
            SaveMode::File => {
                writer.save(&self.document, destination)?;
                Ok(Delivery::Written {
                    path: destination.to_path_buf(),
                })
            }
            SaveMode::Buffer => Ok(Delivery::Bytes(writer.to_bytes(&self.document)?)),
            SaveMode::Download => {
                let bytes_written = writer.write_to(&self.document, sink)?;
                let filename = destination
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "merged.pdf".to_string());
                Ok(Delivery::Attachment {
                    filename,
                    bytes_written,
                })
            }
            SaveMode::Inline => {
                let bytes_written = writer.write_to(&self.document, sink)?;
                Ok(Delivery::Inline { bytes_written })
            }
        }
    }
}
