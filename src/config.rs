//! Configuration module for pdfstitch.
//!
//! This module defines the configuration surface of a merge job: working
//! units, orientations, page formats, output metadata and the composer
//! options threaded through job construction. All configuration is
//! explicit per job; there is no process-wide mutable default.

use std::str::FromStr;

use serde::Deserialize;

use crate::error::{PdfStitchError, Result};

/// Points per millimeter (72 points per inch, 25.4 mm per inch).
const PT_PER_MM: f64 = 72.0 / 25.4;

/// Page orientation.
///
/// When no orientation is set on an entry or on the merge call, the
/// orientation is detected per page from the template dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Portrait: width < height.
    Portrait,
    /// Landscape: width >= height.
    Landscape,
}

impl Orientation {
    /// Detect the natural orientation of a page from its dimensions.
    ///
    /// Portrait if width < height, landscape otherwise.
    pub fn detect(width: f64, height: f64) -> Self {
        if width < height {
            Self::Portrait
        } else {
            Self::Landscape
        }
    }

    /// Arrange a (width, height) pair to match this orientation.
    ///
    /// Portrait puts the smaller dimension first, landscape the larger,
    /// so a template can be placed on a page of either orientation
    /// without rescaling.
    pub fn arrange(&self, width: f64, height: f64) -> (f64, f64) {
        let (min, max) = if width <= height {
            (width, height)
        } else {
            (height, width)
        };
        match self {
            Self::Portrait => (min, max),
            Self::Landscape => (max, min),
        }
    }
}

impl FromStr for Orientation {
    type Err = PdfStitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "p" | "portrait" => Ok(Self::Portrait),
            "l" | "landscape" => Ok(Self::Landscape),
            _ => Err(PdfStitchError::invalid_config(format!(
                "Invalid orientation: {s}. Must be one of: portrait, landscape"
            ))),
        }
    }
}

/// Working unit in which page dimensions are expressed throughout a job.
///
/// Template sizes are reported in this unit; the PDF file itself always
/// stores dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    /// PDF points (1/72 inch).
    Point,
    /// Millimeters.
    #[default]
    Millimeter,
    /// Centimeters.
    Centimeter,
    /// Inches.
    Inch,
}

impl Unit {
    /// Number of points in one of this unit.
    pub fn points_per_unit(&self) -> f64 {
        match self {
            Self::Point => 1.0,
            Self::Millimeter => PT_PER_MM,
            Self::Centimeter => PT_PER_MM * 10.0,
            Self::Inch => 72.0,
        }
    }

    /// Convert a value in this unit to points.
    pub fn to_points(&self, value: f64) -> f64 {
        value * self.points_per_unit()
    }

    /// Convert a value in points to this unit.
    pub fn from_points(&self, points: f64) -> f64 {
        points / self.points_per_unit()
    }
}

impl FromStr for Unit {
    type Err = PdfStitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pt" | "point" => Ok(Self::Point),
            "mm" | "millimeter" => Ok(Self::Millimeter),
            "cm" | "centimeter" => Ok(Self::Centimeter),
            "in" | "inch" => Ok(Self::Inch),
            _ => Err(PdfStitchError::invalid_config(format!(
                "Invalid unit: {s}. Must be one of: pt, mm, cm, in"
            ))),
        }
    }
}

/// Default page format, used when a page must be created with no template
/// to take dimensions from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFormat {
    /// ISO A3 (297 x 420 mm).
    A3,
    /// ISO A4 (210 x 297 mm).
    #[default]
    A4,
    /// ISO A5 (148 x 210 mm).
    A5,
    /// US Letter (8.5 x 11 in).
    Letter,
    /// US Legal (8.5 x 14 in).
    Legal,
}

impl PageFormat {
    /// Portrait size of this format in points.
    pub fn size_points(&self) -> (f64, f64) {
        match self {
            Self::A3 => (841.89, 1190.55),
            Self::A4 => (595.276, 841.89),
            Self::A5 => (419.528, 595.276),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
        }
    }
}

impl FromStr for PageFormat {
    type Err = PdfStitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "a3" => Ok(Self::A3),
            "a4" => Ok(Self::A4),
            "a5" => Ok(Self::A5),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            _ => Err(PdfStitchError::invalid_config(format!(
                "Invalid page format: {s}. Must be one of: a3, a4, a5, letter, legal"
            ))),
        }
    }
}

/// Compose-engine backend selection.
///
/// Both engines import pages from arbitrary conforming PDFs; they differ
/// in how the imported content is attached to the output page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    /// Wrap each source page in a Form XObject and place it with a
    /// single `Do` operator. Resources stay isolated per template.
    #[default]
    Template,
    /// Re-emit the source content streams directly onto the new page.
    Direct,
}

impl FromStr for EngineKind {
    type Err = PdfStitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "template" => Ok(Self::Template),
            "direct" => Ok(Self::Direct),
            _ => Err(PdfStitchError::invalid_config(format!(
                "Invalid engine: {s}. Must be one of: template, direct"
            ))),
        }
    }
}

/// Text encoding for metadata strings when the unicode flag is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// Pass UTF-8 bytes through unchanged.
    #[default]
    Utf8,
    /// Latin-1; characters outside the range are replaced with '?'.
    Latin1,
}

impl FromStr for TextEncoding {
    type Err = PdfStitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            _ => Err(PdfStitchError::invalid_config(format!(
                "Invalid encoding: {s}. Must be one of: utf-8, latin-1"
            ))),
        }
    }
}

/// PDF metadata to set on the output document.
///
/// The key set is fixed: title, author, subject, keywords, creator.
/// Anything else supplied through [`Metadata::from_pairs`] is silently
/// dropped, so callers can pass through richer records without errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
    /// Creating application.
    pub creator: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
            && self.creator.is_none()
    }

    /// Build metadata from key/value pairs.
    ///
    /// Keys are matched case-insensitively against the fixed key set;
    /// unrecognized keys are ignored rather than rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfstitch::config::Metadata;
    ///
    /// let meta = Metadata::from_pairs([("title", "Report"), ("bogus", "x")]);
    /// assert_eq!(meta.title.as_deref(), Some("Report"));
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut meta = Self::default();
        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref().to_lowercase().as_str() {
                "title" => meta.title = Some(value),
                "author" => meta.author = Some(value),
                "subject" => meta.subject = Some(value),
                "keywords" => meta.keywords = Some(value),
                "creator" => meta.creator = Some(value),
                _ => {}
            }
        }
        meta
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
        creator: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
            creator: to_string_opt(creator),
        }
    }
}

/// Complete configuration for a merge job.
///
/// Constructed by the caller and handed to
/// [`PdfMerger::new`](crate::merge::PdfMerger::new); there is no global
/// state and independent jobs never share configuration.
#[derive(Debug, Clone)]
pub struct ComposerOptions {
    /// Job-level default orientation. None means detect per page.
    pub orientation: Option<Orientation>,

    /// Working unit for template dimensions.
    pub unit: Unit,

    /// Default page format for pages created without a template.
    pub format: PageFormat,

    /// Encode non-ASCII metadata strings as UTF-16BE.
    pub unicode: bool,

    /// Metadata byte encoding when unicode encoding does not apply.
    pub encoding: TextEncoding,

    /// Emit PDF/A-oriented output: pins the PDF version to 1.4 and
    /// disables stream compression.
    pub pdfa: bool,

    /// Render the built-in header when no decorator is injected.
    pub use_default_header: bool,

    /// Render the built-in footer when no decorator is injected.
    pub use_default_footer: bool,

    /// Compose-engine backend.
    pub engine: EngineKind,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            orientation: None,
            unit: Unit::Millimeter,
            format: PageFormat::A4,
            unicode: true,
            encoding: TextEncoding::Utf8,
            pdfa: false,
            use_default_header: false,
            use_default_footer: false,
            engine: EngineKind::Template,
        }
    }
}

impl ComposerOptions {
    /// Encode a metadata string into PDF string bytes.
    ///
    /// Non-ASCII text is written as UTF-16BE with a byte-order mark when
    /// the unicode flag is set; everything else goes through the
    /// configured byte encoding.
    pub fn encode_text(&self, text: &str) -> Vec<u8> {
        if self.unicode && !text.is_ascii() {
            let mut bytes = vec![0xFE, 0xFF];
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_be_bytes());
            }
            return bytes;
        }

        match self.encoding {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
                .collect(),
        }
    }

    /// PDF version string for the output document.
    pub fn pdf_version(&self) -> &'static str {
        if self.pdfa { "1.4" } else { "1.7" }
    }
}
