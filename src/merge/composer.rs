//! Core merge implementation.
//!
//! [`PdfMerger`] is the aggregate root of a merge job: an ordered list
//! of entries accumulated through `add_pdf`/`add_batch`, consumed
//! exactly once by `merge` or `duplex_merge`. Composition builds a
//! fresh in-memory document; a failure anywhere leaves no output
//! observable to the caller.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::config::{ComposerOptions, Metadata, Orientation};
use crate::error::{PdfStitchError, Result};
use crate::io::PdfReader;
use crate::merge::headers::{BuiltinDecorator, DECOR_FONT, PageContext, PageDecorator};
use crate::merge::selector::PageSpec;
use crate::merge::template::{PlacedPage, engine_for};

/// One document scheduled for merging: path, page selection and an
/// optional per-entry orientation override. Insertion order is output
/// order.
#[derive(Debug, Clone)]
struct MergeEntry {
    path: PathBuf,
    pages: PageSpec,
    orientation: Option<Orientation>,
}

/// A batch-add record, deserializable from a JSON manifest.
///
/// `pages` defaults to `"all"` when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchEntry {
    /// Path to the source PDF.
    pub path: PathBuf,
    /// Page spec string; `None` means every page.
    #[serde(default)]
    pub pages: Option<String>,
    /// Per-entry orientation override.
    #[serde(default)]
    pub orientation: Option<Orientation>,
}

/// Job lifecycle. A job accumulates entries, composes once, and must be
/// reset before it can be used again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    Accumulating,
    Composed,
}

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of source documents merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document, padding included.
    pub total_pages: usize,

    /// Number of blank pages appended for duplex parity.
    pub blank_pages_added: usize,

    /// Total time taken for the merge.
    pub merge_time: Duration,

    /// Total size of the input files.
    pub input_size: u64,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Result of a merge operation: the composed document plus statistics.
#[derive(Debug)]
pub struct MergeResult {
    /// The merged PDF document.
    pub document: Document,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,

    /// Paths of the files that were merged, in merge order.
    pub merged_files: Vec<PathBuf>,

    /// Whether delivery should compress streams (off for PDF/A output).
    pub(crate) compress: bool,
}

/// PDF merger: collects entries, then composes them into one document.
///
/// # Examples
///
/// ```no_run
/// use pdfstitch::config::{ComposerOptions, Metadata};
/// use pdfstitch::merge::PdfMerger;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut merger = PdfMerger::new(ComposerOptions::default());
/// merger.add_pdf("report.pdf", "all", None)?;
/// merger.add_pdf("appendix.pdf", "1,3,6-9", None)?;
///
/// let meta = Metadata::from_pairs([("title", "Bundle")]);
/// let result = merger.merge(None, &meta)?;
/// println!("{} pages composed", result.statistics.total_pages);
/// # Ok(())
/// # }
/// ```
pub struct PdfMerger {
    options: ComposerOptions,
    reader: PdfReader,
    decorator: Option<Box<dyn PageDecorator>>,
    entries: Vec<MergeEntry>,
    state: JobState,
}

impl std::fmt::Debug for PdfMerger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfMerger")
            .field("options", &self.options)
            .field("reader", &self.reader)
            .field("decorator", &self.decorator.as_ref().map(|_| "<decorator>"))
            .field("entries", &self.entries)
            .field("state", &self.state)
            .finish()
    }
}

impl PdfMerger {
    /// Create a merger with the given options and no entries.
    pub fn new(options: ComposerOptions) -> Self {
        Self {
            options,
            reader: PdfReader::new(),
            decorator: None,
            entries: Vec::new(),
            state: JobState::Accumulating,
        }
    }

    /// Inject a header/footer decorator, replacing the built-in one.
    pub fn with_decorator(mut self, decorator: Box<dyn PageDecorator>) -> Self {
        self.decorator = Some(decorator);
        self
    }

    /// The options this job was constructed with.
    pub fn options(&self) -> &ComposerOptions {
        &self.options
    }

    /// Number of entries added so far.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries have been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a PDF for inclusion in the merge.
    ///
    /// Only the file's existence is checked here; parsing is deferred to
    /// merge time. The page spec is parsed eagerly so malformed specs
    /// fail fast.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the source PDF
    /// * `pages` - Page spec, e.g. `"all"` or `"1,3,6,12-16"`
    /// * `orientation` - Optional per-entry orientation override
    ///
    /// # Errors
    ///
    /// - [`PdfStitchError::FileNotFound`] if the path does not exist
    /// - [`PdfStitchError::InvalidRange`] / [`PdfStitchError::InvalidPageSpec`]
    ///   for bad page specs
    /// - [`PdfStitchError::AlreadyComposed`] if the job was already merged
    pub fn add_pdf(
        &mut self,
        path: impl AsRef<Path>,
        pages: &str,
        orientation: Option<Orientation>,
    ) -> Result<&mut Self> {
        if self.state == JobState::Composed {
            return Err(PdfStitchError::AlreadyComposed);
        }

        let path = path.as_ref();
        if !path.exists() {
            return Err(PdfStitchError::file_not_found(path));
        }

        let pages = PageSpec::parse(pages)?;

        self.entries.push(MergeEntry {
            path: path.to_path_buf(),
            pages,
            orientation,
        });

        Ok(self)
    }

    /// Add a batch of entries, performing single adds in order.
    ///
    /// Fails on the first bad entry; entries before it stay recorded.
    pub fn add_batch(&mut self, batch: &[BatchEntry]) -> Result<&mut Self> {
        for entry in batch {
            self.add_pdf(
                &entry.path,
                entry.pages.as_deref().unwrap_or("all"),
                entry.orientation,
            )?;
        }
        Ok(self)
    }

    /// Add entries from a JSON manifest: an array of
    /// `{"path": ..., "pages": ..., "orientation": ...}` records.
    pub fn add_batch_json(&mut self, json: &str) -> Result<&mut Self> {
        let batch: Vec<BatchEntry> = serde_json::from_str(json)
            .map_err(|e| PdfStitchError::invalid_config(format!("Invalid batch manifest: {e}")))?;
        self.add_batch(&batch)
    }

    /// Merge the added PDFs into one document.
    ///
    /// # Arguments
    ///
    /// * `orientation` - Merge-level orientation; entries without their
    ///   own override use it. `None` means detect per page.
    /// * `meta` - Metadata applied once, before any pages are composed.
    ///
    /// # Errors
    ///
    /// [`PdfStitchError::EmptyJob`] when no entries were added, and any
    /// error from opening, templating or composing the sources.
    pub fn merge(&mut self, orientation: Option<Orientation>, meta: &Metadata) -> Result<MergeResult> {
        self.do_merge(orientation, meta, false)
    }

    /// Merge like [`merge`](Self::merge), appending a blank page after
    /// any document that ends on an odd output page, so each document
    /// starts on a fresh sheet side when the result is printed duplex.
    pub fn duplex_merge(
        &mut self,
        orientation: Option<Orientation>,
        meta: &Metadata,
    ) -> Result<MergeResult> {
        self.do_merge(orientation, meta, true)
    }

    /// Re-initialize the job so it can be used again after composing.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.state = JobState::Accumulating;
    }

    fn do_merge(
        &mut self,
        orientation: Option<Orientation>,
        meta: &Metadata,
        duplex: bool,
    ) -> Result<MergeResult> {
        if self.state == JobState::Composed {
            return Err(PdfStitchError::AlreadyComposed);
        }

        if self.entries.is_empty() {
            return Err(PdfStitchError::EmptyJob);
        }

        let merge_start = Instant::now();

        let mut builder = OutputBuilder::new(&self.options);
        builder.apply_metadata(meta, &self.options);

        let builtin = BuiltinDecorator::from_options(&self.options);
        let decorator: &dyn PageDecorator = match &self.decorator {
            Some(custom) => custom.as_ref(),
            None => &builtin,
        };

        let job_orientation = orientation.or(self.options.orientation);

        let mut input_size = 0;
        let mut blank_pages_added = 0;

        for entry in &self.entries {
            // One session per entry; the handle is released as soon as
            // all of the entry's pages have been templated.
            let source = self.reader.open(&entry.path)?;
            input_size += source.file_size();

            let mut engine = engine_for(self.options.engine);
            let numbers = entry.pages.resolve(source.page_count());
            let mut last_page: Option<(f64, f64, Orientation)> = None;

            for number in numbers {
                let template =
                    engine.import_page(builder.document_mut(), &source, number, self.options.unit)?;

                let effective = entry
                    .orientation
                    .or(job_orientation)
                    .unwrap_or_else(|| Orientation::detect(template.width, template.height));

                let (width_u, height_u) = effective.arrange(template.width, template.height);
                let width_pt = self.options.unit.to_points(width_u);
                let height_pt = self.options.unit.to_points(height_u);

                let placed = engine.place(builder.document_mut(), template)?;
                builder.push_page(width_pt, height_pt, effective, placed, decorator, meta)?;

                last_page = Some((width_pt, height_pt, effective));
            }

            if duplex && builder.page_count() % 2 == 1 {
                let (width_pt, height_pt, effective) = last_page.unwrap_or_else(|| {
                    let (w, h) = self.options.format.size_points();
                    (w, h, Orientation::Portrait)
                });

                builder.push_page(
                    width_pt,
                    height_pt,
                    effective,
                    PlacedPage {
                        content_ids: Vec::new(),
                        resources: Dictionary::new(),
                    },
                    decorator,
                    meta,
                )?;
                blank_pages_added += 1;
            }
        }

        let total_pages = builder.page_count();
        let document = builder.finish(&self.options)?;

        self.state = JobState::Composed;

        Ok(MergeResult {
            document,
            statistics: MergeStatistics {
                files_merged: self.entries.len(),
                total_pages,
                blank_pages_added,
                merge_time: merge_start.elapsed(),
                input_size,
            },
            merged_files: self.entries.iter().map(|e| e.path.clone()).collect(),
            compress: !self.options.pdfa,
        })
    }
}

/// Incremental builder for the output document's page tree.
struct OutputBuilder {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    decor_font: Option<ObjectId>,
}

impl OutputBuilder {
    fn new(options: &ComposerOptions) -> Self {
        let mut document = Document::with_version(options.pdf_version());
        let pages_id = document.new_object_id();

        Self {
            document,
            pages_id,
            kids: Vec::new(),
            decor_font: None,
        }
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Set the Info dictionary. Runs once, before any pages exist.
    fn apply_metadata(&mut self, meta: &Metadata, options: &ComposerOptions) {
        if meta.is_empty() {
            return;
        }

        let mut info = Dictionary::new();
        let mut set = |key: &str, value: &Option<String>| {
            if let Some(text) = value {
                info.set(
                    key,
                    Object::String(options.encode_text(text), StringFormat::Literal),
                );
            }
        };

        set("Title", &meta.title);
        set("Author", &meta.author);
        set("Subject", &meta.subject);
        set("Keywords", &meta.keywords);
        set("Creator", &meta.creator);

        info.set(
            "Producer",
            Object::String(
                concat!("pdfstitch ", env!("CARGO_PKG_VERSION"))
                    .as_bytes()
                    .to_vec(),
                StringFormat::Literal,
            ),
        );

        let info_id = self.document.add_object(Object::Dictionary(info));
        self.document.trailer.set("Info", Object::Reference(info_id));
    }

    /// Append one page of the given size, attach the placed content and
    /// run the decorator.
    fn push_page(
        &mut self,
        width_pt: f64,
        height_pt: f64,
        orientation: Orientation,
        placed: PlacedPage,
        decorator: &dyn PageDecorator,
        meta: &Metadata,
    ) -> Result<ObjectId> {
        let PlacedPage {
            mut content_ids,
            mut resources,
        } = placed;

        let context = PageContext {
            number: self.page_count() + 1,
            width_pt,
            height_pt,
            orientation,
            title: meta.title.clone(),
        };

        let mut decoration = String::new();
        if let Some(ops) = decorator.header(&context) {
            decoration.push_str(&ops);
        }
        if let Some(ops) = decorator.footer(&context) {
            decoration.push_str(&ops);
        }

        if !decoration.is_empty() {
            let stream = Stream::new(Dictionary::new(), decoration.into_bytes());
            content_ids.push(self.document.add_object(stream));
            self.attach_decor_font(&mut resources)?;
        }

        if content_ids.is_empty() {
            // A page must carry a content stream even when blank.
            let empty = Stream::new(Dictionary::new(), Vec::new());
            content_ids.push(self.document.add_object(empty));
        }

        let contents = if content_ids.len() == 1 {
            Object::Reference(content_ids[0])
        } else {
            Object::Array(content_ids.into_iter().map(Object::Reference).collect())
        };

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(self.pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width_pt as f32),
                Object::Real(height_pt as f32),
            ]),
        );
        page.set("Contents", contents);
        page.set("Resources", Object::Dictionary(resources));

        let page_id = self.document.add_object(page);
        self.kids.push(page_id);
        Ok(page_id)
    }

    /// Register the decoration font in a page's resource dictionary.
    fn attach_decor_font(&mut self, resources: &mut Dictionary) -> Result<()> {
        let font_id = *self.decor_font.get_or_insert_with(|| {
            let mut font = Dictionary::new();
            font.set("Type", Object::Name(b"Font".to_vec()));
            font.set("Subtype", Object::Name(b"Type1".to_vec()));
            font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
            font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            self.document.add_object(font)
        });

        // Imported resources may already carry a Font entry, possibly as
        // a reference to a shared dict; extend a private copy of it.
        let mut fonts = match resources.get(b"Font") {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(Object::Reference(id)) => match self.document.get_object(*id) {
                Ok(Object::Dictionary(dict)) => dict.clone(),
                _ => Dictionary::new(),
            },
            _ => Dictionary::new(),
        };
        fonts.set(DECOR_FONT, Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));

        Ok(())
    }

    /// Close the page tree and produce the finished document.
    fn finish(mut self, _options: &ComposerOptions) -> Result<Document> {
        let count = self.kids.len() as i64;
        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set(
            "Kids",
            Object::Array(self.kids.iter().map(|id| Object::Reference(*id)).collect()),
        );
        pages.set("Count", Object::Integer(count));

        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.document.add_object(catalog);

        self.document.trailer.set("Root", Object::Reference(catalog_id));

        Ok(self.document)
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
