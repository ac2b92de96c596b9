//! Page template extraction and compose-engine backends.
//!
//! A template is the extracted, placeable form of one source page: its
//! drawable content, its resources and its bounding box. Templates are
//! imported into the output document and placed on exactly one output
//! page, anchored at the page origin and never rescaled.
//!
//! Two backends implement the import/place interface:
//!
//! - [`TemplateEngine`] wraps the source page in a Form XObject and
//!   places it with a single `Do` operator. Resources stay isolated
//!   inside the XObject, so templates never collide with each other or
//!   with page decorations.
//! - [`DirectEngine`] re-emits the source content streams onto the new
//!   page inside a `q`/`Q` pair, attaching the copied resources to the
//!   page itself.
//!
//! Callers select a backend through
//! [`EngineKind`](crate::config::EngineKind) and depend only on the
//! [`ComposeEngine`] trait.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

use crate::config::{EngineKind, Unit};
use crate::error::{PdfStitchError, Result};
use crate::io::SourceDocument;

/// An extracted source page, ready to be placed on one output page.
///
/// Width and height are expressed in the job's working unit; the
/// bounding box stays in points for placement math.
#[derive(Debug)]
pub struct PageTemplate {
    /// Template width in working units.
    pub width: f64,
    /// Template height in working units.
    pub height: f64,
    bbox: [f64; 4],
    body: TemplateBody,
}

#[derive(Debug)]
enum TemplateBody {
    Form { xobject: ObjectId, name: String },
    Direct { content: Vec<u8>, resources: Dictionary },
}

/// Content and resources produced by placing a template, ready to be
/// attached to a new output page.
#[derive(Debug)]
pub struct PlacedPage {
    /// Content stream objects, in paint order.
    pub content_ids: Vec<ObjectId>,
    /// Resource dictionary for the page.
    pub resources: Dictionary,
}

/// The enumerated interface every compose backend implements.
///
/// One engine instance serves one source-document session; deep-copied
/// objects are cached per instance so resources shared between pages of
/// the same document are imported once.
pub trait ComposeEngine {
    /// Import a source page into the output document as a template.
    ///
    /// # Errors
    ///
    /// [`PdfStitchError::PageNotFound`] if the page number is out of
    /// range or the page object is malformed.
    fn import_page(
        &mut self,
        output: &mut Document,
        source: &SourceDocument,
        page: u32,
        unit: Unit,
    ) -> Result<PageTemplate>;

    /// Place a template at the origin of a new output page.
    ///
    /// Consumes the template; a template is placed exactly once.
    fn place(&mut self, output: &mut Document, template: PageTemplate) -> Result<PlacedPage>;
}

/// Instantiate the backend selected by configuration.
pub fn engine_for(kind: EngineKind) -> Box<dyn ComposeEngine> {
    match kind {
        EngineKind::Template => Box::new(TemplateEngine::new()),
        EngineKind::Direct => Box::new(DirectEngine::new()),
    }
}

/// Form-XObject backend.
pub struct TemplateEngine {
    cache: HashMap<ObjectId, ObjectId>,
    counter: usize,
}

impl TemplateEngine {
    /// Create an engine for one source-document session.
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            counter: 0,
        }
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposeEngine for TemplateEngine {
    fn import_page(
        &mut self,
        output: &mut Document,
        source: &SourceDocument,
        page: u32,
        unit: Unit,
    ) -> Result<PageTemplate> {
        let (bbox, width, height) = template_geometry(source, page, unit)?;
        let content = source.content_bytes(page)?;
        let resources = copy_resources(output, source, page, &mut self.cache)?;

        let mut xobject_dict = Dictionary::new();
        xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
        xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
        xobject_dict.set("FormType", Object::Integer(1));
        xobject_dict.set(
            "BBox",
            Object::Array(bbox.iter().map(|v| Object::Real(*v as f32)).collect()),
        );
        xobject_dict.set("Resources", Object::Dictionary(resources));

        let xobject = output.add_object(Stream::new(xobject_dict, content));

        let name = format!("TPL{}", self.counter);
        self.counter += 1;

        Ok(PageTemplate {
            width,
            height,
            bbox,
            body: TemplateBody::Form { xobject, name },
        })
    }

    fn place(&mut self, output: &mut Document, template: PageTemplate) -> Result<PlacedPage> {
        let TemplateBody::Form { xobject, name } = template.body else {
            return Err(PdfStitchError::compose_failed(
                "template was imported by a different engine",
            ));
        };

        let [x0, y0, _, _] = template.bbox;
        let ops = format!(
            "q 1 0 0 1 {} {} cm /{} Do Q",
            fmt_coord(-x0),
            fmt_coord(-y0),
            name
        );
        let content_id = output.add_object(Stream::new(Dictionary::new(), ops.into_bytes()));

        let mut xobjects = Dictionary::new();
        xobjects.set(name.into_bytes(), Object::Reference(xobject));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        Ok(PlacedPage {
            content_ids: vec![content_id],
            resources,
        })
    }
}

/// Content-stream re-emission backend.
pub struct DirectEngine {
    cache: HashMap<ObjectId, ObjectId>,
}

impl DirectEngine {
    /// Create an engine for one source-document session.
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }
}

impl Default for DirectEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposeEngine for DirectEngine {
    fn import_page(
        &mut self,
        output: &mut Document,
        source: &SourceDocument,
        page: u32,
        unit: Unit,
    ) -> Result<PageTemplate> {
        let (bbox, width, height) = template_geometry(source, page, unit)?;
        let content = source.content_bytes(page)?;
        let resources = copy_resources(output, source, page, &mut self.cache)?;

        Ok(PageTemplate {
            width,
            height,
            bbox,
            body: TemplateBody::Direct { content, resources },
        })
    }

    fn place(&mut self, output: &mut Document, template: PageTemplate) -> Result<PlacedPage> {
        let TemplateBody::Direct { content, resources } = template.body else {
            return Err(PdfStitchError::compose_failed(
                "template was imported by a different engine",
            ));
        };

        let [x0, y0, _, _] = template.bbox;

        // The source operators are bracketed in q/Q so a truncated
        // graphics state cannot leak into page decorations.
        let prefix = format!("q\n1 0 0 1 {} {} cm\n", fmt_coord(-x0), fmt_coord(-y0));
        let prefix_id = output.add_object(Stream::new(Dictionary::new(), prefix.into_bytes()));
        let content_id = output.add_object(Stream::new(Dictionary::new(), content));
        let suffix_id = output.add_object(Stream::new(Dictionary::new(), b"\nQ".to_vec()));

        Ok(PlacedPage {
            content_ids: vec![prefix_id, content_id, suffix_id],
            resources,
        })
    }
}

/// Resolve a page's bounding box and its size in working units.
fn template_geometry(
    source: &SourceDocument,
    page: u32,
    unit: Unit,
) -> Result<([f64; 4], f64, f64)> {
    let bbox = source.media_box(page)?;
    let width_pt = bbox[2] - bbox[0];
    let height_pt = bbox[3] - bbox[1];

    if width_pt <= 0.0 || height_pt <= 0.0 {
        return Err(PdfStitchError::page_not_found(page, source.path()));
    }

    Ok((bbox, unit.from_points(width_pt), unit.from_points(height_pt)))
}

/// Deep-copy a page's resource dictionary into the output document.
fn copy_resources(
    output: &mut Document,
    source: &SourceDocument,
    page: u32,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let resources = source.resources(page)?;

    let mut copied = Dictionary::new();
    for (key, value) in resources.iter() {
        copied.set(
            key.clone(),
            copy_object_deep(output, source.document(), value, cache)?,
        );
    }

    Ok(copied)
}

/// Deep-copy an object from a source document, following references.
///
/// Referenced objects are inserted into the output document and the
/// id mapping is cached so shared objects are copied once per session.
fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    object: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match object {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let referenced = source.get_object(*id)?.clone();

            // Reserve the target id before recursing so reference cycles
            // (e.g. annotation Parent links) terminate.
            let new_id = output.add_object(Object::Null);
            cache.insert(*id, new_id);

            let copied = copy_object_deep(output, source, &referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(items) => {
            let mut new_items = Vec::with_capacity(items.len());
            for item in items {
                new_items.push(copy_object_deep(output, source, item, cache)?);
            }
            Ok(Object::Array(new_items))
        }
        Object::Stream(stream) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            let mut copied = Stream::new(new_dict, stream.content.clone());
            copied.allows_compression = stream.allows_compression;
            Ok(Object::Stream(copied))
        }
        _ => Ok(object.clone()),
    }
}

/// Format a coordinate for a content stream, trimming trailing zeros.
fn fmt_coord(value: f64) -> String {
    let mut text = format!("{value:.4}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::PdfReader;
    use lopdf::dictionary;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// A4 portrait in points.
    const A4_PT: (f64, f64) = (595.2756, 841.8898);

    fn build_source_pdf(page_sizes: &[(f64, f64)]) -> Document {
        let mut doc = Document::with_version("1.5");

        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids = Vec::new();
        for (width, height) in page_sizes {
            let content = Stream::new(
                Dictionary::new(),
                b"BT /F1 12 Tf 72 720 Td (fixture) Tj ET".to_vec(),
            );
            let content_id = doc.add_object(content);

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(*width as f32),
                    Object::Real(*height as f32),
                ],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            });
            kids.push(page_id.into());
        }

        let count = page_sizes.len() as i64;
        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }
            .into(),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc
    }

    fn write_source(dir: &TempDir, name: &str, page_sizes: &[(f64, f64)]) -> PathBuf {
        let path = dir.path().join(name);
        let mut doc = build_source_pdf(page_sizes);
        doc.save(&path).unwrap();
        path
    }

    #[test]
    fn test_template_size_in_working_units() {
        let dir = TempDir::new().unwrap();
        let path = write_source(&dir, "a4.pdf", &[A4_PT]);
        let source = PdfReader::new().open(&path).unwrap();

        let mut output = Document::with_version("1.7");
        let mut engine = TemplateEngine::new();
        let template = engine
            .import_page(&mut output, &source, 1, Unit::Millimeter)
            .unwrap();

        assert!((template.width - 210.0).abs() < 0.01);
        assert!((template.height - 297.0).abs() < 0.01);
    }

    #[test]
    fn test_import_out_of_range_page() {
        let dir = TempDir::new().unwrap();
        let path = write_source(&dir, "a4.pdf", &[A4_PT]);
        let source = PdfReader::new().open(&path).unwrap();

        let mut output = Document::with_version("1.7");
        let mut engine = TemplateEngine::new();
        let err = engine
            .import_page(&mut output, &source, 9, Unit::Millimeter)
            .unwrap_err();

        assert!(matches!(err, PdfStitchError::PageNotFound { page: 9, .. }));
    }

    #[test]
    fn test_form_engine_places_with_do_operator() {
        let dir = TempDir::new().unwrap();
        let path = write_source(&dir, "a4.pdf", &[A4_PT]);
        let source = PdfReader::new().open(&path).unwrap();

        let mut output = Document::with_version("1.7");
        let mut engine = TemplateEngine::new();
        let template = engine
            .import_page(&mut output, &source, 1, Unit::Millimeter)
            .unwrap();
        let placed = engine.place(&mut output, template).unwrap();

        assert_eq!(placed.content_ids.len(), 1);
        assert!(placed.resources.has(b"XObject"));

        let content = output
            .get_object(placed.content_ids[0])
            .unwrap()
            .as_stream()
            .unwrap()
            .content
            .clone();
        let ops = String::from_utf8(content).unwrap();
        assert!(ops.contains("/TPL0 Do"));
    }

    #[test]
    fn test_direct_engine_brackets_content_in_q() {
        let dir = TempDir::new().unwrap();
        let path = write_source(&dir, "a4.pdf", &[A4_PT]);
        let source = PdfReader::new().open(&path).unwrap();

        let mut output = Document::with_version("1.7");
        let mut engine = DirectEngine::new();
        let template = engine
            .import_page(&mut output, &source, 1, Unit::Millimeter)
            .unwrap();
        let placed = engine.place(&mut output, template).unwrap();

        assert_eq!(placed.content_ids.len(), 3);
        assert!(placed.resources.has(b"Font"));

        let first = output
            .get_object(placed.content_ids[0])
            .unwrap()
            .as_stream()
            .unwrap();
        assert!(first.content.starts_with(b"q\n"));

        let last = output
            .get_object(placed.content_ids[2])
            .unwrap()
            .as_stream()
            .unwrap();
        assert!(last.content.ends_with(b"Q"));
    }

    #[test]
    fn test_shared_resources_copied_once_per_session() {
        let dir = TempDir::new().unwrap();
        let path = write_source(&dir, "two.pdf", &[A4_PT, A4_PT]);
        let source = PdfReader::new().open(&path).unwrap();

        let mut output = Document::with_version("1.7");
        let mut engine = DirectEngine::new();

        let font_ref = |placed: &PlacedPage, output: &Document| -> ObjectId {
            let fonts = placed.resources.get(b"Font").unwrap();
            let fonts = match fonts {
                Object::Dictionary(d) => d.clone(),
                Object::Reference(id) => match output.get_object(*id).unwrap() {
                    Object::Dictionary(d) => d.clone(),
                    _ => panic!("Font is not a dictionary"),
                },
                _ => panic!("Font is not a dictionary"),
            };
            match fonts.get(b"F1").unwrap() {
                Object::Reference(id) => *id,
                _ => panic!("F1 is not a reference"),
            }
        };

        let t1 = engine
            .import_page(&mut output, &source, 1, Unit::Millimeter)
            .unwrap();
        let p1 = engine.place(&mut output, t1).unwrap();

        let t2 = engine
            .import_page(&mut output, &source, 2, Unit::Millimeter)
            .unwrap();
        let p2 = engine.place(&mut output, t2).unwrap();

        assert_eq!(font_ref(&p1, &output), font_ref(&p2, &output));
    }

    #[test]
    fn test_engines_cannot_swap_templates() {
        let dir = TempDir::new().unwrap();
        let path = write_source(&dir, "a4.pdf", &[A4_PT]);
        let source = PdfReader::new().open(&path).unwrap();

        let mut output = Document::with_version("1.7");
        let mut form_engine = TemplateEngine::new();
        let mut direct_engine = DirectEngine::new();

        let template = form_engine
            .import_page(&mut output, &source, 1, Unit::Millimeter)
            .unwrap();
        assert!(direct_engine.place(&mut output, template).is_err());
    }

    #[test]
    fn test_fmt_coord() {
        assert_eq!(fmt_coord(0.0), "0");
        assert_eq!(fmt_coord(-0.0), "0");
        assert_eq!(fmt_coord(12.5), "12.5");
        assert_eq!(fmt_coord(-36.2835), "-36.2835");
        assert_eq!(fmt_coord(100.0), "100");
    }
}
