//! Page header and footer decoration.
//!
//! The output document invokes a decorator at page-composition time for
//! every page it creates, including duplex padding pages. A caller can
//! inject its own [`PageDecorator`]; when none is injected the built-in
//! renderer runs, gated by the `use_default_header` and
//! `use_default_footer` configuration flags.

use crate::config::{ComposerOptions, Orientation};

/// Resource name under which the decoration font is registered on pages
/// that carry decorations.
pub(crate) const DECOR_FONT: &str = "Helv";

/// Geometry and position of the page being decorated.
#[derive(Debug, Clone)]
pub struct PageContext {
    /// 1-based page number in the output document.
    pub number: usize,
    /// Page width in points.
    pub width_pt: f64,
    /// Page height in points.
    pub height_pt: f64,
    /// Effective orientation of the page.
    pub orientation: Orientation,
    /// Document title, when metadata supplied one.
    pub title: Option<String>,
}

/// Strategy object invoked at header and footer rendering time.
///
/// Implementations return raw content-stream operators painted on top
/// of the page content; the decoration font is available as `/Helv`.
/// Returning `None` renders nothing.
pub trait PageDecorator {
    /// Operators for the page header area.
    fn header(&self, page: &PageContext) -> Option<String>;

    /// Operators for the page footer area.
    fn footer(&self, page: &PageContext) -> Option<String>;
}

/// The built-in decorator: document title atop each page and a centered
/// `Page N` footer, each independently gated by configuration.
pub struct BuiltinDecorator {
    header_enabled: bool,
    footer_enabled: bool,
}

impl BuiltinDecorator {
    /// Build from the job options.
    pub fn from_options(options: &ComposerOptions) -> Self {
        Self {
            header_enabled: options.use_default_header,
            footer_enabled: options.use_default_footer,
        }
    }
}

impl PageDecorator for BuiltinDecorator {
    fn header(&self, page: &PageContext) -> Option<String> {
        if !self.header_enabled {
            return None;
        }

        let title = page.title.as_deref()?;

        let margin = 36.0;
        let baseline = page.height_pt - 30.0;
        let rule_y = page.height_pt - 36.0;

        let mut ops = String::from("0 g\n");
        ops.push_str(&text_op(10.0, margin, baseline, title));
        ops.push_str(&format!(
            "0.5 w {margin} {rule_y:.2} m {:.2} {rule_y:.2} l S\n",
            page.width_pt - margin,
        ));
        Some(ops)
    }

    fn footer(&self, page: &PageContext) -> Option<String> {
        if !self.footer_enabled {
            return None;
        }

        let text = format!("Page {}", page.number);
        let size = 9.0;
        let width = estimate_text_width(&text, size);
        let x = (page.width_pt - width) / 2.0;

        let mut ops = String::from("0 g\n");
        ops.push_str(&text_op(size, x, 20.0, &text));
        Some(ops)
    }
}

/// A decorator that renders nothing. Useful for suppressing the default
/// decorations regardless of configuration.
pub struct NoDecorations;

impl PageDecorator for NoDecorations {
    fn header(&self, _page: &PageContext) -> Option<String> {
        None
    }

    fn footer(&self, _page: &PageContext) -> Option<String> {
        None
    }
}

/// Emit a single positioned text run in the decoration font.
pub fn text_op(size: f64, x: f64, y: f64, text: &str) -> String {
    format!(
        "BT\n/{DECOR_FONT} {size} Tf\n1 0 0 1 {x:.2} {y:.2} Tm\n({}) Tj\nET\n",
        escape_pdf_string(text)
    )
}

/// Escape special characters in PDF strings.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

/// Estimate text width for Helvetica.
fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    // Average glyph width of roughly 0.5 em is close enough for
    // centering short runs like page numbers.
    text.len() as f64 * font_size * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4_page(number: usize) -> PageContext {
        PageContext {
            number,
            width_pt: 595.276,
            height_pt: 841.89,
            orientation: Orientation::Portrait,
            title: Some("Quarterly Report".to_string()),
        }
    }

    #[test]
    fn test_builtin_disabled_by_default() {
        let decorator = BuiltinDecorator::from_options(&ComposerOptions::default());
        assert!(decorator.header(&a4_page(1)).is_none());
        assert!(decorator.footer(&a4_page(1)).is_none());
    }

    #[test]
    fn test_builtin_header_renders_title() {
        let options = ComposerOptions {
            use_default_header: true,
            ..Default::default()
        };
        let decorator = BuiltinDecorator::from_options(&options);

        let ops = decorator.header(&a4_page(1)).unwrap();
        assert!(ops.contains("(Quarterly Report) Tj"));
        assert!(ops.contains(" l S"));
        assert!(decorator.footer(&a4_page(1)).is_none());
    }

    #[test]
    fn test_builtin_header_skipped_without_title() {
        let options = ComposerOptions {
            use_default_header: true,
            ..Default::default()
        };
        let decorator = BuiltinDecorator::from_options(&options);

        let mut page = a4_page(1);
        page.title = None;
        assert!(decorator.header(&page).is_none());
    }

    #[test]
    fn test_builtin_footer_renders_page_number() {
        let options = ComposerOptions {
            use_default_footer: true,
            ..Default::default()
        };
        let decorator = BuiltinDecorator::from_options(&options);

        let ops = decorator.footer(&a4_page(7)).unwrap();
        assert!(ops.contains("(Page 7) Tj"));
        assert!(decorator.header(&a4_page(7)).is_none());
    }

    #[test]
    fn test_no_decorations() {
        let decorator = NoDecorations;
        assert!(decorator.header(&a4_page(1)).is_none());
        assert!(decorator.footer(&a4_page(1)).is_none());
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("plain"), "plain");
        assert_eq!(escape_pdf_string("a(b)c"), "a\\(b\\)c");
        assert_eq!(escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_text_op_uses_decor_font() {
        let ops = text_op(9.0, 10.0, 20.0, "x");
        assert!(ops.contains("/Helv 9 Tf"));
        assert!(ops.contains("(x) Tj"));
    }
}
