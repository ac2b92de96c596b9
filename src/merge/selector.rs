//! Page-spec parsing.
//!
//! A page spec selects which pages of a source document take part in a
//! merge. It is either the literal `"all"` (case-insensitive) or a
//! comma-separated list of 1-based page numbers and `start-end` ranges,
//! e.g. `"1,3,6,12-16"`.

use crate::error::{PdfStitchError, Result};

/// A parsed page selection for one source document.
///
/// `All` is kept as a distinct value rather than being expanded, so it
/// resolves against the document's actual page count at merge time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSpec {
    /// Every page of the document, in natural order.
    All,
    /// An explicit ordered list of 1-based page numbers.
    ///
    /// The list preserves token order and duplicates exactly as written;
    /// bounds against the real page count are checked when a page is
    /// actually fetched, not at parse time.
    Pages(Vec<u32>),
}

impl PageSpec {
    /// Parse a page spec string.
    ///
    /// Whitespace is stripped before splitting. Each comma-separated
    /// token is either a single positive integer or a `start-end` pair
    /// expanded to every page from start to end inclusive, ascending.
    ///
    /// # Errors
    ///
    /// - [`PdfStitchError::InvalidRange`] if a pair has start > end;
    ///   the message names both endpoints.
    /// - [`PdfStitchError::InvalidPageSpec`] for anything that is not a
    ///   positive integer or a well-formed pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfstitch::merge::PageSpec;
    ///
    /// let spec = PageSpec::parse("1,3,6,12-16").unwrap();
    /// assert_eq!(spec, PageSpec::Pages(vec![1, 3, 6, 12, 13, 14, 15, 16]));
    ///
    /// assert_eq!(PageSpec::parse("ALL").unwrap(), PageSpec::All);
    /// ```
    pub fn parse(spec: &str) -> Result<Self> {
        let spec: String = spec.chars().filter(|c| !c.is_whitespace()).collect();

        if spec.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        let mut pages = Vec::new();

        for token in spec.split(',') {
            match token.split_once('-') {
                Some((start, end)) => {
                    let start = parse_page_number(start, token)?;
                    let end = parse_page_number(end, token)?;

                    if start > end {
                        return Err(PdfStitchError::InvalidRange { start, end });
                    }

                    pages.extend(start..=end);
                }
                None => {
                    pages.push(parse_page_number(token, token)?);
                }
            }
        }

        Ok(Self::Pages(pages))
    }

    /// Resolve the spec into the list of page numbers for a document
    /// with `page_count` pages.
    ///
    /// `All` becomes `1..=page_count`; an explicit list is returned as
    /// written. No bounds validation happens here -- a listed page
    /// beyond the count fails later, when that page is fetched.
    pub fn resolve(&self, page_count: u32) -> Vec<u32> {
        match self {
            Self::All => (1..=page_count).collect(),
            Self::Pages(pages) => pages.clone(),
        }
    }
}

/// Parse one integer out of a spec token.
///
/// Page numbers are 1-based; zero and anything non-numeric fail with the
/// full token in the message.
fn parse_page_number(text: &str, token: &str) -> Result<u32> {
    let page: u32 = text.parse().map_err(|_| PdfStitchError::InvalidPageSpec {
        token: token.to_string(),
    })?;

    if page == 0 {
        return Err(PdfStitchError::InvalidPageSpec {
            token: token.to_string(),
        });
    }

    Ok(page)
}
