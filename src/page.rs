//! Source pages and their normalized plain-text form.

use crate::error::ExtractError;
use scraper::{ElementRef, Html};
use std::borrow::Cow;
use std::io::Read;
use tracing::debug;

/// A fetched page as handed over by the fetching collaborator.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Source URL the HTML was fetched from.
    pub url: String,
    /// Raw HTML text.
    pub html: String,
}

impl RawPage {
    /// Creates a page from an already-decoded HTML string.
    #[inline]
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    /// Creates a page from raw bytes, replacing undecodable sequences.
    ///
    /// Binary garbage degrades to replacement characters and ultimately to an
    /// all-default record, never to a hard failure.
    pub fn from_bytes(url: impl Into<String>, bytes: &[u8]) -> Self {
        let html = match String::from_utf8_lossy(bytes) {
            Cow::Borrowed(text) => text.to_string(),
            Cow::Owned(text) => {
                debug!("page bytes were not valid UTF-8; decoded lossily");
                text
            }
        };
        Self {
            url: url.into(),
            html,
        }
    }

    /// Reads a page from an arbitrary `Read`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Io`] when the reader fails; decoding itself
    /// never fails.
    pub fn from_reader<R: Read>(url: impl Into<String>, mut reader: R) -> Result<Self, ExtractError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::from_bytes(url, &bytes))
    }
}

/// Maps an offset in the normalized text back to the raw HTML (approximate).
#[derive(Debug, Clone, Copy)]
struct OffsetMark {
    text_at: usize,
    html_at: usize,
}

/// Plain text derived from one page: tags stripped, entities decoded,
/// whitespace collapsed, block boundaries kept as single newlines.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    text: String,
    marks: Vec<OffsetMark>,
}

impl NormalizedText {
    /// Normalizes a page. Never fails; malformed markup degrades to
    /// best-effort text and empty input yields empty text.
    #[must_use]
    pub fn from_page(page: &RawPage) -> Self {
        let dom = Html::parse_document(&page.html);
        let mut collector = Collector {
            raw: &page.html,
            cursor: 0,
            out: String::new(),
            marks: Vec::new(),
        };
        collector.visit(dom.root_element());
        let mut text = collector.out;
        text.truncate(text.trim_end().len());
        Self {
            text,
            marks: collector.marks,
        }
    }

    /// The normalized plain text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Approximate offset in the raw HTML for a normalized-text offset.
    ///
    /// Best-effort audit aid only; entity-heavy chunks may have no mapping.
    pub fn source_offset(&self, text_offset: usize) -> Option<usize> {
        let idx = self.marks.partition_point(|m| m.text_at <= text_offset);
        let mark = self.marks.get(idx.checked_sub(1)?)?;
        Some(mark.html_at + (text_offset - mark.text_at))
    }
}

/// Elements whose subtrees never surface as candidate text.
const SKIPPED: [&str; 7] = [
    "script", "style", "noscript", "template", "iframe", "svg", "canvas",
];

/// Elements that terminate a line in the normalized text.
fn is_block(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "br"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "tbody"
            | "tfoot"
            | "thead"
            | "tr"
            | "ul"
    )
}

struct Collector<'a> {
    raw: &'a str,
    cursor: usize,
    out: String,
    marks: Vec<OffsetMark>,
}

impl Collector<'_> {
    fn visit(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        if SKIPPED.contains(&name) {
            return;
        }
        let block = is_block(name);
        if block {
            self.break_line();
        }
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                self.append(text);
            } else if let Some(child_element) = ElementRef::wrap(child) {
                self.visit(child_element);
            }
        }
        if block {
            self.break_line();
        } else if matches!(name, "td" | "th") {
            // Cells stay on their row line but must not fuse together.
            self.pad_space();
        }
    }

    /// Collapses the chunk's whitespace into the output and records one
    /// offset mark when the chunk is findable in the raw HTML.
    fn append(&mut self, chunk: &str) {
        let mut pending = None;
        let probe = chunk.trim();
        if probe.len() >= 3 {
            if let Some(found) = self.raw[self.cursor..].find(probe) {
                let html_at = self.cursor + found;
                self.cursor = html_at + probe.len();
                pending = Some(html_at);
            }
        }
        for ch in chunk.chars() {
            if ch.is_whitespace() {
                self.pad_space();
            } else {
                if let Some(html_at) = pending.take() {
                    self.marks.push(OffsetMark {
                        text_at: self.out.len(),
                        html_at,
                    });
                }
                self.out.push(ch);
            }
        }
    }

    fn pad_space(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with(' ') && !self.out.ends_with('\n') {
            self.out.push(' ');
        }
    }

    fn break_line(&mut self) {
        while self.out.ends_with(' ') {
            self.out.pop();
        }
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }
}
