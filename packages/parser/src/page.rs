//! Loading a downloaded conjugation page into a queryable tree.
//!
//! Dictionary pages are ordinary HTML5: unquoted and boolean attributes,
//! void elements without a closing slash, paragraphs and list items left
//! open. They are parsed with `scraper`, which applies the HTML5 tree
//! construction rules, so markup errors anywhere on the page only affect
//! the shape of the tree and never abort the parse.

use scraper::{ElementRef, Html};

use crate::dom::MarkupNode;
use crate::error::{ConjugationError, Result};

/// A conjugation page parsed into a tree.
///
/// Each page is owned by the invocation that parses it; pages are never
/// shared between concurrent parses.
pub struct ParsedPage {
    html: Html,
}

impl ParsedPage {
    /// Parse a full HTML document.
    pub fn parse(html: &str) -> Self {
        let html = Html::parse_document(html);
        if !html.errors.is_empty() {
            tracing::debug!(errors = html.errors.len(), "Recovered from HTML parse errors");
        }
        Self { html }
    }

    /// The `<html>` element.
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// The element whose id equals the verb's dictionary entry id.
    pub fn entry_root(&self, entry_id: &str) -> Result<ElementRef<'_>> {
        entry_root(self.root(), entry_id)
    }
}

/// Find the element identified by `entry_id`, `page` itself included.
pub fn entry_root<N: MarkupNode>(page: N, entry_id: &str) -> Result<N> {
    if page.attr("id") == Some(entry_id) {
        return Ok(page);
    }
    page.find_by_id(entry_id)
        .ok_or_else(|| ConjugationError::EntryNotFound {
            entry_id: entry_id.to_string(),
        })
}
