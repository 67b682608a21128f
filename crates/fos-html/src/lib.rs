//! fOS HTML Parser
//!
//! HTML5 parser built on html5ever. Builds into a `fos_dom::Document`
//! through its tree primitives and closes it when done.

mod parser;

pub use fos_dom::Document;
pub use parser::HtmlParser;

use fos_dom::{DomError, TextSource};

/// Parse an HTML string into a closed document
pub fn parse(html: &str) -> Result<Document, ParseError> {
    parse_with_url(html, "about:blank")
}

/// Parse HTML with a document URL
pub fn parse_with_url(html: &str, url: &str) -> Result<Document, ParseError> {
    let mut document = Document::new();
    document.set_location(url);
    document.load(TextSource::from_text(html), &mut HtmlParser::new())?;
    Ok(document)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Document error: {0}")]
    Dom(#[from] DomError),
}
