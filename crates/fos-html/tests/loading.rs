//! Loading tests for fos-html
//!
//! The parser driven through `Document::load_html` with an in-memory fetcher.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::*;
use fos_html::HtmlParser;

/// Serves one page from memory
struct PageFetcher {
    content_type: &'static str,
    body: &'static [u8],
}

impl Fetcher for PageFetcher {
    async fn fetch(&self, url: &str, _cancel: CancelToken) -> Result<DocumentResponse, LoadError> {
        // Hand control back once so the fetch really is asynchronous
        smol::future::yield_now().await;
        Ok(DocumentResponse::new(url, 200, self.body.to_vec())
            .with_header("Content-Type", self.content_type)
            .with_header("Set-Cookie", "session=abc; HttpOnly"))
    }
}

struct EventLog(Rc<RefCell<Vec<&'static str>>>);

impl EventDispatcher for EventLog {
    fn dispatch_event(&mut self, _document: &Document, event: &DomEvent) -> bool {
        self.0.borrow_mut().push(event.event_type.as_str());
        true
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// LOAD PIPELINE
// ============================================================================

#[test]
fn test_load_html_parses_and_closes() {
    init_tracing();
    let fetcher = PageFetcher {
        content_type: "text/html; charset=utf-8",
        body: b"<!DOCTYPE html><title> Home  page </title><p id=x>Hi</p>",
    };
    let mut doc = Document::new();
    let events = Rc::new(RefCell::new(Vec::new()));
    doc.set_event_dispatcher(EventLog(events.clone()));

    let loaded = doc.load_html("https://example.com/index.html", &fetcher, &mut HtmlParser::new(), CancelToken::never());

    assert!(loaded);
    assert_eq!(doc.ready_state(), ReadyState::Complete);
    assert_eq!(doc.title(), "Home page");
    assert_eq!(doc.location(), "https://example.com/index.html");
    assert_eq!(doc.cookie(), "session=abc");
    assert_eq!(doc.quirks_mode(), QuirksMode::NoQuirks);
    assert!(doc.get_element_by_id("x").is_some());
    assert_eq!(
        *events.borrow(),
        vec!["readystatechange", "DOMContentLoaded", "readystatechange", "load"]
    );
}

#[test]
fn test_load_html_meta_charset() {
    let fetcher = PageFetcher {
        content_type: "text/html",
        body: b"<meta charset=\"windows-1252\"><p>na\xEFve</p>",
    };
    let mut doc = Document::new();
    assert!(doc.load_html("https://example.com/", &fetcher, &mut HtmlParser::new(), CancelToken::never()));
    assert_eq!(doc.source().encoding(), "windows-1252");
    let p = doc.get_elements_by_tag_name("p")[0];
    assert_eq!(doc.tree().text_content(p), "naïve");
}

#[test]
fn test_load_html_twice_fails() {
    let fetcher = PageFetcher {
        content_type: "text/html",
        body: b"<p>one</p>",
    };
    let mut doc = Document::new();
    assert!(doc.load_html("https://example.com/", &fetcher, &mut HtmlParser::new(), CancelToken::never()));
    let before = doc.to_markup();
    assert!(!doc.load_html("https://example.com/", &fetcher, &mut HtmlParser::new(), CancelToken::never()));
    assert_eq!(doc.to_markup(), before);
}

#[test]
fn test_written_stream_is_parsed_on_load() {
    let mut doc = Document::new();
    doc.open().unwrap();
    doc.write("<ul><li>a").unwrap();
    doc.write("<li>b</ul>").unwrap();
    let source = doc.source().clone();
    doc.load(source, &mut HtmlParser::new()).unwrap();

    assert_eq!(doc.get_elements_by_tag_name("li").len(), 2);
    assert!(!doc.is_stream_open());
}

#[test]
fn test_parse_with_url() {
    let doc = fos_html::parse_with_url("<p>x</p>", "https://example.com/a").unwrap();
    assert_eq!(doc.location(), "https://example.com/a");
    assert!(doc.is_finished_loading());
}
