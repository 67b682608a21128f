//! Loading contracts
//!
//! The core never touches the network or tokenizes markup itself. A
//! `Fetcher` produces a `DocumentResponse`, a `DocumentParser` turns the
//! document's source into a tree.

use std::future::Future;

use smol::channel::{self, Receiver, Sender};

use crate::{Document, DomError, DomResult};

/// Builds a document's tree from its character source, then closes it
pub trait DocumentParser {
    fn parse(&mut self, document: &mut Document) -> DomResult<()>;
}

/// Asynchronous fetch capability
pub trait Fetcher {
    fn fetch(&self, url: &str, cancel: CancelToken) -> impl Future<Output = Result<DocumentResponse, LoadError>>;
}

/// Load error
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {status}")]
    HttpStatus { status: u16 },

    #[error("Load cancelled")]
    Cancelled,

    #[error("Document error: {0}")]
    Dom(#[from] DomError),
}

/// Response handed to the document
#[derive(Debug, Clone, Default)]
pub struct DocumentResponse {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl DocumentResponse {
    pub fn new(url: &str, status: u16, body: Vec<u8>) -> Self {
        Self {
            url: url.to_string(),
            status,
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// First header named `name`, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// MIME type without parameters, lower-cased
    pub fn content_type(&self) -> Option<String> {
        let value = self.header("content-type")?;
        let mime = value.split(';').next()?.trim();
        (!mime.is_empty()).then(|| mime.to_ascii_lowercase())
    }

    /// `charset` parameter of the content type
    pub fn charset(&self) -> Option<&str> {
        self.header("content-type")?
            .split(';')
            .skip(1)
            .filter_map(|param| param.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.trim().trim_matches('"'))
    }

    /// Cookie string visible to the document: `name=value` pairs of every
    /// `Set-Cookie` header, joined with `; `
    pub fn cookie(&self) -> String {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("set-cookie"))
            .filter_map(|(_, v)| v.split(';').next())
            .map(str::trim)
            .filter(|pair| pair.contains('='))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Cancellation signal passed to fetchers.
///
/// Cancelled once its `CancelHandle` is cancelled or dropped.
#[derive(Debug, Clone)]
pub struct CancelToken {
    signal: Option<Receiver<()>>,
}

/// Owner side of a `CancelToken`
#[derive(Debug)]
pub struct CancelHandle {
    sender: Sender<()>,
}

impl CancelToken {
    pub fn pair() -> (CancelHandle, CancelToken) {
        let (sender, receiver) = channel::bounded(1);
        (CancelHandle { sender }, CancelToken { signal: Some(receiver) })
    }

    /// Token that is never cancelled
    pub fn never() -> Self {
        Self { signal: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.as_ref().is_some_and(Receiver::is_closed)
    }

    /// Resolves once cancelled
    pub async fn cancelled(&self) {
        match &self.signal {
            // Nothing is ever sent: recv only returns when the channel closes
            Some(signal) => {
                let _ = signal.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::never()
    }
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.close();
    }
}
