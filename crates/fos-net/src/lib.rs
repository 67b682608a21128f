//! fOS Networking
//!
//! HTTP document fetching for `fos_dom::Document::load_html`.

mod config;
mod fetch;

pub use config::{FetchConfig, HttpFetcherBuilder};
pub use fetch::HttpFetcher;
pub use url::Url;

use fos_dom::LoadError;

/// Network error
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl From<NetError> for LoadError {
    fn from(err: NetError) -> Self {
        match err {
            NetError::InvalidUrl(url) => LoadError::InvalidUrl(url),
            NetError::Cancelled => LoadError::Cancelled,
            other => LoadError::Network(other.to_string()),
        }
    }
}
