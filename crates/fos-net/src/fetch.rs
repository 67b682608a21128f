//! HTTP fetcher
//!
//! reqwest's blocking client run on smol's blocking pool, raced against the
//! document's cancellation token.

use fos_dom::{CancelToken, DocumentResponse, Fetcher, LoadError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use url::Url;

use crate::{FetchConfig, HttpFetcherBuilder, NetError};

/// Fetches documents over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    config: FetchConfig,
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with default settings
    pub fn new() -> Result<Self, NetError> {
        Self::builder().build()
    }

    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::new()
    }

    pub fn with_config(config: FetchConfig) -> Result<Self, NetError> {
        let policy = if config.max_redirects == 0 {
            Policy::none()
        } else {
            Policy::limited(config.max_redirects)
        };
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .redirect(policy)
            .default_headers(header_map(&config.default_headers)?)
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// GET `url`. Only `http` and `https` are supported.
    pub async fn get(&self, url: &str, cancel: CancelToken) -> Result<DocumentResponse, NetError> {
        let url = Url::parse(url).map_err(|e| NetError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NetError::UnsupportedScheme(url.scheme().to_string()));
        }
        if cancel.is_cancelled() {
            return Err(NetError::Cancelled);
        }

        tracing::info!("HTTP GET {}", url);
        let client = self.client.clone();
        let request = smol::unblock(move || send(&client, url));
        let cancelled = async {
            cancel.cancelled().await;
            Err(NetError::Cancelled)
        };
        let response = smol::future::or(request, cancelled).await?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "HTTP response");
        Ok(response)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, cancel: CancelToken) -> Result<DocumentResponse, LoadError> {
        Ok(self.get(url, cancel).await?)
    }
}

fn send(client: &Client, url: Url) -> Result<DocumentResponse, NetError> {
    let response = client.get(url).send()?;
    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response.bytes()?.to_vec();
    Ok(DocumentResponse {
        url: final_url,
        status,
        headers,
        body,
    })
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, NetError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| NetError::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader(name.clone()))?;
        map.append(header, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_map() {
        let map = header_map(&[("Accept".into(), "text/html".into())]).unwrap();
        assert_eq!(map.get("accept").unwrap(), "text/html");
        assert!(matches!(
            header_map(&[("Bad Header".into(), "x".into())]),
            Err(NetError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let fetcher = HttpFetcher::new().unwrap();
        let result = smol::block_on(fetcher.get("ftp://example.com/", CancelToken::never()));
        assert!(matches!(result, Err(NetError::UnsupportedScheme(s)) if s == "ftp"));
    }

    #[test]
    fn test_cancelled_before_request() {
        let fetcher = HttpFetcher::new().unwrap();
        let (handle, token) = CancelToken::pair();
        handle.cancel();
        let result = smol::block_on(fetcher.fetch("http://127.0.0.1:9/", token));
        assert!(matches!(result, Err(LoadError::Cancelled)));
    }
}
