//! Fetcher configuration

use std::time::Duration;

use crate::{HttpFetcher, NetError};

/// HTTP fetcher configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string
    pub user_agent: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max redirects to follow (0 = disable)
    pub max_redirects: usize,
    /// Default headers
    pub default_headers: Vec<(String, String)>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "fOS-Engine/0.1".into(),
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            max_redirects: 10,
            default_headers: vec![(
                "Accept".into(),
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into(),
            )],
        }
    }
}

/// HTTP fetcher builder
pub struct HttpFetcherBuilder {
    config: FetchConfig,
}

impl HttpFetcherBuilder {
    pub fn new() -> Self {
        Self {
            config: FetchConfig::default(),
        }
    }

    pub fn user_agent(mut self, ua: &str) -> Self {
        self.config.user_agent = ua.to_string();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        self.config.default_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn build(self) -> Result<HttpFetcher, NetError> {
        HttpFetcher::with_config(self.config)
    }
}

impl Default for HttpFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
