//! Document configuration

/// How a document is hosted
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Hosted in a browsing context: `pageshow` fires after `load`
    pub browsing_context: bool,
    /// Scripting enabled
    pub scripting: bool,
    /// Encoding assumed when the source declares none
    pub default_encoding: String,
    /// User agent reported to fetchers
    pub user_agent: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            browsing_context: false,
            scripting: false,
            default_encoding: "utf-8".into(),
            user_agent: "fOS-Engine/0.1".into(),
        }
    }
}

impl DocumentConfig {
    pub fn builder() -> DocumentConfigBuilder {
        DocumentConfigBuilder::new()
    }
}

/// Document configuration builder
pub struct DocumentConfigBuilder {
    config: DocumentConfig,
}

impl DocumentConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DocumentConfig::default(),
        }
    }

    pub fn browsing_context(mut self, enabled: bool) -> Self {
        self.config.browsing_context = enabled;
        self
    }

    pub fn scripting(mut self, enabled: bool) -> Self {
        self.config.scripting = enabled;
        self
    }

    pub fn default_encoding(mut self, encoding: &str) -> Self {
        self.config.default_encoding = encoding.to_ascii_lowercase();
        self
    }

    pub fn user_agent(mut self, ua: &str) -> Self {
        self.config.user_agent = ua.to_string();
        self
    }

    pub fn build(self) -> DocumentConfig {
        self.config
    }
}

impl Default for DocumentConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
