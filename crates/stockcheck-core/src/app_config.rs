use std::net::SocketAddr;

use crate::policy::AvailabilityPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Storefront origin, e.g. `https://www.zara.com`.
    pub site_base_url: String,
    /// Storefront path locale, e.g. `tr/tr`.
    pub site_locale: String,
    /// Rendering-proxy API key. `None` disables proxied fetching entirely.
    pub proxy_api_key: Option<String>,
    pub proxy_endpoint: String,
    pub proxy_js_render: bool,
    /// Render-wait budget forwarded to the proxy when `proxy_js_render` is on.
    pub proxy_wait_ms: u64,
    pub prefer_proxy: bool,
    pub direct_timeout_secs: u64,
    pub proxy_timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    pub availability_policy: AvailabilityPolicy,
    /// Query the storefront search page when the canonical product URL fails.
    pub search_fallback: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("site_base_url", &self.site_base_url)
            .field("site_locale", &self.site_locale)
            .field(
                "proxy_api_key",
                &self.proxy_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("proxy_endpoint", &self.proxy_endpoint)
            .field("proxy_js_render", &self.proxy_js_render)
            .field("proxy_wait_ms", &self.proxy_wait_ms)
            .field("prefer_proxy", &self.prefer_proxy)
            .field("direct_timeout_secs", &self.direct_timeout_secs)
            .field("proxy_timeout_secs", &self.proxy_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("accept_language", &self.accept_language)
            .field("availability_policy", &self.availability_policy)
            .field("search_fallback", &self.search_fallback)
            .finish()
    }
}
