//! Page retrieval, directly or through the rendering proxy.

use std::time::Duration;

use reqwest::{header::ACCEPT_LANGUAGE, Client};
use stockcheck_core::AppConfig;

use crate::error::FetchError;

/// Rendering-proxy settings. Only built when an API key is configured.
#[derive(Clone)]
pub struct ProxyConfig {
    pub api_key: String,
    /// Proxy API endpoint, e.g. `https://api.zenrows.com/v1/`.
    pub endpoint: String,
    pub js_render: bool,
    /// Render-wait budget in milliseconds; sent only when `js_render` is on.
    pub wait_ms: u64,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("api_key", &"[redacted]")
            .field("endpoint", &self.endpoint)
            .field("js_render", &self.js_render)
            .field("wait_ms", &self.wait_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub proxy: Option<ProxyConfig>,
    pub direct_timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
}

impl FetchConfig {
    /// Direct-only configuration with the default browser headers.
    #[must_use]
    pub fn direct(timeout_secs: u64) -> Self {
        Self {
            proxy: None,
            direct_timeout_secs: timeout_secs,
            user_agent: stockcheck_core::config::DEFAULT_USER_AGENT.to_string(),
            accept_language: stockcheck_core::config::DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let proxy = config.proxy_api_key.as_ref().map(|key| ProxyConfig {
            api_key: key.clone(),
            endpoint: config.proxy_endpoint.clone(),
            js_render: config.proxy_js_render,
            wait_ms: config.proxy_wait_ms,
            timeout_secs: config.proxy_timeout_secs,
        });
        Self {
            proxy,
            direct_timeout_secs: config.direct_timeout_secs,
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
        }
    }
}

/// Raw HTML for one URL. Discarded once extraction has run.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    /// The storefront URL that was requested, never the proxy URL.
    pub source_url: String,
    pub via_proxy: bool,
}

/// HTTP fetcher for storefront pages.
///
/// When a [`ProxyConfig`] is present and the caller prefers it, the page is
/// requested through the proxy first; any proxy failure falls back to one
/// direct request. There are no other retries. Non-2xx responses are errors
/// and their bodies are never parsed.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    proxy: Option<ProxyConfig>,
    direct_timeout: Duration,
    accept_language: String,
}

impl Fetcher {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g. an invalid `User-Agent` value).
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent)
            .build()?;
        Ok(Self {
            client,
            proxy: config.proxy,
            direct_timeout: Duration::from_secs(config.direct_timeout_secs),
            accept_language: config.accept_language,
        })
    }

    #[must_use]
    pub fn has_proxy(&self) -> bool {
        self.proxy.is_some()
    }

    /// Fetches `url`, through the proxy when one is configured and
    /// `prefer_proxy` is set.
    ///
    /// # Errors
    ///
    /// Returns the error of the direct request when it fails. A proxy
    /// failure alone is never returned; it is logged and followed by the
    /// direct attempt.
    pub async fn fetch(&self, url: &str, prefer_proxy: bool) -> Result<FetchedPage, FetchError> {
        if let (true, Some(proxy)) = (prefer_proxy, self.proxy.as_ref()) {
            match self.fetch_via_proxy(proxy, url).await {
                Ok(html) => {
                    tracing::debug!(url, bytes = html.len(), "fetched page via proxy");
                    return Ok(FetchedPage {
                        html,
                        source_url: url.to_owned(),
                        via_proxy: true,
                    });
                }
                Err(e) => {
                    tracing::warn!(url, error = %e, "proxy fetch failed; falling back to direct request");
                }
            }
        }

        let html = self.fetch_direct(url).await?;
        tracing::debug!(url, bytes = html.len(), "fetched page directly");
        Ok(FetchedPage {
            html,
            source_url: url.to_owned(),
            via_proxy: false,
        })
    }

    async fn fetch_direct(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .timeout(self.direct_timeout)
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }

    async fn fetch_via_proxy(&self, proxy: &ProxyConfig, url: &str) -> Result<String, FetchError> {
        let request_url = proxy_request_url(proxy, url)?;
        // The proxy URL carries the API key; strip it from any reqwest error
        // so it never reaches logs or responses.
        let response = self
            .client
            .get(request_url)
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .timeout(Duration::from_secs(proxy.timeout_secs))
            .send()
            .await
            .map_err(|e| FetchError::Http(e.without_url()))?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Http(e.without_url()))
    }
}

/// Builds the proxy request: `{endpoint}?apikey=…&url=…&js_render=…[&wait=…]`.
fn proxy_request_url(proxy: &ProxyConfig, target: &str) -> Result<reqwest::Url, FetchError> {
    let mut url = reqwest::Url::parse(&proxy.endpoint).map_err(|e| FetchError::InvalidUrl {
        url: proxy.endpoint.clone(),
        reason: e.to_string(),
    })?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("apikey", &proxy.api_key)
            .append_pair("url", target)
            .append_pair("js_render", if proxy.js_render { "true" } else { "false" });
        if proxy.js_render && proxy.wait_ms > 0 {
            pairs.append_pair("wait", &proxy.wait_ms.to_string());
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(js_render: bool, wait_ms: u64) -> ProxyConfig {
        ProxyConfig {
            api_key: "k-123".to_string(),
            endpoint: "https://api.zenrows.com/v1/".to_string(),
            js_render,
            wait_ms,
            timeout_secs: 30,
        }
    }

    #[test]
    fn proxy_request_url_carries_key_and_target() {
        let url = proxy_request_url(&proxy(false, 0), "https://www.zara.com/tr/tr/-p1.html")
            .expect("valid endpoint");
        assert_eq!(
            url.as_str(),
            "https://api.zenrows.com/v1/?apikey=k-123&url=https%3A%2F%2Fwww.zara.com%2Ftr%2Ftr%2F-p1.html&js_render=false"
        );
    }

    #[test]
    fn proxy_request_url_adds_wait_only_when_rendering() {
        let no_render = proxy_request_url(&proxy(false, 2500), "https://x.test/").unwrap();
        assert!(!no_render.as_str().contains("wait="));

        let render = proxy_request_url(&proxy(true, 2500), "https://x.test/").unwrap();
        assert!(render.as_str().contains("js_render=true"));
        assert!(render.as_str().contains("wait=2500"));
    }

    #[test]
    fn proxy_request_url_rejects_bad_endpoint() {
        let mut cfg = proxy(false, 0);
        cfg.endpoint = "::not-a-url".to_string();
        let err = proxy_request_url(&cfg, "https://x.test/").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }), "got: {err:?}");
    }

    #[test]
    fn proxy_config_debug_redacts_key() {
        let debug = format!("{:?}", proxy(false, 0));
        assert!(!debug.contains("k-123"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn direct_config_has_no_proxy() {
        let config = FetchConfig::direct(20);
        let fetcher = Fetcher::new(config).expect("client builds");
        assert!(!fetcher.has_proxy());
    }
}
