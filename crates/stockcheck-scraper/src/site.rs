//! Storefront URL construction.

use stockcheck_core::AppConfig;

use crate::error::FetchError;

/// Where the storefront lives: origin plus path locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Origin without trailing slash, e.g. `https://www.zara.com`.
    pub base_url: String,
    /// Path locale without surrounding slashes, e.g. `tr/tr`.
    pub locale: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.zara.com".to_string(),
            locale: "tr/tr".to_string(),
        }
    }
}

impl SiteConfig {
    #[must_use]
    pub fn new(base_url: &str, locale: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            locale: locale.trim_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(&config.site_base_url, &config.site_locale)
    }

    /// Canonical product page for a normalized id.
    ///
    /// Given `"00526310"`, returns
    /// `"https://www.zara.com/tr/tr/-p00526310.html"`. The storefront
    /// redirects the empty slug before `-p` to the real product slug.
    #[must_use]
    pub fn product_url(&self, product_id: &str) -> String {
        format!("{}/{}/-p{product_id}.html", self.base_url, self.locale)
    }

    /// Search page for a raw identifier, with the term percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the configured base URL does
    /// not parse.
    pub fn search_url(&self, term: &str) -> Result<String, FetchError> {
        let base = format!("{}/{}/search", self.base_url, self.locale);
        reqwest::Url::parse_with_params(&base, &[("searchTerm", term.trim())])
            .map(String::from)
            .map_err(|e| FetchError::InvalidUrl {
                url: base,
                reason: e.to_string(),
            })
    }
}

/// Reduces a SKU or product code to its digits: `"0052/6310"` → `"00526310"`.
///
/// Never fails; an identifier without digits yields an empty string.
#[must_use]
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
