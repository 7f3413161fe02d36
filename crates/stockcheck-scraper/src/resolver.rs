//! Search fallback: discover a product id from the storefront search page.
//!
//! Used when the identifier has no digits or the canonical product URL
//! fails. Three scans run in order and the first hit wins; none is more
//! authoritative than another.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::site::SiteConfig;

/// Product page path, e.g. `/tr/tr/linen-shirt-p04786211.html`.
static PRODUCT_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-p(\d{6,})\.html").expect("valid regex"));

static NEXT_DATA_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*\bid\s*=\s*["']__NEXT_DATA__["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

static NEXT_DATA_PRODUCT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:productId|seoProductId|reference)"\s*:\s*"?(\d{6,})"#).expect("valid regex")
});

/// Anchor paths without the slug dash, e.g. `/tr/tr/p04786211.html?v1=2`.
static ANCHOR_PRODUCT_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|/)(?:[\w-]*-)?p(\d{6,})\.html").expect("valid regex"));

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Returns the first numeric product id found in a search results page.
#[must_use]
pub fn find_product_id(html: &str) -> Option<String> {
    find_in_product_paths(html)
        .or_else(|| find_in_next_data(html))
        .or_else(|| find_in_anchors(html))
}

fn find_in_product_paths(html: &str) -> Option<String> {
    PRODUCT_PATH
        .captures(html)
        .map(|caps| caps[1].to_string())
}

fn find_in_next_data(html: &str) -> Option<String> {
    let blob = NEXT_DATA_SCRIPT.captures(html)?.get(1)?.as_str();
    NEXT_DATA_PRODUCT_ID
        .captures(blob)
        .map(|caps| caps[1].to_string())
}

fn find_in_anchors(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| {
            ANCHOR_PRODUCT_PATH
                .captures(href)
                .map(|caps| caps[1].to_string())
        })
}

/// Fetches the search page for `raw_identifier` and scans it for a product id.
///
/// Returns `Ok(None)` when the page loads but contains no product id.
///
/// # Errors
///
/// Returns a [`FetchError`] when the search URL cannot be built or the
/// search page cannot be fetched.
pub async fn resolve_product_id(
    fetcher: &Fetcher,
    site: &SiteConfig,
    raw_identifier: &str,
    prefer_proxy: bool,
) -> Result<Option<String>, FetchError> {
    let url = site.search_url(raw_identifier)?;
    let page = fetcher.fetch(&url, prefer_proxy).await?;
    let found = find_product_id(&page.html);
    tracing::debug!(
        url,
        identifier = raw_identifier,
        product_id = found.as_deref(),
        "search fallback finished"
    );
    Ok(found)
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
