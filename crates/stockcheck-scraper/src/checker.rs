//! End-to-end stock check: identifier → URL → fetch → extract → response.

use stockcheck_core::{
    AppConfig, AvailabilityPolicy, BatchItem, BatchResult, ErrorKind, StockCheckResponse,
    StockQuery,
};

use crate::error::FetchError;
use crate::extract::extract_availability;
use crate::fetch::{FetchConfig, FetchedPage, Fetcher};
use crate::resolver::resolve_product_id;
use crate::site::{normalize_identifier, SiteConfig};

/// Runs stock checks against one storefront.
///
/// Every failure is folded into the returned [`StockCheckResponse`]; the
/// check methods never return an error.
#[derive(Debug, Clone)]
pub struct StockChecker {
    fetcher: Fetcher,
    site: SiteConfig,
    policy: AvailabilityPolicy,
    prefer_proxy: bool,
    search_fallback: bool,
}

impl StockChecker {
    /// Creates a checker that prefers the proxy (when the fetcher has one)
    /// and uses the search fallback.
    #[must_use]
    pub fn new(fetcher: Fetcher, site: SiteConfig, policy: AvailabilityPolicy) -> Self {
        Self {
            fetcher,
            site,
            policy,
            prefer_proxy: true,
            search_fallback: true,
        }
    }

    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(FetchConfig::from_app_config(config))?;
        Ok(Self::new(
            fetcher,
            SiteConfig::from_app_config(config),
            config.availability_policy.clone(),
        )
        .with_prefer_proxy(config.prefer_proxy)
        .with_search_fallback(config.search_fallback))
    }

    #[must_use]
    pub fn with_prefer_proxy(mut self, prefer_proxy: bool) -> Self {
        self.prefer_proxy = prefer_proxy;
        self
    }

    #[must_use]
    pub fn with_search_fallback(mut self, search_fallback: bool) -> Self {
        self.search_fallback = search_fallback;
        self
    }

    pub async fn check_stock_by_sku(&self, sku: &str) -> StockCheckResponse {
        self.check(&StockQuery::sku(sku)).await
    }

    pub async fn check_stock_by_code(&self, code: &str) -> StockCheckResponse {
        self.check(&StockQuery::code(code)).await
    }

    /// Checks one identifier.
    ///
    /// An identifier without digits is resolved through the search page
    /// first. A failed canonical fetch is retried once with an id from the
    /// search page, when the search finds a different one.
    pub async fn check(&self, query: &StockQuery) -> StockCheckResponse {
        let searched = query.identifier.as_str();
        let mut product_id = normalize_identifier(searched);
        let mut resolved = false;

        if product_id.is_empty() && self.search_fallback && !searched.trim().is_empty() {
            match resolve_product_id(&self.fetcher, &self.site, searched, self.prefer_proxy).await {
                Ok(Some(id)) => {
                    product_id = id;
                    resolved = true;
                }
                Ok(None) => {
                    let url = self.site.search_url(searched).unwrap_or_default();
                    tracing::info!(identifier = searched, "no product id found via search");
                    return StockCheckResponse::failure(
                        ErrorKind::Unresolved,
                        "no product id found for identifier",
                        url,
                        product_id,
                        searched,
                    );
                }
                Err(e) => {
                    let url = self.site.search_url(searched).unwrap_or_default();
                    tracing::warn!(identifier = searched, error = %e, "search request failed");
                    return StockCheckResponse::failure(
                        e.kind(),
                        format!("search request failed: {}", e.detailed_message()),
                        url,
                        product_id,
                        searched,
                    );
                }
            }
        }

        let url = self.site.product_url(&product_id);
        let page = match self.fetcher.fetch(&url, self.prefer_proxy).await {
            Ok(page) => page,
            Err(err) => {
                let retried = if resolved {
                    None
                } else {
                    self.retry_via_search(searched, &product_id).await
                };
                match retried {
                    Some((id, page)) => {
                        product_id = id;
                        page
                    }
                    None => {
                        tracing::warn!(url, product_id, error = %err, "product page fetch failed");
                        return StockCheckResponse::failure(
                            err.kind(),
                            format!("request failed: {}", err.detailed_message()),
                            url,
                            product_id,
                            searched,
                        );
                    }
                }
            }
        };

        let extraction = extract_availability(&page.html, &self.policy);
        tracing::info!(
            url = page.source_url.as_str(),
            product_id,
            via_proxy = page.via_proxy,
            verdict = ?extraction.verdict,
            source = ?extraction.source,
            "stock check completed"
        );

        StockCheckResponse::determined(
            extraction.verdict,
            extraction.variants,
            extraction.source,
            extraction.message,
            page.source_url,
            product_id,
            searched,
        )
    }

    /// Checks each item in order. An invalid item becomes an inline
    /// `validation` failure and the rest of the batch still runs.
    pub async fn check_batch(&self, items: Vec<BatchItem>) -> Vec<BatchResult> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let response = match item.query() {
                Ok(query) => self.check(&query).await,
                Err(message) => {
                    tracing::debug!(brand = %item.brand, %message, "batch item rejected");
                    StockCheckResponse::failure(
                        ErrorKind::Validation,
                        message,
                        "",
                        "",
                        item.searched(),
                    )
                }
            };
            results.push(BatchResult::new(item, response));
        }
        results
    }

    /// Looks the identifier up on the search page and fetches the product
    /// it points at. Returns `None` when the fallback is disabled, finds
    /// nothing new, or fails.
    async fn retry_via_search(
        &self,
        searched: &str,
        failed_id: &str,
    ) -> Option<(String, FetchedPage)> {
        if !self.search_fallback || searched.trim().is_empty() {
            return None;
        }
        let id = match resolve_product_id(&self.fetcher, &self.site, searched, self.prefer_proxy)
            .await
        {
            Ok(Some(id)) if id != failed_id => id,
            Ok(_) => return None,
            Err(e) => {
                tracing::debug!(identifier = searched, error = %e, "search fallback failed");
                return None;
            }
        };
        let url = self.site.product_url(&id);
        match self.fetcher.fetch(&url, self.prefer_proxy).await {
            Ok(page) => Some((id, page)),
            Err(e) => {
                tracing::debug!(url, error = %e, "resolved product page fetch failed");
                None
            }
        }
    }
}
