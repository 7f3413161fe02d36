//! Batch request and response shapes, shared by the API and the CLI.

use serde::{Deserialize, Serialize};

use crate::stock::{is_supported_brand, StockCheckResponse, StockQuery, SUPPORTED_BRAND};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub items: Vec<BatchItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BatchItem {
    #[serde(default)]
    pub brand: String,
    pub sku: Option<String>,
    pub code: Option<String>,
    /// Caller data echoed back untouched.
    pub meta: Option<serde_json::Value>,
}

impl BatchItem {
    /// The identifier as the caller sent it, `sku` first.
    #[must_use]
    pub fn searched(&self) -> &str {
        self.sku
            .as_deref()
            .or(self.code.as_deref())
            .unwrap_or_default()
    }

    /// Validates the item and builds its query.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message when the brand is unsupported or
    /// neither `sku` nor `code` is present.
    pub fn query(&self) -> Result<StockQuery, String> {
        if !is_supported_brand(&self.brand) {
            return Err(unsupported_brand_message(&self.brand));
        }
        StockQuery::from_parts(self.sku.as_deref(), self.code.as_deref())
            .ok_or_else(|| MISSING_IDENTIFIER_MESSAGE.to_string())
    }
}

pub const MISSING_IDENTIFIER_MESSAGE: &str = "either sku or code is required";

#[must_use]
pub fn unsupported_brand_message(brand: &str) -> String {
    format!("unsupported brand \"{brand}\"; only \"{SUPPORTED_BRAND}\" is supported")
}

/// One batch result: the check outcome with the request item echoed back.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub brand: String,
    pub sku: Option<String>,
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    #[serde(flatten)]
    pub result: StockCheckResponse,
}

impl BatchResult {
    #[must_use]
    pub fn new(item: BatchItem, result: StockCheckResponse) -> Self {
        Self {
            brand: item.brand,
            sku: item.sku,
            code: item.code,
            meta: item.meta,
            result,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub count: usize,
    pub results: Vec<BatchResult>,
}

impl From<Vec<BatchResult>> for BatchResponse {
    fn from(results: Vec<BatchResult>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}
