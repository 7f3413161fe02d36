//! Request and response types shared by the checker, the API and the CLI.

use serde::{Deserialize, Serialize};

/// The only retailer this service knows how to check.
pub const SUPPORTED_BRAND: &str = "zara";

/// Returns `true` when `brand` names the supported retailer, ignoring case
/// and surrounding whitespace.
#[must_use]
pub fn is_supported_brand(brand: &str) -> bool {
    brand.trim().eq_ignore_ascii_case(SUPPORTED_BRAND)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Sku,
    Code,
}

/// A single stock lookup, built per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockQuery {
    pub identifier: String,
    pub kind: IdentifierKind,
}

impl StockQuery {
    #[must_use]
    pub fn sku(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: IdentifierKind::Sku,
        }
    }

    #[must_use]
    pub fn code(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: IdentifierKind::Code,
        }
    }

    /// Picks the identifier from an optional `sku`/`code` pair. `sku` wins
    /// when both are present; blank values count as absent.
    #[must_use]
    pub fn from_parts(sku: Option<&str>, code: Option<&str>) -> Option<Self> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }
        present(sku)
            .map(Self::sku)
            .or_else(|| present(code).map(Self::code))
    }
}

/// Tri-state reduction of every variant's availability code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    InStock,
    OutOfStock,
    Unknown,
}

impl Verdict {
    /// Boolean projection used by the `in_stock` response field.
    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Verdict::InStock => Some(true),
            Verdict::OutOfStock => Some(false),
            Verdict::Unknown => None,
        }
    }
}

impl From<Option<bool>> for Verdict {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Verdict::InStock,
            Some(false) => Verdict::OutOfStock,
            None => Verdict::Unknown,
        }
    }
}

/// One colour/size combination as reported by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAvailability {
    pub color_label: Option<String>,
    pub size_label: Option<String>,
    pub raw_availability_code: String,
}

/// Which extraction tier produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    StructuredState,
    ScriptFlag,
    PageText,
    None,
}

/// Classification of a hard failure, exposed so callers never need to
/// match on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// DNS, connect, TLS or timeout failure.
    Transport,
    /// Non-2xx status other than 404.
    HttpStatus,
    /// The product page returned 404.
    NotFound,
    /// The identifier could not be turned into a product id.
    Unresolved,
    /// Rejected before the pipeline ran (unsupported brand, missing id).
    Validation,
}

/// The externally returned record for one stock check.
///
/// `ok == false` always comes with `verdict == Unknown` and an `error`
/// message; use [`StockCheckResponse::failure`] to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCheckResponse {
    pub ok: bool,
    pub verdict: Verdict,
    pub in_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<VariantAvailability>,
    pub url: String,
    pub searched: String,
    pub product_id: String,
    pub source: ExtractionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl StockCheckResponse {
    /// A completed check. `message` is the soft explanation attached to an
    /// `Unknown` verdict, if any.
    #[must_use]
    pub fn determined(
        verdict: Verdict,
        variants: Vec<VariantAvailability>,
        source: ExtractionSource,
        message: Option<String>,
        url: impl Into<String>,
        product_id: impl Into<String>,
        searched: impl Into<String>,
    ) -> Self {
        Self {
            ok: true,
            verdict,
            in_stock: verdict.as_bool(),
            variants,
            url: url.into(),
            searched: searched.into(),
            product_id: product_id.into(),
            source,
            error: message,
            error_kind: None,
        }
    }

    /// A hard failure: verdict is forced to `Unknown`.
    #[must_use]
    pub fn failure(
        kind: ErrorKind,
        message: impl Into<String>,
        url: impl Into<String>,
        product_id: impl Into<String>,
        searched: impl Into<String>,
    ) -> Self {
        Self {
            ok: false,
            verdict: Verdict::Unknown,
            in_stock: None,
            variants: Vec::new(),
            url: url.into(),
            searched: searched.into(),
            product_id: product_id.into(),
            source: ExtractionSource::None,
            error: Some(message.into()),
            error_kind: Some(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_brand_is_case_insensitive() {
        assert!(is_supported_brand("zara"));
        assert!(is_supported_brand("ZARA"));
        assert!(is_supported_brand(" Zara "));
        assert!(!is_supported_brand("mango"));
        assert!(!is_supported_brand(""));
    }

    #[test]
    fn from_parts_prefers_sku_over_code() {
        let q = StockQuery::from_parts(Some("0052/6310"), Some("20230010")).unwrap();
        assert_eq!(q, StockQuery::sku("0052/6310"));
    }

    #[test]
    fn from_parts_falls_back_to_code_when_sku_blank() {
        let q = StockQuery::from_parts(Some("  "), Some("20230010")).unwrap();
        assert_eq!(q.kind, IdentifierKind::Code);
        assert_eq!(q.identifier, "20230010");
    }

    #[test]
    fn from_parts_trims_the_chosen_identifier() {
        let q = StockQuery::from_parts(None, Some("  20230010 ")).unwrap();
        assert_eq!(q, StockQuery::code("20230010"));
    }

    #[test]
    fn from_parts_none_when_both_missing() {
        assert!(StockQuery::from_parts(None, None).is_none());
        assert!(StockQuery::from_parts(Some(""), None).is_none());
    }

    #[test]
    fn verdict_serializes_screaming_case() {
        let json = serde_json::to_string(&Verdict::OutOfStock).unwrap();
        assert_eq!(json, "\"OUT_OF_STOCK\"");
    }

    #[test]
    fn failure_forces_unknown_and_sets_error() {
        let resp = StockCheckResponse::failure(
            ErrorKind::Transport,
            "request failed: connection refused",
            "https://www.zara.com/tr/tr/-p1.html",
            "1",
            "1",
        );
        assert!(!resp.ok);
        assert_eq!(resp.verdict, Verdict::Unknown);
        assert_eq!(resp.in_stock, None);
        assert!(resp.error.is_some());
        assert_eq!(resp.error_kind, Some(ErrorKind::Transport));
    }

    #[test]
    fn determined_response_omits_absent_error_fields() {
        let resp = StockCheckResponse::determined(
            Verdict::InStock,
            Vec::new(),
            ExtractionSource::StructuredState,
            None,
            "https://www.zara.com/tr/tr/-p20230010.html",
            "20230010",
            "20230010",
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["in_stock"], true);
        assert_eq!(json["verdict"], "IN_STOCK");
        assert_eq!(json["source"], "structured_state");
        assert!(json.get("error").is_none());
        assert!(json.get("error_kind").is_none());
        assert!(json.get("variants").is_none());
    }
}
