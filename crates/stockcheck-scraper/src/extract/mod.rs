//! Availability extraction from product page HTML.
//!
//! Tiers run in order and the first one that produces a signal wins:
//!
//! 1. the embedded `window.zara.viewData` state block ([`state`]);
//! 2. explicit availability flags inside inline scripts ([`heuristic`]);
//! 3. stock phrases in the visible page text ([`heuristic`]).
//!
//! A state block that is present but malformed counts as absent. A state
//! block that parses but lists no sizes ends extraction with `Unknown`.

mod heuristic;
mod state;

use scraper::Html;
use stockcheck_core::{AvailabilityPolicy, ExtractionSource, VariantAvailability, Verdict};

use crate::error::StructuredStateError;

/// Outcome of running the extractor over one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub verdict: Verdict,
    /// Empty unless the structured state block was used.
    pub variants: Vec<VariantAvailability>,
    pub source: ExtractionSource,
    /// Explanation attached to an `Unknown` verdict.
    pub message: Option<String>,
}

/// Runs the extraction tiers over `html`.
#[must_use]
pub fn extract_availability(html: &str, policy: &AvailabilityPolicy) -> Extraction {
    match state::extract_structured_state(html) {
        Ok(state) => {
            let variants = state::collect_variants(&state);
            let verdict = decide_verdict(&variants, policy);
            tracing::debug!(
                variant_count = variants.len(),
                ?verdict,
                "verdict from structured state"
            );
            let message = (verdict == Verdict::Unknown)
                .then(|| "structured state lists no sizes; stock could not be determined".to_string());
            return Extraction {
                verdict,
                variants,
                source: ExtractionSource::StructuredState,
                message,
            };
        }
        Err(StructuredStateError::NotFound) => {
            tracing::debug!("no structured state block; trying heuristics");
        }
        Err(e) => {
            tracing::debug!(error = %e, "structured state unusable; trying heuristics");
        }
    }

    let document = Html::parse_document(html);

    if let Some(signal) = heuristic::scan_script_flags(&document) {
        tracing::debug!(evidence = %signal.evidence, in_stock = signal.in_stock, "verdict from script flag");
        return Extraction {
            verdict: Verdict::from(Some(signal.in_stock)),
            variants: Vec::new(),
            source: ExtractionSource::ScriptFlag,
            message: None,
        };
    }

    if let Some(signal) = heuristic::scan_page_text(&document) {
        tracing::debug!(evidence = %signal.evidence, in_stock = signal.in_stock, "verdict from page text");
        return Extraction {
            verdict: Verdict::from(Some(signal.in_stock)),
            variants: Vec::new(),
            source: ExtractionSource::PageText,
            message: None,
        };
    }

    Extraction {
        verdict: Verdict::Unknown,
        variants: Vec::new(),
        source: ExtractionSource::None,
        message: Some(
            "no structured state, availability flag or stock phrase found on page".to_string(),
        ),
    }
}

/// Reduces variant codes to a verdict: any positive code is `InStock`,
/// entries with none positive are `OutOfStock`, no entries is `Unknown`.
#[must_use]
pub fn decide_verdict(variants: &[VariantAvailability], policy: &AvailabilityPolicy) -> Verdict {
    if variants.is_empty() {
        Verdict::Unknown
    } else if variants
        .iter()
        .any(|v| policy.is_positive(&v.raw_availability_code))
    {
        Verdict::InStock
    } else {
        Verdict::OutOfStock
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
