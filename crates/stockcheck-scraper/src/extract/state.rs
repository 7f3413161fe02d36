//! Tier 1: the `window.zara.viewData` page-state block.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use stockcheck_core::VariantAvailability;

use crate::error::StructuredStateError;

static VIEW_DATA_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"window\.zara\.viewData\s*=\s*").expect("valid regex"));

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

/// Locates and parses the page-state object.
///
/// # Errors
///
/// - [`StructuredStateError::NotFound`] when no assignment of an object
///   literal to `window.zara.viewData` exists.
/// - [`StructuredStateError::Unterminated`] when the object never closes.
/// - [`StructuredStateError::Malformed`] when the object is not JSON, even
///   after trailing commas are stripped.
pub(crate) fn extract_structured_state(html: &str) -> Result<Value, StructuredStateError> {
    let raw = locate_state_block(html)?;
    parse_state(raw)
}

fn locate_state_block(html: &str) -> Result<&str, StructuredStateError> {
    for m in VIEW_DATA_ASSIGNMENT.find_iter(html) {
        let rest = &html[m.end()..];
        if rest.starts_with('{') {
            return extract_balanced_object(rest).ok_or(StructuredStateError::Unterminated);
        }
    }
    Err(StructuredStateError::NotFound)
}

/// Returns the shortest prefix of `s` that forms a complete `{…}` object.
///
/// Tracks brace depth while skipping string literals and escapes. Only `}`
/// at depth 0 closes the object, so `{42]` is never accepted.
pub(crate) fn extract_balanced_object(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' => depth -= 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses the raw object, retrying once with trailing commas removed.
fn parse_state(raw: &str) -> Result<Value, StructuredStateError> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(first) => {
            tracing::debug!(error = %first, "structured state is not strict JSON; stripping trailing commas");
            let cleaned = TRAILING_COMMA.replace_all(raw, "$1");
            serde_json::from_str(&cleaned).map_err(StructuredStateError::Malformed)
        }
    }
}

/// Collects every colour/size availability entry under `product.detail`.
///
/// `detail` may be a single object or an array of them. Sizes are read from
/// `detail.colors[*].sizes[*]` and, for layouts without colour grouping,
/// from `detail.sizes[*]`.
pub(crate) fn collect_variants(state: &Value) -> Vec<VariantAvailability> {
    let Some(detail) = state.pointer("/product/detail") else {
        return Vec::new();
    };
    let details: Vec<&Value> = match detail {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut variants = Vec::new();
    for detail in details {
        if let Some(colors) = detail.get("colors").and_then(Value::as_array) {
            for color in colors {
                let color_label = label(color);
                variants.extend(
                    sizes(color).map(|size| to_variant(color_label.clone(), size)),
                );
            }
        }
        variants.extend(sizes(detail).map(|size| to_variant(None, size)));
    }
    variants
}

fn sizes(parent: &Value) -> impl Iterator<Item = &Value> {
    parent
        .get("sizes")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|s| s.is_object())
}

fn to_variant(color_label: Option<String>, size: &Value) -> VariantAvailability {
    VariantAvailability {
        color_label,
        size_label: label(size),
        raw_availability_code: size
            .get("availability")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase(),
    }
}

/// `name` when present, otherwise the `id` rendered as text.
fn label(node: &Value) -> Option<String> {
    node.get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            node.get("id").and_then(|v| {
                v.as_str()
                    .map(str::to_string)
                    .or_else(|| v.as_i64().map(|n| n.to_string()))
            })
        })
}
