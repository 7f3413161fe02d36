//! Tier 2: keyword heuristics for pages without a usable state block.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

/// An availability signal found by keyword matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Signal {
    pub in_stock: bool,
    /// The text that matched, kept for logs.
    pub evidence: String,
}

static SCRIPT_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?P<pos>"in_stock"\s*:\s*true|"availability"\s*:\s*"(?:in stock|available|https?://schema\.org/(?:InStock|LimitedAvailability))")|(?P<neg>"in_stock"\s*:\s*false|"availability"\s*:\s*"(?:out of stock|unavailable|https?://schema\.org/(?:OutOfStock|SoldOut|Discontinued))")"#,
    )
    .expect("valid regex")
});

static INLINE_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script:not([src])").expect("valid selector"));

/// Phrases that mean the product cannot be bought. Checked before
/// [`POSITIVE_PHRASES`].
const NEGATIVE_PHRASES: [&str; 8] = [
    "tükendi",
    "stokta yok",
    "stokta bulunmuyor",
    "ürün bulunamadı",
    "out of stock",
    "sold out",
    "product not found",
    "currently unavailable",
];

const POSITIVE_PHRASES: [&str; 4] = ["sepete ekle", "add to bag", "add to cart", "sepete at"];

/// Scans inline scripts in document order. Within a script the earliest
/// explicit flag wins, whether positive or negative.
pub(crate) fn scan_script_flags(document: &Html) -> Option<Signal> {
    document.select(&INLINE_SCRIPT).find_map(|script| {
        let text: String = script.text().collect();
        let caps = SCRIPT_FLAG.captures(&text)?;
        Some(Signal {
            in_stock: caps.name("pos").is_some(),
            evidence: caps[0].to_string(),
        })
    })
}

/// Scans the visible page text. Negative phrases win over positive ones
/// regardless of where they appear.
pub(crate) fn scan_page_text(document: &Html) -> Option<Signal> {
    let text = visible_text(document);
    first_phrase(&text, &NEGATIVE_PHRASES, false)
        .or_else(|| first_phrase(&text, &POSITIVE_PHRASES, true))
}

fn first_phrase(text: &str, phrases: &[&str], in_stock: bool) -> Option<Signal> {
    phrases
        .iter()
        .find(|p| text.contains(&fold_case(p)))
        .map(|p| Signal {
            in_stock,
            evidence: (*p).to_string(),
        })
}

/// Lowercases and folds the Turkish dotted/dotless `i` pair to plain `i`,
/// so `BULUNAMADI` and `bulunamadı` compare equal.
pub(crate) fn fold_case(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'I' | 'İ' | 'ı' => 'i',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

/// Case-folded text (see [`fold_case`]) of every node outside `script`/
/// `style`/`noscript`/`template`, with whitespace collapsed to single spaces.
pub(crate) fn visible_text(document: &Html) -> String {
    let mut raw = String::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value().as_element().is_some_and(|e| {
                matches!(e.name(), "script" | "style" | "noscript" | "template")
            })
        });
        if !hidden {
            raw.push_str(text);
            raw.push(' ');
        }
    }
    fold_case(&raw.split_whitespace().collect::<Vec<_>>().join(" "))
}
