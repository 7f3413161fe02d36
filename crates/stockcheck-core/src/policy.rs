//! Mapping from storefront availability codes to a purchasable signal.

/// Codes treated as "can be bought" when no override is configured.
///
/// `back_soon` and `coming_soon` are counted as available. This matches the
/// historical behaviour of the checker, not a confirmed business rule, which
/// is why the set is configurable.
pub const DEFAULT_POSITIVE_CODES: [&str; 4] = ["in_stock", "low_stock", "back_soon", "coming_soon"];

/// The set of availability codes that count toward an in-stock verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityPolicy {
    positive_codes: Vec<String>,
}

impl AvailabilityPolicy {
    /// Builds a policy from an explicit list of codes. Codes are trimmed,
    /// lowercased, and empty entries dropped.
    #[must_use]
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positive_codes: Vec<String> = codes
            .into_iter()
            .map(|c| c.as_ref().trim().to_ascii_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        positive_codes.dedup();
        Self { positive_codes }
    }

    /// Parses a comma-separated code list, e.g. `"in_stock,low_stock"`.
    #[must_use]
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Returns `true` when `code` is in the positive set (case-insensitive).
    #[must_use]
    pub fn is_positive(&self, code: &str) -> bool {
        let code = code.trim();
        self.positive_codes
            .iter()
            .any(|c| c.eq_ignore_ascii_case(code))
    }

    #[must_use]
    pub fn positive_codes(&self) -> &[String] {
        &self.positive_codes
    }
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POSITIVE_CODES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_counts_back_soon_and_coming_soon() {
        let policy = AvailabilityPolicy::default();
        assert!(policy.is_positive("in_stock"));
        assert!(policy.is_positive("low_stock"));
        assert!(policy.is_positive("back_soon"));
        assert!(policy.is_positive("coming_soon"));
        assert!(!policy.is_positive("out_of_stock"));
    }

    #[test]
    fn is_positive_ignores_case_and_whitespace() {
        let policy = AvailabilityPolicy::default();
        assert!(policy.is_positive("IN_STOCK"));
        assert!(policy.is_positive(" Low_Stock "));
    }

    #[test]
    fn from_csv_drops_blank_entries() {
        let policy = AvailabilityPolicy::from_csv("in_stock, ,LOW_STOCK,");
        assert_eq!(policy.positive_codes(), ["in_stock", "low_stock"]);
        assert!(!policy.is_positive("coming_soon"));
    }

    #[test]
    fn empty_policy_accepts_nothing() {
        let policy = AvailabilityPolicy::from_csv("");
        assert!(policy.positive_codes().is_empty());
        assert!(!policy.is_positive("in_stock"));
    }
}
