//! Per-key strategy selection.

use super::options::MergeOptions;
use std::fmt;

/// Merge strategy chosen for a single object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// A registered custom merger owns the key.
    CustomMerge,
    /// Overlay value replaces base value.
    Replace,
    /// Base array followed by overlay array.
    Concat,
    /// Concatenation with identity-key de-duplication.
    Dedupe,
    /// Decided by the shape of the overlay value.
    SmartDefault,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::CustomMerge => write!(f, "custom"),
            Strategy::Replace => write!(f, "replace"),
            Strategy::Concat => write!(f, "concat"),
            Strategy::Dedupe => write!(f, "dedupe"),
            Strategy::SmartDefault => write!(f, "smart"),
        }
    }
}

/// Pick the strategy for `key`.
///
/// First match wins: custom merger, concat, replace, dedupe, then the smart
/// default. Concat outranks replace so a key listed in both still
/// concatenates.
pub fn classify(key: &str, options: &MergeOptions) -> Strategy {
    if options.custom_mergers.contains_key(key) {
        Strategy::CustomMerge
    } else if options.concat_keys.contains(key) {
        Strategy::Concat
    } else if options.replace_keys.contains(key) {
        Strategy::Replace
    } else if options.dedupe_keys.contains(key) {
        Strategy::Dedupe
    } else {
        Strategy::SmartDefault
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_unknown_key_is_smart_default() {
        let options = MergeOptions::default();
        assert_eq!(classify("anything", &options), Strategy::SmartDefault);
    }

    #[test]
    fn test_custom_merger_wins_over_sets() {
        let options = MergeOptions::new()
            .with_concat_keys(["hero"])
            .with_replace_keys(["hero"])
            .with_custom_fn("hero", |_base: Option<&Value>, overlay: &Value| overlay.clone());
        assert_eq!(classify("hero", &options), Strategy::CustomMerge);
    }

    #[test]
    fn test_concat_wins_over_replace() {
        let options = MergeOptions::new()
            .with_replace_keys(["keywords"])
            .with_concat_keys(["keywords"]);
        assert_eq!(classify("keywords", &options), Strategy::Concat);
    }

    #[test]
    fn test_replace_wins_over_dedupe() {
        let options = MergeOptions::new()
            .with_dedupe_keys(["images"])
            .with_replace_keys(["images"]);
        assert_eq!(classify("images", &options), Strategy::Replace);
    }

    #[test]
    fn test_dedupe_key() {
        let options = MergeOptions::new().with_dedupe_keys(["faqs"]);
        assert_eq!(classify("faqs", &options), Strategy::Dedupe);
        assert_eq!(classify("faq", &options), Strategy::SmartDefault);
    }

    #[test]
    fn test_location_preset_classification() {
        let options = MergeOptions::location_defaults();
        assert_eq!(classify("seo", &options), Strategy::CustomMerge);
        assert_eq!(classify("neighborhoods", &options), Strategy::Concat);
        assert_eq!(classify("slug", &options), Strategy::Replace);
        assert_eq!(classify("images", &options), Strategy::Dedupe);
        assert_eq!(classify("brand", &options), Strategy::SmartDefault);
    }
}
