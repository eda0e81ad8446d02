//! Merge options: array strategy, per-key strategy sets and custom mergers.

use super::strategy::{DeepMerge, FnMerger, KeyMerger, PreferOverlay};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Fields that identify a location page. Values present in the overlay are
/// copied onto the merged tree verbatim after the merge.
pub const DEFAULT_IDENTITY_KEYS: &[&str] =
    &["slug", "city", "stateCode", "state", "postalCode", "urlPath"];

/// Keys the location preset always replaces.
pub const LOCATION_REPLACE_KEYS: &[&str] = &[
    "slug",
    "city",
    "stateCode",
    "state",
    "postalCode",
    "urlPath",
    "latitude",
    "longitude",
    "affiliateRef",
    "employee",
];

/// Keys the location preset concatenates (base first).
pub const LOCATION_CONCAT_KEYS: &[&str] =
    &["neighborhoods", "landmarks", "localConditions", "keywords"];

/// Keys the location preset de-duplicates by identity key.
pub const LOCATION_DEDUPE_KEYS: &[&str] = &["images", "faqs"];

/// How arrays under an unclassified key are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayStrategy {
    /// Overlay array replaces base array.
    Replace,
    /// Base items followed by overlay items.
    Concat,
    /// Concatenate, then drop later items sharing an identity key.
    Dedupe,
    /// Dedupe identity-bearing arrays, replace everything else.
    #[default]
    Smart,
}

impl ArrayStrategy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Some(ArrayStrategy::Replace),
            "concat" => Some(ArrayStrategy::Concat),
            "dedupe" => Some(ArrayStrategy::Dedupe),
            "smart" => Some(ArrayStrategy::Smart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArrayStrategy::Replace => "replace",
            ArrayStrategy::Concat => "concat",
            ArrayStrategy::Dedupe => "dedupe",
            ArrayStrategy::Smart => "smart",
        }
    }
}

impl fmt::Display for ArrayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options controlling a merge.
///
/// Cheap to clone: custom mergers are reference counted, so one options value
/// can be built once and reused for every location.
#[derive(Clone)]
pub struct MergeOptions {
    /// Array behavior for keys that fall through to the smart default.
    pub array_strategy: ArrayStrategy,
    /// Keys whose overlay value always replaces the base value.
    pub replace_keys: BTreeSet<String>,
    /// Keys whose arrays are concatenated, base first.
    pub concat_keys: BTreeSet<String>,
    /// Keys whose concatenated arrays are de-duplicated.
    pub dedupe_keys: BTreeSet<String>,
    /// Keys whose merge is fully owned by a custom merger.
    pub custom_mergers: BTreeMap<String, Arc<dyn KeyMerger>>,
    /// Root fields pinned to the overlay's value after merging.
    pub identity_keys: Vec<String>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            array_strategy: ArrayStrategy::default(),
            replace_keys: BTreeSet::new(),
            concat_keys: BTreeSet::new(),
            dedupe_keys: BTreeSet::new(),
            custom_mergers: BTreeMap::new(),
            identity_keys: DEFAULT_IDENTITY_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl fmt::Debug for MergeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeOptions")
            .field("array_strategy", &self.array_strategy)
            .field("replace_keys", &self.replace_keys)
            .field("concat_keys", &self.concat_keys)
            .field("dedupe_keys", &self.dedupe_keys)
            .field("custom_mergers", &self.custom_mergers.keys().collect::<Vec<_>>())
            .field("identity_keys", &self.identity_keys)
            .finish()
    }
}

impl MergeOptions {
    /// Options with the smart array strategy, no keyed strategies and the
    /// default identity keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// The preset used for merging the main site config into location pages.
    ///
    /// `seo` and `hero` deep-merge, the remaining sections are taken from the
    /// location when it provides a truthy value.
    pub fn location_defaults() -> Self {
        let mut options = Self::new()
            .with_replace_keys(LOCATION_REPLACE_KEYS.iter().copied())
            .with_concat_keys(LOCATION_CONCAT_KEYS.iter().copied())
            .with_dedupe_keys(LOCATION_DEDUPE_KEYS.iter().copied())
            .with_custom_merger("seo", DeepMerge)
            .with_custom_merger("hero", DeepMerge);
        for key in ["header", "reviewsSection", "ops", "serviceArea", "schemaOrg"] {
            options = options.with_custom_merger(key, PreferOverlay);
        }
        options
    }

    /// Options that behave like a plain layered-config merge: objects
    /// recurse, everything else is replaced and nothing is pinned.
    pub fn replace_arrays() -> Self {
        Self::new()
            .with_array_strategy(ArrayStrategy::Replace)
            .with_identity_keys(std::iter::empty::<&str>())
    }

    pub fn with_array_strategy(mut self, strategy: ArrayStrategy) -> Self {
        self.array_strategy = strategy;
        self
    }

    pub fn with_replace_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replace_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_concat_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.concat_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_dedupe_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dedupe_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Replace the identity key list.
    pub fn with_identity_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identity_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Register a merger that owns the merge of `key`.
    pub fn with_custom_merger<M>(mut self, key: impl Into<String>, merger: M) -> Self
    where
        M: KeyMerger + 'static,
    {
        self.custom_mergers.insert(key.into(), Arc::new(merger));
        self
    }

    /// Register a closure `(base, overlay) -> merged` for `key`.
    pub fn with_custom_fn<F>(self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(Option<&Value>, &Value) -> Value + Send + Sync + 'static,
    {
        self.with_custom_merger(key, FnMerger(f))
    }

    /// Drop a key from every strategy set and the custom merger table.
    pub fn without_key(mut self, key: &str) -> Self {
        self.replace_keys.remove(key);
        self.concat_keys.remove(key);
        self.dedupe_keys.remove(key);
        self.custom_mergers.remove(key);
        self
    }

    pub fn custom_merger(&self, key: &str) -> Option<&Arc<dyn KeyMerger>> {
        self.custom_mergers.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = MergeOptions::default();
        assert_eq!(options.array_strategy, ArrayStrategy::Smart);
        assert!(options.replace_keys.is_empty());
        assert!(options.custom_mergers.is_empty());
        assert_eq!(options.identity_keys.len(), DEFAULT_IDENTITY_KEYS.len());
    }

    #[test]
    fn test_location_defaults() {
        let options = MergeOptions::location_defaults();
        assert!(options.replace_keys.contains("latitude"));
        assert!(options.concat_keys.contains("keywords"));
        assert!(options.dedupe_keys.contains("faqs"));
        assert!(options.custom_merger("seo").is_some());
        assert!(options.custom_merger("schemaOrg").is_some());
        assert!(options.custom_merger("images").is_none());
    }

    #[test]
    fn test_without_key() {
        let options = MergeOptions::location_defaults()
            .without_key("keywords")
            .without_key("seo");
        assert!(!options.concat_keys.contains("keywords"));
        assert!(options.custom_merger("seo").is_none());
    }

    #[test]
    fn test_array_strategy_parse() {
        assert_eq!(ArrayStrategy::from_str("Concat"), Some(ArrayStrategy::Concat));
        assert_eq!(ArrayStrategy::from_str(" smart "), Some(ArrayStrategy::Smart));
        assert_eq!(ArrayStrategy::from_str("merge"), None);
        assert_eq!(ArrayStrategy::Dedupe.to_string(), "dedupe");
    }

    #[test]
    fn test_array_strategy_serde() {
        let strategy: ArrayStrategy = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(strategy, ArrayStrategy::Replace);
        assert_eq!(serde_json::to_string(&ArrayStrategy::Smart).unwrap(), "\"smart\"");
    }
}
