//! Recursive merge of a base tree with an overlay tree.
//!
//! The merge never fails. Shape mismatches between base and overlay resolve
//! to the overlay value, and inputs are only ever borrowed: every result is a
//! fresh tree, so one base can be merged with many overlays.

use super::classify::{Strategy, classify};
use super::dedupe::{dedupe, has_identity};
use super::options::{ArrayStrategy, MergeOptions};
use super::strategy::{Concat, Dedupe, KeyMerger, Replace, concat};
use serde_json::{Map, Value};
use tracing::trace;

/// Merge `overlay` onto `base`.
///
/// - No overlay: the base is returned (or `{}` when both are absent)
/// - No base: the overlay is returned
/// - Objects merge key by key using the classified strategy for each key
/// - Two arrays merge as a de-duplicated concatenation
/// - Anything else: the overlay wins
///
/// When both roots are objects, the identity keys listed in `options` are
/// copied from the overlay onto the result afterwards, so a custom merger can
/// never alter them.
///
/// # Example
/// ```
/// use serde_json::json;
/// use location_merge::merge::{MergeOptions, merge};
///
/// let base = json!({"seo": {"title": "Main", "keywords": ["a", "b"]}});
/// let overlay = json!({"seo": {"title": "Location", "keywords": ["c"]}});
/// let options = MergeOptions::new().with_concat_keys(["keywords"]);
///
/// let merged = merge(Some(&base), Some(&overlay), &options);
/// assert_eq!(merged, json!({"seo": {"title": "Location", "keywords": ["a", "b", "c"]}}));
/// ```
pub fn merge(base: Option<&Value>, overlay: Option<&Value>, options: &MergeOptions) -> Value {
    let Some(overlay) = overlay else {
        return base.cloned().unwrap_or_else(|| Value::Object(Map::new()));
    };

    let mut merged = merge_value(base, overlay, options);
    if let (Value::Object(result), Value::Object(source)) = (&mut merged, overlay) {
        pin_identity_fields(result, source, &options.identity_keys);
    }
    merged
}

/// Merge two trees that are both present.
pub fn merge_trees(base: &Value, overlay: &Value, options: &MergeOptions) -> Value {
    merge(Some(base), Some(overlay), options)
}

/// Fold `merge` over `layers`; later layers take precedence.
pub fn merge_all<'a, I>(layers: I, options: &MergeOptions) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    layers
        .into_iter()
        .fold(Value::Object(Map::new()), |acc, layer| {
            merge(Some(&acc), Some(layer), options)
        })
}

/// Recursive step. Identity pinning is left to the root call.
pub(crate) fn merge_value(base: Option<&Value>, overlay: &Value, options: &MergeOptions) -> Value {
    match (base, overlay) {
        (None, _) => overlay.clone(),
        (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
            Value::Object(merge_objects(base_map, overlay_map, options))
        }
        (Some(Value::Array(base_items)), Value::Array(overlay_items)) => {
            let mut combined = base_items.clone();
            combined.extend_from_slice(overlay_items);
            Value::Array(dedupe(&combined))
        }
        // Primitives, null and mismatched shapes: overlay wins.
        (Some(_), _) => overlay.clone(),
    }
}

fn merge_objects(
    base: &Map<String, Value>,
    overlay: &Map<String, Value>,
    options: &MergeOptions,
) -> Map<String, Value> {
    let mut result = base.clone();

    for (key, overlay_value) in overlay {
        let base_value = base.get(key);
        let strategy = classify(key, options);
        trace!(key = %key, strategy = %strategy, "merging key");

        let merged = match strategy {
            Strategy::CustomMerge => match options.custom_merger(key) {
                Some(merger) => merger.merge(base_value, overlay_value, options),
                None => overlay_value.clone(),
            },
            Strategy::Replace => Replace.merge(base_value, overlay_value, options),
            Strategy::Concat => Concat.merge(base_value, overlay_value, options),
            Strategy::Dedupe => Dedupe.merge(base_value, overlay_value, options),
            Strategy::SmartDefault => smart_default(base_value, overlay_value, options),
        };
        result.insert(key.clone(), merged);
    }

    result
}

/// Merge for keys without an explicit strategy, decided by the overlay's
/// shape.
fn smart_default(base: Option<&Value>, overlay: &Value, options: &MergeOptions) -> Value {
    match overlay {
        Value::Array(items) => match options.array_strategy {
            ArrayStrategy::Replace => overlay.clone(),
            ArrayStrategy::Concat => Value::Array(concat(base, items)),
            ArrayStrategy::Dedupe => Value::Array(dedupe(&concat(base, items))),
            ArrayStrategy::Smart if is_identity_bearing(items) => {
                Value::Array(dedupe(&concat(base, items)))
            }
            ArrayStrategy::Smart => overlay.clone(),
        },
        Value::Object(_) => merge_value(base, overlay, options),
        _ => overlay.clone(),
    }
}

/// A non-empty array whose every item is a string or an object carrying one
/// of the recognized identity fields.
fn is_identity_bearing(items: &[Value]) -> bool {
    const IDENTITY_FIELDS: &[&str] = &["role", "id", "slug", "title", "name"];

    !items.is_empty()
        && items.iter().all(|item| match item {
            Value::String(_) => true,
            Value::Object(map) => {
                has_identity(item) && IDENTITY_FIELDS.iter().any(|f| map.contains_key(*f))
            }
            _ => false,
        })
}

fn pin_identity_fields(
    result: &mut Map<String, Value>,
    overlay: &Map<String, Value>,
    identity_keys: &[String],
) {
    for key in identity_keys {
        if let Some(value) = overlay.get(key) {
            result.insert(key.clone(), value.clone());
        }
    }
}
