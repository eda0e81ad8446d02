//! Key merge strategies.
//!
//! Every strategy the classifier can select is a [`KeyMerger`]. Custom
//! mergers registered in [`MergeOptions`] use the same trait, so callers can
//! plug in their own behavior for a key, including recursing back into the
//! merger through the options they are handed.

use super::dedupe::dedupe;
use super::merger::merge_value;
use super::options::MergeOptions;
use serde_json::{Map, Value};

/// Merges the values found under one key of the base and overlay objects.
///
/// `base` is `None` when the base object does not have the key. The overlay
/// value is always present: keys missing from the overlay keep the base
/// value without consulting any strategy.
pub trait KeyMerger: Send + Sync {
    fn merge(&self, base: Option<&Value>, overlay: &Value, options: &MergeOptions) -> Value;
}

/// Overlay value wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Replace;

impl KeyMerger for Replace {
    fn merge(&self, _base: Option<&Value>, overlay: &Value, _options: &MergeOptions) -> Value {
        overlay.clone()
    }
}

/// Base items followed by overlay items. Non-array overlays replace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Concat;

impl KeyMerger for Concat {
    fn merge(&self, base: Option<&Value>, overlay: &Value, _options: &MergeOptions) -> Value {
        match overlay {
            Value::Array(items) => Value::Array(concat(base, items)),
            _ => overlay.clone(),
        }
    }
}

/// Concatenation with first-wins identity de-duplication. Non-array
/// overlays replace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dedupe;

impl KeyMerger for Dedupe {
    fn merge(&self, base: Option<&Value>, overlay: &Value, _options: &MergeOptions) -> Value {
        match overlay {
            Value::Array(items) => Value::Array(dedupe(&concat(base, items))),
            _ => overlay.clone(),
        }
    }
}

/// Recursive merge of a section, treating a missing or non-object base as
/// an empty object.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepMerge;

impl KeyMerger for DeepMerge {
    fn merge(&self, base: Option<&Value>, overlay: &Value, options: &MergeOptions) -> Value {
        let empty = Value::Object(Map::new());
        let base = match base {
            Some(value @ Value::Object(_)) => value,
            _ => &empty,
        };
        merge_value(Some(base), overlay, options)
    }
}

/// Overlay wins when truthy, otherwise the base is kept.
///
/// Falsy means `null`, `false`, `0` or the empty string. Empty arrays and
/// objects count as values and still replace the base.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferOverlay;

impl KeyMerger for PreferOverlay {
    fn merge(&self, base: Option<&Value>, overlay: &Value, _options: &MergeOptions) -> Value {
        match base {
            Some(base) if !is_truthy(overlay) => base.clone(),
            _ => overlay.clone(),
        }
    }
}

/// Adapter for closures of the form `(base, overlay) -> merged`.
pub struct FnMerger<F>(pub F);

impl<F> KeyMerger for FnMerger<F>
where
    F: Fn(Option<&Value>, &Value) -> Value + Send + Sync,
{
    fn merge(&self, base: Option<&Value>, overlay: &Value, _options: &MergeOptions) -> Value {
        (self.0)(base, overlay)
    }
}

/// Items of `base` when it is an array, nothing otherwise.
pub(crate) fn to_array(base: Option<&Value>) -> &[Value] {
    match base {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

pub(crate) fn concat(base: Option<&Value>, overlay: &[Value]) -> Vec<Value> {
    let base = to_array(base);
    let mut combined = Vec::with_capacity(base.len() + overlay.len());
    combined.extend_from_slice(base);
    combined.extend_from_slice(overlay);
    combined
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
