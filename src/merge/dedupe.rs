//! Identity-key de-duplication for array items.
//!
//! Two items are the same logical item when they derive the same identity
//! key. De-duplication is stable and first-wins: when base and overlay carry
//! the same item, the base copy survives.

use serde_json::Value;
use std::collections::HashSet;

/// Fields checked, in order, for the generic `{field}:{value}` key.
const NAMED_FIELDS: &[&str] = &["slug", "title", "name"];

/// Derive the identity key for `item` at `index` in the combined list.
pub fn item_key(item: &Value, index: usize) -> String {
    match item {
        Value::Object(map) => {
            let field = |name: &str| map.get(name).and_then(field_text);

            if let (Some(role), Some(url)) = (field("role"), field("url")) {
                return format!("{}:{}", role, url);
            }
            if let Some(id) = field("id") {
                return format!("id:{}", id);
            }
            if let Some(question) = field("question").or_else(|| field("q")) {
                return format!("faq:{}", question);
            }
            for name in NAMED_FIELDS {
                if let Some(value) = field(name) {
                    return format!("{}:{}", name, value);
                }
            }
            format!("index:{}", index)
        }
        Value::String(s) => format!("string:{}", s),
        _ => format!("index:{}", index),
    }
}

/// Whether `item` derives a key from its content rather than its position.
pub fn has_identity(item: &Value) -> bool {
    !item_key(item, 0).starts_with("index:")
}

/// Text of an identity field. Null, empty strings and containers carry no
/// identity.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Drop every item whose identity key was already seen.
pub fn dedupe(items: &[Value]) -> Vec<Value> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .enumerate()
        .filter(|(index, item)| seen.insert(item_key(item, *index)))
        .map(|(_, item)| item.clone())
        .collect()
}

/// Report the items `dedupe` would drop, as `(index, key)` pairs.
pub fn find_duplicates(items: &[Value]) -> Vec<(usize, String)> {
    let mut seen = HashSet::with_capacity(items.len());
    let mut duplicates = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let key = item_key(item, index);
        if !seen.insert(key.clone()) {
            duplicates.push((index, key));
        }
    }
    duplicates
}
