//! Property-based tests for merge invariants.

use location_merge::merge::{MergeOptions, dedupe, item_key, merge};
use proptest::prelude::*;
use proptest::test_runner::Config;
use serde_json::{Map, Value, json};
use std::collections::HashSet;

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("slug".to_string()),
        Just("city".to_string()),
        Just("seo".to_string()),
        Just("images".to_string()),
        Just("faqs".to_string()),
        Just("keywords".to_string()),
        "[a-z]{1,5}",
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,6}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(arb_key(), inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn arb_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(arb_key(), arb_value(), 0..6)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()))
}

/// Items that always derive a content key.
fn arb_identified_items() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(
        prop_oneof![
            "[a-d]".prop_map(Value::from),
            ("[a-d]", "[a-z]{1,3}").prop_map(|(id, a)| json!({"id": id, "a": a})),
        ],
        0..6,
    )
}

fn keys_of(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| item_key(item, i))
        .collect()
}

fn all_options() -> Vec<MergeOptions> {
    vec![
        MergeOptions::new(),
        MergeOptions::location_defaults(),
        MergeOptions::replace_arrays(),
    ]
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn merge_never_panics(base in arb_value(), overlay in arb_value()) {
        for options in all_options() {
            let _ = merge(Some(&base), Some(&overlay), &options);
            let _ = merge(None, Some(&overlay), &options);
            let _ = merge(Some(&base), None, &options);
        }
    }

    #[test]
    fn merge_is_deterministic(base in arb_object(), overlay in arb_object()) {
        for options in all_options() {
            let first = merge(Some(&base), Some(&overlay), &options);
            let second = merge(Some(&base), Some(&overlay), &options);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn merge_leaves_inputs_untouched(base in arb_object(), overlay in arb_object()) {
        let base_before = base.clone();
        let overlay_before = overlay.clone();
        let _ = merge(Some(&base), Some(&overlay), &MergeOptions::location_defaults());
        prop_assert_eq!(base, base_before);
        prop_assert_eq!(overlay, overlay_before);
    }

    #[test]
    fn identity_fields_are_pinned(
        base in arb_object(),
        overlay in arb_object(),
        slug in "[a-z]{2}-[a-z]{3,8}",
    ) {
        let mut overlay = overlay;
        if let Value::Object(map) = &mut overlay {
            map.insert("slug".to_string(), Value::from(slug.clone()));
        }
        for options in [MergeOptions::new(), MergeOptions::location_defaults()] {
            let merged = merge(Some(&base), Some(&overlay), &options);
            prop_assert_eq!(&merged["slug"], &Value::from(slug.clone()));
        }
    }

    #[test]
    fn overlay_keys_survive_and_base_keys_remain(base in arb_object(), overlay in arb_object()) {
        let merged = merge(Some(&base), Some(&overlay), &MergeOptions::new());
        let merged = merged.as_object().unwrap();
        for key in base.as_object().unwrap().keys().chain(overlay.as_object().unwrap().keys()) {
            prop_assert!(merged.contains_key(key), "missing key {}", key);
        }
    }

    #[test]
    fn concat_length_is_sum(
        base_items in prop::collection::vec(arb_value(), 0..6),
        overlay_items in prop::collection::vec(arb_value(), 0..6),
    ) {
        let options = MergeOptions::new().with_concat_keys(["tags"]);
        let base = json!({"tags": base_items.clone()});
        let overlay = json!({"tags": overlay_items.clone()});

        let merged = merge(Some(&base), Some(&overlay), &options);

        let tags = merged["tags"].as_array().unwrap();
        prop_assert_eq!(tags.len(), base_items.len() + overlay_items.len());
        prop_assert_eq!(&tags[..base_items.len()], &base_items[..]);
    }

    #[test]
    fn dedupe_keeps_one_item_per_key(
        base_items in arb_identified_items(),
        overlay_items in arb_identified_items(),
    ) {
        let options = MergeOptions::new().with_dedupe_keys(["items"]);
        let base = json!({"items": base_items.clone()});
        let overlay = json!({"items": overlay_items.clone()});

        let merged = merge(Some(&base), Some(&overlay), &options);
        let items = merged["items"].as_array().unwrap();

        let mut combined = base_items.clone();
        combined.extend(overlay_items.iter().cloned());
        let distinct: HashSet<String> = keys_of(&combined).into_iter().collect();

        prop_assert!(items.len() <= base_items.len() + overlay_items.len());
        prop_assert_eq!(items.len(), distinct.len());
        let result_keys: HashSet<String> = keys_of(items).into_iter().collect();
        prop_assert_eq!(result_keys, distinct);
    }

    #[test]
    fn dedupe_is_first_wins(items in arb_identified_items()) {
        let deduped = dedupe(&items);
        for (i, kept) in deduped.iter().enumerate() {
            let key = item_key(kept, i);
            let first = items
                .iter()
                .enumerate()
                .find(|(j, item)| item_key(item, *j) == key)
                .map(|(_, item)| item);
            prop_assert_eq!(Some(kept), first);
        }
        prop_assert_eq!(dedupe(&deduped), deduped);
    }
}
