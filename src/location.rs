//! Merging the main site config into location pages.
//!
//! A location page starts from the platform-wide config and overrides it
//! with its own values. The identity fields of a location (slug, city, state,
//! postal code, url path) always come from the location file.

use crate::merge::{MergeOptions, merge, merge_all};
use serde::Serialize;
use serde_json::Value;

/// Merge `location` onto `main` with the location preset.
pub fn merge_location(main: &Value, location: &Value) -> Value {
    merge_location_with(main, location, &MergeOptions::location_defaults())
}

/// Merge `location` onto `main` with explicit options.
pub fn merge_location_with(main: &Value, location: &Value, options: &MergeOptions) -> Value {
    merge(Some(main), Some(location), options)
}

/// Apply several partial location layers on top of a base page, in order.
pub fn merge_location_layers(base: &Value, layers: &[Value]) -> Value {
    let options = MergeOptions::location_defaults();
    merge_all(std::iter::once(base).chain(layers), &options)
}

/// Where the top-level fields of a merged page came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStatistics {
    /// Fields only the main config provided.
    pub fields_from_main: Vec<String>,
    /// Fields the location provided.
    pub fields_from_location: Vec<String>,
    /// Objects present in both inputs and merged.
    pub fields_merged: Vec<String>,
    /// Arrays longer than either input array.
    pub arrays_concatenated: Vec<String>,
    /// Arrays shorter than both inputs combined.
    pub arrays_deduplicated: Vec<String>,
}

impl MergeStatistics {
    pub fn is_empty(&self) -> bool {
        self.fields_from_main.is_empty() && self.fields_from_location.is_empty()
    }
}

/// Compare a merged page with its inputs, top-level keys only.
pub fn merge_statistics(main: &Value, location: &Value, merged: &Value) -> MergeStatistics {
    let mut stats = MergeStatistics::default();
    let Some(merged_map) = merged.as_object() else {
        return stats;
    };

    for (key, merged_value) in merged_map {
        let main_value = main.get(key);
        let location_value = location.get(key);

        if location_value.is_some() {
            stats.fields_from_location.push(key.clone());
        } else if main_value.is_some() {
            stats.fields_from_main.push(key.clone());
        }

        if merged_value.is_object()
            && main_value.is_some_and(Value::is_object)
            && location_value.is_some_and(Value::is_object)
        {
            stats.fields_merged.push(key.clone());
        }

        if let Value::Array(items) = merged_value {
            let main_len = array_len(main_value);
            let location_len = array_len(location_value);
            if items.len() > main_len.max(location_len) {
                stats.arrays_concatenated.push(key.clone());
            } else if items.len() < main_len + location_len {
                stats.arrays_deduplicated.push(key.clone());
            }
        }
    }

    stats
}

fn array_len(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map_or(0, Vec::len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn main_config() -> Value {
        json!({
            "brand": "Mobile Detail Hub",
            "slug": "site",
            "urlPath": "/",
            "seo": {
                "title": "Premium Mobile Detailing",
                "keywords": ["mobile detailing", "car detailing"],
                "robots": "index,follow"
            },
            "hero": {"h1": "Professional Mobile Detailing", "sub": "We come to you"},
            "header": {"businessName": "Mobile Detail Hub"},
            "neighborhoods": ["Downtown"]
        })
    }

    fn location() -> Value {
        json!({
            "slug": "az-bullhead-city",
            "city": "Bullhead City",
            "urlPath": "/az/bullhead-city/",
            "seo": {"title": "Mobile Detailing Bullhead City, AZ", "keywords": ["Bullhead City AZ"]},
            "hero": {"h1": "Mobile Detailing in Bullhead City, AZ"},
            "header": null,
            "neighborhoods": ["Desert Foothills"],
            "images": [{"role": "hero", "url": "/h.png"}, {"role": "hero", "url": "/h.png"}]
        })
    }

    #[test]
    fn test_merge_location() {
        let merged = merge_location(&main_config(), &location());

        assert_eq!(merged["slug"], "az-bullhead-city");
        assert_eq!(merged["urlPath"], "/az/bullhead-city/");
        assert_eq!(merged["brand"], "Mobile Detail Hub");
        assert_eq!(merged["seo"]["title"], "Mobile Detailing Bullhead City, AZ");
        assert_eq!(merged["seo"]["robots"], "index,follow");
        assert_eq!(
            merged["seo"]["keywords"],
            json!(["mobile detailing", "car detailing", "Bullhead City AZ"])
        );
        assert_eq!(merged["hero"]["sub"], "We come to you");
        // null header keeps the main header
        assert_eq!(merged["header"]["businessName"], "Mobile Detail Hub");
        assert_eq!(merged["neighborhoods"], json!(["Downtown", "Desert Foothills"]));
        assert_eq!(merged["images"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_custom_options_replace_keywords() {
        let options = MergeOptions::location_defaults()
            .without_key("keywords")
            .with_replace_keys(["keywords"]);
        let merged = merge_location_with(&main_config(), &location(), &options);
        assert_eq!(merged["seo"]["keywords"], json!(["Bullhead City AZ"]));
    }

    #[test]
    fn test_merge_location_layers() {
        let base = location();
        let layers = vec![
            json!({"landmarks": ["Colorado River"]}),
            json!({"landmarks": ["Laughlin Bridge"], "city": "Bullhead"}),
        ];
        let merged = merge_location_layers(&base, &layers);
        assert_eq!(merged["landmarks"], json!(["Colorado River", "Laughlin Bridge"]));
        assert_eq!(merged["city"], "Bullhead");
        assert_eq!(merged["slug"], "az-bullhead-city");
    }

    #[test]
    fn test_merge_statistics() {
        let main = main_config();
        let loc = location();
        let merged = merge_location(&main, &loc);
        let stats = merge_statistics(&main, &loc, &merged);

        assert!(stats.fields_from_main.contains(&"brand".to_string()));
        assert!(stats.fields_from_location.contains(&"slug".to_string()));
        assert!(stats.fields_from_location.contains(&"header".to_string()));
        assert!(stats.fields_merged.contains(&"seo".to_string()));
        assert!(stats.fields_merged.contains(&"hero".to_string()));
        assert!(!stats.fields_merged.contains(&"header".to_string()));
        assert_eq!(stats.arrays_concatenated, vec!["neighborhoods".to_string()]);
        assert_eq!(stats.arrays_deduplicated, vec!["images".to_string()]);
    }

    #[test]
    fn test_statistics_of_non_object() {
        let stats = merge_statistics(&json!({}), &json!({}), &json!([1]));
        assert!(stats.is_empty());
    }
}
