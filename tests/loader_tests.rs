//! Integration tests for loading trees from disk and tool configuration.

use location_merge::config::{CONFIG_FILE_NAME, ConfigLoader, ConfigPaths, ConfigTier};
use location_merge::error::SourceError;
use location_merge::merge::{ArrayStrategy, MergeOptions};
use location_merge::source::{
    LocationLoader, load_all_merged_locations, load_merged_location, read_tree,
};
use location_merge::validate::LocationValidator;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const BASE_YAML: &str = r#"
brand: Mobile Detail Hub
seo:
  title: Mobile Detailing
  description: We come to you
neighborhoods: [Downtown]
images:
  - role: hero
    url: /hero.jpg
"#;

const LOCATION_JSON: &str = r#"{
    "slug": "az-kingman",
    "city": "Kingman",
    "stateCode": "AZ",
    "state": "Arizona",
    "postalCode": "86401",
    "urlPath": "/az/kingman/",
    "seo": {"title": "Mobile Detailing Kingman, AZ"},
    "neighborhoods": ["Hualapai"],
    "images": [{"role": "hero", "url": "/hero.jpg", "alt": "duplicate"}]
}"#;

/// Helper to lay out a base file and a location directory.
fn site_dir() -> (TempDir, PathBuf, PathBuf) {
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("site.yaml");
    let locations = temp.path().join("locations");
    fs::create_dir_all(&locations).unwrap();
    fs::write(&base, BASE_YAML).unwrap();
    fs::write(locations.join("az-kingman.json"), LOCATION_JSON).unwrap();
    (temp, base, locations)
}

#[test]
fn yaml_base_and_json_location_merge() {
    let (_temp, base, locations) = site_dir();

    let merged = load_merged_location(
        &base,
        &locations.join("az-kingman.json"),
        &MergeOptions::location_defaults(),
        &LocationValidator::default(),
    )
    .unwrap();

    assert_eq!(merged.data["brand"], "Mobile Detail Hub");
    assert_eq!(merged.data["seo"]["title"], "Mobile Detailing Kingman, AZ");
    assert_eq!(merged.data["seo"]["description"], "We come to you");
    assert_eq!(
        merged.data["neighborhoods"],
        serde_json::json!(["Downtown", "Hualapai"])
    );
    assert_eq!(merged.data["images"].as_array().unwrap().len(), 1);
    assert!(merged.validation.is_valid());
    assert!(merged.statistics.fields_from_main.contains(&"brand".to_string()));
}

#[test]
fn load_all_shares_one_base() {
    let (_temp, base, locations) = site_dir();
    fs::write(
        locations.join("nv-laughlin.yaml"),
        "slug: nv-laughlin\ncity: Laughlin\n",
    )
    .unwrap();

    let paths = vec![
        locations.join("az-kingman.json"),
        locations.join("nv-laughlin.yaml"),
    ];
    let merged = load_all_merged_locations(
        &base,
        &paths,
        &MergeOptions::location_defaults(),
        &LocationValidator::default(),
    )
    .unwrap();

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[1].data["slug"], "nv-laughlin");
    assert_eq!(merged[1].data["brand"], "Mobile Detail Hub");
    assert!(!merged[1].validation.is_valid());
}

#[test]
fn non_object_root_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("list.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    let err = read_tree(&path).unwrap_err();
    assert!(matches!(err, SourceError::NotAnObject { .. }));
    assert_eq!(err.path(), path.as_path());
    assert!(err.to_string().contains("must contain an object"));
}

#[test]
fn parse_errors_name_the_format() {
    let temp = TempDir::new().unwrap();
    let json = temp.path().join("bad.json");
    let yaml = temp.path().join("bad.yml");
    fs::write(&json, "{\"slug\": ").unwrap();
    fs::write(&yaml, "slug: [unclosed").unwrap();

    assert!(matches!(read_tree(&json), Err(SourceError::Json { .. })));
    assert!(matches!(read_tree(&yaml), Err(SourceError::Yaml { .. })));
    assert!(matches!(
        read_tree(&temp.path().join("missing.json")),
        Err(SourceError::Read { .. })
    ));
}

#[test]
fn location_loader_caches_until_reload() {
    let (_temp, base, locations) = site_dir();
    let loader = LocationLoader::new(
        &base,
        MergeOptions::location_defaults(),
        LocationValidator::default(),
    );

    let results = loader.load_dir(&locations).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].1.is_ok());
    assert_eq!(loader.cached_count(), 1);

    fs::write(&base, "brand: Renamed\n").unwrap();
    let path = locations.join("az-kingman.json");
    // still cached
    assert_eq!(loader.load(&path).unwrap().data["brand"], "Mobile Detail Hub");

    loader.reload_base().unwrap();
    assert_eq!(loader.cached_count(), 0);
    assert_eq!(loader.load(&path).unwrap().data["brand"], "Renamed");
}

#[test]
fn failed_base_reload_keeps_previous_base() {
    let (_temp, base, locations) = site_dir();
    let loader = LocationLoader::new(
        &base,
        MergeOptions::location_defaults(),
        LocationValidator::default(),
    );
    loader.base().unwrap();

    fs::write(&base, "brand: [broken").unwrap();
    assert!(loader.reload_base().is_err());

    let merged = loader.load(&locations.join("az-kingman.json")).unwrap();
    assert_eq!(merged.data["brand"], "Mobile Detail Hub");
}

#[test]
fn config_tiers_feed_merge_options() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    let user = temp.path().join("user");
    fs::create_dir_all(&project).unwrap();
    fs::create_dir_all(&user).unwrap();
    fs::write(
        project.join(CONFIG_FILE_NAME),
        "merge:\n  array_strategy: concat\n  concat_keys: [badges]\n",
    )
    .unwrap();
    fs::write(
        user.join(CONFIG_FILE_NAME),
        "validation:\n  required_fields: [slug]\n",
    )
    .unwrap();

    let loader = ConfigLoader::load_with_paths(ConfigPaths::with_dirs(Some(project), Some(user)))
        .expect("Failed to load config");
    let tiers: Vec<ConfigTier> = loader.sources().iter().map(|(tier, _)| *tier).collect();
    assert_eq!(tiers, vec![ConfigTier::Project, ConfigTier::User]);

    let config = loader.config();
    assert_eq!(config.merge.array_strategy, ArrayStrategy::Concat);
    assert_eq!(config.validator().required_fields, vec!["slug".to_string()]);

    let options = config.merge_options();
    let merged = location_merge::merge(
        Some(&serde_json::json!({"badges": ["a"], "misc": [1]})),
        Some(&serde_json::json!({"badges": ["b"], "misc": [2]})),
        &options,
    );
    assert_eq!(merged["badges"], serde_json::json!(["a", "b"]));
    assert_eq!(merged["misc"], serde_json::json!([1, 2]));
}
