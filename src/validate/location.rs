//! Location page rules on top of the generic required/recommended check.

use super::{ValidationReport, lookup, validate};
use crate::merge::find_duplicates;
use regex_lite::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Fields every location page must carry.
pub const DEFAULT_REQUIRED_FIELDS: &[&str] =
    &["slug", "city", "stateCode", "state", "postalCode", "urlPath"];

/// Fields a location page should carry.
pub const DEFAULT_RECOMMENDED_FIELDS: &[&str] = &[
    "seo.title",
    "seo.description",
    "seo.canonicalPath",
    "hero.h1",
    "images",
    "faqs",
    "neighborhoods",
    "localConditions",
    "header.businessName",
    "header.phoneDisplay",
];

const ZIP_PATTERN: &str = r"^\d{5}(-\d{4})?$";

/// String fields checked against a pattern when present.
const FORMAT_RULES: &[(&str, &str, &str)] = &[
    (
        "slug",
        r"^[a-z0-9-]+$",
        "Slug must contain only lowercase letters, numbers, and hyphens",
    ),
    ("stateCode", r"^[A-Z]{2}$", "State code must be 2 uppercase letters"),
    ("postalCode", ZIP_PATTERN, "Postal code must be valid ZIP format"),
    ("urlPath", r"^/.*/$", "URL path must start and end with /"),
    ("seo.canonicalPath", r"^/", "Canonical path must start with /"),
    (
        "header.phoneE164",
        r"^\+[1-9]\d{1,14}$",
        "Phone must be in E.164 format (e.g., +1234567890)",
    ),
];

/// [`FORMAT_RULES`] with each pattern compiled once.
static FORMAT_CHECKS: LazyLock<Vec<(&str, Regex, &str)>> = LazyLock::new(|| {
    FORMAT_RULES
        .iter()
        .map(|(path, pattern, message)| {
            let re = Regex::new(pattern).expect("format rule pattern is valid");
            (*path, re, *message)
        })
        .collect()
});

static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ZIP_PATTERN).expect("ZIP pattern is valid"));

/// Numeric fields checked against an inclusive range when present.
const RANGE_RULES: &[(&str, f64, f64)] = &[
    ("latitude", -90.0, 90.0),
    ("longitude", -180.0, 180.0),
    ("pricingModifierPct", -0.5, 1.0),
];

/// Validator for merged location pages.
#[derive(Debug, Clone)]
pub struct LocationValidator {
    pub required_fields: Vec<String>,
    pub recommended_fields: Vec<String>,
    /// Run pattern and range checks on present fields.
    pub check_formats: bool,
    /// Warn about duplicate images and FAQs.
    pub check_duplicates: bool,
}

impl Default for LocationValidator {
    fn default() -> Self {
        Self {
            required_fields: DEFAULT_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
            recommended_fields: DEFAULT_RECOMMENDED_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            check_formats: true,
            check_duplicates: true,
        }
    }
}

impl LocationValidator {
    pub fn validate(&self, merged: &Value) -> ValidationReport {
        let base = validate(merged, &self.required_fields, &self.recommended_fields);

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.check_formats {
            check_formats(merged, &mut errors);
            check_pricing(merged, &mut warnings);
        }
        if self.check_duplicates {
            check_duplicates(merged, &mut warnings);
        }
        check_hero_images(merged, &mut warnings);

        base.combine(ValidationReport::new(errors, warnings))
    }
}

/// Validate a merged location page with the default rules.
pub fn validate_location(merged: &Value) -> ValidationReport {
    LocationValidator::default().validate(merged)
}

fn check_formats(merged: &Value, errors: &mut Vec<String>) {
    for (path, re, message) in FORMAT_CHECKS.iter() {
        match lookup(merged, path) {
            // Blank values are reported by the required/recommended pass.
            None | Some(Value::Null) => {}
            Some(Value::String(text)) if text.is_empty() => {}
            Some(Value::String(text)) => {
                if !re.is_match(text) {
                    errors.push(format!("{}: {}", path, message));
                }
            }
            Some(_) => errors.push(format!("{}: must be a string", path)),
        }
    }

    for (path, min, max) in RANGE_RULES {
        match lookup(merged, path) {
            None | Some(Value::Null) => {}
            Some(Value::Number(n)) => {
                if let Some(value) = n.as_f64()
                    && !(*min..=*max).contains(&value)
                {
                    errors.push(format!("{}: must be between {} and {}", path, min, max));
                }
            }
            Some(_) => errors.push(format!("{}: must be a number", path)),
        }
    }

    if let Some(Value::Array(codes)) = lookup(merged, "serviceArea.postalCodes") {
        for code in codes {
            let valid = code.as_str().is_some_and(|c| ZIP_RE.is_match(c));
            if !valid {
                errors.push(format!(
                    "serviceArea.postalCodes: {} is not a valid ZIP code",
                    code
                ));
            }
        }
    }
}

fn check_pricing(merged: &Value, warnings: &mut Vec<String>) {
    let Some(pct) = lookup(merged, "pricingModifierPct").and_then(Value::as_f64) else {
        return;
    };
    if pct > 0.5 {
        warnings.push(format!(
            "High pricing modifier ({:.1}%) - ensure this is intentional",
            pct * 100.0
        ));
    }
    if pct < -0.2 {
        warnings.push(format!(
            "Negative pricing modifier ({:.1}%) - ensure this is intentional",
            pct * 100.0
        ));
    }
}

fn check_duplicates(merged: &Value, warnings: &mut Vec<String>) {
    if let Some(Value::Array(images)) = merged.get("images") {
        let duplicates: Vec<String> = find_duplicates(images)
            .into_iter()
            .map(|(index, key)| format!("Image {}: {}", index, key))
            .collect();
        if !duplicates.is_empty() {
            warnings.push(format!("Duplicate images found: {}", duplicates.join(", ")));
        }
    }

    if let Some(Value::Array(faqs)) = merged.get("faqs") {
        let duplicates: Vec<String> = find_duplicates(faqs)
            .into_iter()
            .map(|(index, key)| {
                let question = faqs[index]
                    .get("q")
                    .or_else(|| faqs[index].get("question"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or(key);
                format!("FAQ {}: {}", index, question)
            })
            .collect();
        if !duplicates.is_empty() {
            warnings.push(format!("Duplicate FAQs found: {}", duplicates.join(", ")));
        }
    }
}

fn check_hero_images(merged: &Value, warnings: &mut Vec<String>) {
    let Some(Value::Array(images)) = merged.get("images") else {
        return;
    };
    let heroes = images
        .iter()
        .filter(|img| img.get("role").and_then(Value::as_str) == Some("hero"))
        .count();
    match heroes {
        0 => warnings.push(
            "No hero images found - consider adding images with role=\"hero\"".to_string(),
        ),
        1 => {}
        _ => warnings.push("Multiple hero images found - ensure carousel is implemented".to_string()),
    }
}
