//! Non-throwing validation of merged trees.
//!
//! Required fields produce errors, recommended fields produce warnings.
//! Only errors affect [`ValidationReport::is_valid`].

pub mod location;

use serde::Serialize;
use serde_json::Value;

pub use location::{
    DEFAULT_RECOMMENDED_FIELDS, DEFAULT_REQUIRED_FIELDS, LocationValidator, validate_location,
};

/// Outcome of validating a merged tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// A failed report carrying a single error.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::new(vec![error.into()], Vec::new())
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Combine two reports, keeping `self`'s findings first.
    pub fn combine(self, other: ValidationReport) -> Self {
        let mut errors = self.errors;
        errors.extend(other.errors);
        let mut warnings = self.warnings;
        warnings.extend(other.warnings);
        Self::new(errors, warnings)
    }
}

/// Check `merged` for required and recommended fields.
///
/// Paths are dotted (`seo.title`). A required field is missing when absent,
/// `null` or an empty string. A recommended field is also missing when it is
/// an empty array or object.
pub fn validate<R, W>(merged: &Value, required_fields: &[R], recommended_fields: &[W]) -> ValidationReport
where
    R: AsRef<str>,
    W: AsRef<str>,
{
    let errors = required_fields
        .iter()
        .map(|field| field.as_ref())
        .filter(|path| is_blank(lookup(merged, path)))
        .map(|path| format!("Missing required field: {}", path))
        .collect();

    let warnings = recommended_fields
        .iter()
        .map(|field| field.as_ref())
        .filter(|path| is_empty(lookup(merged, path)))
        .map(describe_missing)
        .collect();

    ValidationReport::new(errors, warnings)
}

/// Resolve a dotted path through nested objects.
pub fn lookup<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(tree, |node, segment| node.as_object()?.get(segment))
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        other => is_blank(other),
    }
}

/// Warning text for a missing recommended field.
fn describe_missing(path: &str) -> String {
    let message = match path {
        "images" => "No images provided",
        "faqs" => "No FAQs provided - consider adding location-specific FAQs",
        "neighborhoods" => "No neighborhoods listed - consider adding local neighborhoods for SEO",
        "localConditions" => {
            "No local conditions listed - consider adding location-specific conditions"
        }
        "landmarks" => "No landmarks listed",
        "seo.title" => "Missing SEO title",
        "seo.description" => "Missing SEO description",
        "seo.canonicalPath" => "No canonical path specified - using urlPath as fallback",
        "hero.h1" => "Missing hero headline",
        "header.businessName" => "No business name in header - using fallback",
        "header.phoneDisplay" => "No phone display format in header - using fallback",
        _ => return format!("Missing recommended field: {}", path),
    };
    message.to_string()
}
