//! Output formatting for merged trees, reports and statistics.

use crate::location::MergeStatistics;
use crate::validate::ValidationReport;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

/// Serialize `value` as pretty JSON or YAML.
///
/// Markdown has no generic tree rendering and falls back to JSON.
pub fn render_value<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Json | OutputFormat::Markdown => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Format a validation report as markdown.
pub fn format_report_markdown(path: &Path, report: &ValidationReport) -> String {
    let mut md = String::new();

    let status = if report.is_valid() { "valid" } else { "invalid" };
    md.push_str(&format!("## {}\n", path.display()));
    md.push_str(&format!("- **status**: {}\n", status));
    md.push_str(&format!("- **errors**: {}\n", report.errors().len()));
    md.push_str(&format!("- **warnings**: {}\n", report.warnings().len()));

    if !report.errors().is_empty() {
        md.push_str("\n### Errors\n");
        for error in report.errors() {
            md.push_str(&format!("- {}\n", error));
        }
    }

    if !report.warnings().is_empty() {
        md.push_str("\n### Warnings\n");
        for warning in report.warnings() {
            md.push_str(&format!("- {}\n", warning));
        }
    }

    md
}

/// Format merge statistics as markdown.
pub fn format_statistics_markdown(path: &Path, stats: &MergeStatistics) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Merge statistics: {}\n", path.display()));

    let sections: [(&str, &[String]); 5] = [
        ("From base", &stats.fields_from_main),
        ("From location", &stats.fields_from_location),
        ("Merged", &stats.fields_merged),
        ("Arrays concatenated", &stats.arrays_concatenated),
        ("Arrays de-duplicated", &stats.arrays_deduplicated),
    ];

    for (title, keys) in sections {
        if keys.is_empty() {
            continue;
        }
        let keys: Vec<String> = keys.iter().map(|k| format!("`{}`", k)).collect();
        md.push_str(&format!("- **{}** ({}): {}\n", title, keys.len(), keys.join(", ")));
    }

    if stats.is_empty() {
        md.push_str("- no fields\n");
    }

    md
}
