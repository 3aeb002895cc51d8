//! Plain-text summaries for the terminal.
//!
//! Markers are ASCII (`[OK]`, `[X]`) so the output renders on any console.

use crate::reconcile::{format_coverage, PathValidation, UnmappedAnalysis};
use std::path::Path;

const RULE_WIDTH: usize = 60;
/// Invalid entries echoed after a validation run.
pub const EXAMPLE_LIMIT: usize = 10;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn unmapped_summary(analysis: &UnmappedAnalysis, report: &Path) -> String {
    let mut lines = vec![
        "Analysis complete:".to_string(),
        format!("Total vocabulary tags: {}", analysis.total_tags),
        format!("Mapped tags: {}", analysis.mapped_tags),
        format!("Unmapped tags: {}", analysis.unmapped_tags.len()),
        format!("Coverage: {}", format_coverage(analysis.coverage)),
        format!("Unused folders: {}", analysis.unused_folders.len()),
    ];
    lines.push(String::new());
    lines.push("Coverage by category:".to_string());
    for (category, stat) in &analysis.coverage_by_category {
        lines.push(format!("  {}: {}", category, stat));
    }
    lines.push("Coverage by file:".to_string());
    for (file, stat) in &analysis.coverage_by_file {
        lines.push(format!("  {}: {}", file, stat));
    }
    if !analysis.extra_mapped_tags.is_empty() {
        lines.push(format!(
            "Mapped tags missing from vocabulary: {}",
            analysis.extra_mapped_tags.len()
        ));
    }
    lines.push(String::new());
    lines.push(format!("Report generated: {}", report.display()));
    lines.join("\n")
}

pub fn validation_summary(validation: &PathValidation, report: &Path) -> String {
    let mut lines = vec![
        "Validation complete!".to_string(),
        format!("Invalid paths found: {}", validation.invalid.len()),
        format!("Report generated: {}", report.display()),
        String::new(),
    ];
    for check in &validation.files {
        if check.passed() {
            lines.push(format!(
                "[OK] {} ({} folder references)",
                check.file, check.references
            ));
        } else {
            lines.push(format!(
                "[X] {} ({} of {} folder references invalid)",
                check.file, check.invalid, check.references
            ));
        }
    }
    if validation.has_invalid() {
        lines.push(String::new());
        lines.push("Some examples of invalid paths:".to_string());
        for r in validation.invalid.iter().take(EXAMPLE_LIMIT) {
            lines.push(format!("  {} (from {})", r.folder, r.source));
        }
    }
    lines.join("\n")
}

/// Per-file pass/fail listing followed by the overall summary.
pub fn verification_summary(validation: &PathValidation) -> String {
    let mut lines = vec![rule(), "FOLDER MAPPING VERIFICATION".to_string(), rule()];

    for check in &validation.files {
        lines.push(String::new());
        lines.push(format!("Checking {}...", check.file));
        if check.references == 0 {
            lines.push(format!("  No mappings found in {}", check.file));
        } else if check.passed() {
            lines.push(format!(
                "  [OK] All {} folder references are valid",
                check.references
            ));
        } else {
            lines.push(format!(
                "  [X] Found {} invalid folder references",
                check.invalid
            ));
        }
    }

    let invalid_count: usize = validation.files.iter().map(|f| f.invalid).sum();
    lines.push(String::new());
    lines.extend([rule(), "SUMMARY REPORT".to_string(), rule()]);
    lines.push(format!("Total tag mappings: {}", validation.total_mappings));
    lines.push(format!("Total folder references: {}", validation.total_references));
    lines.push(format!(
        "Valid folder references: {}",
        validation.total_references - invalid_count
    ));
    lines.push(format!("Invalid folder references: {}", invalid_count));

    if validation.has_invalid() {
        lines.push(String::new());
        lines.push("[X] INVALID FOLDER REFERENCES:".to_string());
        for (source, refs) in validation.invalid_by_source() {
            lines.push(String::new());
            lines.push(format!("{}:", source));
            for r in refs {
                lines.push(format!("  - Tag '{}' -> '{}'", r.tag, r.folder));
            }
        }
        lines.push(String::new());
        lines.push("MISSING FOLDERS THAT NEED TO BE CREATED:".to_string());
        for folder in &validation.missing_folders {
            lines.push(format!("  - {}", folder));
        }
    } else {
        lines.push(String::new());
        lines.push("[OK] ALL FOLDER MAPPINGS ARE VALID!".to_string());
    }

    if !validation.unused_folders.is_empty() {
        lines.push(String::new());
        lines.push("UNUSED FOLDERS (not referenced by any mappings):".to_string());
        for folder in &validation.unused_folders {
            lines.push(format!("  - {}", folder));
        }
    }

    lines.join("\n")
}
