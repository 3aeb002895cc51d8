//! Markdown reports and the atomic writer for them.

use crate::aggregate::Taxonomy;
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::reconcile::{format_coverage, PathValidation, UnmappedAnalysis};
use crate::strategy::MAPPING_STRATEGY;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

#[derive(Default)]
struct Markdown(String);

impl Markdown {
    fn heading(&mut self, level: usize, text: &str) {
        self.0.push_str(&"#".repeat(level));
        self.0.push(' ');
        self.0.push_str(text);
        self.0.push_str("\n\n");
    }

    fn line(&mut self, text: &str) {
        self.0.push_str(text);
        self.0.push('\n');
    }

    fn blank(&mut self) {
        self.0.push('\n');
    }

    fn stat(&mut self, label: &str, value: impl std::fmt::Display) {
        self.line(&format!("- **{}**: {}", label, value));
    }

    fn code_items<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for item in items {
            self.line(&format!("- `{}`", item.as_ref()));
        }
    }
}

/// `sci-fi` -> `Sci-Fi`
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut start = true;
    for c in s.chars() {
        if start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        start = !c.is_alphabetic();
    }
    out
}

pub fn render_unmapped_report(analysis: &UnmappedAnalysis, settings: &ReportConfig) -> String {
    let mut md = Markdown::default();
    md.heading(1, "Unmapped Tags Analysis Report");
    md.line("Generated from vocabulary files analysis");
    md.blank();

    md.heading(2, "Summary");
    md.stat("Total vocabulary tags", analysis.total_tags);
    md.stat("Currently mapped tags", analysis.mapped_tags);
    md.stat("Unmapped tags", analysis.unmapped_tags.len());
    md.stat("Coverage", format_coverage(analysis.coverage));
    md.line("- **Coverage by category**:");
    for (category, stat) in &analysis.coverage_by_category {
        md.line(&format!("  - `{}`: {}", category, stat));
    }
    md.line("- **Coverage by file**:");
    for (file, stat) in &analysis.coverage_by_file {
        md.line(&format!("  - `{}`: {}", file, stat));
    }
    md.blank();
    md.stat("Total folder paths", analysis.total_folders);
    md.stat("Used folder paths", analysis.used_folders);
    md.stat("Unused folder paths", analysis.unused_folders.len());
    md.blank();

    md.heading(2, "Unmapped Tags by Category");
    for (category, tags) in &analysis.by_category {
        md.heading(3, &format!("{} Tags ({})", title_case(category), tags.len()));
        md.code_items(tags);
        md.blank();
    }

    md.heading(2, "Unmapped Tags by Source File");
    for (file, tags) in analysis.by_source.iter().filter(|(_, t)| !t.is_empty()) {
        md.heading(3, &format!("{} ({} unmapped)", file, tags.len()));
        md.code_items(tags);
        md.blank();
    }

    if !analysis.extra_mapped_tags.is_empty() {
        md.heading(2, "Extra Mapped Tags");
        md.line("These tags are mapped to folders but are not declared in any vocabulary file:");
        md.blank();
        md.code_items(&analysis.extra_mapped_tags);
        md.blank();
    }

    if !analysis.unused_folders.is_empty() {
        md.heading(2, "Unused Folder Paths");
        md.line(
            "These folder paths exist in the folder structure but are not used in any mappings:",
        );
        md.blank();
        md.code_items(&analysis.unused_folders);
        md.blank();
    }

    md.heading(2, "Recommendations");
    md.heading(3, "High Priority Tags to Map");
    if analysis.high_priority_total == 0 {
        md.line("Most high-priority tags appear to be mapped already.");
    } else {
        md.line("These unmapped tags are likely to be frequently used and should be prioritized:");
        md.blank();
        md.code_items(&analysis.high_priority);
        if analysis.high_priority_total > analysis.high_priority.len() {
            md.blank();
            md.line(&format!(
                "Showing {} of {} high priority tags.",
                analysis.high_priority.len(),
                analysis.high_priority_total
            ));
        }
    }

    if settings.include_strategy {
        md.blank();
        md.heading(3, "Mapping Strategy");
        for (i, (subject, advice)) in MAPPING_STRATEGY.iter().enumerate() {
            md.line(&format!("{}. **{}** - {}", i + 1, subject, advice));
        }
    }

    md.0
}

pub fn render_invalid_report(
    validation: &PathValidation,
    taxonomy: &Taxonomy,
    settings: &ReportConfig,
) -> String {
    let mut md = Markdown::default();
    md.heading(1, "Invalid Folder Paths Report");
    md.line("Generated from mapping files validation");
    md.blank();

    md.heading(2, "Summary");
    md.stat("Valid folder paths in structure", validation.valid_paths);
    md.stat("Mapped folder paths used", validation.mapped_paths);
    md.stat("Invalid folder references", validation.invalid.len());
    md.stat("Missing folders", validation.missing_folders.len());
    md.blank();

    if validation.has_invalid() {
        md.heading(2, "Invalid Folder Paths");
        md.line("These paths are used in mapping files but don't exist in the folder structure:");
        md.blank();
        for (source, refs) in validation.invalid_by_source() {
            md.heading(3, source);
            for r in refs {
                md.line(&format!("- `{}` (tag `{}`)", r.folder, r.tag));
            }
            md.blank();
        }

        md.heading(2, "Missing Folders");
        md.code_items(&validation.missing_folders);
        md.blank();
    } else {
        md.heading(2, "All Paths Valid");
        md.line("All folder paths used in mapping files exist in the folder structure.");
        md.blank();
    }

    md.heading(2, "Sample Valid Paths for Reference");
    md.line("Here are some valid folder paths from the folder structure:");
    md.blank();
    md.code_items(taxonomy.folders.iter().take(settings.sample_paths));

    md.0
}

/// Replaces `path` with `content` in one rename.
///
/// The content goes to a temporary file next to the target first, so an
/// interrupted run leaves any previous report intact.
pub fn write_report(path: &Path, content: &str) -> Result<(), ReportError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|source| ReportError::MissingDir {
        dir: dir.to_path_buf(),
        source,
    })?;
    let write_err = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    if let Some(perms) = report_permissions(path)? {
        tmp.as_file().set_permissions(perms).map_err(write_err)?;
    }
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    info!("Report generated: {}", path.display());
    Ok(())
}

/// Mode of the report being replaced, or `0o644` for a new one.
fn report_permissions(path: &Path) -> Result<Option<fs::Permissions>, ReportError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(new_file_permissions()),
        Err(source) => Err(ReportError::Write {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Mappings, Vocabulary};
    use crate::config::PriorityConfig;
    use crate::models::MappingRecord;
    use crate::reconcile::{analyze_unmapped, validate_paths, PriorityFilter};
    use std::collections::BTreeSet;
    use std::fs;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn fixture() -> (Vocabulary, Taxonomy, Mappings) {
        let tags = set(&["genre:rock", "mood:tense", "standalone", "keyword:weather:rain"]);
        let vocab = Vocabulary {
            tags: tags.clone(),
            by_file: vec![("genre_vocabulary.rs".into(), tags)],
            issues: vec![],
        };
        let taxonomy = Taxonomy {
            folders: set(&["A/B", "C/D"]),
            ..Taxonomy::default()
        };
        let mappings = Mappings {
            records: vec![MappingRecord {
                tag: "genre:rock".into(),
                folder: "X/Y".into(),
                confidence: Some(8),
                description: Some("rock".into()),
                source: "genre_mappings.rs".into(),
                entry: 0,
            }],
            files: vec!["genre_mappings.rs".into()],
            issues: vec![],
        };
        (vocab, taxonomy, mappings)
    }

    #[test]
    fn title_case_capitalises_each_word() {
        assert_eq!(title_case("genre"), "Genre");
        assert_eq!(title_case("sci-fi"), "Sci-Fi");
    }

    #[test]
    fn unmapped_report_sections() {
        let (vocab, taxonomy, mappings) = fixture();
        let filter = PriorityFilter::new(&PriorityConfig::default());
        let analysis = analyze_unmapped(&vocab, &taxonomy, &mappings, &filter);
        let report = render_unmapped_report(&analysis, &ReportConfig::default());

        assert!(report.starts_with("# Unmapped Tags Analysis Report\n"));
        assert!(report.contains("- **Coverage**: 25.0%"));
        assert!(report.contains("### Other Tags (1)\n\n- `standalone`"));
        assert!(report.contains("### genre_vocabulary.rs (3 unmapped)"));
        assert!(report.contains("## Unused Folder Paths"));
        assert!(report.contains("1. **Occasion tags** - Map to Session Structure folders"));
        assert!(!report.contains("## Extra Mapped Tags"));

        let high = report.split("### High Priority Tags to Map").nth(1).unwrap();
        assert!(high.contains("`mood:tense`"));
        assert!(!high.contains("keyword:weather:rain"));
    }

    #[test]
    fn strategy_block_can_be_omitted() {
        let (vocab, taxonomy, mappings) = fixture();
        let filter = PriorityFilter::new(&PriorityConfig::default());
        let analysis = analyze_unmapped(&vocab, &taxonomy, &mappings, &filter);
        let settings = ReportConfig {
            include_strategy: false,
            ..ReportConfig::default()
        };
        assert!(!render_unmapped_report(&analysis, &settings).contains("Mapping Strategy"));
    }

    #[test]
    fn empty_vocabulary_reports_no_data() {
        let filter = PriorityFilter::new(&PriorityConfig::default());
        let analysis = analyze_unmapped(
            &Vocabulary::default(),
            &Taxonomy::default(),
            &Mappings::default(),
            &filter,
        );
        let report = render_unmapped_report(&analysis, &ReportConfig::default());
        assert!(report.contains("- **Coverage**: no data"));
    }

    #[test]
    fn invalid_report_groups_by_source() {
        let (_, taxonomy, mappings) = fixture();
        let validation = validate_paths(&taxonomy, &mappings);
        let report = render_invalid_report(&validation, &taxonomy, &ReportConfig::default());
        assert!(report.contains("### genre_mappings.rs\n\n- `X/Y` (tag `genre:rock`)"));
        assert!(report.contains("## Missing Folders\n\n- `X/Y`"));
        assert!(report.contains("- `A/B`\n- `C/D`"));
    }

    #[test]
    fn invalid_report_all_valid() {
        let (_, taxonomy, _) = fixture();
        let validation = validate_paths(&taxonomy, &Mappings::default());
        let report = render_invalid_report(&validation, &taxonomy, &ReportConfig::default());
        assert!(report.contains("## All Paths Valid"));
        assert!(!report.contains("## Missing Folders"));
    }

    #[test]
    fn write_report_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        fs::write(&path, "old").unwrap();
        write_report(&path, "new\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn write_report_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        write_report(&path, "new\n").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn new_report_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        write_report(&path, "x").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn zero_priority_limit_still_reports_the_total() {
        let (vocab, taxonomy, mappings) = fixture();
        let filter = PriorityFilter::new(&PriorityConfig {
            limit: 0,
            ..PriorityConfig::default()
        });
        let analysis = analyze_unmapped(&vocab, &taxonomy, &mappings, &filter);
        let report = render_unmapped_report(&analysis, &ReportConfig::default());
        let high = report.split("### High Priority Tags to Map").nth(1).unwrap();
        assert!(!high.contains("appear to be mapped already"));
        assert!(high.contains("Showing 0 of 1 high priority tags."));
    }

    #[test]
    fn summary_lists_coverage_per_category_and_file() {
        let (mut vocab, taxonomy, mappings) = fixture();
        vocab.by_file.push(("mood_vocabulary.rs".into(), BTreeSet::new()));
        let filter = PriorityFilter::new(&PriorityConfig::default());
        let analysis = analyze_unmapped(&vocab, &taxonomy, &mappings, &filter);
        let report = render_unmapped_report(&analysis, &ReportConfig::default());
        assert!(report.contains("- **Coverage by category**:\n  - `genre`: 1/1 (100.0%)\n"));
        assert!(report.contains("  - `keyword`: 0/1 (0.0%)"));
        assert!(report.contains("  - `genre_vocabulary.rs`: 1/4 (25.0%)"));
        assert!(report.contains("  - `mood_vocabulary.rs`: 0/0 (no data)"));
    }

    #[test]
    fn write_report_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("report.md");
        let err = write_report(&path, "x").unwrap_err();
        assert!(matches!(err, ReportError::MissingDir { .. }));
        assert!(!path.exists());
    }
}
