//! Set algebra over the aggregates.
//!
//! Everything is held in ordered collections so that renderings are stable
//! between runs.

use crate::aggregate::{Mappings, Taxonomy, Vocabulary};
use crate::config::PriorityConfig;
use crate::models::{tag_category, InvalidReference};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Percentage of vocabulary tags with at least one mapping.
///
/// `None` when the vocabulary is empty.
pub fn coverage(mapped: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(mapped as f64 / total as f64 * 100.0)
    }
}

pub fn format_coverage(value: Option<f64>) -> String {
    match value {
        Some(pct) => format!("{:.1}%", pct),
        None => "no data".to_string(),
    }
}

/// Mapped share of one slice of the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageStat {
    pub total: usize,
    pub mapped: usize,
    pub coverage: Option<f64>,
}

impl CoverageStat {
    fn new(total: usize, mapped: usize) -> Self {
        Self {
            total,
            mapped,
            coverage: coverage(mapped, total),
        }
    }
}

impl std::fmt::Display for CoverageStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} ({})",
            self.mapped,
            self.total,
            format_coverage(self.coverage)
        )
    }
}

pub fn group_by_category<'a, I>(tags: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for tag in tags {
        groups
            .entry(tag_category(tag).to_string())
            .or_default()
            .push(tag.clone());
    }
    for list in groups.values_mut() {
        list.sort();
    }
    groups
}

#[derive(Debug, Clone)]
pub struct PriorityFilter {
    prefixes: Vec<String>,
    limit: usize,
}

impl PriorityFilter {
    pub fn new(cfg: &PriorityConfig) -> Self {
        Self {
            prefixes: cfg.prefixes.clone(),
            limit: cfg.limit,
        }
    }

    /// Literal prefix test; `keyword:weather:rain` does not match `keyword:sfx:`.
    pub fn is_high_priority(&self, tag: &str) -> bool {
        self.prefixes.iter().any(|p| tag.starts_with(p.as_str()))
    }

    /// All matching tags in sorted order, before the display cap.
    pub fn select<'a, I>(&self, tags: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut selected: Vec<String> = tags
            .into_iter()
            .filter(|t| self.is_high_priority(t))
            .cloned()
            .collect();
        selected.sort();
        selected
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnmappedAnalysis {
    pub total_tags: usize,
    pub mapped_tags: usize,
    pub unmapped_tags: BTreeSet<String>,
    pub coverage: Option<f64>,
    /// Tags mapped to folders but absent from the vocabulary.
    pub extra_mapped_tags: BTreeSet<String>,
    pub by_category: BTreeMap<String, Vec<String>>,
    /// Every vocabulary category, including fully mapped ones.
    pub coverage_by_category: BTreeMap<String, CoverageStat>,
    /// Per vocabulary file, configured order.
    pub coverage_by_file: Vec<(String, CoverageStat)>,
    /// Per vocabulary file, configured order; files with nothing unmapped are kept.
    pub by_source: Vec<(String, Vec<String>)>,
    pub total_folders: usize,
    pub used_folders: usize,
    pub unused_folders: BTreeSet<String>,
    /// Sorted and capped at the priority limit.
    pub high_priority: Vec<String>,
    pub high_priority_total: usize,
}

pub fn analyze_unmapped(
    vocabulary: &Vocabulary,
    taxonomy: &Taxonomy,
    mappings: &Mappings,
    priority: &PriorityFilter,
) -> UnmappedAnalysis {
    let mapped: BTreeSet<&str> = mappings.tags();
    let mapped_folders: BTreeSet<&str> = mappings.folders();

    let unmapped_tags: BTreeSet<String> = vocabulary
        .tags
        .iter()
        .filter(|t| !mapped.contains(t.as_str()))
        .cloned()
        .collect();
    let extra_mapped_tags: BTreeSet<String> = mapped
        .iter()
        .filter(|t| !vocabulary.tags.contains(**t))
        .map(|t| t.to_string())
        .collect();
    let mapped_in_vocab = vocabulary.tags.len() - unmapped_tags.len();

    let mut category_counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for tag in &vocabulary.tags {
        let counts = category_counts
            .entry(tag_category(tag).to_string())
            .or_default();
        counts.0 += 1;
        if mapped.contains(tag.as_str()) {
            counts.1 += 1;
        }
    }
    let coverage_by_category = category_counts
        .into_iter()
        .map(|(category, (total, hits))| (category, CoverageStat::new(total, hits)))
        .collect();

    let coverage_by_file = vocabulary
        .by_file
        .iter()
        .map(|(file, tags)| {
            let hits = tags.iter().filter(|t| mapped.contains(t.as_str())).count();
            (file.clone(), CoverageStat::new(tags.len(), hits))
        })
        .collect();

    let by_source = vocabulary
        .by_file
        .iter()
        .map(|(file, tags)| {
            let unmapped: Vec<String> = tags
                .iter()
                .filter(|t| unmapped_tags.contains(*t))
                .cloned()
                .collect();
            (file.clone(), unmapped)
        })
        .collect();

    let unused_folders: BTreeSet<String> = taxonomy
        .folders
        .iter()
        .filter(|f| !mapped_folders.contains(f.as_str()))
        .cloned()
        .collect();

    let mut high_priority = priority.select(&unmapped_tags);
    let high_priority_total = high_priority.len();
    high_priority.truncate(priority.limit());

    UnmappedAnalysis {
        total_tags: vocabulary.tags.len(),
        mapped_tags: mapped_in_vocab,
        coverage: coverage(mapped_in_vocab, vocabulary.tags.len()),
        by_category: group_by_category(&unmapped_tags),
        coverage_by_category,
        coverage_by_file,
        unmapped_tags,
        extra_mapped_tags,
        by_source,
        total_folders: taxonomy.folders.len(),
        used_folders: mapped_folders.len(),
        unused_folders,
        high_priority,
        high_priority_total,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileCheck {
    pub file: String,
    /// Mapping entries declared in the file.
    pub mappings: usize,
    /// Folder references across those entries.
    pub references: usize,
    pub invalid: usize,
}

impl FileCheck {
    pub fn passed(&self) -> bool {
        self.invalid == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PathValidation {
    pub valid_paths: usize,
    /// Distinct folders referenced by any mapping.
    pub mapped_paths: usize,
    pub total_mappings: usize,
    pub total_references: usize,
    pub invalid: BTreeSet<InvalidReference>,
    /// Distinct invalid folders; these would need to be created.
    pub missing_folders: BTreeSet<String>,
    pub used_folders: BTreeSet<String>,
    pub unused_folders: BTreeSet<String>,
    pub files: Vec<FileCheck>,
}

impl PathValidation {
    pub fn has_invalid(&self) -> bool {
        !self.invalid.is_empty()
    }

    pub fn invalid_by_source(&self) -> BTreeMap<&str, Vec<&InvalidReference>> {
        let mut grouped: BTreeMap<&str, Vec<&InvalidReference>> = BTreeMap::new();
        for r in &self.invalid {
            grouped.entry(r.source.as_str()).or_default().push(r);
        }
        grouped
    }
}

pub fn validate_paths(taxonomy: &Taxonomy, mappings: &Mappings) -> PathValidation {
    let mut invalid = BTreeSet::new();
    let mut used_folders = BTreeSet::new();
    let mut files = Vec::new();

    for file in &mappings.files {
        let mut check = FileCheck {
            file: file.clone(),
            mappings: 0,
            references: 0,
            invalid: 0,
        };
        let mut entries = BTreeSet::new();
        for record in mappings.for_file(file) {
            entries.insert(record.entry);
            check.references += 1;
            if taxonomy.folders.contains(&record.folder) {
                used_folders.insert(record.folder.clone());
            } else {
                check.invalid += 1;
                invalid.insert(InvalidReference {
                    source: record.source.clone(),
                    folder: record.folder.clone(),
                    tag: record.tag.clone(),
                });
            }
        }
        check.mappings = entries.len();
        files.push(check);
    }

    let missing_folders = invalid.iter().map(|r| r.folder.clone()).collect();
    let unused_folders = taxonomy
        .folders
        .difference(&used_folders)
        .cloned()
        .collect();

    PathValidation {
        valid_paths: taxonomy.folders.len(),
        mapped_paths: mappings.folders().len(),
        total_mappings: files.iter().map(|f| f.mappings).sum(),
        total_references: mappings.records.len(),
        invalid,
        missing_folders,
        used_folders,
        unused_folders,
        files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MappingRecord;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn record(tag: &str, folder: &str, source: &str) -> MappingRecord {
        MappingRecord {
            tag: tag.to_string(),
            folder: folder.to_string(),
            confidence: Some(5),
            description: None,
            source: source.to_string(),
            entry: 0,
        }
    }

    fn mappings(records: Vec<MappingRecord>) -> Mappings {
        let files: BTreeSet<String> = records.iter().map(|r| r.source.clone()).collect();
        Mappings {
            records,
            files: files.into_iter().collect(),
            issues: Vec::new(),
        }
    }

    fn vocabulary(tags: &[&str]) -> Vocabulary {
        Vocabulary {
            tags: set(tags),
            by_file: vec![("genre_vocabulary.rs".to_string(), set(tags))],
            issues: Vec::new(),
        }
    }

    fn taxonomy(folders: &[&str]) -> Taxonomy {
        Taxonomy {
            folders: set(folders),
            ..Taxonomy::default()
        }
    }

    #[test]
    fn priority_prefixes_match_literally() {
        let filter = PriorityFilter::new(&PriorityConfig::default());
        assert!(filter.is_high_priority("occasion:combat"));
        assert!(filter.is_high_priority("genre:rock"));
        assert!(filter.is_high_priority("keyword:sfx:door"));
        assert!(!filter.is_high_priority("keyword:weather:rain"));
        assert!(!filter.is_high_priority("standalone"));
    }

    #[test]
    fn high_priority_is_sorted_and_capped() {
        let filter = PriorityFilter::new(&PriorityConfig {
            limit: 2,
            ..PriorityConfig::default()
        });
        let vocab = vocabulary(&["mood:tense", "genre:rock", "occasion:combat", "misc"]);
        let analysis = analyze_unmapped(&vocab, &taxonomy(&[]), &mappings(vec![]), &filter);
        assert_eq!(analysis.high_priority, vec!["genre:rock", "mood:tense"]);
        assert_eq!(analysis.high_priority_total, 3);
    }

    #[test]
    fn groups_by_category_with_other_bucket() {
        let groups = group_by_category(&set(&["genre:rock:classic", "standalone", "genre:blues"]));
        assert_eq!(groups["genre"], vec!["genre:blues", "genre:rock:classic"]);
        assert_eq!(groups["other"], vec!["standalone"]);
    }

    #[test]
    fn unmapped_and_mapped_are_disjoint() {
        let vocab = vocabulary(&["genre:rock", "mood:tense", "occasion:combat"]);
        let maps = mappings(vec![
            record("genre:rock", "Music/Rock", "genre_mappings.rs"),
            record("keyword:unknown", "Music/Rock", "genre_mappings.rs"),
        ]);
        let filter = PriorityFilter::new(&PriorityConfig::default());
        let tax = taxonomy(&["Music/Rock", "Moods/Tension"]);
        let analysis = analyze_unmapped(&vocab, &tax, &maps, &filter);

        let mapped = maps.tags();
        assert!(analysis.unmapped_tags.iter().all(|t| !mapped.contains(t.as_str())));
        assert_eq!(analysis.unmapped_tags, set(&["mood:tense", "occasion:combat"]));
        assert_eq!(analysis.mapped_tags, 1);
        assert_eq!(analysis.extra_mapped_tags, set(&["keyword:unknown"]));
        assert_eq!(analysis.unused_folders, set(&["Moods/Tension"]));
        assert_eq!(
            analysis.by_source,
            vec![(
                "genre_vocabulary.rs".to_string(),
                vec!["mood:tense".to_string(), "occasion:combat".to_string()]
            )]
        );
    }

    #[test]
    fn full_mapping_gives_full_coverage() {
        let vocab = vocabulary(&["genre:rock", "mood:tense"]);
        let maps = mappings(vec![
            record("genre:rock", "A/B", "m.rs"),
            record("mood:tense", "A/B", "m.rs"),
        ]);
        let filter = PriorityFilter::new(&PriorityConfig::default());
        let analysis = analyze_unmapped(&vocab, &taxonomy(&["A/B"]), &maps, &filter);
        assert!(analysis.unmapped_tags.is_empty());
        assert_eq!(format_coverage(analysis.coverage), "100.0%");
    }

    #[test]
    fn coverage_is_broken_down_by_category_and_file() {
        let genres = set(&["genre:rock", "genre:jazz", "genre:folk"]);
        let vocab = Vocabulary {
            tags: set(&["genre:rock", "genre:jazz", "genre:folk", "mood:tense"]),
            by_file: vec![
                ("genre_vocabulary.rs".to_string(), genres),
                ("mood_vocabulary.rs".to_string(), set(&["mood:tense"])),
                ("empty_vocabulary.rs".to_string(), BTreeSet::new()),
            ],
            issues: Vec::new(),
        };
        let maps = mappings(vec![
            record("genre:rock", "A/B", "m.rs"),
            record("mood:tense", "A/B", "m.rs"),
        ]);
        let filter = PriorityFilter::new(&PriorityConfig::default());
        let analysis = analyze_unmapped(&vocab, &taxonomy(&["A/B"]), &maps, &filter);

        assert_eq!(analysis.coverage_by_category["genre"].to_string(), "1/3 (33.3%)");
        assert_eq!(analysis.coverage_by_category["mood"].to_string(), "1/1 (100.0%)");
        let files: Vec<(&str, String)> = analysis
            .coverage_by_file
            .iter()
            .map(|(f, s)| (f.as_str(), s.to_string()))
            .collect();
        assert_eq!(
            files,
            vec![
                ("genre_vocabulary.rs", "1/3 (33.3%)".to_string()),
                ("mood_vocabulary.rs", "1/1 (100.0%)".to_string()),
                ("empty_vocabulary.rs", "0/0 (no data)".to_string()),
            ]
        );
    }

    #[test]
    fn empty_vocabulary_has_no_coverage() {
        assert_eq!(coverage(0, 0), None);
        assert_eq!(format_coverage(coverage(3, 0)), "no data");
        assert_eq!(format_coverage(coverage(1, 3)), "33.3%");
    }

    #[test]
    fn invalid_folders_are_detected_against_taxonomy() {
        let tax = taxonomy(&["A/B", "C/D"]);
        let maps = mappings(vec![
            record("genre:rock", "A/B", "genre_mappings.rs"),
            record("mood:tense", "X/Y", "mood_mappings.rs"),
        ]);
        let validation = validate_paths(&tax, &maps);

        assert_eq!(validation.missing_folders, set(&["X/Y"]));
        assert!(validation.used_folders.contains("A/B"));
        assert_eq!(validation.unused_folders, set(&["C/D"]));
        let grouped = validation.invalid_by_source();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["mood_mappings.rs"][0].tag, "mood:tense");

        let checks: Vec<(bool, usize)> = validation
            .files
            .iter()
            .map(|f| (f.passed(), f.references))
            .collect();
        assert_eq!(checks, vec![(true, 1), (false, 1)]);
    }

    #[test]
    fn mapping_entries_are_counted_apart_from_references() {
        let maps = mappings(vec![
            record("genre:rock", "A/B", "genre_mappings.rs"),
            record("genre:rock", "C/D", "genre_mappings.rs"),
            MappingRecord {
                entry: 1,
                ..record("genre:jazz", "A/B", "genre_mappings.rs")
            },
        ]);
        let validation = validate_paths(&taxonomy(&["A/B", "C/D"]), &maps);
        assert_eq!(validation.total_mappings, 2);
        assert_eq!(validation.total_references, 3);
        assert_eq!(validation.files[0].mappings, 2);
        assert_eq!(validation.files[0].references, 3);
    }
}
