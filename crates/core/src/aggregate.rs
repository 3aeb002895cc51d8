//! Runs the extractor over each configured input and folds the results.
//!
//! Every aggregate carries the [`SourceIssue`]s it ran into; a missing or
//! empty file is a warning and the remaining files are still processed.

use crate::config::{SourcesConfig, TaxonomyMode};
use crate::error::SourceIssue;
use crate::extractor::{extract_file, Record, Shape};
use crate::models::MappingRecord;
use globset::{Glob, GlobMatcher};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Vocabulary {
    pub tags: BTreeSet<String>,
    /// Per-file tag sets, in configured file order.
    pub by_file: Vec<(String, BTreeSet<String>)>,
    pub issues: Vec<SourceIssue>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Taxonomy {
    pub folders: BTreeSet<String>,
    pub parents: BTreeMap<String, Option<String>>,
    pub issues: Vec<SourceIssue>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Mappings {
    pub records: Vec<MappingRecord>,
    /// Every mapping file visited, in name order.
    pub files: Vec<String>,
    pub issues: Vec<SourceIssue>,
}

impl Mappings {
    pub fn tags(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.tag.as_str()).collect()
    }

    pub fn folders(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.folder.as_str()).collect()
    }

    pub fn for_file<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a MappingRecord> + 'a {
        self.records.iter().filter(move |r| r.source == file)
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extracts one file, turning read failures and empty results into issues.
fn extract_checked(path: &Path, shape: Shape, issues: &mut Vec<SourceIssue>) -> Vec<Record> {
    match extract_file(path, shape) {
        Ok(records) if records.is_empty() => {
            warn!("No records found in {}", path.display());
            issues.push(SourceIssue::Empty {
                path: path.to_path_buf(),
            });
            records
        }
        Ok(records) => records,
        Err(issue) => {
            issues.push(issue);
            Vec::new()
        }
    }
}

pub fn collect_vocabulary(sources: &SourcesConfig) -> Vocabulary {
    collect_vocabulary_from(&sources.vocabulary_paths())
}

pub fn collect_vocabulary_from(paths: &[PathBuf]) -> Vocabulary {
    let mut vocab = Vocabulary::default();
    for path in paths {
        let label = file_label(path);
        if !path.exists() {
            warn!("Warning: {} not found", label);
            vocab.issues.push(SourceIssue::Missing { path: path.clone() });
            continue;
        }
        let tags: BTreeSet<String> = extract_checked(path, Shape::Vocabulary, &mut vocab.issues)
            .into_iter()
            .filter_map(|r| match r {
                Record::Tag(t) => Some(t),
                _ => None,
            })
            .collect();
        info!("Found {} tags in {}", tags.len(), label);
        vocab.tags.extend(tags.iter().cloned());
        vocab.by_file.push((label, tags));
    }
    vocab
}

pub fn collect_taxonomy(sources: &SourcesConfig) -> Taxonomy {
    collect_taxonomy_from(&sources.taxonomy_path(), sources.taxonomy_mode)
}

pub fn collect_taxonomy_from(path: &Path, mode: TaxonomyMode) -> Taxonomy {
    let mut taxonomy = Taxonomy::default();
    let shape = match mode {
        TaxonomyMode::Heuristic => Shape::TaxonomyHeuristic,
        TaxonomyMode::Strict | TaxonomyMode::Auto => Shape::TaxonomyPath,
    };
    let mut records = match extract_file(path, shape) {
        Ok(r) => r,
        Err(issue) => {
            taxonomy.issues.push(issue);
            return taxonomy;
        }
    };
    if records.is_empty() && mode == TaxonomyMode::Auto {
        warn!(
            "No strict folder entries in {}, falling back to heuristic scan",
            path.display()
        );
        records = extract_file(path, Shape::TaxonomyHeuristic).unwrap_or_default();
    }
    if records.is_empty() {
        warn!("No folder paths found in {}", path.display());
        taxonomy.issues.push(SourceIssue::Empty {
            path: path.to_path_buf(),
        });
    }
    for record in records {
        if let Record::Folder(entry) = record {
            taxonomy.folders.insert(entry.path.clone());
            taxonomy
                .parents
                .entry(entry.path)
                .or_insert(entry.parent);
        }
    }
    info!(
        "Found {} folder paths in {}",
        taxonomy.folders.len(),
        file_label(path)
    );
    taxonomy
}

pub fn collect_mappings(sources: &SourcesConfig, shape: Shape) -> anyhow::Result<Mappings> {
    collect_mappings_from(&sources.mapping_path(), &sources.mapping_pattern, shape)
}

/// Extracts every file in `dir` whose name matches `pattern`.
///
/// Only an invalid glob is an error; a missing directory is an issue.
pub fn collect_mappings_from(dir: &Path, pattern: &str, shape: Shape) -> anyhow::Result<Mappings> {
    let matcher: GlobMatcher = Glob::new(pattern)?.compile_matcher();
    let mut mappings = Mappings::default();
    if !dir.is_dir() {
        warn!("Mapping directory {} not found", dir.display());
        mappings.issues.push(SourceIssue::Missing {
            path: dir.to_path_buf(),
        });
        return Ok(mappings);
    }

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Error reading mapping directory {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !matcher.is_match(entry.file_name()) {
            continue;
        }
        let path = entry.path();
        let label = file_label(path);
        let before = mappings.records.len();
        for record in extract_checked(path, shape, &mut mappings.issues) {
            if let Record::Mapping {
                tag,
                folder,
                confidence,
                description,
                entry,
            } = record
            {
                mappings.records.push(MappingRecord {
                    tag,
                    folder,
                    confidence,
                    description,
                    source: label.clone(),
                    entry,
                });
            }
        }
        info!(
            "Found {} mappings in {}",
            mappings.records.len() - before,
            label
        );
        mappings.files.push(label);
    }

    info!(
        "Found {} mapped tags and {} mapped folders",
        mappings.tags().len(),
        mappings.folders().len()
    );
    Ok(mappings)
}
