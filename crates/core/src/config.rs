use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sources: SourcesConfig,
    pub reports: ReportConfig,
    pub priority: PriorityConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyMode {
    /// Only `("path", parent, icon, "description")` entries.
    Strict,
    /// Any quoted string containing `/`.
    Heuristic,
    /// Strict, falling back to heuristic when nothing matches.
    #[default]
    Auto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Base directory; relative entries below resolve against it.
    pub data_dir: PathBuf,
    pub vocabulary_files: Vec<String>,
    pub taxonomy_file: String,
    pub taxonomy_mode: TaxonomyMode,
    pub mapping_dir: String,
    /// Glob matched against file names inside `mapping_dir`.
    pub mapping_pattern: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("src-tauri/src/data"),
            vocabulary_files: vec![
                "genre_vocabulary.rs".to_string(),
                "mood_vocabulary.rs".to_string(),
                "occasion_vocabulary.rs".to_string(),
                "keyword_vocabulary.rs".to_string(),
            ],
            taxonomy_file: "folder_structure.rs".to_string(),
            taxonomy_mode: TaxonomyMode::Auto,
            mapping_dir: "tag_mappings".to_string(),
            mapping_pattern: "*.rs".to_string(),
        }
    }
}

impl SourcesConfig {
    pub fn resolve(&self, entry: &str) -> PathBuf {
        let p = Path::new(entry);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.data_dir.join(p)
        }
    }

    pub fn vocabulary_paths(&self) -> Vec<PathBuf> {
        self.vocabulary_files.iter().map(|f| self.resolve(f)).collect()
    }

    pub fn taxonomy_path(&self) -> PathBuf {
        self.resolve(&self.taxonomy_file)
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.resolve(&self.mapping_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub unmapped_report: PathBuf,
    pub invalid_report: PathBuf,
    /// Append the static mapping strategy checklist.
    pub include_strategy: bool,
    /// Number of valid paths listed for reference in the invalid report.
    pub sample_paths: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            unmapped_report: PathBuf::from("new_tags_to_add.md"),
            invalid_report: PathBuf::from("invalid_folder_paths.md"),
            include_strategy: true,
            sample_paths: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityConfig {
    /// Literal prefixes; a tag is high priority if it starts with any of them.
    pub prefixes: Vec<String>,
    /// Display cap for the high priority excerpt.
    pub limit: usize,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            prefixes: [
                "occasion:",
                "keyword:sfx:",
                "keyword:loc:",
                "keyword:creature:",
                "keyword:biome:",
                "mood:",
                "genre:",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            limit: 50,
        }
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(config::Environment::with_prefix("TAGMAP").separator("__"));
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
