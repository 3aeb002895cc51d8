use serde::{Deserialize, Serialize};

/// Bucket for tags without a `:` separator.
pub const OTHER_CATEGORY: &str = "other";

/// Top-level category of a hierarchical tag (`genre:rock:classic` -> `genre`).
pub fn tag_category(tag: &str) -> &str {
    match tag.split_once(':') {
        Some((category, _)) => category,
        None => OTHER_CATEGORY,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub path: String,
    pub parent: Option<String>,
}

/// One tag -> folder assertion recovered from a mapping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub tag: String,
    pub folder: String,
    pub confidence: Option<i64>,
    pub description: Option<String>,
    /// File name the record came from.
    pub source: String,
    /// Index of the declaring tuple within `source`.
    pub entry: usize,
}

/// A mapping whose folder is not part of the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvalidReference {
    pub source: String,
    pub folder: String,
    pub tag: String,
}
