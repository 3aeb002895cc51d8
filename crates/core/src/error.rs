use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Non-fatal problem with one input file. The run continues without it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceIssue {
    #[error("{path} not found")]
    Missing { path: PathBuf },
    #[error("could not read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("no records found in {path}")]
    Empty { path: PathBuf },
}

/// Failure to produce a report file. Always fatal.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report directory {dir} is not available")]
    MissingDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write report {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
