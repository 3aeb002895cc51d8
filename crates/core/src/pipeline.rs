use crate::aggregate::{self, Taxonomy};
use crate::config::AppConfig;
use crate::error::SourceIssue;
use crate::extractor::Shape;
use crate::reconcile::{self, PathValidation, PriorityFilter, UnmappedAnalysis};
use crate::report;
use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct UnmappedRun {
    pub analysis: UnmappedAnalysis,
    pub report: PathBuf,
    pub issues: Vec<SourceIssue>,
}

#[derive(Debug, Serialize)]
pub struct ValidationRun {
    pub validation: PathValidation,
    /// Not set for the console-only verification run.
    pub report: Option<PathBuf>,
    pub issues: Vec<SourceIssue>,
}

/// Vocabulary vs. tuple mappings; writes the unmapped tags report.
pub fn run_unmapped(config: &AppConfig) -> anyhow::Result<UnmappedRun> {
    info!("Analyzing vocabulary files...");
    let vocabulary = aggregate::collect_vocabulary(&config.sources);
    let taxonomy = aggregate::collect_taxonomy(&config.sources);
    let mappings = aggregate::collect_mappings(&config.sources, Shape::MappingTuple)
        .context("collect mappings")?;

    let priority = PriorityFilter::new(&config.priority);
    let analysis = reconcile::analyze_unmapped(&vocabulary, &taxonomy, &mappings, &priority);
    info!(
        "Analysis complete: {} vocabulary tags, {} unmapped",
        analysis.total_tags,
        analysis.unmapped_tags.len()
    );

    let path = config.reports.unmapped_report.clone();
    let content = report::render_unmapped_report(&analysis, &config.reports);
    report::write_report(&path, &content)
        .with_context(|| format!("writing unmapped tags report to {}", path.display()))?;

    let issues = [vocabulary.issues, taxonomy.issues, mappings.issues].concat();
    Ok(UnmappedRun {
        analysis,
        report: path,
        issues,
    })
}

/// Tuple mappings vs. taxonomy; writes the invalid folder paths report.
pub fn run_validate(config: &AppConfig) -> anyhow::Result<ValidationRun> {
    info!("Validating folder paths in mapping files...");
    let (taxonomy, validation, issues) = validate(config, Shape::MappingTuple)?;

    let path = config.reports.invalid_report.clone();
    let content = report::render_invalid_report(&validation, &taxonomy, &config.reports);
    report::write_report(&path, &content)
        .with_context(|| format!("writing invalid paths report to {}", path.display()))?;

    Ok(ValidationRun {
        validation,
        report: Some(path),
        issues,
    })
}

/// Array mappings vs. taxonomy; console output only.
pub fn run_verify(config: &AppConfig) -> anyhow::Result<ValidationRun> {
    info!("Verifying folder mappings...");
    let (_, validation, issues) = validate(config, Shape::MappingArray)?;
    Ok(ValidationRun {
        validation,
        report: None,
        issues,
    })
}

fn validate(
    config: &AppConfig,
    shape: Shape,
) -> anyhow::Result<(Taxonomy, PathValidation, Vec<SourceIssue>)> {
    let taxonomy = aggregate::collect_taxonomy(&config.sources);
    let mappings =
        aggregate::collect_mappings(&config.sources, shape).context("collect mappings")?;
    let validation = reconcile::validate_paths(&taxonomy, &mappings);
    info!(
        "{} of {} folder references are invalid",
        validation.invalid.len(),
        validation.total_references
    );
    let issues = [taxonomy.issues.clone(), mappings.issues].concat();
    Ok((taxonomy, validation, issues))
}
