use anyhow::Result;
use tagmap_core::config::AppConfig;
use tagmap_core::console;
use tagmap_core::pipeline::{self, UnmappedRun, ValidationRun};

/// Exit status used by `--strict` when invalid folder references exist.
pub const STRICT_FAILURE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    Findings,
}

impl Outcome {
    pub fn exit_status(self, strict: bool) -> u8 {
        match self {
            Outcome::Findings if strict => STRICT_FAILURE,
            _ => 0,
        }
    }
}

pub fn outcome(run: &ValidationRun) -> Outcome {
    if run.validation.has_invalid() {
        Outcome::Findings
    } else {
        Outcome::Clean
    }
}

/// Text or JSON rendering of an unmapped run.
///
/// Source issues are left to the `warn!` diagnostics emitted while collecting.
pub fn render_unmapped(run: &UnmappedRun, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(run)?);
    }
    Ok(console::unmapped_summary(&run.analysis, &run.report))
}

pub fn render_validate(run: &ValidationRun, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(run)?);
    }
    let report = run.report.clone().unwrap_or_default();
    Ok(console::validation_summary(&run.validation, &report))
}

pub fn render_verify(run: &ValidationRun, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(run)?);
    }
    Ok(console::verification_summary(&run.validation))
}

pub fn run_unmapped(cfg: &AppConfig, json: bool) -> Result<Outcome> {
    let run = pipeline::run_unmapped(cfg)?;
    println!("{}", render_unmapped(&run, json)?);
    // advisory only: unmapped tags never fail the run
    Ok(Outcome::Clean)
}

pub fn run_validate(cfg: &AppConfig, json: bool) -> Result<Outcome> {
    let run = pipeline::run_validate(cfg)?;
    println!("{}", render_validate(&run, json)?);
    Ok(outcome(&run))
}

pub fn run_verify(cfg: &AppConfig, json: bool) -> Result<Outcome> {
    let run = pipeline::run_verify(cfg)?;
    println!("{}", render_verify(&run, json)?);
    Ok(outcome(&run))
}
