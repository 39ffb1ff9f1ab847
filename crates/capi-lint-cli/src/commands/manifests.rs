//! Validate and lint commands: rule presets over manifest files.

use anyhow::{bail, Context, Result};
use capi_lint_core::{Engine, ExitPolicy, Report, RuleContext, Severity};
use capi_lint_rules::Preset;
use capi_lint_source::manifests::{self, ManifestFile};
use std::path::PathBuf;

use crate::{FileArgs, Globals, ReportArgs};

/// Runs a file-based preset and returns the exit code.
pub fn run(preset: Preset, files: &FileArgs, report: &ReportArgs, globals: &Globals) -> Result<i32> {
    let config = super::load_config(globals)?;
    let policy = super::exit_policy(&config, ExitPolicy::fail_at(Severity::Error), report.strict);
    let engine = preset.engine(config);

    let reports = check_paths(&engine, &files.paths, files.recursive)?;
    super::output::emit(&reports, report)?;
    Ok(policy.exit_code(&reports))
}

/// Discovers manifests and checks each file, one report per file.
pub fn check_paths(engine: &Engine, paths: &[PathBuf], recursive: bool) -> Result<Vec<Report>> {
    let discovered = manifests::discover(paths, recursive).context("Failed to find manifests")?;
    if discovered.is_empty() {
        bail!("No YAML files found");
    }
    tracing::info!(
        "Checking {} file(s) with {} rules",
        discovered.len(),
        engine.rule_count()
    );

    Ok(manifests::load_all(&discovered)
        .iter()
        .map(|file| check_file(engine, file))
        .collect())
}

/// Checks one loaded file: parse findings, per-document rules, then raw-text rules.
///
/// Every document of the file is related context for the others. Findings
/// without a line get the line their document starts on.
pub fn check_file(engine: &Engine, file: &ManifestFile) -> Report {
    let mut findings = file.findings.clone();

    let related: Vec<_> = file.documents().cloned().collect();
    let ctx = RuleContext::new().with_related(&related).with_file(&file.path);
    for entry in &file.documents {
        findings.extend(engine.check_document(&entry.document, &ctx).into_iter().map(|mut f| {
            f.line.get_or_insert(entry.line);
            f
        }));
    }

    findings.extend(engine.check_source(&file.path, &file.content));
    Report::with_findings(file.path.display().to_string(), findings)
}
