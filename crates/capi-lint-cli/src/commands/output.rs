//! Shared output formatting for reports.

use anyhow::{Context, Result};
use capi_lint_core::{report, Report, SeverityCounts};
use std::path::Path;

use crate::{OutputFormat, ReportArgs};

/// Prints reports in the requested format, or writes JSON to `--output`.
pub fn emit(reports: &[Report], args: &ReportArgs) -> Result<()> {
    if let Some(path) = &args.output {
        return write_json(reports, path);
    }
    print(reports, args.format)
}

/// Print reports in the specified format.
pub fn print(reports: &[Report], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report::render_text(reports)),
        OutputFormat::Json => println!("{}", report::render_json(reports)?),
        OutputFormat::Compact => print!("{}", report::render_compact(reports)),
        OutputFormat::Diagnostics => {
            print!("{}", report::render_diagnostics(reports));
            let mut counts = SeverityCounts::default();
            for r in reports {
                counts.add(&r.count_by_severity());
            }
            println!("Found {}", report::summary_line(&counts));
        }
    }
    Ok(())
}

fn write_json(reports: &[Report], path: &Path) -> Result<()> {
    let json = report::render_json(reports)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Report written to: {}", path.display());
    Ok(())
}
