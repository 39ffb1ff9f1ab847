//! Compare-versions command: what changes between two Cluster API releases.

use anyhow::{Context, Result};
use capi_lint_versions::{compare, render_checklist, render_comparison, render_version_table};
use std::path::Path;

use crate::DataFormat;

/// Runs the compare-versions command.
pub fn run(
    from: Option<&str>,
    to: Option<&str>,
    list: bool,
    checklist: bool,
    format: DataFormat,
    output: Option<&Path>,
) -> Result<i32> {
    if list {
        print!("{}", render_version_table());
        return Ok(0);
    }

    let (Some(from), Some(to)) = (from, to) else {
        anyhow::bail!("Both FROM and TO versions are required (use --list to see known versions)");
    };
    let comparison = compare(from, to)?;

    if format == DataFormat::Json || output.is_some() {
        let json = serde_json::to_string_pretty(&comparison)?;
        match output {
            Some(path) => {
                std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Comparison written to: {}", path.display());
            }
            None => println!("{json}"),
        }
    } else {
        print!("{}", render_comparison(&comparison));
        if checklist {
            print!("{}", render_checklist(&comparison));
        }
    }
    Ok(0)
}
