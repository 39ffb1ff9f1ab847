//! List rules command implementation.

use anyhow::Result;
use capi_lint_core::Config;
use capi_lint_rules::{all_rules, Preset};
use std::fmt::Write;

use crate::Globals;

/// Runs the list-rules command.
pub fn run(globals: &Globals) -> Result<()> {
    let config = super::load_config(globals)?;
    print!("{}", render(&config));
    Ok(())
}

fn render(config: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Available rules:\n");
    let _ = writeln!(out, "{:<7} {:<30} {:<9} Description", "Code", "Name", "Severity");
    let _ = writeln!(out, "{}", "-".repeat(100));
    for (code, name, description, severity) in all_rules(config).describe() {
        let _ = writeln!(out, "{code:<7} {name:<30} {:<9} {description}", severity.as_str());
    }

    let _ = writeln!(out, "\nPresets:");
    for preset in Preset::ALL {
        let codes: Vec<_> = preset
            .rules(config)
            .iter()
            .map(|rule| rule.code())
            .chain(preset.source_rules().iter().map(|rule| rule.code()))
            .collect();
        let _ = writeln!(out, "  {:<9} {}", preset.name(), codes.join(", "));
    }

    let _ = writeln!(out, "\nDisable or regrade a rule by name or code in capi-lint.toml, e.g.:");
    let _ = writeln!(out, "  [rules.namespace-specified]");
    let _ = writeln!(out, "  enabled = false");
    let _ = writeln!(out, "  [rules.CL201]");
    let _ = writeln!(out, "  severity = \"high\"");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rule_listed_once() {
        let text = render(&Config::default());
        let rows: Vec<_> = text.lines().filter(|line| line.starts_with("CL")).collect();

        assert_eq!(rows.len(), 23);
        assert!(rows.iter().any(|row| row.starts_with("CL007   hardcoded-credentials")));
    }

    #[test]
    fn presets_name_their_codes() {
        let text = render(&Config::default());
        assert!(text.contains("  health    CL201, CL202\n"));
        assert!(text.contains("  lint      ") && text.contains("CL007\n"));
    }
}
