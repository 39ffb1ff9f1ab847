//! capi-lint CLI tool.
//!
//! Usage:
//! ```bash
//! capi-lint validate [OPTIONS] <PATHS>...
//! capi-lint lint [OPTIONS] <PATHS>...
//! capi-lint migrate [OPTIONS] [PATHS]...
//! capi-lint audit [-c CLUSTER] [-n NS] [-A]
//! capi-lint health <CLUSTER> [-n NS]
//! capi-lint conditions [-c CLUSTER] [-n NS] [-A] [-a]
//! capi-lint timeline <CLUSTER> [-n NS] [--since 1h]
//! capi-lint provider-contract [-p PROVIDER] [-t TYPE]
//! capi-lint compare-versions <FROM> <TO> [--checklist]
//! capi-lint export -c CLUSTER [-o DIR]
//! capi-lint list-rules
//! capi-lint init
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Validation, security audit, health and migration checks for Cluster API resources
#[derive(Parser)]
#[command(name = "capi-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Kubeconfig passed to kubectl
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Timeout in seconds for each live query
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate manifests against the Cluster API schema
    Validate {
        #[command(flatten)]
        files: FileArgs,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Validate manifests and check best practices and hardcoded credentials
    Lint {
        #[command(flatten)]
        files: FileArgs,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Check v1beta1 to v1beta2 migration readiness
    Migrate {
        /// Manifest files, directories or glob patterns
        paths: Vec<PathBuf>,

        /// Search directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Also analyze resources of the live cluster
        #[arg(long)]
        live: bool,

        /// Namespace for live analysis (default: all)
        #[arg(short, long)]
        namespace: Option<String>,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Audit the security posture of clusters
    Audit {
        #[command(flatten)]
        scope: ScopeArgs,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Check the health of one cluster from its conditions
    Health {
        /// Cluster name
        cluster: String,

        /// Namespace of the cluster
        #[arg(short, long)]
        namespace: Option<String>,

        /// Read resources from manifests instead of the live cluster
        #[arg(long, num_args = 1..)]
        manifests: Vec<PathBuf>,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Show status conditions of every Cluster API resource
    Conditions {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Show all conditions, not just unhealthy ones
        #[arg(short = 'a', long = "show-all")]
        show_all: bool,

        /// Output format
        #[arg(long, default_value = "table")]
        format: ConditionsFormat,
    },

    /// Show events and condition transitions of one cluster in time order
    Timeline(commands::timeline::TimelineArgs),

    /// Check provider CRDs against the Cluster API provider contracts
    ProviderContract(commands::provider_contract::ContractArgs),

    /// Compare two Cluster API releases
    CompareVersions {
        /// Release to upgrade from
        from: Option<String>,

        /// Release to upgrade to
        to: Option<String>,

        /// List known releases
        #[arg(long)]
        list: bool,

        /// Include a migration checklist
        #[arg(long)]
        checklist: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: DataFormat,

        /// Write JSON to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export cluster resources as re-appliable YAML
    Export(commands::export::ExportArgs),

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Manifest inputs.
#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    /// Manifest files, directories or glob patterns
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Search directories recursively
    #[arg(short, long)]
    pub recursive: bool,
}

/// Which clusters to look at, live or from manifests.
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Specific cluster
    #[arg(short, long)]
    pub cluster: Option<String>,

    /// Namespace to look in
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Look in all namespaces
    #[arg(short = 'A', long)]
    pub all_namespaces: bool,

    /// Read resources from manifests instead of the live cluster
    #[arg(long, num_args = 1..)]
    pub manifests: Vec<PathBuf>,
}

/// Report rendering and exit behaviour.
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Write the JSON report to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Treat warnings as failures
    #[arg(long)]
    pub strict: bool,
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-finding compact format.
    Compact,
    /// Rich diagnostics with help text.
    Diagnostics,
}

/// Output format for plain data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DataFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// Output format for the conditions command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ConditionsFormat {
    /// Table of conditions followed by a summary.
    #[default]
    Table,
    /// JSON array of conditions.
    Json,
    /// Counts only.
    Summary,
}

/// Global options every command may need.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    /// `--config`.
    pub config: Option<PathBuf>,
    /// `--kubeconfig`.
    pub kubeconfig: Option<PathBuf>,
    /// `--timeout`.
    pub timeout: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let globals = Globals {
        config: cli.config,
        kubeconfig: cli.kubeconfig,
        timeout: cli.timeout,
    };

    let code = match cli.command {
        Commands::Validate { files, report } => {
            commands::manifests::run(capi_lint_rules::Preset::Validate, &files, &report, &globals)?
        }
        Commands::Lint { files, report } => {
            commands::manifests::run(capi_lint_rules::Preset::Lint, &files, &report, &globals)?
        }
        Commands::Migrate {
            paths,
            recursive,
            live,
            namespace,
            report,
        } => commands::migrate::run(&paths, recursive, live, namespace.as_deref(), &report, &globals)?,
        Commands::Audit { scope, report } => commands::audit::run(&scope, &report, &globals)?,
        Commands::Health {
            cluster,
            namespace,
            manifests,
            report,
        } => commands::health::run(&cluster, namespace.as_deref(), &manifests, &report, &globals)?,
        Commands::Conditions {
            scope,
            show_all,
            format,
        } => commands::conditions::run(&scope, show_all, format, &globals)?,
        Commands::Timeline(args) => commands::timeline::run(&args, &globals)?,
        Commands::ProviderContract(args) => commands::provider_contract::run(&args, &globals)?,
        Commands::CompareVersions {
            from,
            to,
            list,
            checklist,
            format,
            output,
        } => commands::compare_versions::run(
            from.as_deref(),
            to.as_deref(),
            list,
            checklist,
            format,
            output.as_deref(),
        )?,
        Commands::Export(args) => commands::export::run(&args, &globals)?,
        Commands::ListRules => {
            commands::list_rules::run(&globals)?;
            0
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
            0
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
