//! Command implementations and the plumbing they share.

pub mod audit;
pub mod compare_versions;
pub mod conditions;
pub mod export;
pub mod health;
pub mod init;
pub mod list_rules;
pub mod manifests;
pub mod migrate;
pub mod output;
pub mod provider_contract;
pub mod timeline;

use anyhow::{Context, Result};
use capi_lint_core::{Config, Document, ExitPolicy};
use capi_lint_source::{manifests as files, KubectlSource, MemorySource, ResourceSource};
use std::path::{Path, PathBuf};

use crate::config_resolver::{self, ConfigSource};
use crate::Globals;

/// Loads the configuration and applies global flag overrides.
pub fn load_config(globals: &Globals) -> Result<Config> {
    let source = config_resolver::resolve(Path::new("."), globals.config.as_deref());
    let mut config = match &source {
        ConfigSource::Default => Config::default(),
        other => {
            // Invariant: non-Default variants always have a path
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))?
        }
    };

    if let Some(kubeconfig) = &globals.kubeconfig {
        config.live.kubeconfig = Some(kubeconfig.clone());
    }
    if let Some(timeout) = globals.timeout {
        config.live.timeout_secs = timeout;
    }
    Ok(config)
}

/// Applies `fail_on` from configuration to a single-tier policy.
pub fn exit_policy(config: &Config, default: ExitPolicy, strict: bool) -> ExitPolicy {
    let mut policy = match config.fail_on {
        Some(severity) => ExitPolicy {
            fail_at: severity,
            ..default
        },
        None => default,
    };
    if strict {
        policy = policy.strict();
    }
    policy
}

/// Opens the live cluster.
pub fn live_source(config: &Config) -> Result<KubectlSource> {
    KubectlSource::from_config(&config.live).context("Failed to prepare kubectl")
}

/// Loads manifests into an in-memory source, logging any parse findings.
pub fn manifest_source(paths: &[PathBuf]) -> Result<MemorySource> {
    let discovered = files::discover(paths, true).context("Failed to find manifests")?;
    let mut documents: Vec<Document> = Vec::new();
    for file in files::load_all(&discovered) {
        for finding in &file.findings {
            tracing::warn!("{finding}");
        }
        documents.extend(file.documents.into_iter().map(|d| d.document));
    }
    tracing::debug!("Loaded {} document(s) from manifests", documents.len());
    Ok(MemorySource::new(documents))
}

/// The live cluster, or the given manifests when any are set.
pub fn scope_source(manifests: &[PathBuf], config: &Config) -> Result<Box<dyn ResourceSource>> {
    if manifests.is_empty() {
        Ok(Box::new(live_source(config)?))
    } else {
        Ok(Box::new(manifest_source(manifests)?))
    }
}
