//! Live cluster access through the `kubectl` command.

use crate::source::{normalize, Query, ResourceSource, SourceError};
use capi_lint_core::{Document, LiveConfig};

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tracing::debug;

/// Default per-query timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Queries a live cluster by shelling out to `kubectl ... -o json`.
///
/// Every query is bounded by a timeout; on expiry the child process is
/// killed and the query fails. There are no retries.
pub struct KubectlSource {
    program: String,
    kubeconfig: Option<PathBuf>,
    timeout: Duration,
    runtime: tokio::runtime::Runtime,
}

impl KubectlSource {
    /// Creates a source using `kubectl` from `PATH` and the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the async runtime cannot be created.
    pub fn new() -> Result<Self, SourceError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            program: "kubectl".to_string(),
            kubeconfig: None,
            timeout: DEFAULT_TIMEOUT,
            runtime,
        })
    }

    /// Creates a source from the `[live]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if the async runtime cannot be created.
    pub fn from_config(live: &LiveConfig) -> Result<Self, SourceError> {
        Ok(Self::new()?
            .program(live.kubectl.clone())
            .kubeconfig(live.kubeconfig.clone())
            .timeout(Duration::from_secs(live.timeout_secs)))
    }

    /// Sets the command to run.
    #[must_use]
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the kubeconfig passed to every query.
    #[must_use]
    pub fn kubeconfig(mut self, kubeconfig: Option<PathBuf>) -> Self {
        self.kubeconfig = kubeconfig;
        self
    }

    /// Sets the per-query timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the argument list for a query.
    #[must_use]
    pub fn get_args(&self, query: &Query) -> Vec<String> {
        let target = match &query.name {
            Some(name) => format!("{}/{name}", query.resource),
            None => query.resource.clone(),
        };
        let mut args = vec!["get".to_string(), target, "-o".to_string(), "json".to_string()];

        if query.all_namespaces {
            args.push("--all-namespaces".to_string());
        } else if let Some(ns) = &query.namespace {
            args.push("-n".to_string());
            args.push(ns.clone());
        }
        if let Some(selector) = &query.label_selector {
            args.push("-l".to_string());
            args.push(selector.clone());
        }
        if query.name.is_some() {
            args.push("--ignore-not-found".to_string());
        }
        self.push_kubeconfig(&mut args);
        args
    }

    fn push_kubeconfig(&self, args: &mut Vec<String>) {
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push("--kubeconfig".to_string());
            args.push(kubeconfig.display().to_string());
        }
    }

    /// Runs the command and returns stdout, or `None` when the server reports nothing found.
    fn run(&self, args: &[String], resource: &str) -> Result<Option<String>, SourceError> {
        debug!("{} {}", self.program, args.join(" "));

        let output = self.runtime.block_on(async {
            let mut cmd = tokio::process::Command::new(&self.program);
            cmd.args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);
            tokio::time::timeout(self.timeout, cmd.output()).await
        });

        let output = match output {
            Err(_) => {
                return Err(SourceError::Timeout {
                    resource: resource.to_string(),
                    after: self.timeout,
                })
            }
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::CommandNotFound {
                    program: self.program.clone(),
                })
            }
            Ok(Err(e)) => return Err(SourceError::Io(e)),
            Ok(Ok(output)) => output,
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            if is_not_found(&stderr) {
                debug!("{resource}: nothing found");
                return Ok(None);
            }
            return Err(SourceError::Command {
                resource: resource.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if stdout.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(stdout))
    }
}

impl ResourceSource for KubectlSource {
    fn get(&self, query: &Query) -> Result<Vec<Document>, SourceError> {
        let args = self.get_args(query);
        let Some(stdout) = self.run(&args, &query.resource)? else {
            return Ok(Vec::new());
        };
        let value: Document = serde_json::from_str(&stdout).map_err(|e| SourceError::Parse {
            resource: query.resource.clone(),
            message: e.to_string(),
        })?;
        Ok(normalize(value))
    }

    fn discover(&self, api_group: &str) -> Result<Vec<String>, SourceError> {
        let mut args = vec![
            "api-resources".to_string(),
            format!("--api-group={api_group}"),
            "-o".to_string(),
            "name".to_string(),
        ];
        self.push_kubeconfig(&mut args);
        let stdout = self.run(&args, "api-resources")?.unwrap_or_default();
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Server diagnostics that mean "nothing here" rather than failure.
fn is_not_found(stderr: &str) -> bool {
    stderr.contains("NotFound") || stderr.contains("doesn't have a resource type")
}
