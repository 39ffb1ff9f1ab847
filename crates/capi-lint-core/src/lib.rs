//! # capi-lint-core
//!
//! Core framework for analyzing Kubernetes Cluster API resources.
//!
//! This crate provides the foundational types shared by every capi-lint
//! command. It includes:
//!
//! - [`Document`], a generic tree for any Kubernetes object
//! - [`Rule`] trait for per-document checks
//! - [`SourceRule`] trait for raw manifest text checks
//! - [`Engine`] for running a rule set
//! - [`Finding`] and [`Report`] for results, rendered by the [`report`] module
//!
//! ## Example
//!
//! ```ignore
//! use capi_lint_core::{report, Engine, Report};
//!
//! let engine = Engine::builder()
//!     .rule(MyRule::new())
//!     .build();
//!
//! let findings = engine.run(&documents);
//! println!("{}", report::render_text(&[Report::with_findings("manifests", findings)]));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod document;
mod engine;
mod rule;
mod types;

pub mod report;

pub use config::{Config, ConfigError, HealthConfig, LiveConfig, RuleConfig, SecurityConfig};
pub use document::{Document, CAPI_GROUP_SUFFIX, CLUSTER_NAME_LABEL};
pub use engine::{Engine, EngineBuilder};
pub use report::ExitPolicy;
pub use rule::{Rule, RuleBox, RuleContext, SourceRule, SourceRuleBox, SourceText};
pub use types::{Finding, FindingDiagnostic, Report, Severity, SeverityCounts};
