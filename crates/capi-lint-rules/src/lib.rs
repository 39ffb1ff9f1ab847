//! # capi-lint-rules
//!
//! Built-in Cluster API rules for capi-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Preset |
//! |------|------|--------|
//! | CL001 | `required-fields` | validate, lint |
//! | CL002 | `api-version` | validate, lint |
//! | CL003 | `required-spec-fields` | validate, lint |
//! | CL004 | `deprecated-fields` | validate, lint |
//! | CL005 | `cluster-name-label` | validate |
//! | CL006 | `namespace-specified` | lint |
//! | CL007 | `hardcoded-credentials` | lint (raw text) |
//! | CL101 | `pod-security-standard` | audit |
//! | CL102 | `encryption-at-rest` | audit |
//! | CL103 | `audit-policy` | audit |
//! | CL104 | `rbac-authorization` | audit |
//! | CL105 | `anonymous-auth` | audit |
//! | CL106 | `kubelet-serving-certs` | audit |
//! | CL107 | `control-plane-replicas` | audit |
//! | CL108 | `cluster-network` | audit |
//! | CL109 | `bootstrap-data-secret` | audit |
//! | CL110 | `orphaned-kubeconfig-secret` | audit |
//! | CL201 | `expected-conditions` | health |
//! | CL202 | `failure-reasons` | health |
//! | CL301 | `deprecated-api-version` | migrate |
//! | CL302 | `migration-deprecated-fields` | migrate |
//! | CL303 | `object-reference-shape` | migrate |
//! | CL304 | `duration-fields` | migrate |
//!
//! ## Usage
//!
//! ```ignore
//! use capi_lint_core::Config;
//! use capi_lint_rules::Preset;
//!
//! let engine = Preset::Audit.engine(Config::default());
//! let findings = engine.run(&cluster_documents);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod conditions;
pub mod health;
pub mod kinds;
pub mod migration;
pub mod security;
pub mod structural;

mod presets;

pub use conditions::{Condition, ConditionSummary};
pub use presets::{all_rules, Preset};

/// Re-export core types for convenience.
pub use capi_lint_core::{Finding, Rule, Severity};
