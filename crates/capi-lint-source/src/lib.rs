//! # capi-lint-source
//!
//! Loads Cluster API resources for analysis.
//!
//! - [`KubectlSource`] queries a live cluster with a bounded timeout
//! - [`MemorySource`] answers the same queries from loaded manifests
//! - [`manifests`] discovers and parses YAML files, reporting syntax errors as findings
//! - [`Resolver`] follows object references and label ownership
//! - [`export`] cleans, redacts, and writes resources back to YAML

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod kubectl;
mod memory;
mod resolver;
mod source;

pub mod export;
pub mod manifests;

pub use kubectl::{KubectlSource, DEFAULT_TIMEOUT};
pub use manifests::{ManifestDocument, ManifestError, ManifestFile};
pub use memory::{selector_matches, MemorySource};
pub use resolver::{extract_references, Reference, Resolver, CAPI_GROUP_SUFFIX, REFERENCE_FIELDS};
pub use source::{api_group, normalize, plural, resource_name, Query, ResourceSource, SourceError};
