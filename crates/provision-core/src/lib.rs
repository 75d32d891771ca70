//! Manifest collection, dependency resolution and ordered execution.
//!
//! Providers declare named manifests and the manifests they depend on.
//! This crate gathers those declarations, builds a dependency graph
//! (synthesizing stubs for dependencies nobody declared), orders it
//! depth-first so dependencies run before their dependents, marks anything
//! downstream of a stub as blocked, and finally runs each manifest's task in
//! order, stopping at the first failure.
//!
//! # Example
//!
//! ```
//! use provision_core::{Declaration, ProviderRegistry, Provisioner, StaticProvider, task_fn};
//!
//! let registry = ProviderRegistry::new().with(
//!     StaticProvider::new("db")
//!         .manifest("schema", Declaration::new().task(task_fn(|_| true)))
//!         .manifest("seed", Declaration::new().depends_on("db", "schema").task(task_fn(|_| ()))),
//! );
//!
//! let mut provisioner = Provisioner::new(registry);
//! let report = provisioner.run(&mut ()).unwrap();
//! let ids: Vec<String> = report.applied.iter().map(|k| k.id()).collect();
//! assert_eq!(ids, vec!["db-schema", "db-seed"]);
//! ```

pub mod applicability;
pub mod collector;
pub mod command;
pub mod config;
pub mod error;
pub mod file_provider;
pub mod graph;
pub mod key;
pub mod manifest;
pub mod provider;
pub mod resolution;
pub mod resolver;
pub mod resource;
pub mod runner;
pub mod task;

pub use command::CommandTask;
pub use config::{CONFIG_FILENAME, ProviderConfig, ProvisionConfig};
pub use error::{Error, Result};
pub use file_provider::{FileProvider, MANIFESTS_FILENAME};
pub use graph::ManifestGraph;
pub use key::ManifestKey;
pub use manifest::{Declaration, ManifestInfo, ManifestMap, ManifestSummary, Resource};
pub use provider::{Provider, ProviderRegistry, StaticProvider};
pub use resolution::{Provisioner, Resolution};
pub use resource::{FileResourceLoader, ResourceCache, ResourceLoader};
pub use runner::{RunListener, RunReport, Runner};
pub use task::{FnTask, Invocation, Task, TaskOutcome, task_fn};
