//! Error types for provision-core

use std::path::PathBuf;

use crate::key::ManifestKey;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while collecting, resolving or running manifests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A declared dependency was never supplied by any provider.
    #[error("manifest {key} is missing: no provider declares it")]
    MissingManifest { key: ManifestKey },

    /// A manifest depends (transitively) on one or more missing manifests.
    #[error("manifest {key} has unresolved dependencies: {}", join_keys(.blocked_by))]
    UnresolvedDependency {
        key: ManifestKey,
        blocked_by: Vec<ManifestKey>,
    },

    /// A manifest was flagged inapplicable without a recorded cause.
    #[error("manifest {key} is not applicable")]
    InapplicableUnspecified { key: ManifestKey },

    /// The resource declared by a manifest could not be located.
    #[error("resource {} for manifest {key} not found", .path.display())]
    ResourceNotFound { key: ManifestKey, path: PathBuf },

    /// A manifest declares no task.
    #[error("manifest {key} has no task")]
    MissingTask { key: ManifestKey },

    /// A manifest's task cannot be invoked.
    #[error("task for manifest {key} is not invocable: {reason}")]
    InvalidTask { key: ManifestKey, reason: String },

    /// Declared task arguments are not an array.
    #[error("arguments for manifest {key} must be an array, found {found}")]
    InvalidArguments { key: ManifestKey, found: String },

    /// The task ran and reported failure.
    #[error("manifest {key} failed{}", reason_suffix(.reason))]
    TaskFailed {
        key: ManifestKey,
        reason: Option<String>,
    },

    /// The dependency graph contains a cycle.
    #[error("dependency cycle detected between: {}", join_keys(.participants))]
    DependencyCycle { participants: Vec<ManifestKey> },

    /// A provider failed to enumerate its manifests.
    #[error("provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    /// Configuration file does not exist.
    #[error("configuration not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Configuration file could not be parsed.
    #[error("invalid configuration at {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A provider's manifests file could not be parsed.
    #[error("invalid manifests file at {}: {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The manifest a run-time failure is attributed to, if any.
    pub fn manifest(&self) -> Option<&ManifestKey> {
        match self {
            Error::MissingManifest { key }
            | Error::UnresolvedDependency { key, .. }
            | Error::InapplicableUnspecified { key }
            | Error::ResourceNotFound { key, .. }
            | Error::MissingTask { key }
            | Error::InvalidTask { key, .. }
            | Error::InvalidArguments { key, .. }
            | Error::TaskFailed { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Whether this error was raised by the runner while walking the order.
    pub fn is_run_failure(&self) -> bool {
        self.manifest().is_some()
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {reason}"),
        None => String::new(),
    }
}

fn join_keys(keys: &[ManifestKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_dependency_display_names_blockers() {
        let err = Error::UnresolvedDependency {
            key: ManifestKey::new("app", "site"),
            blocked_by: vec![ManifestKey::new("db", "schema"), ManifestKey::new("db", "seed")],
        };
        let msg = err.to_string();
        assert!(msg.contains("app-site"));
        assert!(msg.contains("db-schema, db-seed"));
    }

    #[test]
    fn test_task_failed_display_without_reason() {
        let err = Error::TaskFailed {
            key: ManifestKey::new("app", "site"),
            reason: None,
        };
        assert_eq!(err.to_string(), "manifest app-site failed");
    }

    #[test]
    fn test_run_failure_classification() {
        let run = Error::MissingTask {
            key: ManifestKey::new("a", "b"),
        };
        assert!(run.is_run_failure());
        assert_eq!(run.manifest(), Some(&ManifestKey::new("a", "b")));

        let cycle = Error::DependencyCycle {
            participants: vec![],
        };
        assert!(!cycle.is_run_failure());
    }
}
