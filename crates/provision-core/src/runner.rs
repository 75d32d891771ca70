//! Ordered, fail-fast execution of a resolution.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::key::ManifestKey;
use crate::manifest::ManifestInfo;
use crate::provider::ProviderRegistry;
use crate::resolution::Resolution;
use crate::resource::{FileResourceLoader, ResourceCache, ResourceLoader, locate};
use crate::task::{Invocation, TaskOutcome};

/// Receives progress notifications while a run walks the order.
pub trait RunListener {
    fn on_start(&mut self, _manifest: &ManifestInfo) {}
    fn on_success(&mut self, _manifest: &ManifestInfo, _outcome: &TaskOutcome) {}
    fn on_failure(&mut self, _manifest: &ManifestInfo, _error: &Error) {}

    /// Called instead of `on_start` when an inapplicable manifest aborts
    /// the run before any task was invoked.
    fn on_blocked(&mut self, _manifest: &ManifestInfo, _error: &Error) {}
}

impl RunListener for () {}

/// Summary of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Manifests applied, in the order they ran.
    pub applied: Vec<ManifestKey>,
}

impl RunReport {
    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Walks a [`Resolution`] in ascending weight.
///
/// If any manifest is inapplicable, the first one by weight aborts the run
/// before a single task is invoked. Otherwise the first failing manifest
/// aborts it; no later manifest is touched, whatever component it belongs
/// to. Nothing already applied is undone.
///
/// Resources are loaded through a borrowed [`ResourceCache`], so a cache
/// that outlives the runner keeps each path loaded across runs.
pub struct Runner<'r, L = FileResourceLoader> {
    registry: &'r ProviderRegistry,
    resources: &'r mut ResourceCache<L>,
}

impl<'r, L: ResourceLoader> Runner<'r, L> {
    pub fn new(registry: &'r ProviderRegistry, resources: &'r mut ResourceCache<L>) -> Self {
        Self {
            registry,
            resources,
        }
    }

    pub fn run(
        &mut self,
        resolution: &Resolution,
        listener: &mut dyn RunListener,
    ) -> Result<RunReport> {
        info!(manifests = resolution.len(), "Starting run");
        let mut report = RunReport::default();

        // Blocked manifests fail the run before any task is invoked.
        if let Some(blocked) = resolution.ordered().find(|m| !m.applicable) {
            let error = inapplicable(blocked);
            warn!(manifest = %blocked.key, %error, "Aborting run before any task");
            listener.on_blocked(blocked, &error);
            return Err(error);
        }

        for manifest in resolution.ordered() {
            listener.on_start(manifest);
            match self.apply(manifest) {
                Ok(outcome) => {
                    debug!(manifest = %manifest.key, ?outcome, "Manifest applied");
                    listener.on_success(manifest, &outcome);
                    report.applied.push(manifest.key.clone());
                }
                Err(error) => {
                    warn!(manifest = %manifest.key, %error, "Aborting run");
                    listener.on_failure(manifest, &error);
                    return Err(error);
                }
            }
        }

        info!(applied = report.len(), "Run complete");
        Ok(report)
    }

    fn apply(&mut self, manifest: &ManifestInfo) -> Result<TaskOutcome> {
        let key = &manifest.key;
        if !manifest.applicable {
            return Err(inapplicable(manifest));
        }

        let resource = match &manifest.resource {
            Some(resource) => {
                let default_dir = self
                    .registry
                    .get(&key.provider)
                    .and_then(|provider| provider.resource_dir());
                let path = locate(resource, default_dir.as_deref());
                if !self.resources.ensure_loaded(&path) {
                    return Err(Error::ResourceNotFound {
                        key: key.clone(),
                        path,
                    });
                }
                Some(path)
            }
            None => None,
        };

        let task = manifest
            .task
            .as_ref()
            .ok_or_else(|| Error::MissingTask { key: key.clone() })?;
        task.validate().map_err(|reason| Error::InvalidTask {
            key: key.clone(),
            reason,
        })?;

        let args: &[toml::Value] = match &manifest.arguments {
            None => &[],
            Some(toml::Value::Array(args)) => args,
            Some(other) => {
                return Err(Error::InvalidArguments {
                    key: key.clone(),
                    found: other.type_str().to_string(),
                });
            }
        };

        let outcome = task.execute(&Invocation {
            key,
            args,
            resource: resource.as_deref(),
        });
        match outcome {
            TaskOutcome::Failed { reason } => Err(Error::TaskFailed {
                key: key.clone(),
                reason,
            }),
            outcome => Ok(outcome),
        }
    }
}

fn inapplicable(manifest: &ManifestInfo) -> Error {
    let key = manifest.key.clone();
    if manifest.is_stub {
        Error::MissingManifest { key }
    } else if !manifest.blocked_by.is_empty() {
        Error::UnresolvedDependency {
            key,
            blocked_by: manifest.blocked_by.clone(),
        }
    } else {
        Error::InapplicableUnspecified { key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestMap;
    use crate::task::task_fn;

    fn resolution_of(infos: Vec<ManifestInfo>) -> Resolution {
        let manifests: ManifestMap = infos
            .into_iter()
            .enumerate()
            .map(|(i, mut info)| {
                info.weight = i + 1;
                (info.key.clone(), info)
            })
            .collect();
        Resolution::from_manifests(manifests)
    }

    fn ready(name: &str) -> ManifestInfo {
        let mut info = ManifestInfo::from_declaration(
            ManifestKey::new("p", name),
            crate::manifest::Declaration::new().task(task_fn(|_| true)),
        );
        info.applicable = true;
        info
    }

    #[derive(Default)]
    struct Events(Vec<String>);

    impl RunListener for Events {
        fn on_start(&mut self, manifest: &ManifestInfo) {
            self.0.push(format!("start {}", manifest.key));
        }

        fn on_failure(&mut self, manifest: &ManifestInfo, _error: &Error) {
            self.0.push(format!("fail {}", manifest.key));
        }

        fn on_blocked(&mut self, manifest: &ManifestInfo, _error: &Error) {
            self.0.push(format!("blocked {}", manifest.key));
        }
    }

    #[test]
    fn test_inapplicable_without_cause_is_unspecified() {
        let mut info = ManifestInfo::stub(ManifestKey::new("p", "odd"));
        info.is_stub = false;
        info.applicable = false;

        let registry = ProviderRegistry::new();
        let mut resources = ResourceCache::new(FileResourceLoader);
        let err = Runner::new(&registry, &mut resources)
            .run(&resolution_of(vec![info]), &mut ())
            .unwrap_err();
        assert!(matches!(err, Error::InapplicableUnspecified { .. }));
    }

    #[test]
    fn test_blocked_manifest_is_reported_without_start() {
        let stub = ManifestInfo::stub(ManifestKey::new("gone", "x"));
        let registry = ProviderRegistry::new();
        let mut resources = ResourceCache::new(FileResourceLoader);
        let mut events = Events::default();

        let err = Runner::new(&registry, &mut resources)
            .run(&resolution_of(vec![ready("first"), stub]), &mut events)
            .unwrap_err();
        assert!(matches!(err, Error::MissingManifest { .. }));
        assert_eq!(events.0, vec!["blocked gone-x"]);
    }

    #[test]
    fn test_empty_resolution_succeeds() {
        let registry = ProviderRegistry::new();
        let mut resources = ResourceCache::new(FileResourceLoader);
        let report = Runner::new(&registry, &mut resources)
            .run(&Resolution::default(), &mut ())
            .unwrap();
        assert!(report.is_empty());
    }
}
