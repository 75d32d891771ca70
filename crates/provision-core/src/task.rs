//! Task trait and related types

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::key::ManifestKey;

/// Result of invoking a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task returned no value. Counts as success.
    Done,
    /// The task explicitly reported success.
    Succeeded,
    /// The task explicitly reported failure.
    Failed { reason: Option<String> },
}

impl TaskOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: Some(reason.into()),
        }
    }
}

impl From<()> for TaskOutcome {
    fn from(_: ()) -> Self {
        Self::Done
    }
}

impl From<bool> for TaskOutcome {
    fn from(value: bool) -> Self {
        if value {
            Self::Succeeded
        } else {
            Self::Failed { reason: None }
        }
    }
}

impl From<Option<bool>> for TaskOutcome {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Done, Self::from)
    }
}

/// Everything a task receives when it is invoked.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub key: &'a ManifestKey,
    pub args: &'a [toml::Value],
    /// Resolved location of the manifest's resource, once loaded.
    pub resource: Option<&'a Path>,
}

/// A unit of work bound to a manifest.
pub trait Task: Send + Sync {
    /// Check that the task can be invoked at all.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    fn execute(&self, invocation: &Invocation<'_>) -> TaskOutcome;
}

/// Adapts a closure into a [`Task`].
///
/// The closure may return `()`, `bool`, `Option<bool>` or a
/// [`TaskOutcome`].
pub struct FnTask<F> {
    f: F,
}

impl<F> FnTask<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, R> Task for FnTask<F>
where
    F: Fn(&Invocation<'_>) -> R + Send + Sync,
    R: Into<TaskOutcome>,
{
    fn execute(&self, invocation: &Invocation<'_>) -> TaskOutcome {
        (self.f)(invocation).into()
    }
}

impl<F> fmt::Debug for FnTask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnTask")
    }
}

/// Shorthand for wrapping a closure as a shared task.
pub fn task_fn<F, R>(f: F) -> Arc<dyn Task>
where
    F: Fn(&Invocation<'_>) -> R + Send + Sync + 'static,
    R: Into<TaskOutcome> + 'static,
{
    Arc::new(FnTask::new(f))
}
