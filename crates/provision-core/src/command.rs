//! Tasks that run an external program.
//!
//! A command string is split on whitespace into a program and its leading
//! arguments. Program paths containing a separator are resolved against the
//! provider directory; bare names are searched for on `PATH`. The manifest's
//! declared arguments are appended after the fixed ones.
//!
//! The program runs with the provider directory as working directory and
//! inherits stdin/stdout/stderr so its output streams live to the terminal.
//! These variables are added to its environment:
//!
//! - `PROVISION_MANIFEST`: composite id of the manifest being run
//! - `PROVISION_PROVIDER`: id of the declaring provider
//! - `PROVISION_RESOURCE`: resolved resource path, when one was loaded

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::task::{Invocation, Task, TaskOutcome};

/// A task that executes a program and succeeds on a zero exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTask {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandTask {
    /// Parse `command` into program and fixed arguments.
    pub fn parse(command: &str, working_dir: impl Into<PathBuf>) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
            working_dir: working_dir.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Locate the program binary.
    pub fn resolve_program(&self) -> Option<PathBuf> {
        if self.program.is_empty() {
            return None;
        }
        let path = Path::new(&self.program);
        if path.components().count() > 1 || path.is_absolute() {
            let candidate = self.working_dir.join(path);
            return candidate.is_file().then_some(candidate);
        }
        find_on_path(&self.program)
    }
}

impl Task for CommandTask {
    fn validate(&self) -> Result<(), String> {
        if self.program.is_empty() {
            return Err("command is empty".to_string());
        }
        match self.resolve_program() {
            Some(_) => Ok(()),
            None => Err(format!("program '{}' not found", self.program)),
        }
    }

    fn execute(&self, invocation: &Invocation<'_>) -> TaskOutcome {
        let Some(program) = self.resolve_program() else {
            return TaskOutcome::failed(format!("program '{}' not found", self.program));
        };

        let mut cmd = Command::new(&program);
        cmd.args(&self.args)
            .args(invocation.args.iter().map(argument_to_string))
            .current_dir(&self.working_dir)
            .env("PROVISION_MANIFEST", invocation.key.id())
            .env("PROVISION_PROVIDER", &invocation.key.provider)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(resource) = invocation.resource {
            cmd.env("PROVISION_RESOURCE", resource);
        }

        debug!(manifest = %invocation.key, program = %program.display(), "Running command");
        match cmd.status() {
            Ok(status) if status.success() => TaskOutcome::Succeeded,
            Ok(status) => TaskOutcome::failed(match status.code() {
                Some(code) => format!("'{}' exited with status {code}", self.program),
                None => format!("'{}' was terminated by a signal", self.program),
            }),
            Err(e) => TaskOutcome::failed(format!("failed to start '{}': {e}", self.program)),
        }
    }
}

/// Render a declared argument for the command line. Strings are passed
/// verbatim; other values use their TOML representation.
fn argument_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Search `PATH` for an executable named `tool`.
pub fn find_on_path(tool: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    let extensions: Vec<String> = if cfg!(windows) {
        std::env::var("PATHEXT")
            .unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string())
            .split(';')
            .map(|s| s.to_ascii_lowercase())
            .collect()
    } else {
        vec![String::new()]
    };

    std::env::split_paths(&path_var).find_map(|dir| {
        extensions.iter().find_map(|ext| {
            let candidate = dir.join(format!("{tool}{ext}"));
            candidate.is_file().then_some(candidate)
        })
    })
}
