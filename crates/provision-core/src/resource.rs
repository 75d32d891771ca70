//! Locating and loading manifest resources.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::manifest::Resource;

/// Loads resources on behalf of the runner.
pub trait ResourceLoader {
    /// Make the resource at `path` available. Returns `false` when it
    /// cannot be found. Called at most once per distinct path by
    /// [`ResourceCache`].
    fn load(&mut self, path: &Path) -> bool;
}

/// Loads resources that exist as regular files on disk.
#[derive(Debug, Default)]
pub struct FileResourceLoader;

impl ResourceLoader for FileResourceLoader {
    fn load(&mut self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Wraps a loader so each path is loaded at most once.
#[derive(Debug, Default)]
pub struct ResourceCache<L> {
    loader: L,
    loaded: HashSet<PathBuf>,
}

impl<L: ResourceLoader> ResourceCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            loaded: HashSet::new(),
        }
    }

    /// Load `path` unless an earlier call already did.
    pub fn ensure_loaded(&mut self, path: &Path) -> bool {
        if self.loaded.contains(path) {
            return true;
        }
        if !self.loader.load(path) {
            return false;
        }
        debug!(path = %path.display(), "Loaded resource");
        self.loaded.insert(path.to_path_buf());
        true
    }
}

/// Resolve where a resource lives.
///
/// An absolute base path is used as is; a relative one is taken relative
/// to the provider's default directory. Without a base path the file is
/// looked up in the default directory itself.
pub fn locate(resource: &Resource, default_dir: Option<&Path>) -> PathBuf {
    let dir = match (&resource.base_path, default_dir) {
        (Some(base), _) if base.is_absolute() => base.clone(),
        (Some(base), Some(default)) => default.join(base),
        (Some(base), None) => base.clone(),
        (None, Some(default)) => default.to_path_buf(),
        (None, None) => PathBuf::new(),
    };
    dir.join(&resource.file)
}
