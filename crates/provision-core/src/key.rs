//! Manifest identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a manifest by the provider that declares it and its name.
///
/// Keys order by provider first, then name, which keeps every map keyed
/// by them iterating in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ManifestKey {
    pub provider: String,
    pub name: String,
}

impl ManifestKey {
    pub fn new(provider: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            name: name.into(),
        }
    }

    /// Composite vertex id, e.g. `db-schema`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.provider, self.name)
    }
}

impl fmt::Display for ManifestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.provider, self.name)
    }
}
