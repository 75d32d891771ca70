//! Gathers declarations from every registered provider.

use tracing::{debug, warn};

use crate::Result;
use crate::key::ManifestKey;
use crate::manifest::{ManifestInfo, ManifestMap};
use crate::provider::ProviderRegistry;

/// Query every provider and merge their declarations into one mapping.
///
/// Providers are queried in registration order. If two declarations share
/// a key, the later one replaces the earlier one.
pub fn collect(registry: &ProviderRegistry) -> Result<ManifestMap> {
    let mut collected = ManifestMap::new();

    for provider in registry.iter() {
        let declarations = provider.discover()?;
        debug!(
            provider = provider.id(),
            count = declarations.len(),
            "Collected manifest declarations"
        );

        for (name, declaration) in declarations {
            let key = ManifestKey::new(provider.id(), name);
            let info = ManifestInfo::from_declaration(key.clone(), declaration);
            if collected.insert(key.clone(), info).is_some() {
                warn!(manifest = %key, "Manifest declared more than once; keeping the last declaration");
            }
        }
    }

    Ok(collected)
}
