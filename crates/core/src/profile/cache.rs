//! Caller-owned cache of loaded catalogs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::catalog::{arguments_from_str, ProfileCatalog};
use super::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    profiles: PathBuf,
    arguments: PathBuf,
}

#[derive(Debug)]
struct CacheEntry {
    digest: [u8; 32],
    catalog: Arc<ProfileCatalog>,
}

/// Catalogs keyed by the canonical paths of their sources.
///
/// Each entry stores a SHA-256 digest of both sources; a lookup re-reads the
/// files and reloads when the digest changed.
#[derive(Debug, Default)]
pub struct CatalogCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the catalog for the given sources, loading it when needed.
    pub fn load(
        &self,
        profiles: impl AsRef<Path>,
        arguments: impl AsRef<Path>,
    ) -> Result<Arc<ProfileCatalog>, CatalogError> {
        let profiles = canonical(profiles.as_ref())?;
        let arguments = canonical(arguments.as_ref())?;

        let profile_source = read(&profiles)?;
        let argument_source = read(&arguments)?;
        let digest = digest(&profile_source, &argument_source);

        let key = CacheKey {
            profiles: profiles.clone(),
            arguments: arguments.clone(),
        };

        if let Some(entry) = self.entries().get(&key) {
            if entry.digest == digest {
                return Ok(Arc::clone(&entry.catalog));
            }
            debug!(profiles = %profiles.display(), "Catalog sources changed, reloading");
        }

        let catalog = ProfileCatalog::profiles_from_str(&profile_source, &profiles)?
            .with_arguments(arguments_from_str(&argument_source, &arguments)?);
        let catalog = Arc::new(catalog);

        self.entries_mut().insert(
            key,
            CacheEntry {
                digest,
                catalog: Arc::clone(&catalog),
            },
        );

        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries_mut().clear();
    }

    // Entries are inserted whole; a poisoned map is still consistent.
    fn entries(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("Catalog cache lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn entries_mut(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("Catalog cache lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}

fn canonical(path: &Path) -> Result<PathBuf, CatalogError> {
    path.canonicalize()
        .map_err(|e| CatalogError::load(path, e.to_string()))
}

fn read(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|e| CatalogError::load(path, e.to_string()))
}

fn digest(profiles: &str, arguments: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(profiles.as_bytes());
    hasher.update([0u8]);
    hasher.update(arguments.as_bytes());
    hasher.finalize().into()
}
