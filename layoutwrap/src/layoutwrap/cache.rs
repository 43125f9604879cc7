use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use log::debug;

use crate::layoutwrap::error::LayoutError;
use crate::layoutwrap::storage::{FsStorage, Storage};

struct CacheEntry {
    modified: SystemTime,
    content: Arc<str>,
}

/// Layout templates keyed by location, refreshed when the stored
/// modification time changes.
///
/// Any difference in time counts as a change, including a time that moved
/// backwards. Entries live as long as the cache.
pub struct LayoutCache {
    storage: Arc<dyn Storage>,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl LayoutCache {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cache over the local filesystem.
    pub fn filesystem() -> Self {
        Self::new(Arc::new(FsStorage))
    }

    pub fn get(&self, location: &str) -> Result<Arc<str>, LayoutError> {
        let modified = self
            .storage
            .modified(location)
            .map_err(|e| LayoutError::storage(location, e))?;

        if let Some(content) = self.fresh(location, modified) {
            debug!("layout cache hit for {location}");
            return Ok(content);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have loaded the same version while we waited.
        if let Some(entry) = entries.get(location) {
            if entry.modified == modified {
                return Ok(entry.content.clone());
            }
            debug!("layout {location} changed on storage, reloading");
        } else {
            debug!("loading layout {location}");
        }

        let bytes = self
            .storage
            .read_all(location)
            .map_err(|e| LayoutError::storage(location, e))?;
        let content: Arc<str> = String::from_utf8_lossy(&bytes).into();

        entries.insert(
            location.to_string(),
            CacheEntry {
                modified,
                content: content.clone(),
            },
        );

        Ok(content)
    }

    fn fresh(&self, location: &str, modified: SystemTime) -> Option<Arc<str>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(location)
            .filter(|entry| entry.modified == modified)
            .map(|entry| entry.content.clone())
    }

    pub fn contains(&self, location: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(location)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::filesystem()
    }
}
