pub mod gate;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::warn;
use tokio::sync::broadcast;

use crate::cancel::CancelToken;
use crate::client::Client;
use crate::storage::{Storage, MAINTENANCE_PAGES_KEY};

/// Page key to "under maintenance" flag, keys lowercased.
pub type MaintenanceMap = HashMap<String, bool>;

const BROADCAST_CAPACITY: usize = 16;

/// Mirror of the server's maintenance map.
///
/// Reads are synchronous from the persisted mirror so the first paint
/// never waits on the network. A successful refresh overwrites the whole
/// mirror (stale keys for removed pages die there) and publishes the new
/// map; every other holder of the same storage sees the new value on its
/// next read without a fetch of its own.
pub struct MaintenanceStore {
    storage: Arc<dyn Storage>,
    tx: broadcast::Sender<MaintenanceMap>,
}

impl MaintenanceStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { storage, tx }
    }

    /// Synchronous read from the mirror. Unknown pages are not under
    /// maintenance.
    pub fn is_on(&self, page: &str) -> bool {
        self.cached()
            .get(&page.trim().to_lowercase())
            .copied()
            .unwrap_or(false)
    }

    /// Current mirrored map. A missing or unparsable mirror reads as
    /// empty.
    pub fn cached(&self) -> MaintenanceMap {
        let data = match self.storage.read(MAINTENANCE_PAGES_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => return MaintenanceMap::new(),
            Err(err) => {
                warn!("Read maintenance mirror failed: {err:#}");
                return MaintenanceMap::new();
            }
        };
        match serde_json::from_slice(&data) {
            Ok(map) => map,
            Err(_) => {
                warn!("Maintenance mirror is invalid, treating as empty");
                MaintenanceMap::new()
            }
        }
    }

    /// Fetches the live map and replaces the mirror. On fetch failure
    /// the previous mirror is kept, never assumed "off".
    pub async fn refresh(&self, client: &Client, cancel: &CancelToken) -> Result<MaintenanceMap> {
        let pages = match client.maintenance_pages().await {
            Ok(pages) => pages,
            Err(err) => {
                warn!("Fetch maintenance pages failed: {err:#}, keeping cached map");
                return Ok(self.cached());
            }
        };
        if cancel.is_cancelled() {
            return Ok(self.cached());
        }

        let map: MaintenanceMap = pages
            .into_iter()
            .map(|(page, on)| (page.trim().to_lowercase(), on))
            .collect();

        let data = serde_json::to_vec(&map).context("encode maintenance map")?;
        self.storage
            .write(MAINTENANCE_PAGES_KEY, &data)
            .context("persist maintenance map")?;

        // No receivers is fine, the mirror alone keeps late readers
        // consistent
        let _ = self.tx.send(map.clone());

        Ok(map)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MaintenanceMap> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::storage::MemoryStorage;

    fn new_store() -> MaintenanceStore {
        MaintenanceStore::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_cached_empty_by_default() {
        let store = new_store();
        assert!(store.cached().is_empty());
        assert!(!store.is_on("splits"));
    }

    #[test]
    fn test_is_on_normalizes_page_key() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .write(MAINTENANCE_PAGES_KEY, br#"{"splits": true}"#)
            .unwrap();
        let store = MaintenanceStore::new(storage);
        assert!(store.is_on("splits"));
        assert!(store.is_on(" Splits "));
        assert!(!store.is_on("accounting"));
    }

    #[test]
    fn test_invalid_mirror_reads_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.write(MAINTENANCE_PAGES_KEY, b"not json").unwrap();
        let store = MaintenanceStore::new(storage);
        assert!(store.cached().is_empty());
        assert!(!store.is_on("splits"));
    }
}
