use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::filelock::{read_file_lock, remove_file_lock, write_file_lock};
use crate::utils::ensure_dir;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "auth_token";

/// Storage key holding the cached user attributes.
pub const CACHED_USER_KEY: &str = "cached_user";

/// Storage key mirroring the server's maintenance map.
pub const MAINTENANCE_PAGES_KEY: &str = "maintenance_pages";

/// Storage key holding the forced-logout reason, consumed by the sign-in
/// surface on its next load.
pub const LOGOUT_REASON_KEY: &str = "logout_reason";

/// Persistent key-value state shared by every component of the client.
///
/// Values are opaque blobs; writers always replace the whole value, there
/// is no partial merge. Implementations must be safe to share across
/// concurrent readers and writers.
pub trait Storage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn write(&self, key: &str, data: &[u8]) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// File-per-key storage under a fixed directory, lock-guarded so that
/// multiple portal processes can share it.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) {
            bail!("invalid storage key '{key}'");
        }
        Ok(self.dir.join(key))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        read_file_lock(self.path(key)?)
    }

    fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        write_file_lock(self.path(key)?, data)
    }

    fn remove(&self, key: &str) -> Result<()> {
        remove_file_lock(self.path(key)?)
    }
}

/// In-memory storage for tests and embedded hosts.
#[derive(Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.data.lock().unwrap().remove(key);
        Ok(())
    }
}
