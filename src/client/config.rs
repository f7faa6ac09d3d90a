use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{CommonConfig, PathSet};
use crate::storage::{FileStorage, Storage};
use crate::utils::expand_path;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientConfig {
    /// Origin the portal front end is served from. Used for api-base
    /// inference when no explicit override or remote config is available.
    #[serde(default = "ClientConfig::default_origin")]
    pub origin: String,

    /// Explicit api base. Empty means resolve automatically.
    #[serde(default = "ClientConfig::default_server")]
    pub server: String,

    #[serde(default = "ClientConfig::default_timeout_secs")]
    pub timeout_secs: u64,

    /// Directory holding the persisted client state (token, cached user,
    /// maintenance mirror). Empty means the data dir.
    #[serde(default = "ClientConfig::default_storage_dir")]
    pub storage_dir: String,

    /// Page the deny notice offers as its recovery target.
    #[serde(default = "ClientConfig::default_home_page")]
    pub home_page: String,
}

impl CommonConfig for ClientConfig {
    fn default() -> Self {
        Self {
            origin: Self::default_origin(),
            server: Self::default_server(),
            timeout_secs: Self::default_timeout_secs(),
            storage_dir: Self::default_storage_dir(),
            home_page: Self::default_home_page(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        if self.storage_dir.is_empty() {
            self.storage_dir = ps.data_dir.to_string_lossy().into_owned();
        } else {
            self.storage_dir = expand_path(&self.storage_dir)?;
        }
        Ok(())
    }
}

impl ClientConfig {
    pub fn default_origin() -> String {
        String::from("http://localhost:3000")
    }

    pub fn default_server() -> String {
        String::new()
    }

    pub fn default_timeout_secs() -> u64 {
        10
    }

    pub fn default_storage_dir() -> String {
        String::new()
    }

    pub fn default_home_page() -> String {
        String::from("dashboard")
    }

    pub fn build_storage(&self) -> Result<Arc<dyn Storage>> {
        let storage = FileStorage::new(self.storage_dir.clone()).context("open storage dir")?;
        Ok(Arc::new(storage))
    }
}
