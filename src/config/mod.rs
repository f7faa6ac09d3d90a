use std::path::PathBuf;
use std::{fs, io};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::utils::{ensure_dir, expand_path};

/// Shared behavior for every config struct: a full default form and a
/// completion pass that resolves paths against the [`PathSet`].
pub trait CommonConfig {
    fn default() -> Self;

    fn complete(&mut self, ps: &PathSet) -> Result<()>;
}

/// Locations of the config and data directories.
pub struct PathSet {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl PathSet {
    const DEFAULT_CONFIG_DIR: &'static str = "~/.config/distrogate";
    const DEFAULT_DATA_DIR: &'static str = "~/.local/share/distrogate";

    pub fn new(config_dir: Option<String>, data_dir: Option<String>) -> Result<Self> {
        let config_dir = match config_dir {
            Some(dir) => dir,
            None => String::from(Self::DEFAULT_CONFIG_DIR),
        };
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => String::from(Self::DEFAULT_DATA_DIR),
        };

        let config_dir = PathBuf::from(expand_path(&config_dir)?);
        let data_dir = PathBuf::from(expand_path(&data_dir)?);
        ensure_dir(&config_dir).context("ensure config dir")?;
        ensure_dir(&data_dir).context("ensure data dir")?;

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Loads `<config_dir>/<name>.toml`, falling back to the provided
    /// default when the file does not exist. The config is completed
    /// before being returned.
    pub fn load_config<T, F>(&self, name: &str, default: F) -> Result<T>
    where
        T: CommonConfig + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let path = self.config_dir.join(format!("{name}.toml"));
        let mut cfg: T = match fs::read_to_string(&path) {
            Ok(data) => toml::from_str(&data)
                .with_context(|| format!("parse config file '{}'", path.display()))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => default(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("read config file '{}'", path.display()))
            }
        };

        cfg.complete(self)
            .with_context(|| format!("complete '{name}' config"))?;
        Ok(cfg)
    }
}
