use std::path::Path;
use std::{fs, io};

use anyhow::{bail, Context, Result};

pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<()> {
    match fs::metadata(dir.as_ref()) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => bail!(
            "path '{}' exists and is not a directory",
            dir.as_ref().display()
        ),
        Err(err) if err.kind() == io::ErrorKind::NotFound => fs::create_dir_all(dir.as_ref())
            .with_context(|| format!("create directory '{}'", dir.as_ref().display())),
        Err(err) => {
            Err(err).with_context(|| format!("stat directory '{}'", dir.as_ref().display()))
        }
    }
}

pub fn expand_path(path: &str) -> Result<String> {
    let expanded = shellexpand::full(path).with_context(|| format!("expand path '{path}'"))?;
    Ok(expanded.into_owned())
}
