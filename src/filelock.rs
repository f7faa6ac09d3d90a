use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use file_lock::{FileLock, FileOptions};

pub fn read_file_lock<P: AsRef<Path>>(path: P) -> Result<Option<Vec<u8>>> {
    let opts = FileOptions::new().read(true);
    let mut file = match FileLock::lock(path.as_ref(), true, opts) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("lock file '{}' for read", path.as_ref().display()))
        }
    };

    let mut data = Vec::new();
    file.file
        .read_to_end(&mut data)
        .with_context(|| format!("read file '{}'", path.as_ref().display()))?;
    Ok(Some(data))
}

pub fn write_file_lock<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<()> {
    let opts = FileOptions::new().write(true).truncate(true).create(true);
    let mut file = FileLock::lock(path.as_ref(), true, opts)
        .with_context(|| format!("lock file '{}' for write", path.as_ref().display()))?;
    file.file
        .write_all(data)
        .with_context(|| format!("write file '{}'", path.as_ref().display()))?;
    Ok(())
}

pub fn remove_file_lock<P: AsRef<Path>>(path: P) -> Result<()> {
    match std::fs::remove_file(path.as_ref()) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => {
            Err(err).with_context(|| format!("remove file '{}'", path.as_ref().display()))
        }
    }
}
