use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::StoreError;

/// Writes `data` to `path` atomically: temp file in the same directory,
/// write, sync, rename. Readers never observe a partially-written file.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|source| StoreError::io("creating temp file", dir, source))?;
    tmp.write_all(data)
        .map_err(|source| StoreError::io("writing temp file", tmp.path().to_path_buf(), source))?;
    tmp.as_file()
        .sync_all()
        .map_err(|source| StoreError::io("syncing temp file", tmp.path().to_path_buf(), source))?;
    tmp.persist(path)
        .map_err(|error| StoreError::io("renaming temp file", path, error.error))?;

    Ok(())
}
