use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot create {path}: {source}")]
    Dir { path: PathBuf, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes `{dir}/{file_name}`, creating `dir` if needed. The bytes land in a
/// temp file next to the target and are renamed over it, so the settings
/// record or saved artwork is either the old file or the complete new one.
pub fn write_atomic(dir: &Path, file_name: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
    fs::create_dir_all(dir).map_err(|source| PersistError::Dir {
        path: dir.to_path_buf(),
        source,
    })?;

    let target = dir.join(file_name);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
    Ok(target)
}
