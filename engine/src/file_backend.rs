//! Durable session slot: one JSON file, replaced atomically on every save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quartet_core::{RecordStore, StorageBackend, StorageError};
use quartet_utils::{atomic_write, recover_bak_file, remove_if_exists};

/// Session records persisted to a file.
pub type FileStore = RecordStore<FileBackend>;

#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Restores a `.bak` left behind by an interrupted write before first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        recover_bak_file(&path);
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        atomic_write(&self.path, contents.as_bytes())?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        remove_if_exists(&self.path)?;
        Ok(())
    }
}
