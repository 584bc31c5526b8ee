use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use dayplan_core::storage::{KeyValueStore, StoreError};
use tempfile::NamedTempFile;
use tracing::instrument;

/// File-per-key store under a root directory. Values are written verbatim
/// through a temp file and renamed into place, so a crashed write never
/// leaves a truncated value behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        write_atomic(&self.path_for(key), value)
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        fs::read(self.path_for(key)).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound {
                key: key.to_string(),
            },
            _ => StoreError::storage(err),
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::storage(err)),
        }
    }
}

fn write_atomic(path: &Path, value: &[u8]) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::storage("invalid storage path"))?;
    fs::create_dir_all(parent).map_err(StoreError::storage)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(StoreError::storage)?;
    tmp.write_all(value).map_err(StoreError::storage)?;
    tmp.flush().map_err(StoreError::storage)?;
    tmp.persist(path)
        .map_err(|e| StoreError::storage(e.error))?;
    Ok(())
}

/// Keeps keys usable as file names: anything outside `[A-Za-z0-9_-]` becomes `_`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
