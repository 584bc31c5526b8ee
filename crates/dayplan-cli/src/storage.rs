use std::path::PathBuf;

use color_eyre::Result;
use dayplan_storage::file_store::FileStore;
use dayplan_task::KvTaskStore;
use dirs::data_dir;
use tracing::debug;

use crate::config::Config;

/// Resolve the default data directory for dayplan.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("dayplan"))
}

/// File store rooted at the configured data directory, or the platform default.
pub fn store_from_config(config: &Config) -> Result<FileStore> {
    let root = match &config.data_dir {
        Some(root) => {
            debug!(?root, "initializing file store (config override)");
            root.clone()
        }
        None => {
            let root = default_data_dir()?;
            debug!(?root, "initializing file store");
            root
        }
    };
    Ok(FileStore::new(root))
}

pub fn task_store(config: &Config) -> Result<KvTaskStore<FileStore>> {
    Ok(KvTaskStore::new(store_from_config(config)?))
}

/// Helper for tests: a task store rooted at a temp dir.
#[cfg(test)]
pub fn test_task_store(root: impl Into<PathBuf>) -> KvTaskStore<FileStore> {
    KvTaskStore::new(FileStore::new(root))
}
