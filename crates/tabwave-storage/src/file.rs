//! One file per key under a root directory.

use crate::KeyValueStore;
use std::fs;
use std::path::{Path, PathBuf};
use tabwave_core::{TabwaveError, TabwaveResult};

/// Directory-backed store
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> TabwaveResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| {
            TabwaveError::storage(format!(
                "failed to create store directory `{}`: {}",
                root.display(),
                err
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds `key`.
    ///
    /// Keys map to file names one to one, so only `[a-z0-9._-]` is
    /// accepted; anything else is an error rather than a rewritten name
    /// that another key could share.
    pub fn path_for(&self, key: &str) -> TabwaveResult<PathBuf> {
        check_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> TabwaveResult<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path).map(Some).map_err(|err| {
            TabwaveError::storage(format!("failed to read `{}`: {}", path.display(), err))
        })
    }

    fn set(&mut self, key: &str, value: &str) -> TabwaveResult<()> {
        let path = self.path_for(key)?;
        // Readers never see a half-written file.
        let staging = path.with_extension("json.tmp");

        fs::write(&staging, value).map_err(|err| {
            TabwaveError::storage(format!("failed to write `{}`: {}", staging.display(), err))
        })?;
        fs::rename(&staging, &path).map_err(|err| {
            TabwaveError::storage(format!("failed to replace `{}`: {}", path.display(), err))
        })?;

        tracing::trace!(key, bytes = value.len(), "Wrote file store entry");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> TabwaveResult<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(&path).map_err(|err| {
                TabwaveError::storage(format!("failed to remove `{}`: {}", path.display(), err))
            })?;
        }
        Ok(())
    }
}

fn check_key(key: &str) -> TabwaveResult<()> {
    let portable = key
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '.' | '-' | '_'));

    if key.is_empty() || !portable || key.chars().all(|ch| ch == '.') {
        return Err(TabwaveError::storage(format!(
            "key `{}` is not a valid file store key",
            key
        )));
    }
    Ok(())
}
