//! Key-value storage for the Tabwave snapshot.
//!
//! The shell persists one serialized blob under one key; everything here
//! is about getting that string in and out of somewhere durable.

pub mod file;
pub mod memory;
pub mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use tabwave_core::{ShellConfig, StorageBackend, TabwaveResult};

/// A string-keyed store of string values
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> TabwaveResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> TabwaveResult<()>;

    /// Delete `key`; deleting a missing key is not an error
    fn remove(&mut self, key: &str) -> TabwaveResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> TabwaveResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> TabwaveResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> TabwaveResult<()> {
        (**self).remove(key)
    }
}

/// Open the backend selected in `config`, rooted at its data directory
pub fn open_backend(config: &ShellConfig) -> TabwaveResult<Box<dyn KeyValueStore>> {
    tracing::info!(
        backend = config.backend.as_str(),
        data_dir = %config.data_dir.display(),
        "Opening storage backend"
    );

    let store: Box<dyn KeyValueStore> = match config.backend {
        StorageBackend::Memory => Box::new(MemoryStore::new()),
        StorageBackend::Json => Box::new(FileStore::open(config.data_dir.join("state"))?),
        StorageBackend::Sqlite => Box::new(SqliteStore::open(&config.data_dir.join("tabwave.db"))?),
    };
    Ok(store)
}
