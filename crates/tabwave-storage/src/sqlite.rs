//! SQLite-backed store.

use crate::KeyValueStore;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tabwave_core::{TabwaveError, TabwaveResult};

/// Database schema version for migrations
const SCHEMA_VERSION: i32 = 1;

/// Single-table key-value store in a SQLite database
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> TabwaveResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| {
            TabwaveError::storage(format!("Failed to open state database: {}", e))
        })?;
        Self::with_connection(conn)
    }

    /// Database that lives only as long as this value
    pub fn in_memory() -> TabwaveResult<Self> {
        let conn = Connection::open_in_memory().map_err(storage_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> TabwaveResult<Self> {
        let version = schema_version(&conn)?;
        if version < SCHEMA_VERSION {
            create_schema_v1(&conn)?;
        } else if version > SCHEMA_VERSION {
            return Err(TabwaveError::storage(format!(
                "state database schema v{} is newer than supported v{}",
                version, SCHEMA_VERSION
            )));
        }
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> TabwaveResult<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(storage_error)
    }

    fn set(&mut self, key: &str, value: &str) -> TabwaveResult<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now_secs()],
            )
            .map_err(storage_error)?;
        tracing::trace!(key, bytes = value.len(), "Wrote sqlite store entry");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> TabwaveResult<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(storage_error)?;
        Ok(())
    }
}

fn schema_version(conn: &Connection) -> TabwaveResult<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get::<_, i32>(0).map(|count| count > 0),
        )
        .map_err(storage_error)?;

    if !table_exists {
        return Ok(0);
    }

    let version = conn
        .query_row(
            "SELECT version FROM schema_version ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(storage_error)?;
    Ok(version.unwrap_or(0))
}

/// Create initial schema (version 1)
fn create_schema_v1(conn: &Connection) -> TabwaveResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            version INTEGER NOT NULL,
            applied_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );
        "#,
    )
    .map_err(storage_error)?;

    conn.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        params![SCHEMA_VERSION, now_secs()],
    )
    .map_err(storage_error)?;

    tracing::debug!(version = SCHEMA_VERSION, "Created state database schema");
    Ok(())
}

fn storage_error(err: rusqlite::Error) -> TabwaveError {
    TabwaveError::storage(err.to_string())
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get("state").unwrap(), None);

        store.set("state", "one").unwrap();
        store.set("state", "two").unwrap();
        assert_eq!(store.get("state").unwrap().as_deref(), Some("two"));

        store.remove("state").unwrap();
        assert_eq!(store.get("state").unwrap(), None);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabwave.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.set("state", "persisted").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("state").unwrap().as_deref(), Some("persisted"));
        assert_eq!(schema_version(&store.conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_newer_schema_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_v1(&conn).unwrap();
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, 0)",
            params![SCHEMA_VERSION + 1],
        )
        .unwrap();

        let result = SqliteStore::with_connection(conn);
        assert!(matches!(result, Err(TabwaveError::Storage(_))));
    }
}
