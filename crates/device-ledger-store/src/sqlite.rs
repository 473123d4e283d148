//! SQLite implementation of the Store trait.
//!
//! The durable storage backend. Uses rusqlite with bundled SQLite; every
//! namespace lives in the single `kv` table created by [`crate::migration`].

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use device_ledger_core::Namespace;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via an internal Mutex. Each call runs as one statement, so a
/// write is committed before the call returns.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file, its parent directories, and runs migrations if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Poisoned(format!("mutex poisoned: {}", e)))
    }

    /// Execute an operation on the connection.
    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }
}

impl Store for SqliteStore {
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Bytes>> {
        self.with_conn(|conn| {
            let value: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT value FROM kv WHERE namespace = ?1 AND key = ?2",
                    params![ns.as_str(), key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value.map(Bytes::from))
        })
    }

    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (namespace, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value",
                params![ns.as_str(), key, value],
            )?;
            Ok(())
        })
    }

    fn put_if_absent(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<InsertResult> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO kv (namespace, key, value) VALUES (?1, ?2, ?3)",
                params![ns.as_str(), key, value],
            )?;

            if changed == 0 {
                Ok(InsertResult::AlreadyExists)
            } else {
                Ok(InsertResult::Inserted)
            }
        })
    }

    fn delete(&self, ns: Namespace, key: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM kv WHERE namespace = ?1 AND key = ?2",
                params![ns.as_str(), key],
            )?;
            Ok(changed > 0)
        })
    }

    fn scan_prefix(&self, ns: Namespace, prefix: &str) -> Result<Vec<(String, Bytes)>> {
        self.with_conn(|conn| {
            // BINARY collation orders TEXT by its UTF-8 bytes, same as `String`.
            // The prefix is matched as a blob: TEXT `length` counts characters
            // and stops at the first NUL.
            let mut stmt = conn.prepare(
                "SELECT key, value FROM kv
                 WHERE namespace = ?1 AND substr(CAST(key AS BLOB), 1, length(?2)) = ?2
                 ORDER BY key",
            )?;

            let entries = stmt
                .query_map(params![ns.as_str(), prefix.as_bytes()], |row| {
                    let key: String = row.get(0)?;
                    let value: Vec<u8> = row.get(1)?;
                    Ok((key, Bytes::from(value)))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(entries)
        })
    }

    fn count(&self, ns: Namespace) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM kv WHERE namespace = ?1",
                params![ns.as_str()],
                |row| row.get(0),
            )?;
            usize::try_from(count)
                .map_err(|_| StoreError::InvalidData(format!("negative row count {}", count)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_store_basic() {
        let store = SqliteStore::open_memory().unwrap();

        store.put(Namespace::DeviceRegistry, "device/d1", b"one").unwrap();
        assert_eq!(
            store.get(Namespace::DeviceRegistry, "device/d1").unwrap(),
            Some(Bytes::from_static(b"one"))
        );
        assert_eq!(store.get(Namespace::AccessControl, "device/d1").unwrap(), None);
    }

    #[test]
    fn test_sqlite_store_overwrite() {
        let store = SqliteStore::open_memory().unwrap();
        let ns = Namespace::FirmwareCatalog;

        store.put(ns, "installed/d1", b"1.0.0").unwrap();
        store.put(ns, "installed/d1", b"1.1.0").unwrap();

        assert_eq!(store.get(ns, "installed/d1").unwrap(), Some(Bytes::from_static(b"1.1.0")));
        assert_eq!(store.count(ns).unwrap(), 1);
    }

    #[test]
    fn test_sqlite_store_put_if_absent() {
        let store = SqliteStore::open_memory().unwrap();
        let ns = Namespace::FirmwareCatalog;

        assert_eq!(store.put_if_absent(ns, "k", b"first").unwrap(), InsertResult::Inserted);
        assert_eq!(store.put_if_absent(ns, "k", b"second").unwrap(), InsertResult::AlreadyExists);
        assert_eq!(store.get(ns, "k").unwrap(), Some(Bytes::from_static(b"first")));
    }

    #[test]
    fn test_sqlite_store_prefix_with_like_metacharacters() {
        let store = SqliteStore::open_memory().unwrap();
        let ns = Namespace::AccessControl;

        store.put(ns, "perm/d_1/u", b"a").unwrap();
        store.put(ns, "perm/dx1/u", b"b").unwrap();

        let entries = store.scan_prefix(ns, "perm/d_1/").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "perm/d_1/u");
    }

    #[test]
    fn test_sqlite_store_prefix_with_nul_and_multibyte() {
        let store = SqliteStore::open_memory().unwrap();
        let ns = Namespace::AccessControl;

        store.put(ns, "perm/a\0b/u", b"a").unwrap();
        store.put(ns, "perm/a\0c/u", b"b").unwrap();
        store.put(ns, "perm/d\u{e9}v/u", b"c").unwrap();
        store.put(ns, "perm/dev/u", b"d").unwrap();

        let entries = store.scan_prefix(ns, "perm/a\0b/").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "perm/a\0b/u");

        let entries = store.scan_prefix(ns, "perm/d\u{e9}v/").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, Bytes::from_static(b"c"));
    }
}
