//! In-memory implementation of the Store trait.
//!
//! Same semantics as SQLite but everything lives in memory with no
//! persistence. Used by tests and by embedders that replay state on start.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;

use device_ledger_core::Namespace;

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// One ordered map per namespace so prefix scans come out sorted.
    namespaces: HashMap<Namespace, BTreeMap<String, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Bytes>> {
        let inner = self.read()?;
        Ok(inner.namespaces.get(&ns).and_then(|m| m.get(key)).cloned())
    }

    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<()> {
        let mut inner = self.write()?;
        inner
            .namespaces
            .entry(ns)
            .or_default()
            .insert(key.to_owned(), Bytes::copy_from_slice(value));
        Ok(())
    }

    fn put_if_absent(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<InsertResult> {
        let mut inner = self.write()?;
        let map = inner.namespaces.entry(ns).or_default();

        if map.contains_key(key) {
            return Ok(InsertResult::AlreadyExists);
        }

        map.insert(key.to_owned(), Bytes::copy_from_slice(value));
        Ok(InsertResult::Inserted)
    }

    fn delete(&self, ns: Namespace, key: &str) -> Result<bool> {
        let mut inner = self.write()?;
        Ok(inner
            .namespaces
            .get_mut(&ns)
            .and_then(|m| m.remove(key))
            .is_some())
    }

    fn scan_prefix(&self, ns: Namespace, prefix: &str) -> Result<Vec<(String, Bytes)>> {
        let inner = self.read()?;
        let Some(map) = inner.namespaces.get(&ns) else {
            return Ok(Vec::new());
        };

        Ok(map
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    fn count(&self, ns: Namespace) -> Result<usize> {
        let inner = self.read()?;
        Ok(inner.namespaces.get(&ns).map_or(0, BTreeMap::len))
    }
}
