//! Store trait: the abstract interface for ledger persistence.
//!
//! This trait keeps the ledger storage-agnostic. Implementations include
//! SQLite (durable) and in-memory (tests, embedding).

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use device_ledger_core::{decode_record, encode_record, Blake3Hash, Digester, Namespace};

use crate::error::Result;

/// Result of an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// The value was written.
    Inserted,
    /// A value already exists under the key; nothing was written.
    AlreadyExists,
}

/// The Store trait: a namespaced key/value map.
///
/// Calls are synchronous and complete before returning. A read observes
/// every write that returned before it.
///
/// # Design Notes
///
/// - **No implicit defaults**: an absent key is `None`. Default-value policy
///   belongs to the component reading the record.
/// - **Atomic creation**: `put_if_absent` must check and write as a single
///   step; creation paths rely on it rather than a read before the write.
/// - **Ordering**: `scan_prefix` returns entries sorted by key bytes.
pub trait Store: Send + Sync {
    /// Get the raw value under `key`.
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Bytes>>;

    /// Write `value` under `key`, replacing any previous value.
    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<()>;

    /// Write `value` under `key` only if the key is vacant.
    fn put_if_absent(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<InsertResult>;

    /// Remove `key`. Returns whether a value was removed.
    fn delete(&self, ns: Namespace, key: &str) -> Result<bool>;

    /// All entries whose key starts with `prefix`, sorted by key.
    ///
    /// An empty prefix scans the whole namespace.
    fn scan_prefix(&self, ns: Namespace, prefix: &str) -> Result<Vec<(String, Bytes)>>;

    /// Number of entries in the namespace.
    fn count(&self, ns: Namespace) -> Result<usize>;
}

/// Extension trait for typed record access.
pub trait StoreExt: Store {
    /// Read and decode a record.
    fn get_record<T: DeserializeOwned>(&self, ns: Namespace, key: &str) -> Result<Option<T>> {
        match self.get(ns, key)? {
            Some(bytes) => Ok(Some(decode_record(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Encode and write a record, replacing any previous value.
    fn put_record<T: Serialize>(&self, ns: Namespace, key: &str, record: &T) -> Result<()> {
        let bytes = encode_record(record)?;
        self.put(ns, key, &bytes)
    }

    /// Encode and write a record only if the key is vacant.
    fn insert_record<T: Serialize>(
        &self,
        ns: Namespace,
        key: &str,
        record: &T,
    ) -> Result<InsertResult> {
        let bytes = encode_record(record)?;
        self.put_if_absent(ns, key, &bytes)
    }

    /// Decode every record under `prefix`, sorted by key.
    fn scan_records<T: DeserializeOwned>(
        &self,
        ns: Namespace,
        prefix: &str,
    ) -> Result<Vec<(String, T)>> {
        self.scan_prefix(ns, prefix)?
            .into_iter()
            .map(|(key, bytes)| Ok((key, decode_record(&bytes)?)))
            .collect()
    }

    /// Digest of one namespace's full contents.
    fn namespace_digest(&self, ns: Namespace) -> Result<Blake3Hash> {
        let mut digester = Digester::new();
        feed_namespace(self, &mut digester, ns)?;
        Ok(digester.finalize())
    }

    /// Digest of every namespace. Equal digests mean equal contents.
    fn state_digest(&self) -> Result<Blake3Hash> {
        let mut digester = Digester::new();
        for ns in Namespace::ALL {
            feed_namespace(self, &mut digester, ns)?;
        }
        Ok(digester.finalize())
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

fn feed_namespace<S: Store + ?Sized>(
    store: &S,
    digester: &mut Digester,
    ns: Namespace,
) -> Result<()> {
    digester.namespace(ns);
    for (key, value) in store.scan_prefix(ns, "")? {
        digester.entry(&key, &value);
    }
    Ok(())
}
