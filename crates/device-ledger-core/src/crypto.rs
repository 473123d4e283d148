//! Hashing primitives for the device ledger.
//!
//! The ledger does not sign or verify anything. Blake3 is only used to
//! commit to the contents of the namespaces so two ledgers (or the same
//! ledger before and after a rejected call) can be compared cheaply.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Namespace;

/// A 32-byte Blake3 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blake3Hash(pub [u8; 32]);

impl Blake3Hash {
    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Blake3Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blake3({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Blake3Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Blake3Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Incremental digest over namespace entries.
///
/// Every field is length-prefixed, so the entry boundaries are part of the
/// digest. Entries must be fed in a stable order (sorted by key) for two
/// stores with the same contents to agree.
pub struct Digester {
    hasher: blake3::Hasher,
}

impl Digester {
    /// Domain separation tag for ledger state digests.
    pub const DOMAIN: &'static [u8] = b"device-ledger/state/v1";

    pub fn new() -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(Self::DOMAIN);
        Self { hasher }
    }

    /// Start a namespace section.
    pub fn namespace(&mut self, ns: Namespace) -> &mut Self {
        self.field(ns.as_str().as_bytes())
    }

    /// Add one key/value entry.
    pub fn entry(&mut self, key: &str, value: &[u8]) -> &mut Self {
        self.field(key.as_bytes()).field(value)
    }

    fn field(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update(&(bytes.len() as u64).to_be_bytes());
        self.hasher.update(bytes);
        self
    }

    pub fn finalize(&self) -> Blake3Hash {
        Blake3Hash(*self.hasher.finalize().as_bytes())
    }
}

impl Default for Digester {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_boundaries_matter() {
        let mut a = Digester::new();
        a.entry("ab", b"c");
        let mut b = Digester::new();
        b.entry("a", b"bc");
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_namespace_sections_matter() {
        let mut a = Digester::new();
        a.namespace(Namespace::AccessControl).entry("k", b"v");
        let mut b = Digester::new();
        b.namespace(Namespace::DeviceRegistry).entry("k", b"v");
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_hash_hex_display() {
        let h = Blake3Hash([0xab; 32]);
        assert_eq!(h.to_string().len(), 64);
        assert!(format!("{:?}", h).starts_with("Blake3(abab"));
    }
}
