//! Canonical CBOR encoding of stored records.
//!
//! Records are encoded as CBOR maps keyed by field name, never positionally,
//! so a record written by an older build still decodes after fields are
//! added and unknown fields are skipped on read. Field order follows the
//! struct declaration, which makes the encoding of a given record
//! deterministic and lets namespace digests be compared across stores.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CoreError;

/// Encode a record to CBOR bytes.
pub fn encode_record<T: Serialize>(record: &T) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(record, &mut buf).map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(buf)
}

/// Decode a record from CBOR bytes.
pub fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CoreError> {
    ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
}
