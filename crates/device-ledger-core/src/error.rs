//! Error types for the device ledger core.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Core errors raised while encoding or decoding stored records.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Why a call was rejected.
///
/// These are the only failures a caller can observe from a well-behaved
/// ledger. They serialize to the stable `ERR_*` codes used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller lacks the administrator or ownership capability.
    #[serde(rename = "ERR_NOT_AUTHORIZED")]
    NotAuthorized,

    /// The referenced device does not exist.
    #[serde(rename = "ERR_NOT_FOUND")]
    NotFound,

    /// Device id collision on registration.
    #[serde(rename = "ERR_ALREADY_REGISTERED")]
    AlreadyRegistered,

    /// Firmware release collision on `(device type, version)`.
    #[serde(rename = "ERR_ALREADY_EXISTS")]
    AlreadyExists,
}

impl ErrorKind {
    /// The stable wire code.
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotAuthorized => "ERR_NOT_AUTHORIZED",
            ErrorKind::NotFound => "ERR_NOT_FOUND",
            ErrorKind::AlreadyRegistered => "ERR_ALREADY_REGISTERED",
            ErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
