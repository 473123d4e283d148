//! Error types for the access control ledger.

use device_ledger_core::{ErrorKind, Principal};
use device_ledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur during access control operations.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Caller is not the ledger administrator.
    #[error("not authorized: {caller} is not the ledger administrator")]
    NotAuthorized { caller: Principal },

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl AccessError {
    /// The rejection kind, or `None` for storage faults.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AccessError::NotAuthorized { .. } => Some(ErrorKind::NotAuthorized),
            AccessError::Store(_) => None,
        }
    }
}

/// Result type for access control operations.
pub type Result<T> = std::result::Result<T, AccessError>;
