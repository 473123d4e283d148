//! Error types for the device registry.

use device_ledger_core::{DeviceId, ErrorKind, Principal};
use device_ledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A device with this id already exists.
    #[error("device already registered: {0}")]
    AlreadyRegistered(DeviceId),

    /// No device with this id.
    #[error("device not found: {0}")]
    NotFound(DeviceId),

    /// Caller is not the device owner.
    #[error("not authorized: {caller} does not own {device}")]
    NotAuthorized { caller: Principal, device: DeviceId },

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// The rejection kind, or `None` for storage faults.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            RegistryError::AlreadyRegistered(_) => Some(ErrorKind::AlreadyRegistered),
            RegistryError::NotFound(_) => Some(ErrorKind::NotFound),
            RegistryError::NotAuthorized { .. } => Some(ErrorKind::NotAuthorized),
            RegistryError::Store(_) => None,
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
