//! Error types for the firmware catalog.

use device_ledger_core::{DeviceType, ErrorKind, FirmwareVersion, Principal};
use device_ledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur during firmware catalog operations.
#[derive(Debug, Error)]
pub enum FirmwareError {
    /// Caller is not the catalog administrator.
    #[error("not authorized: {caller} is not the catalog administrator")]
    NotAuthorized { caller: Principal },

    /// A release already exists for this device type and version.
    #[error("firmware {version} already released for {device_type}")]
    AlreadyExists {
        device_type: DeviceType,
        version: FirmwareVersion,
    },

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl FirmwareError {
    /// The rejection kind, or `None` for storage faults.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            FirmwareError::NotAuthorized { .. } => Some(ErrorKind::NotAuthorized),
            FirmwareError::AlreadyExists { .. } => Some(ErrorKind::AlreadyExists),
            FirmwareError::Store(_) => None,
        }
    }
}

/// Result type for firmware catalog operations.
pub type Result<T> = std::result::Result<T, FirmwareError>;
