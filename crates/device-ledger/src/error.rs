//! Error types for the ledger.

use device_ledger_access::AccessError;
use device_ledger_core::ErrorKind;
use device_ledger_firmware::FirmwareError;
use device_ledger_registry::RegistryError;
use device_ledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Access control error.
    #[error("access control: {0}")]
    Access(#[from] AccessError),

    /// Device registry error.
    #[error("device registry: {0}")]
    Registry(#[from] RegistryError),

    /// Firmware catalog error.
    #[error("firmware catalog: {0}")]
    Firmware(#[from] FirmwareError),

    /// Storage error outside any component.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A call result could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The serialized executor is no longer running.
    #[error("ledger service stopped")]
    ServiceStopped,
}

impl LedgerError {
    /// The rejection kind, or `None` for faults of the environment.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            LedgerError::Access(e) => e.kind(),
            LedgerError::Registry(e) => e.kind(),
            LedgerError::Firmware(e) => e.kind(),
            LedgerError::Store(_)
            | LedgerError::Config(_)
            | LedgerError::Encoding(_)
            | LedgerError::ServiceStopped => None,
        }
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
