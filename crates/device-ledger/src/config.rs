//! Ledger configuration.
//!
//! Administrator identities are resolved here, at construction, never
//! embedded in the components.

use std::path::Path;

use serde::{Deserialize, Serialize};

use device_ledger_core::Principal;

use crate::error::{LedgerError, Result};

/// Who may record a device's installed firmware version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FirmwareUpdatePolicy {
    /// Any caller, any device, any version string.
    #[default]
    Permissive,
    /// Only the registered owner of the device.
    OwnerOnly,
}

/// Configuration for the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LedgerConfig {
    /// May grant and revoke permissions.
    pub ledger_admin: Principal,

    /// May publish firmware releases.
    pub catalog_admin: Principal,

    /// Authorization applied to installed-version updates.
    #[serde(default)]
    pub firmware_policy: FirmwareUpdatePolicy,
}

impl LedgerConfig {
    /// One identity for both administrator roles.
    pub fn with_admin(admin: Principal) -> Self {
        Self {
            ledger_admin: admin.clone(),
            catalog_admin: admin,
            firmware_policy: FirmwareUpdatePolicy::default(),
        }
    }

    /// Replace the firmware update policy.
    pub fn firmware_policy(mut self, policy: FirmwareUpdatePolicy) -> Self {
        self.firmware_policy = policy;
        self
    }

    /// Parse from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Reject administrator identities that no caller could ever match.
    pub fn validate(&self) -> Result<()> {
        if self.ledger_admin.as_str().is_empty() {
            return Err(LedgerError::Config("ledger-admin must not be empty".into()));
        }
        if self.catalog_admin.as_str().is_empty() {
            return Err(LedgerError::Config("catalog-admin must not be empty".into()));
        }
        Ok(())
    }
}
