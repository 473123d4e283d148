//! A materialized permission grant.

use serde::{Deserialize, Serialize};

use device_ledger_core::{keys, DeviceId, Permission, Principal};
use device_ledger_store::StoreError;

/// One stored `(device, user) -> permission` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// The device the grant applies to.
    pub device: DeviceId,

    /// The principal holding the grant.
    pub user: Principal,

    /// The granted triple.
    pub permission: Permission,
}

impl Grant {
    pub fn new(device: DeviceId, user: Principal, permission: Permission) -> Self {
        Self {
            device,
            user,
            permission,
        }
    }

    /// The storage key of this grant.
    pub fn key(&self) -> String {
        keys::permission(&self.device, &self.user)
    }

    /// Rebuild a grant from a scanned storage entry of `device`.
    pub(crate) fn from_entry(
        device: &DeviceId,
        key: &str,
        permission: Permission,
    ) -> Result<Self, StoreError> {
        let user = keys::last_segment(key)
            .ok_or_else(|| StoreError::InvalidData(format!("malformed permission key: {}", key)))?;
        Ok(Self::new(device.clone(), Principal::from(user), permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_key_roundtrip() {
        let grant = Grant::new(
            DeviceId::from("device1"),
            Principal::from("user/1"),
            Permission::new(true, false, false),
        );
        let rebuilt = Grant::from_entry(&grant.device, &grant.key(), grant.permission).unwrap();
        assert_eq!(rebuilt, grant);
    }

    #[test]
    fn test_malformed_key_rejected() {
        let err = Grant::from_entry(&DeviceId::from("d"), "perm/d/bad%zz", Permission::none())
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }
}
