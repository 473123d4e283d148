//! The firmware catalog.

use std::sync::Arc;

use device_ledger_core::{
    keys, Clock, DeviceFirmwareState, DeviceId, DeviceType, FirmwareRelease, FirmwareVersion,
    Namespace, Principal,
};
use device_ledger_store::{InsertResult, Store, StoreError, StoreExt};

use crate::error::{FirmwareError, Result};

const NS: Namespace = Namespace::FirmwareCatalog;

/// Released firmware and per-device installed versions.
pub struct FirmwareCatalog<S: Store> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    admin: Principal,
}

impl<S: Store> FirmwareCatalog<S> {
    /// Create a catalog over `store`, with `admin` allowed to publish releases.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, admin: Principal) -> Self {
        Self {
            store,
            clock,
            admin,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Releases
    // ─────────────────────────────────────────────────────────────────────────

    /// Publish a release. Authorization is checked before existence.
    pub fn release_firmware(
        &self,
        caller: &Principal,
        device_type: &DeviceType,
        version: &FirmwareVersion,
        hash: &str,
        url: &str,
        release_notes: &str,
    ) -> Result<FirmwareRelease> {
        if caller != &self.admin {
            tracing::debug!(caller = %caller, "firmware release rejected");
            return Err(FirmwareError::NotAuthorized {
                caller: caller.clone(),
            });
        }

        let release = FirmwareRelease {
            hash: hash.to_owned(),
            url: url.to_owned(),
            release_notes: release_notes.to_owned(),
            released_by: caller.clone(),
            released_at: self.clock.now(),
        };

        match self
            .store
            .insert_record(NS, &keys::release(device_type, version), &release)?
        {
            InsertResult::Inserted => {
                tracing::debug!(
                    device_type = %device_type,
                    version = %version,
                    released_at = %release.released_at,
                    "released firmware"
                );
                Ok(release)
            }
            InsertResult::AlreadyExists => Err(FirmwareError::AlreadyExists {
                device_type: device_type.clone(),
                version: version.clone(),
            }),
        }
    }

    pub fn get_firmware_info(
        &self,
        device_type: &DeviceType,
        version: &FirmwareVersion,
    ) -> Result<Option<FirmwareRelease>> {
        Ok(self
            .store
            .get_record(NS, &keys::release(device_type, version))?)
    }

    /// Every release of `device_type`, ordered by version key.
    pub fn releases_for_type(
        &self,
        device_type: &DeviceType,
    ) -> Result<Vec<(FirmwareVersion, FirmwareRelease)>> {
        let entries: Vec<(String, FirmwareRelease)> = self
            .store
            .scan_records(NS, &keys::release_prefix(device_type))?;

        entries
            .into_iter()
            .map(|(key, release)| {
                let version = keys::last_segment(&key).ok_or_else(|| {
                    StoreError::InvalidData(format!("malformed release key: {}", key))
                })?;
                Ok((FirmwareVersion::from(version), release))
            })
            .collect::<std::result::Result<_, StoreError>>()
            .map_err(FirmwareError::from)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Installed versions
    // ─────────────────────────────────────────────────────────────────────────

    /// Record `version` as installed on `device`, replacing any previous value.
    ///
    /// Neither the caller nor the version is checked against anything.
    pub fn update_device_firmware(
        &self,
        caller: &Principal,
        device: &DeviceId,
        version: &FirmwareVersion,
    ) -> Result<()> {
        let state = DeviceFirmwareState::new(version.clone());
        self.store.put_record(NS, &keys::installed(device), &state)?;

        tracing::debug!(
            device = %device,
            version = %version,
            caller = %caller,
            "updated device firmware"
        );
        Ok(())
    }

    /// The installed version, or the empty sentinel when nothing is recorded.
    pub fn get_device_firmware_version(&self, device: &DeviceId) -> Result<FirmwareVersion> {
        let state: Option<DeviceFirmwareState> =
            self.store.get_record(NS, &keys::installed(device))?;
        Ok(state.unwrap_or_default().current_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_ledger_core::{BlockHeight, ErrorKind, FixedClock};
    use device_ledger_store::MemoryStore;

    const OWNER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    fn setup() -> (FirmwareCatalog<MemoryStore>, Principal) {
        let admin = Principal::from(OWNER);
        let catalog = FirmwareCatalog::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedClock(BlockHeight(42))),
            admin.clone(),
        );
        (catalog, admin)
    }

    fn release_v1(
        catalog: &FirmwareCatalog<MemoryStore>,
        caller: &Principal,
    ) -> Result<FirmwareRelease> {
        catalog.release_firmware(
            caller,
            &DeviceType::from("device-type-1"),
            &FirmwareVersion::from("1.0.0"),
            "0x1234567890",
            "https://example.com/firmware",
            "Initial release",
        )
    }

    #[test]
    fn test_release_firmware() {
        let (catalog, admin) = setup();
        let release = release_v1(&catalog, &admin).unwrap();

        assert_eq!(release.released_by, admin);
        assert_eq!(release.released_at, BlockHeight(42));

        let info = catalog
            .get_firmware_info(&DeviceType::from("device-type-1"), &FirmwareVersion::from("1.0.0"))
            .unwrap()
            .unwrap();
        assert_eq!(info.hash, "0x1234567890");
        assert_eq!(info, release);
    }

    #[test]
    fn test_release_requires_admin() {
        let (catalog, _) = setup();
        let outsider = Principal::from("ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG");
        let err = release_v1(&catalog, &outsider).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotAuthorized));
        assert!(catalog
            .releases_for_type(&DeviceType::from("device-type-1"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_duplicate_release_keeps_original() {
        let (catalog, admin) = setup();
        let original = release_v1(&catalog, &admin).unwrap();

        let err = catalog
            .release_firmware(
                &admin,
                &DeviceType::from("device-type-1"),
                &FirmwareVersion::from("1.0.0"),
                "0xdeadbeef",
                "https://example.com/other",
                "Duplicate release",
            )
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::AlreadyExists));

        let info = catalog
            .get_firmware_info(&DeviceType::from("device-type-1"), &FirmwareVersion::from("1.0.0"))
            .unwrap();
        assert_eq!(info, Some(original));
    }

    #[test]
    fn test_unknown_release_is_absent() {
        let (catalog, _) = setup();
        assert_eq!(
            catalog
                .get_firmware_info(&DeviceType::from("t"), &FirmwareVersion::from("9.9.9"))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_device_firmware_version() {
        let (catalog, _) = setup();
        let device = DeviceId::from("device1");
        let anyone = Principal::from("user1");

        assert!(catalog.get_device_firmware_version(&device).unwrap().is_empty());

        catalog
            .update_device_firmware(&anyone, &device, &FirmwareVersion::from("1.2.0"))
            .unwrap();
        assert_eq!(
            catalog.get_device_firmware_version(&device).unwrap(),
            FirmwareVersion::from("1.2.0")
        );

        // Unreleased versions are accepted as-is.
        catalog
            .update_device_firmware(&anyone, &device, &FirmwareVersion::from("never-released"))
            .unwrap();
        assert_eq!(
            catalog.get_device_firmware_version(&device).unwrap().as_str(),
            "never-released"
        );
    }

    #[test]
    fn test_releases_for_type() {
        let (catalog, admin) = setup();
        let t = DeviceType::from("sensor");

        for v in ["2.0.0", "1.0.0", "1.1.0"] {
            catalog
                .release_firmware(&admin, &t, &FirmwareVersion::from(v), "h", "u", "n")
                .unwrap();
        }
        catalog
            .release_firmware(
                &admin,
                &DeviceType::from("sensor-x"),
                &FirmwareVersion::from("1.0.0"),
                "h",
                "u",
                "n",
            )
            .unwrap();

        let versions: Vec<String> = catalog
            .releases_for_type(&t)
            .unwrap()
            .into_iter()
            .map(|(v, _)| v.into_inner())
            .collect();
        assert_eq!(versions, vec!["1.0.0", "1.1.0", "2.0.0"]);
    }
}
