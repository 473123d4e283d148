//! The Ledger: unified API over the three components.
//!
//! The ledger owns the store and hands each component a shared reference to
//! it. Components never call each other; the only cross-component rule (the
//! owner-only firmware policy) is enforced here.

use std::sync::Arc;

use device_ledger_access::{AccessControlLedger, Grant};
use device_ledger_core::{
    Blake3Hash, Clock, Device, DeviceId, DeviceType, FirmwareRelease, FirmwareVersion, Namespace,
    Permission, Principal,
};
use device_ledger_firmware::FirmwareCatalog;
use device_ledger_registry::{DeviceRegistry, RegistryError};
use device_ledger_store::{Store, StoreExt};

use crate::config::{FirmwareUpdatePolicy, LedgerConfig};
use crate::error::Result;

/// The device ledger.
///
/// Provides a unified API for:
/// - Registering, updating and transferring devices
/// - Granting, revoking and checking permissions
/// - Publishing firmware releases and tracking installed versions
pub struct Ledger<S: Store> {
    store: Arc<S>,
    config: LedgerConfig,
    access: AccessControlLedger<S>,
    registry: DeviceRegistry<S>,
    firmware: FirmwareCatalog<S>,
}

impl<S: Store> Ledger<S> {
    /// Create a ledger that takes ownership of `store`.
    ///
    /// Fails with [`LedgerError::Config`] when `config` names an empty admin.
    ///
    /// [`LedgerError::Config`]: crate::LedgerError::Config
    pub fn new(store: S, clock: Arc<dyn Clock>, config: LedgerConfig) -> Result<Self> {
        Self::with_shared_store(Arc::new(store), clock, config)
    }

    /// Create a ledger over a store the caller keeps a handle to.
    pub fn with_shared_store(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        config: LedgerConfig,
    ) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            ledger_admin = %config.ledger_admin,
            catalog_admin = %config.catalog_admin,
            firmware_policy = ?config.firmware_policy,
            "ledger initialized"
        );

        Ok(Self {
            access: AccessControlLedger::new(Arc::clone(&store), config.ledger_admin.clone()),
            registry: DeviceRegistry::new(Arc::clone(&store), Arc::clone(&clock)),
            firmware: FirmwareCatalog::new(
                Arc::clone(&store),
                clock,
                config.catalog_admin.clone(),
            ),
            store,
            config,
        })
    }

    /// Digest over every namespace. Unchanged by any rejected call.
    pub fn state_digest(&self) -> Result<Blake3Hash> {
        Ok(self.store.state_digest()?)
    }

    /// Digest of a single component's namespace.
    pub fn namespace_digest(&self, ns: Namespace) -> Result<Blake3Hash> {
        Ok(self.store.namespace_digest(ns)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access Control
    // ─────────────────────────────────────────────────────────────────────────

    pub fn grant_permission(
        &self,
        caller: &Principal,
        device: &DeviceId,
        user: &Principal,
        permission: Permission,
    ) -> Result<()> {
        Ok(self.access.grant_permission(caller, device, user, permission)?)
    }

    pub fn revoke_permission(
        &self,
        caller: &Principal,
        device: &DeviceId,
        user: &Principal,
    ) -> Result<()> {
        Ok(self.access.revoke_permission(caller, device, user)?)
    }

    pub fn check_permission(&self, device: &DeviceId, user: &Principal) -> Result<Permission> {
        Ok(self.access.check_permission(device, user)?)
    }

    pub fn can_read(&self, device: &DeviceId, user: &Principal) -> Result<bool> {
        Ok(self.access.can_read(device, user)?)
    }

    pub fn can_write(&self, device: &DeviceId, user: &Principal) -> Result<bool> {
        Ok(self.access.can_write(device, user)?)
    }

    pub fn can_update(&self, device: &DeviceId, user: &Principal) -> Result<bool> {
        Ok(self.access.can_update(device, user)?)
    }

    pub fn permissions_for_device(&self, device: &DeviceId) -> Result<Vec<Grant>> {
        Ok(self.access.permissions_for_device(device)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Device Registry
    // ─────────────────────────────────────────────────────────────────────────

    pub fn register_device(
        &self,
        caller: &Principal,
        device: &DeviceId,
        metadata: &str,
    ) -> Result<Device> {
        Ok(self.registry.register_device(caller, device, metadata)?)
    }

    pub fn update_device_metadata(
        &self,
        caller: &Principal,
        device: &DeviceId,
        metadata: &str,
    ) -> Result<()> {
        Ok(self.registry.update_device_metadata(caller, device, metadata)?)
    }

    /// Transfer ownership. Permission grants on the device are left as they are.
    pub fn transfer_device(
        &self,
        caller: &Principal,
        device: &DeviceId,
        new_owner: &Principal,
    ) -> Result<()> {
        Ok(self.registry.transfer_device(caller, device, new_owner)?)
    }

    pub fn get_device(&self, device: &DeviceId) -> Result<Option<Device>> {
        Ok(self.registry.get_device(device)?)
    }

    pub fn is_device_owner(&self, device: &DeviceId, candidate: &Principal) -> Result<bool> {
        Ok(self.registry.is_device_owner(device, candidate)?)
    }

    pub fn devices_owned_by(&self, owner: &Principal) -> Result<Vec<DeviceId>> {
        Ok(self.registry.devices_owned_by(owner)?)
    }

    pub fn device_count(&self) -> Result<usize> {
        Ok(self.registry.device_count()?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Firmware Catalog
    // ─────────────────────────────────────────────────────────────────────────

    pub fn release_firmware(
        &self,
        caller: &Principal,
        device_type: &DeviceType,
        version: &FirmwareVersion,
        hash: &str,
        url: &str,
        release_notes: &str,
    ) -> Result<FirmwareRelease> {
        Ok(self
            .firmware
            .release_firmware(caller, device_type, version, hash, url, release_notes)?)
    }

    /// Record the installed firmware version, subject to the configured policy.
    pub fn update_device_firmware(
        &self,
        caller: &Principal,
        device: &DeviceId,
        version: &FirmwareVersion,
    ) -> Result<()> {
        if self.config.firmware_policy == FirmwareUpdatePolicy::OwnerOnly {
            let record = self
                .registry
                .get_device(device)?
                .ok_or_else(|| RegistryError::NotFound(device.clone()))?;

            if !record.is_owned_by(caller) {
                tracing::debug!(
                    device = %device,
                    caller = %caller,
                    "firmware update rejected by policy"
                );
                return Err(RegistryError::NotAuthorized {
                    caller: caller.clone(),
                    device: device.clone(),
                }
                .into());
            }
        }

        Ok(self.firmware.update_device_firmware(caller, device, version)?)
    }

    pub fn get_firmware_info(
        &self,
        device_type: &DeviceType,
        version: &FirmwareVersion,
    ) -> Result<Option<FirmwareRelease>> {
        Ok(self.firmware.get_firmware_info(device_type, version)?)
    }

    pub fn get_device_firmware_version(&self, device: &DeviceId) -> Result<FirmwareVersion> {
        Ok(self.firmware.get_device_firmware_version(device)?)
    }

    pub fn releases_for_type(
        &self,
        device_type: &DeviceType,
    ) -> Result<Vec<(FirmwareVersion, FirmwareRelease)>> {
        Ok(self.firmware.releases_for_type(device_type)?)
    }
}
