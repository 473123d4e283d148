//! The device registry.

use std::sync::Arc;

use device_ledger_core::{keys, Clock, Device, DeviceId, Namespace, Principal};
use device_ledger_store::{InsertResult, Store, StoreExt};

use crate::error::{RegistryError, Result};

const NS: Namespace = Namespace::DeviceRegistry;

/// Device records keyed by device id.
pub struct DeviceRegistry<S: Store> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: Store> DeviceRegistry<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Load a device and check that `caller` owns it.
    ///
    /// Existence is checked before ownership, so a missing device is
    /// `NotFound` whoever asks.
    fn load_owned(&self, caller: &Principal, device: &DeviceId) -> Result<Device> {
        let record = self
            .get_device(device)?
            .ok_or_else(|| RegistryError::NotFound(device.clone()))?;

        if !record.is_owned_by(caller) {
            tracing::debug!(device = %device, caller = %caller, "registry mutation rejected");
            return Err(RegistryError::NotAuthorized {
                caller: caller.clone(),
                device: device.clone(),
            });
        }

        Ok(record)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register `device` with `caller` as its owner.
    pub fn register_device(
        &self,
        caller: &Principal,
        device: &DeviceId,
        metadata: &str,
    ) -> Result<Device> {
        let record = Device::new(device.clone(), caller.clone(), metadata, self.clock.now());

        match self.store.insert_record(NS, &keys::device(device), &record)? {
            InsertResult::Inserted => {
                tracing::debug!(
                    device = %device,
                    owner = %caller,
                    registered_at = %record.registered_at,
                    "registered device"
                );
                Ok(record)
            }
            InsertResult::AlreadyExists => Err(RegistryError::AlreadyRegistered(device.clone())),
        }
    }

    /// Replace the metadata of a device the caller owns.
    pub fn update_device_metadata(
        &self,
        caller: &Principal,
        device: &DeviceId,
        metadata: &str,
    ) -> Result<()> {
        let mut record = self.load_owned(caller, device)?;
        record.metadata = metadata.to_owned();
        self.store.put_record(NS, &keys::device(device), &record)?;

        tracing::debug!(device = %device, "updated device metadata");
        Ok(())
    }

    /// Hand a device the caller owns to `new_owner`.
    ///
    /// Transferring to the current owner is allowed and changes nothing.
    pub fn transfer_device(
        &self,
        caller: &Principal,
        device: &DeviceId,
        new_owner: &Principal,
    ) -> Result<()> {
        let mut record = self.load_owned(caller, device)?;
        record.owner = new_owner.clone();
        self.store.put_record(NS, &keys::device(device), &record)?;

        tracing::debug!(device = %device, from = %caller, to = %new_owner, "transferred device");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get_device(&self, device: &DeviceId) -> Result<Option<Device>> {
        Ok(self.store.get_record(NS, &keys::device(device))?)
    }

    /// True only if `device` exists and `candidate` owns it.
    pub fn is_device_owner(&self, device: &DeviceId, candidate: &Principal) -> Result<bool> {
        Ok(self
            .get_device(device)?
            .is_some_and(|record| record.is_owned_by(candidate)))
    }

    /// Ids of every device currently owned by `owner`, ordered by key.
    pub fn devices_owned_by(&self, owner: &Principal) -> Result<Vec<DeviceId>> {
        let records: Vec<(String, Device)> =
            self.store.scan_records(NS, &keys::device_prefix())?;

        Ok(records
            .into_iter()
            .filter(|(_, record)| record.is_owned_by(owner))
            .map(|(_, record)| record.id)
            .collect())
    }

    /// Number of registered devices.
    pub fn device_count(&self) -> Result<usize> {
        Ok(self.store.count(NS)?)
    }
}
