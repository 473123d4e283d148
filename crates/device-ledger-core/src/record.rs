//! Stored records.
//!
//! Each record is owned by exactly one component's namespace. Records refer
//! to each other only by value (the device id string), never by reference.

use serde::{Deserialize, Serialize};

use crate::types::{BlockHeight, DeviceId, FirmwareVersion, Principal};

/// A registered device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Device {
    /// Immutable identifier.
    pub id: DeviceId,

    /// Current owner. Changes only through a transfer.
    pub owner: Principal,

    /// Opaque owner-supplied metadata.
    pub metadata: String,

    /// Logical clock value at registration.
    pub registered_at: BlockHeight,
}

impl Device {
    /// Create a freshly registered device.
    pub fn new(
        id: DeviceId,
        owner: Principal,
        metadata: impl Into<String>,
        registered_at: BlockHeight,
    ) -> Self {
        Self {
            id,
            owner,
            metadata: metadata.into(),
            registered_at,
        }
    }

    /// Whether `candidate` is the current owner.
    pub fn is_owned_by(&self, candidate: &Principal) -> bool {
        &self.owner == candidate
    }
}

/// A single capability flag of a [`Permission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Read,
    Write,
    Update,
}

/// The permission triple granted to a user on a device.
///
/// The `Default` value (all false) is what an absent grant means. It is
/// never written to storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Permission {
    pub can_read: bool,
    pub can_write: bool,
    pub can_update: bool,
}

impl Permission {
    /// Build a triple.
    pub const fn new(can_read: bool, can_write: bool, can_update: bool) -> Self {
        Self {
            can_read,
            can_write,
            can_update,
        }
    }

    /// The implicit all-false default.
    pub const fn none() -> Self {
        Self::new(false, false, false)
    }

    /// Whether the named capability is granted.
    pub const fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Read => self.can_read,
            Capability::Write => self.can_write,
            Capability::Update => self.can_update,
        }
    }

    /// Whether no capability is granted.
    pub const fn is_empty(&self) -> bool {
        !(self.can_read || self.can_write || self.can_update)
    }
}

/// Metadata of a released firmware image. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FirmwareRelease {
    /// Content hash of the image, as published.
    pub hash: String,

    /// Where the image can be fetched.
    pub url: String,

    /// Free-form release notes.
    pub release_notes: String,

    /// The administrator that published the release.
    pub released_by: Principal,

    /// Logical clock value at release.
    pub released_at: BlockHeight,
}

/// The firmware version a device reports as installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeviceFirmwareState {
    pub current_version: FirmwareVersion,
}

impl DeviceFirmwareState {
    pub fn new(current_version: FirmwareVersion) -> Self {
        Self { current_version }
    }
}
