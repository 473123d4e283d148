//! Test fixtures and helpers.
//!
//! Common setup code for integration tests. Helpers panic on faults: a test
//! that hits a storage error should fail loudly, not branch on it.

use std::sync::Arc;

use device_ledger::{
    Call, FirmwareUpdatePolicy, Ledger, LedgerConfig, Operation, Outcome,
};
use device_ledger_core::{
    Blake3Hash, BlockHeight, Device, DeviceId, DeviceType, FirmwareRelease, FirmwareVersion,
    ManualClock, Permission, Principal,
};
use device_ledger_store::{MemoryStore, Store};

/// The administrator identity used by every fixture.
pub const ADMIN: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

pub const USER1: &str = "user1";
pub const USER2: &str = "user2";
pub const USER3: &str = "user3";

/// A principal holding no role at all.
pub const OUTSIDER: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";

/// Block height every fixture starts at.
pub const START_HEIGHT: BlockHeight = BlockHeight(100);

/// A test fixture with a ledger and a manual clock.
pub struct TestFixture<S: Store = MemoryStore> {
    pub clock: Arc<ManualClock>,
    pub ledger: Ledger<S>,
}

impl TestFixture<MemoryStore> {
    /// In-memory ledger with the permissive firmware policy.
    pub fn new() -> Self {
        Self::with_policy(FirmwareUpdatePolicy::Permissive)
    }

    /// In-memory ledger with the given firmware policy.
    pub fn with_policy(policy: FirmwareUpdatePolicy) -> Self {
        Self::with_store(MemoryStore::new(), policy)
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Store> TestFixture<S> {
    /// Ledger over `store`, administered by [`ADMIN`].
    pub fn with_store(store: S, policy: FirmwareUpdatePolicy) -> Self {
        let clock = Arc::new(ManualClock::new(START_HEIGHT));
        let config = LedgerConfig::with_admin(Principal::from(ADMIN)).firmware_policy(policy);
        let ledger = Ledger::new(store, clock.clone(), config).expect("invalid fixture config");
        Self { clock, ledger }
    }

    /// Dispatch one call.
    pub fn call(&self, caller: &str, operation: Operation) -> Outcome {
        self.ledger
            .dispatch(&Call::new(caller, operation))
            .expect("store fault during dispatch")
    }

    /// Register `device` owned by `owner`.
    pub fn register(&self, owner: &str, device: &str) -> Device {
        self.ledger
            .register_device(&owner.into(), &device.into(), "Test Device")
            .expect("device registration failed")
    }

    /// Grant `permission` on `device` to `user` as [`ADMIN`].
    pub fn grant(&self, device: &str, user: &str, permission: Permission) {
        self.ledger
            .grant_permission(&ADMIN.into(), &device.into(), &user.into(), permission)
            .expect("grant failed");
    }

    /// Publish a release as [`ADMIN`].
    pub fn release(&self, device_type: &str, version: &str) -> FirmwareRelease {
        self.ledger
            .release_firmware(
                &ADMIN.into(),
                &DeviceType::from(device_type),
                &FirmwareVersion::from(version),
                "0x1234567890",
                "https://example.com/firmware",
                "Initial release",
            )
            .expect("release failed")
    }

    /// Installed firmware version of `device`.
    pub fn installed(&self, device: &str) -> FirmwareVersion {
        self.ledger
            .get_device_firmware_version(&DeviceId::from(device))
            .expect("firmware lookup failed")
    }

    /// Move the clock forward.
    pub fn advance(&self, blocks: u64) -> BlockHeight {
        self.clock.advance(blocks)
    }

    /// Digest of the whole ledger.
    pub fn digest(&self) -> Blake3Hash {
        self.ledger.state_digest().expect("digest failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_registration() {
        let fixture = TestFixture::new();
        let device = fixture.register(USER1, "device1");

        assert_eq!(device.owner, Principal::from(USER1));
        assert_eq!(device.registered_at, START_HEIGHT);
    }

    #[test]
    fn test_fixture_clock() {
        let fixture = TestFixture::new();
        fixture.advance(5);
        let device = fixture.register(USER1, "device1");
        assert_eq!(device.registered_at, BlockHeight(105));
    }

    #[test]
    fn test_fixture_grant_and_release() {
        let fixture = TestFixture::new();
        fixture.grant("device1", USER2, Permission::new(true, false, false));
        let release = fixture.release("sensor", "1.0.0");

        assert!(fixture
            .ledger
            .can_read(&"device1".into(), &USER2.into())
            .unwrap());
        assert_eq!(release.released_by, Principal::from(ADMIN));
        assert!(fixture.installed("device1").is_empty());
    }
}
