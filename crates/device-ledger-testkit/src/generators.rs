//! Proptest generators for property-based testing.
//!
//! Identifiers are drawn from small pools so generated call sequences
//! collide often: the interesting behavior is in repeated registration,
//! cross-owner mutation and re-granting.

use proptest::prelude::*;

use device_ledger::{Call, Operation};
use device_ledger_core::{DeviceId, DeviceType, FirmwareVersion, Permission, Principal};

use crate::fixtures::{ADMIN, OUTSIDER, USER1, USER2, USER3};

/// Generate a caller, weighted towards the administrator.
pub fn principal() -> impl Strategy<Value = Principal> {
    prop_oneof![
        2 => Just(ADMIN),
        2 => Just(USER1),
        2 => Just(USER2),
        1 => Just(USER3),
        1 => Just(OUTSIDER),
    ]
    .prop_map(Principal::from)
}

/// Generate a device id from a small pool, including ids with NUL and
/// multibyte characters.
pub fn device_id() -> impl Strategy<Value = DeviceId> {
    prop_oneof![
        Just("device1"),
        Just("device2"),
        Just("device-1"),
        Just("device/3"),
        Just("dev\0ice"),
        Just("d\u{e9}vice"),
    ]
    .prop_map(DeviceId::from)
}

/// Generate a device type from a small pool.
pub fn device_type() -> impl Strategy<Value = DeviceType> {
    prop_oneof![Just("device-type-1"), Just("device-type"), Just("sensor")]
        .prop_map(DeviceType::from)
}

/// Generate a firmware version string.
pub fn version() -> impl Strategy<Value = FirmwareVersion> {
    (0u8..3, 0u8..3).prop_map(|(major, minor)| FirmwareVersion::new(format!("{major}.{minor}.0")))
}

/// Generate an arbitrary permission triple.
pub fn permission() -> impl Strategy<Value = Permission> {
    any::<(bool, bool, bool)>().prop_map(|(r, w, u)| Permission::new(r, w, u))
}

/// Generate short metadata text.
pub fn metadata() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ]{0,24}".prop_map(String::from)
}

/// Generate a state-changing operation.
pub fn mutation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (device_id(), principal(), permission()).prop_map(|(device, user, p)| {
            Operation::GrantPermission {
                device,
                user,
                can_read: p.can_read,
                can_write: p.can_write,
                can_update: p.can_update,
            }
        }),
        (device_id(), principal())
            .prop_map(|(device, user)| Operation::RevokePermission { device, user }),
        (device_id(), metadata())
            .prop_map(|(device, metadata)| Operation::RegisterDevice { device, metadata }),
        (device_id(), metadata())
            .prop_map(|(device, metadata)| Operation::UpdateDeviceMetadata { device, metadata }),
        (device_id(), principal())
            .prop_map(|(device, new_owner)| Operation::TransferDevice { device, new_owner }),
        (device_type(), version(), metadata()).prop_map(|(device_type, version, notes)| {
            Operation::ReleaseFirmware {
                device_type,
                version,
                hash: "0x1234567890".into(),
                url: "https://example.com/firmware".into(),
                release_notes: notes,
            }
        }),
        (device_id(), version())
            .prop_map(|(device, version)| Operation::UpdateDeviceFirmware { device, version }),
    ]
}

/// Generate a read-only access control operation.
pub fn permission_query() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (device_id(), principal())
            .prop_map(|(device, user)| Operation::CheckPermission { device, user }),
        (device_id(), principal()).prop_map(|(device, user)| Operation::CanRead { device, user }),
        (device_id(), principal()).prop_map(|(device, user)| Operation::CanWrite { device, user }),
        (device_id(), principal()).prop_map(|(device, user)| Operation::CanUpdate { device, user }),
        device_id().prop_map(|device| Operation::PermissionsForDevice { device }),
    ]
}

/// Generate a read-only registry or catalog operation.
pub fn record_query() -> impl Strategy<Value = Operation> {
    prop_oneof![
        device_id().prop_map(|device| Operation::GetDevice { device }),
        (device_id(), principal())
            .prop_map(|(device, candidate)| Operation::IsDeviceOwner { device, candidate }),
        principal().prop_map(|owner| Operation::DevicesOwnedBy { owner }),
        Just(Operation::DeviceCount),
        (device_type(), version()).prop_map(|(device_type, version)| {
            Operation::GetFirmwareInfo {
                device_type,
                version,
            }
        }),
        device_id().prop_map(|device| Operation::GetDeviceFirmwareVersion { device }),
        device_type().prop_map(|device_type| Operation::ReleasesForType { device_type }),
    ]
}

/// Generate a read-only operation.
pub fn query() -> impl Strategy<Value = Operation> {
    prop_oneof![permission_query(), record_query()]
}

/// Generate any operation.
pub fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![3 => mutation(), 1 => query()]
}

/// Generate a call by an arbitrary principal.
pub fn call() -> impl Strategy<Value = Call> {
    (principal(), operation()).prop_map(|(caller, operation)| Call { caller, operation })
}

/// Generate a sequence of calls.
pub fn calls(max_len: usize) -> impl Strategy<Value = Vec<Call>> {
    prop::collection::vec(call(), 0..=max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_mutations_are_mutations(op in mutation()) {
            prop_assert!(op.is_mutation());
        }

        #[test]
        fn test_queries_are_not_mutations(op in query()) {
            prop_assert!(!op.is_mutation());
        }

        #[test]
        fn test_generated_calls_roundtrip_json(c in call()) {
            let json = serde_json::to_string(&c).unwrap();
            let parsed: Call = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(parsed, c);
        }
    }
}
