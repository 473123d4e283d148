//! Property tests over generated call sequences.

use std::collections::BTreeMap;

use proptest::prelude::*;

use device_ledger::store::SqliteStore;
use device_ledger::{FirmwareRelease, FirmwareUpdatePolicy, Operation};
use device_ledger_testkit::fixtures::TestFixture;
use device_ledger_testkit::generators::{call, calls, query};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn dispatch_never_faults(sequence in calls(24)) {
        let fixture = TestFixture::new();
        for c in &sequence {
            prop_assert!(fixture.ledger.dispatch(c).is_ok());
        }
    }

    #[test]
    fn rejection_leaves_digest_unchanged(sequence in calls(24), last in call()) {
        let fixture = TestFixture::new();
        for c in &sequence {
            fixture.ledger.dispatch(c).unwrap();
        }

        let before = fixture.digest();
        let outcome = fixture.ledger.dispatch(&last).unwrap();
        if !outcome.success {
            prop_assert!(outcome.error.is_some());
            prop_assert_eq!(fixture.digest(), before);
        }
    }

    #[test]
    fn queries_never_mutate(sequence in calls(16), op in query()) {
        let fixture = TestFixture::new();
        for c in &sequence {
            fixture.ledger.dispatch(c).unwrap();
        }

        let before = fixture.digest();
        let outcome = fixture.call("anyone", op);
        prop_assert!(outcome.success);
        prop_assert_eq!(fixture.digest(), before);
    }

    #[test]
    fn devices_are_never_unregistered(sequence in calls(32)) {
        let fixture = TestFixture::new();
        let mut count = 0;
        for c in &sequence {
            let outcome = fixture.ledger.dispatch(c).unwrap();
            let now = fixture.ledger.device_count().unwrap();

            match &c.operation {
                Operation::RegisterDevice { device, .. } if outcome.success => {
                    prop_assert_eq!(now, count + 1);
                    prop_assert!(fixture.ledger.is_device_owner(device, &c.caller).unwrap());
                }
                _ => {
                    prop_assert_eq!(now, count);
                }
            }
            count = now;
        }
    }

    #[test]
    fn releases_are_immutable(sequence in calls(32)) {
        let fixture = TestFixture::new();
        let mut published: BTreeMap<(String, String), FirmwareRelease> = BTreeMap::new();

        for c in &sequence {
            fixture.ledger.dispatch(c).unwrap();
            if let Operation::ReleaseFirmware { device_type, version, .. } = &c.operation {
                let stored = fixture
                    .ledger
                    .get_firmware_info(device_type, version)
                    .unwrap();
                let key = (device_type.to_string(), version.to_string());
                match (published.get(&key), stored) {
                    (Some(first), Some(now)) => {
                        prop_assert_eq!(first, &now);
                    }
                    (None, Some(now)) => {
                        published.insert(key, now);
                    }
                    (_, None) => {}
                }
            }
        }
    }

    #[test]
    fn owner_only_updates_need_ownership(sequence in calls(32)) {
        let fixture = TestFixture::with_policy(FirmwareUpdatePolicy::OwnerOnly);
        for c in &sequence {
            let owned = match &c.operation {
                Operation::UpdateDeviceFirmware { device, .. } => {
                    Some(fixture.ledger.is_device_owner(device, &c.caller).unwrap())
                }
                _ => None,
            };
            let outcome = fixture.ledger.dispatch(c).unwrap();
            if let Some(owned) = owned {
                prop_assert_eq!(outcome.success, owned);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn backends_agree(sequence in calls(24)) {
        let memory = TestFixture::new();
        let sqlite = TestFixture::with_store(
            SqliteStore::open_memory().unwrap(),
            FirmwareUpdatePolicy::Permissive,
        );

        for c in &sequence {
            let a = memory.ledger.dispatch(c).unwrap();
            let b = sqlite.ledger.dispatch(c).unwrap();
            prop_assert_eq!(a, b);
        }
        prop_assert_eq!(memory.digest(), sqlite.digest());
    }
}
