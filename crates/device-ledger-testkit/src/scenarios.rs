//! Golden scenarios.
//!
//! Each scenario is a call sequence against a fresh ledger with the outcome
//! every step must produce. Any store backend, and any process talking to
//! the ledger over JSON, must reproduce them exactly.

use serde_json::{json, Value};

use device_ledger::{Call, Ledger, Operation, Outcome};
use device_ledger_core::ErrorKind;
use device_ledger_store::Store;

use crate::fixtures::{ADMIN, OUTSIDER, USER1, USER2, USER3};

/// What a step must produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Expect {
    /// Accepted, value not checked.
    Success,
    /// Accepted with exactly this value.
    Value(Value),
    /// Rejected with this kind.
    Rejected(ErrorKind),
}

impl Expect {
    fn matches(&self, outcome: &Outcome) -> bool {
        match self {
            Expect::Success => outcome.success,
            Expect::Value(v) => outcome.success && outcome.value.as_ref() == Some(v),
            Expect::Rejected(kind) => !outcome.success && outcome.error == Some(*kind),
        }
    }
}

/// One call and its expected outcome.
#[derive(Debug, Clone)]
pub struct Step {
    pub call: Call,
    pub expect: Expect,
}

/// A named call sequence.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Human-readable name for the scenario.
    pub name: &'static str,
    pub steps: Vec<Step>,
}

fn step(caller: &str, operation: Operation, expect: Expect) -> Step {
    Step {
        call: Call::new(caller, operation),
        expect,
    }
}

fn grant(user: &str, r: bool, w: bool, u: bool) -> Operation {
    Operation::GrantPermission {
        device: "device1".into(),
        user: user.into(),
        can_read: r,
        can_write: w,
        can_update: u,
    }
}

fn register(device: &str, metadata: &str) -> Operation {
    Operation::RegisterDevice {
        device: device.into(),
        metadata: metadata.into(),
    }
}

fn release(notes: &str) -> Operation {
    Operation::ReleaseFirmware {
        device_type: "device-type-1".into(),
        version: "1.0.0".into(),
        hash: "0x1234567890".into(),
        url: "https://example.com/firmware".into(),
        release_notes: notes.into(),
    }
}

/// Get all golden scenarios.
pub fn all_scenarios() -> Vec<Scenario> {
    vec![
        // Access control
        Scenario {
            name: "admin grants permission",
            steps: vec![step(ADMIN, grant(USER1, true, false, false), Expect::Success)],
        },
        Scenario {
            name: "non-admin cannot grant",
            steps: vec![
                step(
                    USER2,
                    grant(USER1, true, false, false),
                    Expect::Rejected(ErrorKind::NotAuthorized),
                ),
                step(
                    "anyone",
                    Operation::CanRead {
                        device: "device1".into(),
                        user: USER1.into(),
                    },
                    Expect::Value(json!(false)),
                ),
            ],
        },
        Scenario {
            name: "admin revokes permission",
            steps: vec![
                step(ADMIN, grant(USER1, true, false, false), Expect::Success),
                step(
                    ADMIN,
                    Operation::RevokePermission {
                        device: "device1".into(),
                        user: USER1.into(),
                    },
                    Expect::Success,
                ),
                step(
                    "anyone",
                    Operation::CheckPermission {
                        device: "device1".into(),
                        user: USER1.into(),
                    },
                    Expect::Value(
                        json!({ "can-read": false, "can-write": false, "can-update": false }),
                    ),
                ),
            ],
        },
        Scenario {
            name: "non-admin cannot revoke",
            steps: vec![step(
                USER2,
                Operation::RevokePermission {
                    device: "device1".into(),
                    user: USER1.into(),
                },
                Expect::Rejected(ErrorKind::NotAuthorized),
            )],
        },
        Scenario {
            name: "check full and individual permissions",
            steps: vec![
                step(ADMIN, grant(USER1, true, false, true), Expect::Success),
                step(
                    "anyone",
                    Operation::CheckPermission {
                        device: "device1".into(),
                        user: USER1.into(),
                    },
                    Expect::Value(
                        json!({ "can-read": true, "can-write": false, "can-update": true }),
                    ),
                ),
                step(
                    "anyone",
                    Operation::CanRead {
                        device: "device1".into(),
                        user: USER1.into(),
                    },
                    Expect::Value(json!(true)),
                ),
                step(
                    "anyone",
                    Operation::CanWrite {
                        device: "device1".into(),
                        user: USER1.into(),
                    },
                    Expect::Value(json!(false)),
                ),
                step(
                    "anyone",
                    Operation::CanUpdate {
                        device: "device1".into(),
                        user: USER1.into(),
                    },
                    Expect::Value(json!(true)),
                ),
            ],
        },
        // Device registry
        Scenario {
            name: "register device",
            steps: vec![
                step(USER1, register("device1", "Test Device"), Expect::Success),
                step(
                    "anyone",
                    Operation::GetDevice {
                        device: "device1".into(),
                    },
                    Expect::Value(json!({
                        "id": "device1",
                        "owner": USER1,
                        "metadata": "Test Device",
                        "registered-at": 100,
                    })),
                ),
                step(
                    "anyone",
                    Operation::IsDeviceOwner {
                        device: "device1".into(),
                        candidate: USER1.into(),
                    },
                    Expect::Value(json!(true)),
                ),
            ],
        },
        Scenario {
            name: "register twice",
            steps: vec![
                step(USER1, register("device1", "Test Device"), Expect::Success),
                step(
                    USER2,
                    register("device1", "Test Device"),
                    Expect::Rejected(ErrorKind::AlreadyRegistered),
                ),
                step(
                    "anyone",
                    Operation::IsDeviceOwner {
                        device: "device1".into(),
                        candidate: USER1.into(),
                    },
                    Expect::Value(json!(true)),
                ),
            ],
        },
        Scenario {
            name: "owner updates metadata",
            steps: vec![
                step(USER1, register("device1", "Test Device"), Expect::Success),
                step(
                    USER1,
                    Operation::UpdateDeviceMetadata {
                        device: "device1".into(),
                        metadata: "Updated Device".into(),
                    },
                    Expect::Success,
                ),
            ],
        },
        Scenario {
            name: "non-owner cannot update metadata",
            steps: vec![
                step(USER1, register("device1", "Test Device"), Expect::Success),
                step(
                    USER2,
                    Operation::UpdateDeviceMetadata {
                        device: "device1".into(),
                        metadata: "Updated Device".into(),
                    },
                    Expect::Rejected(ErrorKind::NotAuthorized),
                ),
            ],
        },
        Scenario {
            name: "transfer ownership",
            steps: vec![
                step(USER1, register("device1", "Test Device"), Expect::Success),
                step(
                    USER2,
                    Operation::TransferDevice {
                        device: "device1".into(),
                        new_owner: USER3.into(),
                    },
                    Expect::Rejected(ErrorKind::NotAuthorized),
                ),
                step(
                    USER1,
                    Operation::TransferDevice {
                        device: "device1".into(),
                        new_owner: USER2.into(),
                    },
                    Expect::Success,
                ),
                step(
                    "anyone",
                    Operation::IsDeviceOwner {
                        device: "device1".into(),
                        candidate: USER1.into(),
                    },
                    Expect::Value(json!(false)),
                ),
                step(
                    "anyone",
                    Operation::IsDeviceOwner {
                        device: "device1".into(),
                        candidate: USER2.into(),
                    },
                    Expect::Value(json!(true)),
                ),
            ],
        },
        Scenario {
            name: "missing device",
            steps: vec![
                step(
                    USER1,
                    Operation::TransferDevice {
                        device: "device1".into(),
                        new_owner: USER2.into(),
                    },
                    Expect::Rejected(ErrorKind::NotFound),
                ),
                step(
                    "anyone",
                    Operation::GetDevice {
                        device: "device1".into(),
                    },
                    Expect::Value(Value::Null),
                ),
            ],
        },
        // Firmware catalog
        Scenario {
            name: "admin releases firmware",
            steps: vec![
                step(ADMIN, release("Initial release"), Expect::Success),
                step(
                    "anyone",
                    Operation::ReleasesForType {
                        device_type: "device-type-1".into(),
                    },
                    Expect::Success,
                ),
            ],
        },
        Scenario {
            name: "non-admin cannot release",
            steps: vec![
                step(
                    OUTSIDER,
                    release("Initial release"),
                    Expect::Rejected(ErrorKind::NotAuthorized),
                ),
                step(
                    "anyone",
                    Operation::GetFirmwareInfo {
                        device_type: "device-type-1".into(),
                        version: "1.0.0".into(),
                    },
                    Expect::Value(Value::Null),
                ),
            ],
        },
        Scenario {
            name: "duplicate release",
            steps: vec![
                step(ADMIN, release("Initial release"), Expect::Success),
                step(
                    ADMIN,
                    release("Duplicate release"),
                    Expect::Rejected(ErrorKind::AlreadyExists),
                ),
            ],
        },
        Scenario {
            name: "installed firmware version",
            steps: vec![
                step(
                    "anyone",
                    Operation::GetDeviceFirmwareVersion {
                        device: "device1".into(),
                    },
                    Expect::Value(json!("")),
                ),
                step(
                    USER1,
                    Operation::UpdateDeviceFirmware {
                        device: "device1".into(),
                        version: "1.0.0".into(),
                    },
                    Expect::Success,
                ),
                step(
                    "anyone",
                    Operation::GetDeviceFirmwareVersion {
                        device: "device1".into(),
                    },
                    Expect::Value(json!("1.0.0")),
                ),
            ],
        },
    ]
}

/// Run `scenario` against `ledger`, stopping at the first mismatch.
pub fn run_scenario<S: Store>(ledger: &Ledger<S>, scenario: &Scenario) -> Result<(), String> {
    for (i, step) in scenario.steps.iter().enumerate() {
        let outcome = ledger
            .dispatch(&step.call)
            .map_err(|e| format!("{} step {}: fault: {}", scenario.name, i, e))?;

        if !step.expect.matches(&outcome) {
            return Err(format!(
                "{} step {} ({}): expected {:?}, got {:?}",
                scenario.name,
                i,
                step.call.operation.name(),
                step.expect,
                outcome
            ));
        }
    }
    Ok(())
}

/// Run every scenario on a fresh in-memory ledger.
pub fn verify_all_scenarios() -> Vec<(String, bool, String)> {
    all_scenarios()
        .into_iter()
        .map(|scenario| {
            let fixture = crate::fixtures::TestFixture::new();
            match run_scenario(&fixture.ledger, &scenario) {
                Ok(()) => (scenario.name.to_string(), true, String::new()),
                Err(e) => (scenario.name.to_string(), false, e),
            }
        })
        .collect()
}
