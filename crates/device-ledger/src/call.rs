//! The call contract.
//!
//! A [`Call`] names one operation and the principal invoking it. Dispatching
//! a call yields an [`Outcome`]: a success flag with an optional value, or a
//! rejection kind. Rejections are outcomes, not errors; only faults of the
//! environment (storage, encoding) surface as `Err`.
//!
//! Calls and outcomes are serde types so they can cross a process boundary
//! as JSON:
//!
//! ```json
//! { "caller": "user1", "operation": { "op": "register-device",
//!   "args": { "device": "device1", "metadata": "Test Device" } } }
//! ```
//!
//! `args` may also be an array holding the arguments in declaration order,
//! so `"args": ["device1", "Test Device"]` is the same call. Operations are
//! always serialized with named arguments.

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use device_ledger_core::{DeviceId, DeviceType, ErrorKind, FirmwareVersion, Permission, Principal};
use device_ledger_store::Store;

use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;

/// One invocation of a ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// The authenticated principal making the call.
    pub caller: Principal,

    /// What to do.
    pub operation: Operation,
}

impl Call {
    pub fn new(caller: impl Into<Principal>, operation: Operation) -> Self {
        Self {
            caller: caller.into(),
            operation,
        }
    }
}

/// Every operation the ledger exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(
    tag = "op",
    content = "args",
    rename_all = "kebab-case",
    rename_all_fields = "kebab-case"
)]
pub enum Operation {
    // Access control
    GrantPermission {
        device: DeviceId,
        user: Principal,
        can_read: bool,
        can_write: bool,
        can_update: bool,
    },
    RevokePermission {
        device: DeviceId,
        user: Principal,
    },
    CheckPermission {
        device: DeviceId,
        user: Principal,
    },
    CanRead {
        device: DeviceId,
        user: Principal,
    },
    CanWrite {
        device: DeviceId,
        user: Principal,
    },
    CanUpdate {
        device: DeviceId,
        user: Principal,
    },
    PermissionsForDevice {
        device: DeviceId,
    },

    // Device registry
    RegisterDevice {
        device: DeviceId,
        metadata: String,
    },
    UpdateDeviceMetadata {
        device: DeviceId,
        metadata: String,
    },
    TransferDevice {
        device: DeviceId,
        new_owner: Principal,
    },
    GetDevice {
        device: DeviceId,
    },
    IsDeviceOwner {
        device: DeviceId,
        candidate: Principal,
    },
    DevicesOwnedBy {
        owner: Principal,
    },
    DeviceCount,

    // Firmware catalog
    ReleaseFirmware {
        device_type: DeviceType,
        version: FirmwareVersion,
        hash: String,
        url: String,
        release_notes: String,
    },
    UpdateDeviceFirmware {
        device: DeviceId,
        version: FirmwareVersion,
    },
    GetFirmwareInfo {
        device_type: DeviceType,
        version: FirmwareVersion,
    },
    GetDeviceFirmwareVersion {
        device: DeviceId,
    },
    ReleasesForType {
        device_type: DeviceType,
    },
}

impl Operation {
    /// The wire name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::GrantPermission { .. } => "grant-permission",
            Operation::RevokePermission { .. } => "revoke-permission",
            Operation::CheckPermission { .. } => "check-permission",
            Operation::CanRead { .. } => "can-read",
            Operation::CanWrite { .. } => "can-write",
            Operation::CanUpdate { .. } => "can-update",
            Operation::PermissionsForDevice { .. } => "permissions-for-device",
            Operation::RegisterDevice { .. } => "register-device",
            Operation::UpdateDeviceMetadata { .. } => "update-device-metadata",
            Operation::TransferDevice { .. } => "transfer-device",
            Operation::GetDevice { .. } => "get-device",
            Operation::IsDeviceOwner { .. } => "is-device-owner",
            Operation::DevicesOwnedBy { .. } => "devices-owned-by",
            Operation::DeviceCount => "device-count",
            Operation::ReleaseFirmware { .. } => "release-firmware",
            Operation::UpdateDeviceFirmware { .. } => "update-device-firmware",
            Operation::GetFirmwareInfo { .. } => "get-firmware-info",
            Operation::GetDeviceFirmwareVersion { .. } => "get-device-firmware-version",
            Operation::ReleasesForType { .. } => "releases-for-type",
        }
    }

    /// Whether the operation can change ledger state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Operation::GrantPermission { .. }
                | Operation::RevokePermission { .. }
                | Operation::RegisterDevice { .. }
                | Operation::UpdateDeviceMetadata { .. }
                | Operation::TransferDevice { .. }
                | Operation::ReleaseFirmware { .. }
                | Operation::UpdateDeviceFirmware { .. }
        )
    }
}

/// `{ "op": .., "args": .. }` before the arguments are bound to names.
#[derive(Deserialize)]
struct WireOperation {
    op: String,
    #[serde(default)]
    args: Value,
}

/// Argument names of `op`, in positional order.
fn arg_names(op: &str) -> Option<&'static [&'static str]> {
    let names: &'static [&'static str] = match op {
        "grant-permission" => &["device", "user", "can-read", "can-write", "can-update"],
        "revoke-permission" | "check-permission" | "can-read" | "can-write" | "can-update" => {
            &["device", "user"]
        }
        "permissions-for-device" | "get-device" | "get-device-firmware-version" => &["device"],
        "register-device" | "update-device-metadata" => &["device", "metadata"],
        "transfer-device" => &["device", "new-owner"],
        "is-device-owner" => &["device", "candidate"],
        "devices-owned-by" => &["owner"],
        "device-count" => &[],
        "release-firmware" => &["device-type", "version", "hash", "url", "release-notes"],
        "update-device-firmware" => &["device", "version"],
        "get-firmware-info" => &["device-type", "version"],
        "releases-for-type" => &["device-type"],
        _ => return None,
    };
    Some(names)
}

/// Arguments of one operation, keyed by name.
struct Args {
    op: String,
    named: Map<String, Value>,
}

impl Args {
    fn bind(op: String, args: Value) -> std::result::Result<Self, String> {
        let names = arg_names(&op).ok_or_else(|| format!("unknown operation `{op}`"))?;
        let named = match args {
            Value::Null => Map::new(),
            Value::Object(named) => named,
            Value::Array(values) => {
                if values.len() != names.len() {
                    return Err(format!(
                        "`{op}` takes {} arguments, got {}",
                        names.len(),
                        values.len()
                    ));
                }
                names.iter().map(|name| name.to_string()).zip(values).collect()
            }
            other => {
                return Err(format!("`{op}` arguments must be an object or array, got {other}"))
            }
        };
        Ok(Self { op, named })
    }

    fn take<T: DeserializeOwned>(&mut self, name: &str) -> std::result::Result<T, String> {
        let value = self
            .named
            .remove(name)
            .ok_or_else(|| format!("`{}` is missing argument `{name}`", self.op))?;
        serde_json::from_value(value)
            .map_err(|e| format!("`{}` argument `{name}`: {e}", self.op))
    }
}

impl TryFrom<WireOperation> for Operation {
    type Error = String;

    fn try_from(wire: WireOperation) -> std::result::Result<Self, String> {
        let op = wire.op.clone();
        let mut args = Args::bind(wire.op, wire.args)?;

        let operation = match op.as_str() {
            "grant-permission" => Operation::GrantPermission {
                device: args.take("device")?,
                user: args.take("user")?,
                can_read: args.take("can-read")?,
                can_write: args.take("can-write")?,
                can_update: args.take("can-update")?,
            },
            "revoke-permission" => Operation::RevokePermission {
                device: args.take("device")?,
                user: args.take("user")?,
            },
            "check-permission" => Operation::CheckPermission {
                device: args.take("device")?,
                user: args.take("user")?,
            },
            "can-read" => Operation::CanRead {
                device: args.take("device")?,
                user: args.take("user")?,
            },
            "can-write" => Operation::CanWrite {
                device: args.take("device")?,
                user: args.take("user")?,
            },
            "can-update" => Operation::CanUpdate {
                device: args.take("device")?,
                user: args.take("user")?,
            },
            "permissions-for-device" => Operation::PermissionsForDevice {
                device: args.take("device")?,
            },
            "register-device" => Operation::RegisterDevice {
                device: args.take("device")?,
                metadata: args.take("metadata")?,
            },
            "update-device-metadata" => Operation::UpdateDeviceMetadata {
                device: args.take("device")?,
                metadata: args.take("metadata")?,
            },
            "transfer-device" => Operation::TransferDevice {
                device: args.take("device")?,
                new_owner: args.take("new-owner")?,
            },
            "get-device" => Operation::GetDevice {
                device: args.take("device")?,
            },
            "is-device-owner" => Operation::IsDeviceOwner {
                device: args.take("device")?,
                candidate: args.take("candidate")?,
            },
            "devices-owned-by" => Operation::DevicesOwnedBy {
                owner: args.take("owner")?,
            },
            "device-count" => Operation::DeviceCount,
            "release-firmware" => Operation::ReleaseFirmware {
                device_type: args.take("device-type")?,
                version: args.take("version")?,
                hash: args.take("hash")?,
                url: args.take("url")?,
                release_notes: args.take("release-notes")?,
            },
            "update-device-firmware" => Operation::UpdateDeviceFirmware {
                device: args.take("device")?,
                version: args.take("version")?,
            },
            "get-firmware-info" => Operation::GetFirmwareInfo {
                device_type: args.take("device-type")?,
                version: args.take("version")?,
            },
            "get-device-firmware-version" => Operation::GetDeviceFirmwareVersion {
                device: args.take("device")?,
            },
            "releases-for-type" => Operation::ReleasesForType {
                device_type: args.take("device-type")?,
            },
            _ => return Err(format!("unknown operation `{op}`")),
        };
        Ok(operation)
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = WireOperation::deserialize(deserializer)?;
        Operation::try_from(wire).map_err(D::Error::custom)
    }
}

/// The observable result of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether the call was accepted.
    pub success: bool,

    /// The returned value of a successful query or creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Why the call was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl Outcome {
    /// Success carrying `value`.
    pub fn ok<T: Serialize>(value: &T) -> Result<Self> {
        let value =
            serde_json::to_value(value).map_err(|e| LedgerError::Encoding(e.to_string()))?;
        Ok(Self {
            success: true,
            value: Some(value),
            error: None,
        })
    }

    /// Success with nothing to return.
    pub fn done() -> Self {
        Self {
            success: true,
            value: None,
            error: None,
        }
    }

    /// Rejection with `kind`.
    pub fn rejected(kind: ErrorKind) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(kind),
        }
    }

    /// Decode the returned value.
    pub fn value_as<T: serde::de::DeserializeOwned>(&self) -> Result<Option<T>> {
        self.value
            .clone()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| LedgerError::Encoding(e.to_string()))
    }
}

/// One catalog entry as returned by `releases-for-type`.
#[derive(Serialize)]
struct ReleaseEntry<'a> {
    version: &'a FirmwareVersion,
    release: &'a device_ledger_core::FirmwareRelease,
}

impl<S: Store> Ledger<S> {
    /// Execute one call.
    ///
    /// Rejections come back as `Ok(Outcome { success: false, .. })` with the
    /// store untouched. Storage faults come back as `Err`.
    pub fn dispatch(&self, call: &Call) -> Result<Outcome> {
        let op = call.operation.name();
        tracing::trace!(op, caller = %call.caller, "dispatching call");

        match self.execute(&call.caller, &call.operation) {
            Ok(outcome) => Ok(outcome),
            Err(e) => match e.kind() {
                Some(kind) => {
                    tracing::debug!(op, caller = %call.caller, error = %kind, "call rejected");
                    Ok(Outcome::rejected(kind))
                }
                None => {
                    tracing::warn!(op, caller = %call.caller, error = %e, "call failed");
                    Err(e)
                }
            },
        }
    }

    fn execute(&self, caller: &Principal, operation: &Operation) -> Result<Outcome> {
        match operation {
            Operation::GrantPermission {
                device,
                user,
                can_read,
                can_write,
                can_update,
            } => {
                let permission = Permission::new(*can_read, *can_write, *can_update);
                self.grant_permission(caller, device, user, permission)?;
                Ok(Outcome::done())
            }
            Operation::RevokePermission { device, user } => {
                self.revoke_permission(caller, device, user)?;
                Ok(Outcome::done())
            }
            Operation::CheckPermission { device, user } => {
                Outcome::ok(&self.check_permission(device, user)?)
            }
            Operation::CanRead { device, user } => Outcome::ok(&self.can_read(device, user)?),
            Operation::CanWrite { device, user } => Outcome::ok(&self.can_write(device, user)?),
            Operation::CanUpdate { device, user } => Outcome::ok(&self.can_update(device, user)?),
            Operation::PermissionsForDevice { device } => {
                Outcome::ok(&self.permissions_for_device(device)?)
            }

            Operation::RegisterDevice { device, metadata } => {
                Outcome::ok(&self.register_device(caller, device, metadata)?)
            }
            Operation::UpdateDeviceMetadata { device, metadata } => {
                self.update_device_metadata(caller, device, metadata)?;
                Ok(Outcome::done())
            }
            Operation::TransferDevice { device, new_owner } => {
                self.transfer_device(caller, device, new_owner)?;
                Ok(Outcome::done())
            }
            Operation::GetDevice { device } => Outcome::ok(&self.get_device(device)?),
            Operation::IsDeviceOwner { device, candidate } => {
                Outcome::ok(&self.is_device_owner(device, candidate)?)
            }
            Operation::DevicesOwnedBy { owner } => Outcome::ok(&self.devices_owned_by(owner)?),
            Operation::DeviceCount => Outcome::ok(&self.device_count()?),

            Operation::ReleaseFirmware {
                device_type,
                version,
                hash,
                url,
                release_notes,
            } => Outcome::ok(&self.release_firmware(
                caller,
                device_type,
                version,
                hash,
                url,
                release_notes,
            )?),
            Operation::UpdateDeviceFirmware { device, version } => {
                self.update_device_firmware(caller, device, version)?;
                Ok(Outcome::done())
            }
            Operation::GetFirmwareInfo {
                device_type,
                version,
            } => Outcome::ok(&self.get_firmware_info(device_type, version)?),
            Operation::GetDeviceFirmwareVersion { device } => {
                Outcome::ok(&self.get_device_firmware_version(device)?)
            }
            Operation::ReleasesForType { device_type } => {
                let releases = self.releases_for_type(device_type)?;
                let entries: Vec<ReleaseEntry<'_>> = releases
                    .iter()
                    .map(|(version, release)| ReleaseEntry { version, release })
                    .collect();
                Outcome::ok(&entries)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_wire_shape() {
        let call = Call::new(
            "user1",
            Operation::TransferDevice {
                device: "device1".into(),
                new_owner: "user2".into(),
            },
        );
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "caller": "user1",
                "operation": {
                    "op": "transfer-device",
                    "args": { "device": "device1", "new-owner": "user2" }
                }
            })
        );

        let parsed: Call = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, call);
    }

    #[test]
    fn test_unit_operation_parses() {
        let op: Operation = serde_json::from_str(r#"{ "op": "device-count" }"#).unwrap();
        assert_eq!(op, Operation::DeviceCount);
        assert!(!op.is_mutation());
    }

    #[test]
    fn test_positional_args_match_named() {
        let cases = [
            (
                r#"{ "op": "grant-permission", "args": ["device1", "user1", true, false, true] }"#,
                r#"{ "op": "grant-permission", "args": { "device": "device1", "user": "user1",
                     "can-read": true, "can-write": false, "can-update": true } }"#,
            ),
            (
                r#"{ "op": "transfer-device", "args": ["device1", "user2"] }"#,
                r#"{ "op": "transfer-device",
                     "args": { "device": "device1", "new-owner": "user2" } }"#,
            ),
            (
                r#"{ "op": "release-firmware",
                     "args": ["device-type-1", "1.0.0", "0x12", "https://x", "notes"] }"#,
                r#"{ "op": "release-firmware", "args": { "device-type": "device-type-1",
                     "version": "1.0.0", "hash": "0x12", "url": "https://x",
                     "release-notes": "notes" } }"#,
            ),
            (
                r#"{ "op": "device-count", "args": [] }"#,
                r#"{ "op": "device-count" }"#,
            ),
        ];
        for (positional, named) in cases {
            let a: Operation = serde_json::from_str(positional).unwrap();
            let b: Operation = serde_json::from_str(named).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_malformed_args_are_rejected() {
        let err = serde_json::from_str::<Operation>(
            r#"{ "op": "register-device", "args": ["device1"] }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("takes 2 arguments, got 1"));

        let err = serde_json::from_str::<Operation>(
            r#"{ "op": "register-device", "args": { "device": "d" } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing argument `metadata`"));

        let err = serde_json::from_str::<Operation>(r#"{ "op": "self-destruct", "args": [] }"#)
            .unwrap_err();
        assert!(err.to_string().contains("unknown operation"));

        let err = serde_json::from_str::<Operation>(
            r#"{ "op": "grant-permission", "args": ["d", "u", "yes", false, false] }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("can-read"));
    }

    #[test]
    fn test_name_matches_serde_tag() {
        let ops = [
            Operation::CanRead {
                device: "d".into(),
                user: "u".into(),
            },
            Operation::GetDeviceFirmwareVersion { device: "d".into() },
            Operation::ReleasesForType {
                device_type: "t".into(),
            },
        ];
        for op in ops {
            let json = serde_json::to_value(&op).unwrap();
            assert_eq!(json["op"], op.name());
        }
    }

    #[test]
    fn test_outcome_shape() {
        let rejected = serde_json::to_value(Outcome::rejected(ErrorKind::NotFound)).unwrap();
        assert_eq!(
            rejected,
            serde_json::json!({ "success": false, "error": "ERR_NOT_FOUND" })
        );

        let done = serde_json::to_value(Outcome::done()).unwrap();
        assert_eq!(done, serde_json::json!({ "success": true }));

        let value = Outcome::ok(&true).unwrap();
        assert_eq!(value.value_as::<bool>().unwrap(), Some(true));
    }
}
