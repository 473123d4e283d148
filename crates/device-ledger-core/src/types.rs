//! Strong type definitions for the device ledger.
//!
//! All identifiers are newtypes to prevent mixing up a device id with a
//! principal or a firmware version at compile time. They are opaque: the
//! ledger never parses them, it only compares and stores them.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from anything string-like.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the underlying string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id! {
    /// Opaque, unique device identifier. Immutable once registered.
    DeviceId
}

string_id! {
    /// A pre-authenticated caller identity.
    Principal
}

string_id! {
    /// Hardware family a firmware release targets.
    DeviceType
}

string_id! {
    /// Firmware version label.
    ///
    /// The empty version is the sentinel returned for a device with no
    /// recorded firmware state.
    FirmwareVersion
}

impl FirmwareVersion {
    /// The "no firmware recorded" sentinel.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Whether this is the empty sentinel.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Logical clock value (block height) used to timestamp records.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    /// Get the raw height.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHeight({})", self.0)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BlockHeight {
    fn from(height: u64) -> Self {
        Self(height)
    }
}

/// The independent key/value namespaces the components persist into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Namespace {
    /// Permission grants, owned by the access control ledger.
    #[serde(rename = "accessControl")]
    AccessControl,
    /// Device records, owned by the device registry.
    #[serde(rename = "deviceRegistry")]
    DeviceRegistry,
    /// Firmware releases and installed versions, owned by the firmware catalog.
    #[serde(rename = "firmwareCatalog")]
    FirmwareCatalog,
}

impl Namespace {
    /// All namespaces, in a fixed order.
    pub const ALL: [Namespace; 3] = [
        Namespace::AccessControl,
        Namespace::DeviceRegistry,
        Namespace::FirmwareCatalog,
    ];

    /// The persisted name of this namespace.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Namespace::AccessControl => "accessControl",
            Namespace::DeviceRegistry => "deviceRegistry",
            Namespace::FirmwareCatalog => "firmwareCatalog",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_display_verbatim() {
        let id = DeviceId::from("device1");
        assert_eq!(id.to_string(), "device1");
        assert_eq!(format!("{:?}", id), "DeviceId(\"device1\")");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&Principal::from("user1")).unwrap();
        assert_eq!(json, "\"user1\"");
    }

    #[test]
    fn test_empty_firmware_version() {
        assert!(FirmwareVersion::empty().is_empty());
        assert!(!FirmwareVersion::from("1.0.0").is_empty());
        assert_eq!(FirmwareVersion::default(), FirmwareVersion::empty());
    }

    #[test]
    fn test_namespace_names_match_serde() {
        for ns in Namespace::ALL {
            let json = serde_json::to_string(&ns).unwrap();
            assert_eq!(json, format!("\"{}\"", ns.as_str()));
        }
    }
}
