//! # Device Ledger Core
//!
//! Pure primitives for the device ledger: identifiers, records, composite
//! storage keys, canonical record encoding and the logical clock.
//!
//! This crate contains no I/O and no storage. It only defines the values the
//! three ledger components agree on.
//!
//! ## Key Types
//!
//! - [`DeviceId`], [`Principal`], [`DeviceType`], [`FirmwareVersion`] - string identifiers
//! - [`Device`], [`Permission`], [`FirmwareRelease`], [`DeviceFirmwareState`] - stored records
//! - [`Namespace`] - the three independent key/value namespaces
//! - [`ErrorKind`] - the taxonomy of rejected calls
//! - [`Clock`] - the externally supplied logical clock (block height)
//!
//! ## Encoding
//!
//! Records are stored as field-named CBOR maps. See the [`canonical`] module.

pub mod canonical;
pub mod clock;
pub mod crypto;
pub mod error;
pub mod keys;
pub mod record;
pub mod types;

pub use canonical::{decode_record, encode_record};
pub use clock::{Clock, FixedClock, ManualClock};
pub use crypto::{Blake3Hash, Digester};
pub use error::{CoreError, ErrorKind};
pub use record::{Capability, Device, DeviceFirmwareState, FirmwareRelease, Permission};
pub use types::{BlockHeight, DeviceId, DeviceType, FirmwareVersion, Namespace, Principal};
