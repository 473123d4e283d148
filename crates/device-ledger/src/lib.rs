//! # Device Ledger
//!
//! The unified API over the three ledger components: device registry,
//! access control and firmware catalog, sharing one injected store.
//!
//! ## Overview
//!
//! - **Devices**: registered once, owned by one principal, transferable by
//!   that owner.
//! - **Permissions**: per-(device, user) read/write/update triples, granted
//!   and revoked by the ledger administrator.
//! - **Firmware**: releases published once by the catalog administrator, and
//!   the version each device reports as installed.
//!
//! Every mutation checks its capability before touching the store; a
//! rejected call leaves the store byte-for-byte unchanged.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use device_ledger::{Call, Ledger, LedgerConfig, Operation};
//! use device_ledger::core::{BlockHeight, ErrorKind, ManualClock, Principal};
//! use device_ledger::store::MemoryStore;
//!
//! let clock = Arc::new(ManualClock::new(BlockHeight(100)));
//! let config = LedgerConfig::with_admin(Principal::from("admin"));
//! let ledger = Ledger::new(MemoryStore::new(), clock, config).unwrap();
//!
//! let outcome = ledger
//!     .dispatch(&Call::new(
//!         "user1",
//!         Operation::RegisterDevice { device: "device1".into(), metadata: "Test Device".into() },
//!     ))
//!     .unwrap();
//! assert!(outcome.success);
//!
//! let outcome = ledger
//!     .dispatch(&Call::new(
//!         "user2",
//!         Operation::TransferDevice { device: "device1".into(), new_owner: "user3".into() },
//!     ))
//!     .unwrap();
//! assert_eq!(outcome.error, Some(ErrorKind::NotAuthorized));
//! ```
//!
//! ## Re-exports
//!
//! - `device_ledger::core` - identifiers, records, keys, clock
//! - `device_ledger::store` - storage abstraction, memory and SQLite stores
//! - `device_ledger::access` - access control ledger
//! - `device_ledger::registry` - device registry
//! - `device_ledger::firmware` - firmware catalog

pub mod call;
pub mod config;
pub mod error;
pub mod ledger;
pub mod service;

// Re-export component crates
pub use device_ledger_access as access;
pub use device_ledger_core as core;
pub use device_ledger_firmware as firmware;
pub use device_ledger_registry as registry;
pub use device_ledger_store as store;

// Re-export main types for convenience
pub use call::{Call, Operation, Outcome};
pub use config::{FirmwareUpdatePolicy, LedgerConfig};
pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use service::{LedgerHandle, LedgerService};

// Re-export commonly used core types
pub use device_ledger_core::{
    BlockHeight, Clock, Device, DeviceId, DeviceType, ErrorKind, FirmwareRelease,
    FirmwareVersion, ManualClock, Permission, Principal,
};
