//! # Device Ledger Access Control
//!
//! Per-(device, user) permission triples, governed by a single ledger
//! administrator.
//!
//! ## Overview
//!
//! A grant stores the full `(can-read, can-write, can-update)` triple for a
//! device/user pair, replacing whatever was there. A revoke removes the
//! entry. An absent entry reads as all-false; the default is never written.
//!
//! ## Policy
//!
//! Grants are administrator-governed, not owner-governed. Nothing here
//! consults the device registry: transferring a device does not touch the
//! grants recorded for it. Integrators that want ownership changes to
//! cascade must revoke explicitly.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use device_ledger_access::AccessControlLedger;
//! use device_ledger_core::{DeviceId, Permission, Principal};
//! use device_ledger_store::MemoryStore;
//!
//! let admin = Principal::from("admin");
//! let acl = AccessControlLedger::new(Arc::new(MemoryStore::new()), admin.clone());
//!
//! let device = DeviceId::from("device1");
//! let user = Principal::from("user1");
//! acl.grant_permission(&admin, &device, &user, Permission::new(true, false, true)).unwrap();
//!
//! assert!(acl.can_read(&device, &user).unwrap());
//! assert!(!acl.can_write(&device, &user).unwrap());
//! ```

pub mod error;
pub mod grant;
pub mod ledger;

pub use error::{AccessError, Result};
pub use grant::Grant;
pub use ledger::AccessControlLedger;
