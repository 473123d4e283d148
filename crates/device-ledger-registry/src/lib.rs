//! # Device Ledger Registry
//!
//! Device identity and ownership.
//!
//! A device is registered once, by the principal that becomes its owner,
//! and is never removed. Only the current owner may change its metadata or
//! hand it to someone else.
//!
//! ```rust
//! use std::sync::Arc;
//! use device_ledger_core::{BlockHeight, DeviceId, FixedClock, Principal};
//! use device_ledger_registry::DeviceRegistry;
//! use device_ledger_store::MemoryStore;
//!
//! let registry = DeviceRegistry::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(FixedClock(BlockHeight(100))),
//! );
//!
//! let device = DeviceId::from("device1");
//! let alice = Principal::from("alice");
//! let bob = Principal::from("bob");
//!
//! registry.register_device(&alice, &device, "thermostat").unwrap();
//! registry.transfer_device(&alice, &device, &bob).unwrap();
//! assert!(registry.is_device_owner(&device, &bob).unwrap());
//! ```

pub mod error;
pub mod registry;

pub use error::{RegistryError, Result};
pub use registry::DeviceRegistry;
