//! # Device Ledger Store
//!
//! Storage abstraction for the device ledger. Provides a trait-based
//! key/value interface with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! Every component persists into its own [`Namespace`] of one shared store.
//! The [`Store`] trait is deliberately small: point reads, point writes, an
//! atomic insert-if-absent, deletes and ordered prefix scans. [`StoreExt`]
//! layers typed record access on top of it.
//!
//! ## Key Types
//!
//! - [`Store`] - The storage trait
//! - [`StoreExt`] - Typed record helpers and state digests
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests and embedding
//! - [`InsertResult`] - Result of an insert-if-absent
//!
//! ## Usage
//!
//! ```rust,no_run
//! use device_ledger_core::{Namespace, Permission};
//! use device_ledger_store::{SqliteStore, StoreExt};
//!
//! let store = SqliteStore::open("ledger.db").unwrap();
//! let read_only = Permission::new(true, false, false);
//! store
//!     .put_record(Namespace::AccessControl, "perm/device1/user1", &read_only)
//!     .unwrap();
//! let perm: Option<Permission> = store
//!     .get_record(Namespace::AccessControl, "perm/device1/user1")
//!     .unwrap();
//! ```
//!
//! ## Design Notes
//!
//! - **Read-after-write**: a read always observes every prior completed write.
//! - **Atomic creation**: `put_if_absent` checks and writes in one step.
//! - **Ordered scans**: prefix scans return entries sorted by key bytes, in
//!   both backends, so digests agree across implementations.
//!
//! [`Namespace`]: device_ledger_core::Namespace

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Store, StoreExt};
