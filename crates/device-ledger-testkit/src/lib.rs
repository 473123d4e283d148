//! # Device Ledger Testkit
//!
//! Testing utilities for the device ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden scenarios**: Call sequences with expected outcomes that every
//!   store backend must reproduce
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up test scenarios
//!
//! ## Golden Scenarios
//!
//! ```rust
//! use device_ledger_testkit::scenarios::{all_scenarios, run_scenario};
//! use device_ledger_testkit::fixtures::TestFixture;
//!
//! for scenario in all_scenarios() {
//!     let fixture = TestFixture::new();
//!     run_scenario(&fixture.ledger, &scenario).unwrap();
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use device_ledger_testkit::generators::call;
//!
//! proptest! {
//!     #[test]
//!     fn dispatch_never_faults(c in call()) {
//!         let fixture = TestFixture::new();
//!         prop_assert!(fixture.ledger.dispatch(&c).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use device_ledger_testkit::fixtures::{TestFixture, USER1};
//!
//! let fixture = TestFixture::new();
//! fixture.register(USER1, "device1");
//! assert!(fixture.ledger.is_device_owner(&"device1".into(), &USER1.into()).unwrap());
//! ```

pub mod fixtures;
pub mod generators;
pub mod scenarios;

pub use fixtures::{TestFixture, ADMIN, OUTSIDER, USER1, USER2, USER3};
pub use generators::{call, operation};
pub use scenarios::{all_scenarios, run_scenario, verify_all_scenarios, Expect, Scenario, Step};
