//! # Device Ledger Firmware
//!
//! Firmware release metadata and the version each device reports as
//! installed.
//!
//! ## Overview
//!
//! - **Releases** are keyed by `(device type, version)`, published once by
//!   the catalog administrator and never changed afterwards.
//! - **Installed versions** are a per-device pointer. The catalog itself
//!   accepts any caller and any version string here; stricter policies are
//!   applied by the enclosing ledger, which can consult device ownership.
//!
//! Only metadata is tracked: the hash and URL of an image, never the image.

pub mod catalog;
pub mod error;

pub use catalog::FirmwareCatalog;
pub use error::{FirmwareError, Result};
