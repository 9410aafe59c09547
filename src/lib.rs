//! # knx-dpt - A Rust Crate for Decoding KNX Datapoint Types
//!
//! The knx-dpt crate decodes the value part of KNX telegrams into structured
//! values. KNX is the European standard for home and building automation; every
//! group address on the bus carries values of one datapoint type (DPT), and the
//! bit layout of each type is published in the KNX master data.
//!
//! ## Features
//!
//! - Parse type identifiers in both the conventional (`9.001`) and the ETS (`DPST-9-1`) spelling
//! - Load the KNX master data catalog from JSON and resolve subtypes with a default/first fallback
//! - Extract bit-aligned fields, including fields that straddle a byte boundary
//! - Decode flags, integers, enumerations, 2-byte KNX floats, IEEE floats and strings
//! - Compose dates and times of day, with locale-aware date strings
//! - Map group addresses to their configured datapoint type
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! To use the knx-dpt crate in your Rust project, add the following to your Cargo.toml file:
//!
//! ```toml
//! [dependencies]
//! knx-dpt = "0.3.0"
//! ```
//!
//! Then load a catalog once and share the decoder:
//!
//! ```rust,no_run
//! use knx_dpt::{Catalog, Decoder};
//!
//! let catalog = Catalog::load("knx_master.json")?;
//! let decoder = Decoder::new(catalog);
//!
//! if let Some(result) = decoder.convenience_decode(&[0x0C, 0x1A], "DPST-9-1", None) {
//!     println!("{:?} {:?}", result.value, result.err);
//! }
//! # Ok::<(), knx_dpt::DptError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod constants;
pub mod dpt;
pub mod error;
pub mod logging;
pub mod payload;
pub mod util;

pub use crate::error::DptError;
pub use crate::logging::{init_logger, log_info};

// Core decoding types
pub use catalog::{Catalog, FieldFormat, FieldKind, MainType, SubType};
pub use dpt::{normalize, DptId, TypeIdentifier};
pub use payload::{DecodeResult, DecodedField, Decoder, FieldValue};

// Group address configuration
pub use config::{GroupAddress, GroupAddressBook, GroupAddressEntry};

/// Load a catalog file and build a decoder over it.
///
/// # Arguments
/// * `path` - Path to a KNX master data JSON export
///
/// # Returns
/// * `Ok(Decoder)` - Decoder sharing the loaded catalog
/// * `Err(DptError)` - The file could not be read or parsed
pub fn open_catalog<P: AsRef<std::path::Path>>(path: P) -> Result<Decoder, DptError> {
    Catalog::load(path).map(Decoder::new)
}
