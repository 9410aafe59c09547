//! # DPT Error Handling
//!
//! This module defines the DptError enum, which represents the different error
//! types that can occur in the knx-dpt crate.
//!
//! Decoding never returns these as `Err`: they travel inside
//! [`DecodeResult::err`](crate::payload::DecodeResult) so that one malformed
//! telegram cannot disturb the decoding of the next one. Only catalog and
//! address book loading return them through `Result`.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Represents the different error types that can occur in the DPT crate.
#[derive(Debug, Error)]
pub enum DptError {
    /// The identifier could not be parsed, or names a type missing from the catalog.
    #[error("DPT could not be found: {0}")]
    NotFound(String),

    /// The payload carries fewer bits than the main type declares.
    #[error("telegram payload too few bits for given DPT: {available} < {required}")]
    InsufficientPayload { available: usize, required: usize },

    /// The main type has no subtypes, so there is no field layout to walk.
    #[error("DPT with no defined default subtype, and none was given.")]
    NoDefaultSubtype,

    /// A field layout reaches past the end of the payload.
    #[error("telegram payload truncated at bit {bit}")]
    PayloadTruncated { bit: usize },

    /// A field width the bit extractor cannot read.
    #[error("Unsupported field width: {0} bits")]
    UnsupportedWidth(u32),

    /// The catalog or address book file could not be read.
    #[error("Catalog I/O error: {0}")]
    CatalogIo(#[from] std::io::Error),

    /// The catalog or address book document is malformed.
    #[error("Catalog parse error: {0}")]
    CatalogParse(#[from] serde_json::Error),

    /// A group address string is not in `main/middle/sub` or `main/sub` form.
    #[error("Invalid group address: {0}")]
    InvalidGroupAddress(String),
}

impl Serialize for DptError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
