//! # Utility Modules
//!
//! Helpers shared by the command-line tool and the tests.

pub mod hex;

pub use hex::{decode_hex, format_hex_compact, HexError};
