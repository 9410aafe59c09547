//! The payload module contains the components responsible for decoding the
//! value part of a KNX telegram according to a datapoint type.

pub mod bits;
pub mod compose;
pub mod data_encoding;
pub mod decoder;
pub mod record;

pub use bits::extract_bits;
pub use compose::{compose, expand_two_digit_year, DateStyle};
pub use decoder::Decoder;
pub use record::{DecodeResult, DecodedField, FieldValue};
