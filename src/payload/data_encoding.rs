//! # KNX Data Encoding
//!
//! This module provides the byte-level decoders for the non-integer field
//! formats of the KNX datapoint types: two's-complement integers, the KNX
//! 2-byte float (DPT 9), IEEE-754 singles (DPT 14) and character strings
//! (DPT 4, DPT 16).

use nom::{
    bytes::complete::take,
    number::complete::{be_f32, be_i16, be_i32, be_i8, be_u16},
    IResult,
};

use crate::constants::ENCODING_US_ASCII;
use crate::error::DptError;

/// Rounds half-way cases towards positive infinity (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounds to `decimals` places with [`round_half_up`].
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    round_half_up(value * factor) / factor
}

/// Decodes the KNX 2-byte float: `SEEE EMMM MMMM MMMM`, value `0.01 * M * 2^E`.
///
/// A set sign bit marks the mantissa as negative; it is converted from its
/// two's-complement form. The result is rounded to two decimals.
///
/// ```rust
/// use knx_dpt::payload::data_encoding::decode_knx_float16;
///
/// assert_eq!(decode_knx_float16(0x0C1A), 21.0);
/// assert_eq!(decode_knx_float16(0x8A24), -30.0);
/// ```
pub fn decode_knx_float16(raw: u16) -> f64 {
    let sign = (raw & 0x8000) >> 15;
    let exponent = i32::from((raw & 0x7800) >> 11);
    let mut mantissa = i32::from(raw & 0x07FF);
    if sign != 0 {
        mantissa = -(!(mantissa - 1) & 0x07FF);
    }
    round_to(0.01 * f64::from(mantissa) * 2f64.powi(exponent), 2)
}

fn at(buffer: &[u8], byte_index: usize) -> &[u8] {
    buffer.get(byte_index..).unwrap_or(&[])
}

fn truncated(byte_index: usize) -> DptError {
    DptError::PayloadTruncated { bit: byte_index * 8 }
}

/// Reads a big-endian two's-complement integer of 8, 16 or 32 bits at `byte_index`.
pub fn read_signed(buffer: &[u8], byte_index: usize, width: u32) -> Result<i32, DptError> {
    let input = at(buffer, byte_index);
    let parsed: IResult<&[u8], i32> = match width {
        8 => be_i8(input).map(|(rest, v)| (rest, i32::from(v))),
        16 => be_i16(input).map(|(rest, v)| (rest, i32::from(v))),
        32 => be_i32(input),
        other => return Err(DptError::UnsupportedWidth(other)),
    };
    parsed.map(|(_, v)| v).map_err(|_| truncated(byte_index))
}

/// Reads a float field of 16 (KNX float) or 32 (IEEE-754) bits at `byte_index`.
pub fn read_float(buffer: &[u8], byte_index: usize, width: u32) -> Result<f64, DptError> {
    let input = at(buffer, byte_index);
    match width {
        16 => {
            let parsed: IResult<&[u8], u16> = be_u16(input);
            parsed
                .map(|(_, raw)| decode_knx_float16(raw))
                .map_err(|_| truncated(byte_index))
        }
        32 => {
            let parsed: IResult<&[u8], f32> = be_f32(input);
            parsed
                .map(|(_, v)| f64::from(v))
                .map_err(|_| truncated(byte_index))
        }
        other => Err(DptError::UnsupportedWidth(other)),
    }
}

/// Reads `len` bytes at `byte_index` as text.
///
/// `us-ascii` keeps the low seven bits of every byte; any other encoding is
/// read as ISO 8859-1, where every byte maps to the code point of equal value.
pub fn read_string(buffer: &[u8], byte_index: usize, len: usize, encoding: Option<&str>) -> Result<String, DptError> {
    let parsed: IResult<&[u8], &[u8]> = take(len)(at(buffer, byte_index));
    let (_, bytes) = parsed.map_err(|_| truncated(byte_index))?;
    let ascii = encoding.is_some_and(|e| e.eq_ignore_ascii_case(ENCODING_US_ASCII));
    Ok(bytes
        .iter()
        .map(|&b| if ascii { char::from(b & 0x7F) } else { char::from(b) })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(94.1176), 94.0);
        assert_eq!(round_to(1.005 * 100.0, 0), 100.0);
        assert_eq!(round_to(0.125, 2), 0.13);
    }

    #[test]
    fn test_float16_known_values() {
        assert_eq!(decode_knx_float16(0x0000), 0.0);
        assert_eq!(decode_knx_float16(0x0C1A), 21.0); // 1050 * 2^1 * 0.01
        assert_eq!(decode_knx_float16(0x07FF), 20.47);
        assert_eq!(decode_knx_float16(0x7FFF), 670760.96);
        assert_eq!(decode_knx_float16(0x87FF), -0.01);
        assert_eq!(decode_knx_float16(0x8A24), -30.0);
    }

    #[test]
    fn test_signed_widths() {
        let buf = [0xFF, 0x80, 0x00, 0x00, 0x01];
        assert_eq!(read_signed(&buf, 0, 8).unwrap(), -1);
        assert_eq!(read_signed(&buf, 1, 16).unwrap(), -32768);
        assert_eq!(read_signed(&buf, 1, 32).unwrap(), i32::MIN + 1);
        assert!(matches!(read_signed(&buf, 4, 16), Err(DptError::PayloadTruncated { bit: 32 })));
        assert!(matches!(read_signed(&buf, 0, 12), Err(DptError::UnsupportedWidth(12))));
    }

    #[test]
    fn test_float32() {
        let buf = 1234.5f32.to_be_bytes();
        assert_eq!(read_float(&buf, 0, 32).unwrap(), 1234.5);
        assert!(read_float(&buf, 1, 32).is_err());
    }

    #[test]
    fn test_strings() {
        let buf = [b'K', b'N', b'X', 0xE4, 0x00];
        assert_eq!(read_string(&buf, 0, 3, Some("us-ascii")).unwrap(), "KNX");
        assert_eq!(read_string(&buf, 3, 1, Some("us-ascii")).unwrap(), "d");
        assert_eq!(read_string(&buf, 3, 1, Some("iso-8859-1")).unwrap(), "ä");
        assert_eq!(read_string(&buf, 0, 5, None).unwrap(), "KNXä\0");
        assert!(read_string(&buf, 2, 4, None).is_err());
    }
}
