//! # Bit Field Extraction
//!
//! KNX payloads pack fields MSB-first with no regard for byte boundaries:
//! DPST-10-1 puts a 3-bit weekday and a 5-bit hour into one byte, DPT 3 a
//! control bit and a 3-bit step code into the low nibble of the first byte.
//! [`extract_bits`] reads one such field given the number of bits already
//! consumed; the caller keeps track of the cursor.
//!
//! ```text
//! cursor = 6, width = 4
//!
//! byte 0: . . . . . . T T    byte 1: H H . . . . . .
//! value = TTHH
//! ```

use nom::{
    number::complete::{be_u16, be_u24, be_u32, be_u8},
    IResult,
};

use crate::error::DptError;

/// Extracts an unsigned field of `bits_to_read` bits (1..=32) starting `bits_processed`
/// bits into `buffer`.
///
/// Fields narrower than a byte are taken from the current byte at offset
/// `bits_processed % 8`, spilling into the next byte when they do not fit.
/// Whole-byte widths are read big-endian from byte `bits_processed / 8`.
/// Reading past the end of `buffer` is reported as
/// [`DptError::PayloadTruncated`], never by panicking.
///
/// ```rust
/// use knx_dpt::payload::bits::extract_bits;
///
/// let buf = [0b1101_0001, 0b0011_0111];
/// assert_eq!(extract_bits(&buf, 0, 3).unwrap(), 6); // 110
/// assert_eq!(extract_bits(&buf, 3, 5).unwrap(), 17); // 10001
/// assert_eq!(extract_bits(&buf, 6, 4).unwrap(), 0b0100); // 01 | 00
/// assert_eq!(extract_bits(&buf, 0, 16).unwrap(), 0xD137);
/// ```
pub fn extract_bits(buffer: &[u8], bits_processed: usize, bits_to_read: u32) -> Result<u32, DptError> {
    match bits_to_read {
        0 => Ok(0),
        1..=7 => extract_sub_byte(buffer, bits_processed, bits_to_read),
        8 | 16 | 24 | 32 => read_be(buffer, bits_processed, bits_to_read),
        9..=32 => extract_window(buffer, bits_processed, bits_to_read),
        _ => Err(DptError::UnsupportedWidth(bits_to_read)),
    }
}

#[inline]
fn low_mask(bits: u32) -> u32 {
    (1u32 << bits) - 1
}

fn extract_sub_byte(buffer: &[u8], bits_processed: usize, width: u32) -> Result<u32, DptError> {
    let byte_index = bits_processed / 8;
    let offset = (bits_processed % 8) as u32;
    let current = *buffer
        .get(byte_index)
        .ok_or(DptError::PayloadTruncated { bit: bits_processed })? as u32;

    if offset + width > 8 {
        // Tail of this byte forms the high part, head of the next byte the low part.
        let next = *buffer
            .get(byte_index + 1)
            .ok_or(DptError::PayloadTruncated { bit: bits_processed })? as u32;
        let tail_bits = 8 - offset;
        let head_bits = offset + width - 8;
        let high = (current & low_mask(tail_bits)) << head_bits;
        let low = next >> (8 - head_bits);
        Ok(high | low)
    } else {
        Ok((current >> (8 - offset - width)) & low_mask(width))
    }
}

fn read_be(buffer: &[u8], bits_processed: usize, width: u32) -> Result<u32, DptError> {
    let input = buffer.get(bits_processed / 8..).unwrap_or(&[]);
    let parsed: IResult<&[u8], u32> = match width {
        8 => be_u8(input).map(|(rest, v)| (rest, u32::from(v))),
        16 => be_u16(input).map(|(rest, v)| (rest, u32::from(v))),
        24 => be_u24(input),
        _ => be_u32(input),
    };
    parsed
        .map(|(_, value)| value)
        .map_err(|_| DptError::PayloadTruncated { bit: bits_processed })
}

/// Widths that are neither sub-byte nor whole bytes, at any offset.
fn extract_window(buffer: &[u8], bits_processed: usize, width: u32) -> Result<u32, DptError> {
    let end_bit = bits_processed + width as usize;
    let first = bits_processed / 8;
    let last = end_bit.div_ceil(8);
    let bytes = buffer
        .get(first..last)
        .ok_or(DptError::PayloadTruncated { bit: bits_processed })?;
    let window = bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    let trailing = last * 8 - end_bit;
    Ok(((window >> trailing) & ((1u64 << width) - 1)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Bit-by-bit reference: MSB-first over the whole buffer.
    fn reference(buffer: &[u8], offset: usize, width: u32) -> u32 {
        (0..width as usize).fold(0u32, |acc, i| {
            let bit = offset + i;
            let b = (buffer[bit / 8] >> (7 - bit % 8)) & 1;
            (acc << 1) | u32::from(b)
        })
    }

    #[test]
    fn test_within_byte() {
        let buf = [0b1011_0110];
        assert_eq!(extract_bits(&buf, 0, 1).unwrap(), 1);
        assert_eq!(extract_bits(&buf, 1, 1).unwrap(), 0);
        assert_eq!(extract_bits(&buf, 1, 3).unwrap(), 0b011);
        assert_eq!(extract_bits(&buf, 4, 4).unwrap(), 0b0110);
        assert_eq!(extract_bits(&buf, 7, 1).unwrap(), 0);
    }

    #[test]
    fn test_cross_byte() {
        let buf = [0b0000_0101, 0b1100_0000];
        assert_eq!(extract_bits(&buf, 5, 5).unwrap(), 0b10111);
        assert_eq!(extract_bits(&buf, 7, 2).unwrap(), 0b11);
        assert_eq!(extract_bits(&buf, 6, 7).unwrap(), 0b0111_000);
    }

    #[test]
    fn test_whole_bytes() {
        let buf = [0x12, 0x34, 0x56, 0x78, 0x9A];
        assert_eq!(extract_bits(&buf, 0, 8).unwrap(), 0x12);
        assert_eq!(extract_bits(&buf, 8, 16).unwrap(), 0x3456);
        assert_eq!(extract_bits(&buf, 8, 24).unwrap(), 0x34_5678);
        assert_eq!(extract_bits(&buf, 8, 32).unwrap(), 0x3456_789A);
    }

    #[test]
    fn test_odd_wide_widths() {
        let buf = [0xAB, 0xCD, 0xEF];
        assert_eq!(extract_bits(&buf, 4, 12).unwrap(), 0xBCD);
        assert_eq!(extract_bits(&buf, 0, 10).unwrap(), 0b1010_1011_11);
    }

    #[test]
    fn test_truncated_reads() {
        let buf = [0xFF];
        assert!(matches!(
            extract_bits(&buf, 6, 4),
            Err(DptError::PayloadTruncated { bit: 6 })
        ));
        assert!(matches!(
            extract_bits(&buf, 0, 16),
            Err(DptError::PayloadTruncated { .. })
        ));
        assert!(matches!(
            extract_bits(&buf, 8, 1),
            Err(DptError::PayloadTruncated { .. })
        ));
        assert!(matches!(extract_bits(&[], 0, 8), Err(DptError::PayloadTruncated { .. })));
    }

    #[test]
    fn test_unsupported_width() {
        assert!(matches!(
            extract_bits(&[0; 8], 0, 33),
            Err(DptError::UnsupportedWidth(33))
        ));
        assert_eq!(extract_bits(&[], 0, 0).unwrap(), 0);
    }

    #[test]
    fn test_all_sub_byte_widths_and_offsets() {
        let buf = [0b1101_0001, 0b0011_0111, 0b0010_1000];
        for width in 1..=7u32 {
            for offset in 0..16usize {
                let expected = reference(&buf, offset, width);
                assert_eq!(
                    extract_bits(&buf, offset, width).unwrap(),
                    expected,
                    "width {width} at offset {offset}"
                );
            }
        }
    }

    proptest! {
        #[test]
        fn prop_matches_reference(buf in proptest::collection::vec(any::<u8>(), 5..8), offset in 0usize..8, width in 1u32..=32) {
            // whole-byte widths are only read at byte boundaries
            let offset = if width % 8 == 0 { 0 } else { offset };
            let expected = reference(&buf, offset, width);
            prop_assert_eq!(extract_bits(&buf, offset, width).unwrap(), expected);
        }

        #[test]
        fn prop_never_panics(buf in proptest::collection::vec(any::<u8>(), 0..4), offset in 0usize..40, width in 0u32..40) {
            let _ = extract_bits(&buf, offset, width);
        }
    }
}
