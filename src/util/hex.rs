//! # Hex Payload Input
//!
//! Payloads handed to the command-line tool, and the ones written into test
//! fixtures, are hex strings copied out of bus monitors. Those come as
//! `19 02 11`, `19:02:11`, `0x19,0x02,0x11` or plain `190211`; this module
//! turns all of them into bytes with the `hex` crate.

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Invalid hex character: {0}")]
    InvalidCharacter(char),

    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,
}

/// Decodes a hex payload, accepting whitespace, `:`/`,`/`-` separators and `0x` prefixes.
///
/// Separated bytes may drop their leading zero (`0x1 0x2` is `[1, 2]`).
///
/// ```rust
/// use knx_dpt::util::hex::decode_hex;
///
/// assert_eq!(decode_hex("19 02 11").unwrap(), vec![0x19, 0x02, 0x11]);
/// assert_eq!(decode_hex("0x19,0x2,0x11").unwrap(), vec![0x19, 0x02, 0x11]);
/// assert_eq!(decode_hex("D13728").unwrap(), vec![0xD1, 0x37, 0x28]);
/// ```
pub fn decode_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let groups: Vec<&str> = input
        .split(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | '-'))
        .map(|group| group.trim_start_matches("0x").trim_start_matches("0X"))
        .filter(|group| !group.is_empty())
        .collect();

    if groups.is_empty() {
        return Err(HexError::EmptyString);
    }

    let mut bytes = Vec::new();
    for group in &groups {
        if let Some(bad) = group.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(HexError::InvalidCharacter(bad));
        }
        if groups.len() > 1 && group.len() == 1 {
            bytes.extend(hex_pairs(&format!("0{group}"))?);
        } else {
            bytes.extend(hex_pairs(group)?);
        }
    }
    Ok(bytes)
}

fn hex_pairs(group: &str) -> Result<Vec<u8>, HexError> {
    if group.len() % 2 != 0 {
        return Err(HexError::OddLength(group.len()));
    }
    hex::decode(group).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, .. } => HexError::InvalidCharacter(c),
        _ => HexError::OddLength(group.len()),
    })
}

/// Format hex data for compact display (useful for logs)
///
/// Formats data as "19 02 11" with spaces between bytes.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_spaced() {
        assert_eq!(decode_hex("190211").unwrap(), vec![0x19, 0x02, 0x11]);
        assert_eq!(decode_hex(" 19  02\t11 ").unwrap(), vec![0x19, 0x02, 0x11]);
        assert_eq!(decode_hex("f0").unwrap(), vec![0xF0]);
    }

    #[test]
    fn test_separators_and_prefixes() {
        assert_eq!(decode_hex("19:02:11").unwrap(), vec![0x19, 0x02, 0x11]);
        assert_eq!(decode_hex("0xD1, 0x37, 0x28").unwrap(), vec![0xD1, 0x37, 0x28]);
        assert_eq!(decode_hex("0x1 0x2").unwrap(), vec![0x01, 0x02]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(decode_hex(""), Err(HexError::EmptyString));
        assert_eq!(decode_hex(" , "), Err(HexError::EmptyString));
        assert_eq!(decode_hex("123"), Err(HexError::OddLength(3)));
        assert_eq!(decode_hex("GG"), Err(HexError::InvalidCharacter('G')));
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_hex_compact(&[0x19, 0x02, 0x11]), "19 02 11");
        assert_eq!(format_hex_compact(&[]), "");
    }
}
