//! # Group Address Configuration
//!
//! A KNX installation attaches a datapoint type to each group address in its
//! ETS project. The decoder itself only needs the type, but a bus monitor sees
//! destination addresses, so the mapping is kept in a small JSON file:
//!
//! ```json
//! {
//!     "1/2/3": { "type": "DPST-1-1", "name": "Kitchen Light" },
//!     "3/1/10": { "type": "DPST-9-1", "name": "Living room temperature" }
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::DptError;
use crate::logging::log_debug;
use crate::payload::{DecodeResult, Decoder};

/// A 16-bit KNX group address.
///
/// Written in the three-level style `main/middle/sub` (5/3/8 bits) or the
/// two-level style `main/sub` (5/11 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupAddress(u16);

impl GroupAddress {
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub fn three_level(main: u8, middle: u8, sub: u8) -> Result<Self, DptError> {
        if main > 0x1F || middle > 0x07 {
            return Err(DptError::InvalidGroupAddress(format!("{main}/{middle}/{sub}")));
        }
        Ok(Self(u16::from(main) << 11 | u16::from(middle) << 8 | u16::from(sub)))
    }

    pub fn two_level(main: u8, sub: u16) -> Result<Self, DptError> {
        if main > 0x1F || sub > 0x07FF {
            return Err(DptError::InvalidGroupAddress(format!("{main}/{sub}")));
        }
        Ok(Self(u16::from(main) << 11 | sub))
    }

    /// Reads a big-endian address, as carried in the destination field of a telegram.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        match data {
            [hi, lo, ..] => Some(Self(u16::from_be_bytes([*hi, *lo]))),
            _ => None,
        }
    }

    pub fn main(self) -> u8 {
        (self.0 >> 11) as u8
    }

    pub fn middle(self) -> u8 {
        ((self.0 >> 8) & 0x07) as u8
    }

    pub fn sub(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl fmt::Display for GroupAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.main(), self.middle(), self.sub())
    }
}

impl FromStr for GroupAddress {
    type Err = DptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DptError::InvalidGroupAddress(s.to_string());
        let parts: Vec<&str> = s.trim().split('/').collect();
        match parts.as_slice() {
            [main, middle, sub] => Self::three_level(
                main.parse().map_err(|_| invalid())?,
                middle.parse().map_err(|_| invalid())?,
                sub.parse().map_err(|_| invalid())?,
            ),
            [main, sub] => Self::two_level(
                main.parse().map_err(|_| invalid())?,
                sub.parse().map_err(|_| invalid())?,
            ),
            _ => Err(invalid()),
        }
    }
}

/// Datapoint type and label configured for one group address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupAddressEntry {
    #[serde(rename = "type")]
    pub dpt: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Mapping from group address to its configured datapoint type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupAddressBook {
    entries: IndexMap<GroupAddress, GroupAddressEntry>,
}

impl GroupAddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, DptError> {
        let raw: IndexMap<String, GroupAddressEntry> = serde_json::from_str(json)?;
        let mut book = Self::new();
        for (address, entry) in raw {
            book.insert(address.parse()?, entry);
        }
        Ok(book)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DptError> {
        let book = Self::from_json_str(&fs::read_to_string(path.as_ref())?)?;
        log_debug(&format!(
            "Loaded {} group addresses from {}",
            book.len(),
            path.as_ref().display()
        ));
        Ok(book)
    }

    pub fn insert(&mut self, address: GroupAddress, entry: GroupAddressEntry) {
        self.entries.insert(address, entry);
    }

    pub fn get(&self, address: GroupAddress) -> Option<&GroupAddressEntry> {
        self.entries.get(&address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupAddress, &GroupAddressEntry)> {
        self.entries.iter()
    }

    /// Decodes a payload sent to `address` with the type configured for it.
    ///
    /// Returns `None` for addresses that are not in the book.
    pub fn decode(
        &self,
        decoder: &Decoder,
        address: GroupAddress,
        payload: &[u8],
        locale: Option<&str>,
    ) -> Option<DecodeResult> {
        let entry = self.get(address)?;
        decoder.convenience_decode(payload, &entry.dpt, locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_level_roundtrip() {
        let ga: GroupAddress = "1/2/3".parse().unwrap();
        assert_eq!(ga.raw(), 0x0A03);
        assert_eq!(ga.to_string(), "1/2/3");
        assert_eq!(GroupAddress::from_raw(0xFFFF).to_string(), "31/7/255");
    }

    #[test]
    fn test_two_level() {
        let ga: GroupAddress = "1/515".parse().unwrap();
        assert_eq!(ga.raw(), 0x0A03);
        assert_eq!(ga, "1/2/3".parse().unwrap());
    }

    #[test]
    fn test_invalid_addresses() {
        assert!("32/0/0".parse::<GroupAddress>().is_err());
        assert!("1/8/0".parse::<GroupAddress>().is_err());
        assert!("1/2/256".parse::<GroupAddress>().is_err());
        assert!("1/2048".parse::<GroupAddress>().is_err());
        assert!("1".parse::<GroupAddress>().is_err());
        assert!("a/b/c".parse::<GroupAddress>().is_err());
    }

    #[test]
    fn test_from_bytes() {
        assert_eq!(
            GroupAddress::from_bytes(&[0x0A, 0x03, 0xFF]),
            Some(GroupAddress::from_raw(0x0A03))
        );
        assert_eq!(GroupAddress::from_bytes(&[0x0A]), None);
    }

    #[test]
    fn test_book_from_json() {
        let book = GroupAddressBook::from_json_str(
            r#"{
                "1/2/3": {"type": "DPST-1-1", "name": "Kitchen Light"},
                "1/2/4": {"type": "DPST-1-1"}
            }"#,
        )
        .unwrap();
        assert_eq!(book.len(), 2);
        let entry = book.get("1/2/3".parse().unwrap()).unwrap();
        assert_eq!(entry.dpt, "DPST-1-1");
        assert_eq!(entry.name.as_deref(), Some("Kitchen Light"));
        assert!(book.get("1/2/4".parse().unwrap()).unwrap().name.is_none());
        assert!(book.get("1/2/5".parse().unwrap()).is_none());
    }

    #[test]
    fn test_book_rejects_bad_address() {
        let err = GroupAddressBook::from_json_str(r#"{"kitchen": {"type": "DPST-1-1"}}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid group address: kitchen");
    }
}
