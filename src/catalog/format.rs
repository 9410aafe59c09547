//! Field-format descriptors of a subtype's bit layout.
//!
//! The master data export describes each field with a `type` string and a loose
//! bag of attributes whose numbers are sometimes JSON numbers and sometimes
//! strings. [`RawFormat`] takes that shape as it comes and is converted into a
//! [`FieldFormat`] with a closed [`FieldKind`].

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One field of a subtype's layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawFormat")]
pub struct FieldFormat {
    pub kind: FieldKind,
    /// Explicit width in bits.
    pub width: Option<u32>,
    /// Implicit width used by integer and enumeration fields without `Width`.
    pub total_bits: Option<u32>,
    pub coefficient: Option<f64>,
    pub unit: Option<String>,
    pub name: Option<String>,
}

/// Variant-specific part of a [`FieldFormat`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Bit {
        set: Option<String>,
        cleared: Option<String>,
    },
    UnsignedInteger,
    SignedInteger,
    Enumeration(BTreeMap<u32, String>),
    Float,
    String {
        encoding: Option<String>,
    },
    Reserved,
    /// A `type` this decoder does not know; carries the original type name.
    Unknown(String),
}

impl FieldKind {
    pub fn type_name(&self) -> &str {
        match self {
            FieldKind::Bit { .. } => "Bit",
            FieldKind::UnsignedInteger => "UnsignedInteger",
            FieldKind::SignedInteger => "SignedInteger",
            FieldKind::Enumeration(_) => "Enumeration",
            FieldKind::Float => "Float",
            FieldKind::String { .. } => "String",
            FieldKind::Reserved => "Reserved",
            FieldKind::Unknown(name) => name,
        }
    }
}

impl FieldFormat {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            width: None,
            total_bits: None,
            coefficient: None,
            unit: None,
            name: None,
        }
    }

    pub fn bit(set: &str, cleared: &str) -> Self {
        Self::new(FieldKind::Bit {
            set: Some(set.to_string()),
            cleared: Some(cleared.to_string()),
        })
        .with_width(1)
    }

    pub fn unsigned(width: u32) -> Self {
        Self::new(FieldKind::UnsignedInteger).with_width(width)
    }

    pub fn signed(width: u32) -> Self {
        Self::new(FieldKind::SignedInteger).with_width(width)
    }

    pub fn float(width: u32) -> Self {
        Self::new(FieldKind::Float).with_width(width)
    }

    pub fn reserved(width: u32) -> Self {
        Self::new(FieldKind::Reserved).with_width(width)
    }

    pub fn string(width: u32, encoding: &str) -> Self {
        Self::new(FieldKind::String {
            encoding: Some(encoding.to_string()),
        })
        .with_width(width)
    }

    pub fn enumeration<'a>(width: u32, values: impl IntoIterator<Item = (u32, &'a str)>) -> Self {
        let values = values
            .into_iter()
            .map(|(code, text)| (code, text.to_string()))
            .collect();
        Self::new(FieldKind::Enumeration(values)).with_width(width)
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_coefficient(mut self, coefficient: f64) -> Self {
        self.coefficient = Some(coefficient);
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Scaling factor; a missing or zero coefficient scales by 1.
    pub fn scale(&self) -> f64 {
        match self.coefficient {
            Some(c) if c != 0.0 && c.is_finite() => c,
            _ => 1.0,
        }
    }

    /// Width for integer and enumeration fields: explicit width, else the implicit total.
    pub fn integer_width(&self, fallback: u32) -> u32 {
        self.width.or(self.total_bits).unwrap_or(fallback)
    }
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(rename = "Width", default, deserialize_with = "lenient_u32")]
    width: Option<u32>,
    #[serde(rename = "totalBits", default, deserialize_with = "lenient_u32")]
    total_bits: Option<u32>,
    #[serde(rename = "Coefficient", default, deserialize_with = "lenient_f64")]
    coefficient: Option<f64>,
    #[serde(rename = "Unit", default, deserialize_with = "lenient_string")]
    unit: Option<String>,
    #[serde(rename = "Name", default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(rename = "Set", default, deserialize_with = "lenient_string")]
    set: Option<String>,
    #[serde(rename = "Cleared", default, deserialize_with = "lenient_string")]
    cleared: Option<String>,
    #[serde(rename = "Encoding", default, deserialize_with = "lenient_string")]
    encoding: Option<String>,
    #[serde(default)]
    enumeration: Option<RawEnumeration>,
}

/// Enumeration tables appear both keyed by code and as a list of entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEnumeration {
    Map(IndexMap<String, RawEnumEntry>),
    List(Vec<RawEnumEntry>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEnumEntry {
    Entry {
        #[serde(rename = "Value", default, deserialize_with = "lenient_u32")]
        value: Option<u32>,
        #[serde(rename = "Text", default, deserialize_with = "lenient_string")]
        text: Option<String>,
    },
    Text(String),
}

impl RawEnumEntry {
    fn into_parts(self) -> (Option<u32>, String) {
        match self {
            RawEnumEntry::Entry { value, text } => (value, text.unwrap_or_default()),
            RawEnumEntry::Text(text) => (None, text),
        }
    }
}

impl RawEnumeration {
    fn into_table(self) -> BTreeMap<u32, String> {
        match self {
            RawEnumeration::Map(map) => map
                .into_iter()
                .filter_map(|(key, entry)| {
                    let (value, text) = entry.into_parts();
                    key.trim().parse().ok().or(value).map(|code| (code, text))
                })
                .collect(),
            RawEnumeration::List(list) => list
                .into_iter()
                .enumerate()
                .map(|(index, entry)| {
                    let (value, text) = entry.into_parts();
                    (value.unwrap_or(index as u32), text)
                })
                .collect(),
        }
    }
}

impl From<RawFormat> for FieldFormat {
    fn from(raw: RawFormat) -> Self {
        let kind = match raw.kind.as_str() {
            "Bit" => FieldKind::Bit {
                set: raw.set,
                cleared: raw.cleared,
            },
            "UnsignedInteger" => FieldKind::UnsignedInteger,
            "SignedInteger" => FieldKind::SignedInteger,
            "Enumeration" => FieldKind::Enumeration(
                raw.enumeration.map(RawEnumeration::into_table).unwrap_or_default(),
            ),
            "Float" => FieldKind::Float,
            "String" => FieldKind::String {
                encoding: raw.encoding,
            },
            "Reserved" => FieldKind::Reserved,
            other => FieldKind::Unknown(other.to_string()),
        };
        Self {
            kind,
            width: raw.width,
            total_bits: raw.total_bits,
            coefficient: raw.coefficient,
            unit: raw.unit,
            name: raw.name,
        }
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts `8`, `"8"` or nothing; anything unparseable becomes `None`.
pub(crate) fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .as_ref()
        .and_then(value_as_f64)
        .filter(|v| *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v.trunc() as u32))
}

pub(crate) fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .as_ref()
        .and_then(value_as_f64))
}

/// Keeps JSON strings only; any other value is `None`.
pub(crate) fn string_only<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Strings pass through; numbers and booleans are rendered, `null` is `None`.
pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_with_string_numbers() {
        let format: FieldFormat = serde_json::from_str(
            r#"{"type": "UnsignedInteger", "Width": "8", "Coefficient": "0.4", "Unit": "%"}"#,
        )
        .unwrap();
        assert_eq!(format.kind, FieldKind::UnsignedInteger);
        assert_eq!(format.width, Some(8));
        assert_eq!(format.coefficient, Some(0.4));
        assert_eq!(format.unit.as_deref(), Some("%"));
    }

    #[test]
    fn test_bit_texts() {
        let format: FieldFormat =
            serde_json::from_str(r#"{"type": "Bit", "Set": "On", "Cleared": "Off"}"#).unwrap();
        assert_eq!(
            format.kind,
            FieldKind::Bit {
                set: Some("On".into()),
                cleared: Some("Off".into())
            }
        );
    }

    #[test]
    fn test_enumeration_as_map() {
        let format: FieldFormat = serde_json::from_str(
            r#"{"type": "Enumeration", "Width": 3, "enumeration": {"0": {"Text": "no day"}, "6": {"Text": "Saturday"}}}"#,
        )
        .unwrap();
        match format.kind {
            FieldKind::Enumeration(table) => {
                assert_eq!(table.get(&0).map(String::as_str), Some("no day"));
                assert_eq!(table.get(&6).map(String::as_str), Some("Saturday"));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_enumeration_as_list() {
        let format: FieldFormat = serde_json::from_str(
            r#"{"type": "Enumeration", "Width": 8, "enumeration": [{"Text": "auto"}, {"Value": "4", "Text": "frost"}, "off"]}"#,
        )
        .unwrap();
        match format.kind {
            FieldKind::Enumeration(table) => {
                assert_eq!(table.get(&0).map(String::as_str), Some("auto"));
                assert_eq!(table.get(&4).map(String::as_str), Some("frost"));
                assert_eq!(table.get(&2).map(String::as_str), Some("off"));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_keeps_name() {
        let format: FieldFormat =
            serde_json::from_str(r#"{"type": "DoubleFloat", "Width": 64}"#).unwrap();
        assert_eq!(format.kind, FieldKind::Unknown("DoubleFloat".into()));
        assert_eq!(format.kind.type_name(), "DoubleFloat");
        assert_eq!(format.width, Some(64));
    }

    #[test]
    fn test_unparseable_width_is_none() {
        let format: FieldFormat =
            serde_json::from_str(r#"{"type": "Reserved", "Width": "n/a"}"#).unwrap();
        assert_eq!(format.width, None);
    }

    #[test]
    fn test_scale_defaults() {
        assert_eq!(FieldFormat::unsigned(8).scale(), 1.0);
        assert_eq!(FieldFormat::unsigned(8).with_coefficient(0.0).scale(), 1.0);
        assert_eq!(FieldFormat::unsigned(8).with_coefficient(0.5).scale(), 0.5);
    }

    #[test]
    fn test_integer_width_fallbacks() {
        let mut format = FieldFormat::new(FieldKind::UnsignedInteger);
        assert_eq!(format.integer_width(8), 8);
        format.total_bits = Some(16);
        assert_eq!(format.integer_width(8), 16);
        assert_eq!(format.with_width(4).integer_width(8), 4);
    }
}
