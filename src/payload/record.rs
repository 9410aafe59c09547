//! Decode results.
//!
//! A [`DecodeResult`] holds one [`DecodedField`] per field format of the
//! resolved subtype, in declaration order. Serialized with serde it uses the
//! key spelling of the KNX master data (`TypeText`, `DPT`, `Unit`, `Name`).

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::DptError;

/// Value of a decoded field, or a composed value of a whole result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Number(f64::from(n))
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// One decoded field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedField {
    pub value: FieldValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
    #[serde(rename = "Unit", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared width of a field whose format type is not understood.
    #[serde(rename = "lengthBits", skip_serializing_if = "Option::is_none")]
    pub length_bits: Option<u32>,
}

impl DecodedField {
    pub fn new(value: impl Into<FieldValue>) -> Self {
        Self {
            value: value.into(),
            interpretation: None,
            unit: None,
            name: None,
            length_bits: None,
        }
    }

    pub fn null(interpretation: &str) -> Self {
        Self::new(FieldValue::Null).interpreted(Some(interpretation.to_string()))
    }

    pub fn interpreted(mut self, interpretation: Option<String>) -> Self {
        self.interpretation = interpretation;
        self
    }
}

/// Result of decoding one payload.
#[derive(Debug, Default, Serialize)]
pub struct DecodeResult {
    #[serde(rename = "TypeText", skip_serializing_if = "Option::is_none")]
    pub type_text: Option<String>,
    /// Id of the subtype that described the layout, e.g. `DPST-9-1`.
    #[serde(rename = "DPT", skip_serializing_if = "Option::is_none")]
    pub dpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subitems: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<DecodedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<DptError>,
    /// Composed value, see [`Decoder::convenience_decode`](crate::payload::Decoder::convenience_decode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    /// Calendar date composed for DPST-11-1.
    #[serde(skip)]
    pub date: Option<NaiveDate>,
}

impl DecodeResult {
    pub fn failed(err: DptError) -> Self {
        Self {
            err: Some(err),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.err.is_none()
    }

    pub fn field(&self, index: usize) -> Option<&DecodedField> {
        self.fields.get(index)
    }

    /// Value of the field at `index`, `Null` when there is no such field.
    pub fn field_value(&self, index: usize) -> &FieldValue {
        self.fields
            .get(index)
            .map_or(&FieldValue::Null, |field| &field.value)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
