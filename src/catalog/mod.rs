//! # DPT Catalog
//!
//! In-memory form of the KNX master data datapoint types: main types keyed by
//! `DPT-<n>`, each with an ordered map of subtypes keyed by `DPST-<n>-<m>`.
//! The catalog is loaded once, never mutated afterwards, and handed to the
//! [`Decoder`](crate::payload::Decoder) behind an `Arc`.
//!
//! Document order is preserved because subtype resolution falls back to the
//! first default (or the first) subtype of a main type.

pub mod format;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use crate::dpt::DptId;
use crate::error::DptError;
use format::{lenient_string, lenient_u32, string_only};

pub use format::{FieldFormat, FieldKind};

/// A datapoint main type, e.g. `DPT-9` (2-byte float).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MainType {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Text", default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(rename = "SizeInBit", default, deserialize_with = "lenient_u32")]
    pub size_in_bit: Option<u32>,
    #[serde(default)]
    pub subtypes: Option<IndexMap<String, SubType>>,
}

/// A concrete encoding within a main type, e.g. `DPST-9-1` (temperature).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubType {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Text", default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(rename = "Default", default, deserialize_with = "string_only")]
    pub default: Option<String>,
    #[serde(rename = "Format", default)]
    pub format: Vec<FieldFormat>,
}

impl MainType {
    pub fn new(id: &str, text: &str, size_in_bit: u32) -> Self {
        Self {
            id: id.to_string(),
            text: Some(text.to_string()),
            size_in_bit: Some(size_in_bit),
            subtypes: None,
        }
    }

    /// Appends a subtype under its own id, keeping insertion order.
    pub fn with_subtype(mut self, sub: SubType) -> Self {
        self.subtypes
            .get_or_insert_with(IndexMap::new)
            .insert(sub.id.clone(), sub);
        self
    }

    /// Declared payload size in bits, if the master data states one.
    pub fn total_bits(&self) -> Option<usize> {
        self.size_in_bit.map(|bits| bits as usize)
    }

    pub fn has_subtypes(&self) -> bool {
        self.subtypes.as_ref().is_some_and(|subs| !subs.is_empty())
    }
}

impl SubType {
    pub fn new(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            text: Some(text.to_string()),
            default: None,
            format: Vec::new(),
        }
    }

    pub fn with_format(mut self, format: FieldFormat) -> Self {
        self.format.push(format);
        self
    }

    pub fn as_default(mut self) -> Self {
        self.default = Some("true".to_string());
        self
    }

    /// The master data marks default subtypes with the literal string `"true"`.
    pub fn is_default(&self) -> bool {
        self.default.as_deref() == Some("true")
    }
}

/// Which step of the resolution policy produced the subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The requested subtype exists.
    Explicit,
    /// First subtype marked as default.
    Default,
    /// First subtype in catalog order.
    First,
    /// The main type has no subtypes at all.
    MainOnly,
}

/// Outcome of [`Catalog::resolve`].
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub main: &'a MainType,
    pub sub: Option<&'a SubType>,
    pub resolution: Resolution,
}

impl Resolved<'_> {
    /// Display text of the subtype, else of the main type.
    pub fn text(&self) -> Option<&str> {
        self.sub
            .and_then(|sub| sub.text.as_deref())
            .or(self.main.text.as_deref())
    }

    /// Id of the subtype, else of the main type.
    pub fn id(&self) -> &str {
        self.sub.map_or(self.main.id.as_str(), |sub| sub.id.as_str())
    }
}

/// The datapoint type catalog.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    types: IndexMap<String, MainType>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a master data JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, DptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DptError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads the catalog from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DptError> {
        let file = File::open(path.as_ref())?;
        let catalog = Self::from_reader(BufReader::new(file))?;
        debug!(
            "Loaded {} main types from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    /// Adds a main type under its own id; used to build catalogs in code.
    pub fn insert(&mut self, main: MainType) {
        self.types.insert(main.id.clone(), main);
    }

    pub fn with(mut self, main: MainType) -> Self {
        self.insert(main);
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn main_type(&self, key: &str) -> Option<&MainType> {
        self.types.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MainType)> {
        self.types.iter().map(|(key, main)| (key.as_str(), main))
    }

    /// Resolves an identifier to its main type and the subtype that describes the layout.
    ///
    /// An explicitly named subtype wins; otherwise the first subtype marked as
    /// default, then the first subtype. Returns `None` only if the main type is
    /// unknown.
    pub fn resolve(&self, id: &DptId) -> Option<Resolved<'_>> {
        let main = self.types.get(&id.main_key())?;
        let Some(subtypes) = main.subtypes.as_ref().filter(|_| main.has_subtypes()) else {
            return Some(Resolved {
                main,
                sub: None,
                resolution: Resolution::MainOnly,
            });
        };

        if let Some(sub) = id.sub_key().and_then(|key| subtypes.get(&key)) {
            return Some(Resolved {
                main,
                sub: Some(sub),
                resolution: Resolution::Explicit,
            });
        }

        if let Some(sub) = subtypes.values().find(|sub| sub.is_default()) {
            debug!("{id}: using default subtype {}", sub.id);
            return Some(Resolved {
                main,
                sub: Some(sub),
                resolution: Resolution::Default,
            });
        }

        let sub = subtypes.values().next();
        if let Some(sub) = sub {
            debug!("{id}: no default subtype, using first subtype {}", sub.id);
        }
        Some(Resolved {
            main,
            sub,
            resolution: Resolution::First,
        })
    }

    /// Normalizes `input` and resolves it; `None` on parse failure or unknown type.
    pub fn resolve_str(&self, input: &str) -> Option<Resolved<'_>> {
        self.resolve(&DptId::parse(input)?)
    }
}
