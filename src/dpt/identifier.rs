//! Datapoint type identifier normalization.
//!
//! KNX tooling spells the same datapoint type in several ways: the
//! conventional `9.001` / `DPT9.001`, the ETS export form `DPST-9-1`, or just
//! the main number `DPT-9`. All of them reduce to a [`DptId`], which renders
//! back to the ETS keys used by the catalog.

use std::fmt;
use std::str::FromStr;

use nom::{
    bytes::complete::take_till,
    character::complete::{digit1, one_of},
    combinator::opt,
    sequence::preceded,
    IResult,
};

use crate::error::DptError;

/// Canonical datapoint type identifier: a main type and an optional subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DptId {
    pub main: u32,
    pub sub: Option<u32>,
}

impl DptId {
    pub const fn new(main: u32, sub: Option<u32>) -> Self {
        Self { main, sub }
    }

    pub const fn main_only(main: u32) -> Self {
        Self { main, sub: None }
    }

    /// Parses any DPT-like string, returning `None` when no positive main number is present.
    ///
    /// Only the first digit group and a group directly following a `.` or `-`
    /// separator are considered; any other text is ignored.
    ///
    /// ```rust
    /// use knx_dpt::DptId;
    ///
    /// assert_eq!(DptId::parse("DPT1.0234"), Some(DptId::new(1, Some(234))));
    /// assert_eq!(DptId::parse("DPST-1-234"), Some(DptId::new(1, Some(234))));
    /// assert_eq!(DptId::parse("DPT-5"), Some(DptId::main_only(5)));
    /// assert_eq!(DptId::parse("switch"), None);
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        let (_, (main, sub)) = dpt_digits(input).ok()?;
        let main: u32 = main.parse().ok()?;
        if main == 0 {
            return None;
        }
        let sub = match sub {
            Some(digits) => Some(digits.parse::<u32>().ok()?).filter(|&s| s > 0),
            None => None,
        };
        Some(Self { main, sub })
    }

    /// Catalog key of the main type, e.g. `DPT-9`.
    pub fn main_key(&self) -> String {
        format!("DPT-{}", self.main)
    }

    /// Catalog key of the subtype, e.g. `DPST-9-1`.
    pub fn sub_key(&self) -> Option<String> {
        self.sub.map(|sub| format!("DPST-{}-{}", self.main, sub))
    }
}

impl fmt::Display for DptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub {
            Some(sub) => write!(f, "DPST-{}-{}", self.main, sub),
            None => write!(f, "DPT-{}", self.main),
        }
    }
}

impl FromStr for DptId {
    type Err = DptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DptError::NotFound(s.to_string()))
    }
}

/// Skips to the first digit group and takes an optional `.`/`-` separated second group.
fn dpt_digits(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    let (input, _) = take_till(|c: char| c.is_ascii_digit())(input)?;
    let (input, main) = digit1(input)?;
    let (input, sub) = opt(preceded(one_of(".-"), digit1))(input)?;
    Ok((input, (main, sub)))
}

/// Normalizes a DPT string; shorthand for [`DptId::parse`].
pub fn normalize(input: &str) -> Option<DptId> {
    DptId::parse(input)
}

/// A type identifier as handed to the decoder: either raw text or an already normalized id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeIdentifier<'a> {
    Raw(&'a str),
    Canonical(DptId),
}

impl TypeIdentifier<'_> {
    /// An empty raw identifier means "no type configured".
    pub fn is_absent(&self) -> bool {
        matches!(self, TypeIdentifier::Raw(raw) if raw.trim().is_empty())
    }

    pub fn to_id(&self) -> Option<DptId> {
        match self {
            TypeIdentifier::Raw(raw) => DptId::parse(raw),
            TypeIdentifier::Canonical(id) => Some(*id),
        }
    }
}

impl fmt::Display for TypeIdentifier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeIdentifier::Raw(raw) => f.write_str(raw),
            TypeIdentifier::Canonical(id) => id.fmt(f),
        }
    }
}

impl<'a> From<&'a str> for TypeIdentifier<'a> {
    fn from(raw: &'a str) -> Self {
        TypeIdentifier::Raw(raw)
    }
}

impl<'a> From<&'a String> for TypeIdentifier<'a> {
    fn from(raw: &'a String) -> Self {
        TypeIdentifier::Raw(raw.as_str())
    }
}

impl From<DptId> for TypeIdentifier<'_> {
    fn from(id: DptId) -> Self {
        TypeIdentifier::Canonical(id)
    }
}
