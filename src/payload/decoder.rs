//! # Payload Decoder
//!
//! Walks the field formats of a resolved subtype over a telegram payload,
//! keeping a bit cursor, and produces one [`DecodedField`] per format.
//!
//! Every failure ends up in [`DecodeResult::err`]; nothing here panics on
//! short or malformed payloads, so a caller decoding a stream of telegrams can
//! keep going after a bad one.

use std::sync::Arc;

use crate::catalog::{Catalog, FieldFormat, FieldKind};
use crate::constants::*;
use crate::dpt::TypeIdentifier;
use crate::error::DptError;
use crate::logging::{log_debug, log_error, log_warn};
use crate::payload::bits::extract_bits;
use crate::payload::data_encoding::{read_float, read_signed, read_string, round_half_up};
use crate::payload::record::{DecodeResult, DecodedField};

/// Catalog-driven DPT decoder.
///
/// Cloning is cheap; clones share the same catalog and may be used from any
/// number of threads.
///
/// ```rust
/// use knx_dpt::catalog::{Catalog, FieldFormat, MainType, SubType};
/// use knx_dpt::payload::{Decoder, FieldValue};
///
/// let catalog = Catalog::new().with(
///     MainType::new("DPT-5", "8-bit unsigned value", 8).with_subtype(
///         SubType::new("DPST-5-1", "percentage (0..100%)")
///             .with_format(FieldFormat::unsigned(8).with_coefficient(100.0 / 255.0).with_unit("%")),
///     ),
/// );
/// let decoder = Decoder::new(catalog);
///
/// let result = decoder.decode(&[0xFF], "5.001").unwrap();
/// assert!(result.is_ok());
/// assert_eq!(result.field_value(0), &FieldValue::Number(100.0));
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    catalog: Arc<Catalog>,
}

impl Decoder {
    pub fn new(catalog: impl Into<Arc<Catalog>>) -> Self {
        Self {
            catalog: catalog.into(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Decodes `payload` as the datapoint type `dpt`.
    ///
    /// Returns `None` only when no type is given (an empty identifier string).
    /// Lookup failures, short payloads and incomplete catalog entries are
    /// reported through [`DecodeResult::err`].
    pub fn decode<'a>(&self, payload: &[u8], dpt: impl Into<TypeIdentifier<'a>>) -> Option<DecodeResult> {
        let dpt = dpt.into();
        if dpt.is_absent() {
            return None;
        }

        let Some(resolved) = dpt.to_id().and_then(|id| self.catalog.resolve(&id)) else {
            log_debug(&format!("No catalog entry for {dpt}"));
            return Some(DecodeResult::failed(DptError::NotFound(dpt.to_string())));
        };

        let mut result = DecodeResult {
            type_text: resolved.text().map(str::to_string),
            dpt: Some(resolved.id().to_string()),
            ..DecodeResult::default()
        };

        let total_bits = resolved.main.total_bits();
        let available = payload.len() * 8;
        if let Some(required) = total_bits {
            if available < required {
                log_error(&format!(
                    "telegram payload too few bits for {}: {available} < {required}",
                    resolved.id()
                ));
                result.err = Some(DptError::InsufficientPayload { available, required });
                return Some(result);
            }
        }

        let Some(sub) = resolved.sub else {
            log_error(&format!("{} has no subtypes to describe its layout", resolved.main.id));
            result.err = Some(DptError::NoDefaultSubtype);
            return Some(result);
        };

        // Short types live in the low bits of the first byte, next to the APCI.
        let mut bits_processed = match total_bits {
            Some(bits) if bits <= SHORT_TELEGRAM_MAX_BITS => 8 - bits,
            _ => 0,
        };
        let implicit_bits = total_bits.unwrap_or(0) as u32;

        result.subitems = Some(sub.format.len());
        result.fields.reserve(sub.format.len());
        for format in &sub.format {
            let (mut field, advance) = match decode_field(payload, format, bits_processed, implicit_bits) {
                Ok(decoded) => decoded,
                Err(DptError::UnsupportedWidth(width)) => {
                    log_warn(&format!(
                        "{}: {} field with unsupported width {width}",
                        sub.id,
                        format.kind.type_name()
                    ));
                    (DecodedField::null(INTERPRETATION_UNSUPPORTED_WIDTH), width)
                }
                Err(err) => {
                    log_error(&format!("{}: {err}", sub.id));
                    result.err = Some(err);
                    break;
                }
            };
            field.unit = format.unit.clone();
            field.name = format.name.clone();
            result.fields.push(field);
            bits_processed += advance as usize;
        }

        Some(result)
    }
}

/// Decodes one field at the cursor, returning it with the number of bits it occupies.
fn decode_field(
    payload: &[u8],
    format: &FieldFormat,
    bits_processed: usize,
    implicit_bits: u32,
) -> Result<(DecodedField, u32), DptError> {
    let bytes_read = bits_processed / 8;
    match &format.kind {
        FieldKind::Bit { set, cleared } => {
            let bit = extract_bits(payload, bits_processed, 1)?;
            let text = if bit == 1 { set } else { cleared };
            Ok((DecodedField::new(bit).interpreted(text.clone()), 1))
        }
        FieldKind::UnsignedInteger => {
            let width = format.integer_width(implicit_bits);
            let scaled = f64::from(extract_bits(payload, bits_processed, width)?) * format.scale();
            let value = if width <= 8 { round_half_up(scaled) } else { scaled };
            Ok((DecodedField::new(value), width))
        }
        FieldKind::Enumeration(table) => {
            let width = format.integer_width(implicit_bits);
            let code = extract_bits(payload, bits_processed, width)?;
            let text = match table.get(&code) {
                Some(text) => text.clone(),
                None => {
                    log_warn(&format!("Enumeration code {code} has no catalog text"));
                    INTERPRETATION_UNKNOWN_ENUM.to_string()
                }
            };
            Ok((DecodedField::new(code).interpreted(Some(text)), width))
        }
        FieldKind::SignedInteger => {
            let width = format.integer_width(implicit_bits);
            let scaled = f64::from(read_signed(payload, bytes_read, width)?) * format.scale();
            let value = if width == 8 { round_half_up(scaled) } else { scaled };
            Ok((DecodedField::new(value), width))
        }
        FieldKind::Float => {
            let width = format.width.unwrap_or(implicit_bits);
            Ok((DecodedField::new(read_float(payload, bytes_read, width)?), width))
        }
        FieldKind::String { encoding } => {
            let width = format.width.unwrap_or(implicit_bits);
            let text = read_string(payload, bytes_read, (width / 8) as usize, encoding.as_deref())?;
            Ok((DecodedField::new(text), width))
        }
        FieldKind::Reserved => Ok((
            DecodedField::null(INTERPRETATION_RESERVED),
            format.width.unwrap_or(0),
        )),
        FieldKind::Unknown(kind) => {
            log_warn(&format!("Unhandled format {kind}"));
            let mut field = DecodedField::null(INTERPRETATION_UNKNOWN);
            field.length_bits = format.width;
            Ok((field, format.width.unwrap_or(0)))
        }
    }
}
