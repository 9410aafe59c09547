//! KNX Datapoint Constants
//!
//! This module defines constants used by the decoder, based on the KNX
//! datapoint type definitions (KNX Standard, Volume 3/7/2).

use crate::dpt::DptId;

/// DPST-10-1, time of day.
pub const DPT_TIME_OF_DAY: DptId = DptId::new(10, Some(1));

/// DPST-11-1, date.
pub const DPT_DATE: DptId = DptId::new(11, Some(1));

/// Types up to this many bits share the first byte with the APCI bits.
pub const SHORT_TELEGRAM_MAX_BITS: usize = 6;

// ----------------------------------------------------------------------------
// DPST-10-1 / DPST-11-1 field positions
// ----------------------------------------------------------------------------

/// Hour field of DPST-10-1
pub const TIME_FIELD_HOUR: usize = 1;

/// Minutes field of DPST-10-1
pub const TIME_FIELD_MINUTE: usize = 3;

/// Seconds field of DPST-10-1
pub const TIME_FIELD_SECOND: usize = 5;

/// Day of month field of DPST-11-1
pub const DATE_FIELD_DAY: usize = 1;

/// Month field of DPST-11-1
pub const DATE_FIELD_MONTH: usize = 3;

/// Two-digit year field of DPST-11-1
pub const DATE_FIELD_YEAR: usize = 5;

/// Two-digit years below this belong to the 21st century.
pub const DATE_CENTURY_PIVOT: u32 = 90;

// ----------------------------------------------------------------------------
// Field interpretations
// ----------------------------------------------------------------------------

/// Interpretation of reserved padding fields
pub const INTERPRETATION_RESERVED: &str = "reserved";

/// Interpretation of fields with an unhandled format type
pub const INTERPRETATION_UNKNOWN: &str = "unknown";

/// Interpretation of enumeration codes missing from the table
pub const INTERPRETATION_UNKNOWN_ENUM: &str = "unknown enumeration value";

/// Interpretation of numeric fields declared with a width the format cannot take
pub const INTERPRETATION_UNSUPPORTED_WIDTH: &str = "unsupported width";

/// String encoding decoded as 7-bit ASCII; every other encoding is read as Latin-1
pub const ENCODING_US_ASCII: &str = "us-ascii";
