//! # Composed Values
//!
//! Post-processing on top of [`Decoder::decode`]: the date (DPST-11-1) and
//! time of day (DPST-10-1) types are folded into one display value, and
//! single-field types expose their field value at the top level.

use chrono::NaiveDate;

use crate::constants::*;
use crate::dpt::{DptId, TypeIdentifier};
use crate::logging::log_warn;
use crate::payload::decoder::Decoder;
use crate::payload::record::{DecodeResult, FieldValue};

impl Decoder {
    /// Decodes like [`Decoder::decode`] and adds a composed `value` when the decode succeeded.
    ///
    /// `locale` is a BCP 47 tag (`de-DE`, `en-US`, ...) that only affects the
    /// date string of DPST-11-1.
    pub fn convenience_decode<'a>(
        &self,
        payload: &[u8],
        dpt: impl Into<TypeIdentifier<'a>>,
        locale: Option<&str>,
    ) -> Option<DecodeResult> {
        let mut result = self.decode(payload, dpt)?;
        if result.is_ok() {
            compose(&mut result, locale);
        }
        Some(result)
    }
}

/// Adds the composed value to an error-free result.
pub fn compose(result: &mut DecodeResult, locale: Option<&str>) {
    match result.dpt.as_deref().and_then(DptId::parse) {
        Some(DPT_DATE) => compose_date(result, locale),
        Some(DPT_TIME_OF_DAY) => compose_time(result),
        _ if result.subitems == Some(1) => {
            result.value = result.fields.first().map(|field| field.value.clone());
        }
        _ => {}
    }
}

/// Two-digit KNX years: 90..99 are 1990..1999, 0..89 are 2000..2089.
pub fn expand_two_digit_year(year: u32) -> u32 {
    if year < DATE_CENTURY_PIVOT {
        2000 + year
    } else {
        1900 + year
    }
}

fn field_u32(result: &DecodeResult, index: usize) -> Option<u32> {
    result
        .field_value(index)
        .as_f64()
        .filter(|v| *v >= 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v as u32)
}

fn compose_date(result: &mut DecodeResult, locale: Option<&str>) {
    let (Some(day), Some(month), Some(year)) = (
        field_u32(result, DATE_FIELD_DAY),
        field_u32(result, DATE_FIELD_MONTH),
        field_u32(result, DATE_FIELD_YEAR),
    ) else {
        log_warn("Date layout lacks day, month or year fields");
        return;
    };

    let year = expand_two_digit_year(year);
    if let Some(field) = result.fields.get_mut(DATE_FIELD_YEAR) {
        field.value = FieldValue::from(year);
    }

    match NaiveDate::from_ymd_opt(year as i32, month, day) {
        Some(date) => {
            result.value = Some(FieldValue::Text(DateStyle::for_locale(locale).format(date)));
            result.date = Some(date);
        }
        None => log_warn(&format!("Not a calendar date: {year}-{month}-{day}")),
    }
}

fn present(result: &DecodeResult, index: usize) -> Option<&FieldValue> {
    Some(result.field_value(index)).filter(|value| !value.is_null())
}

fn compose_time(result: &mut DecodeResult) {
    let text = match (
        present(result, TIME_FIELD_HOUR),
        present(result, TIME_FIELD_MINUTE),
        present(result, TIME_FIELD_SECOND),
    ) {
        (Some(hour), Some(minute), Some(second)) => format!("{hour}:{minute}:{second}"),
        _ => {
            log_warn("Time of day layout lacks hour, minute or second fields");
            return;
        }
    };
    result.value = Some(FieldValue::Text(text));
}

/// Numeric date layouts, two-digit day and month with a four-digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// 2017-02-25
    Iso,
    /// 02/25/2017
    MonthDayYear,
    /// 25.02.2017
    DayMonthYearDot,
    /// 25/02/2017
    DayMonthYearSlash,
    /// 25-02-2017
    DayMonthYearDash,
    /// 2017/02/25
    YearMonthDaySlash,
    /// 2017. 02. 25.
    YearMonthDayDotted,
}

impl DateStyle {
    /// Picks the layout for a BCP 47 locale tag; unknown or missing tags get ISO 8601.
    pub fn for_locale(locale: Option<&str>) -> Self {
        let Some((language, region)) = locale.and_then(split_locale) else {
            return DateStyle::Iso;
        };
        match (language.as_str(), region.as_deref()) {
            ("en", None | Some("US")) => DateStyle::MonthDayYear,
            ("en", Some(_)) => DateStyle::DayMonthYearSlash,
            ("de" | "ru" | "pl" | "fi" | "nb" | "no" | "da" | "cs" | "tr" | "uk", _) => {
                DateStyle::DayMonthYearDot
            }
            ("fr" | "es" | "it" | "pt" | "el", _) => DateStyle::DayMonthYearSlash,
            ("nl", _) => DateStyle::DayMonthYearDash,
            ("ja" | "zh", _) => DateStyle::YearMonthDaySlash,
            ("ko" | "hu", _) => DateStyle::YearMonthDayDotted,
            _ => DateStyle::Iso,
        }
    }

    pub fn pattern(self) -> &'static str {
        match self {
            DateStyle::Iso => "%Y-%m-%d",
            DateStyle::MonthDayYear => "%m/%d/%Y",
            DateStyle::DayMonthYearDot => "%d.%m.%Y",
            DateStyle::DayMonthYearSlash => "%d/%m/%Y",
            DateStyle::DayMonthYearDash => "%d-%m-%Y",
            DateStyle::YearMonthDaySlash => "%Y/%m/%d",
            DateStyle::YearMonthDayDotted => "%Y. %m. %d.",
        }
    }

    pub fn format(self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }
}

/// Language and region subtags of a locale tag; script and extension subtags are skipped.
fn split_locale(tag: &str) -> Option<(String, Option<String>)> {
    let mut subtags = tag.split(['-', '_']).filter(|s| !s.is_empty());
    let language = subtags.next()?.to_ascii_lowercase();
    if !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let region = subtags
        .take_while(|s| s.len() > 1)
        .find(|s| {
            (s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic()))
                || (s.len() == 3 && s.chars().all(|c| c.is_ascii_digit()))
        })
        .map(str::to_ascii_uppercase);
    Some((language, region))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, FieldFormat, MainType, SubType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_pivot() {
        assert_eq!(expand_two_digit_year(0), 2000);
        assert_eq!(expand_two_digit_year(17), 2017);
        assert_eq!(expand_two_digit_year(89), 2089);
        assert_eq!(expand_two_digit_year(90), 1990);
        assert_eq!(expand_two_digit_year(99), 1999);
    }

    #[test]
    fn test_locale_styles() {
        let d = date(2017, 2, 25);
        assert_eq!(DateStyle::for_locale(None).format(d), "2017-02-25");
        assert_eq!(DateStyle::for_locale(Some("de-DE-u-co-phonebk")).format(d), "25.02.2017");
        assert_eq!(DateStyle::for_locale(Some("en-US")).format(d), "02/25/2017");
        assert_eq!(DateStyle::for_locale(Some("en")).format(d), "02/25/2017");
        assert_eq!(DateStyle::for_locale(Some("en_GB")).format(d), "25/02/2017");
        assert_eq!(DateStyle::for_locale(Some("nl-NL")).format(d), "25-02-2017");
        assert_eq!(DateStyle::for_locale(Some("zh-Hant-TW")).format(d), "2017/02/25");
        assert_eq!(DateStyle::for_locale(Some("hu")).format(d), "2017. 02. 25.");
        assert_eq!(DateStyle::for_locale(Some("sv-SE")).format(d), "2017-02-25");
        assert_eq!(DateStyle::for_locale(Some("")).format(d), "2017-02-25");
        assert_eq!(DateStyle::for_locale(Some("1234")).format(d), "2017-02-25");
    }

    #[test]
    fn test_split_locale() {
        assert_eq!(split_locale("de-DE-u-co-phonebk"), Some(("de".into(), Some("DE".into()))));
        assert_eq!(split_locale("es-419"), Some(("es".into(), Some("419".into()))));
        assert_eq!(split_locale("en-u-ca-gregory"), Some(("en".into(), None)));
        assert_eq!(split_locale("FR"), Some(("fr".into(), None)));
    }

    fn date_decoder() -> Decoder {
        let day = SubType::new("DPST-11-1", "date")
            .with_format(FieldFormat::reserved(3))
            .with_format(FieldFormat::unsigned(5).with_unit("Day of month"))
            .with_format(FieldFormat::reserved(4))
            .with_format(FieldFormat::unsigned(4).with_unit("Month"))
            .with_format(FieldFormat::reserved(1))
            .with_format(FieldFormat::unsigned(7).with_unit("Year"));
        Decoder::new(Catalog::new().with(MainType::new("DPT-11", "date", 24).with_subtype(day)))
    }

    #[test]
    fn test_date_in_previous_century() {
        let result = date_decoder()
            .convenience_decode(&[0x1F, 0x0C, 0x63], "DPST-11-1", Some("de-DE"))
            .unwrap();
        assert_eq!(result.value, Some(FieldValue::Text("31.12.1999".into())));
        assert_eq!(result.date, Some(date(1999, 12, 31)));
        assert_eq!(result.field_value(DATE_FIELD_YEAR), &FieldValue::Number(1999.0));
    }

    #[test]
    fn test_impossible_date_has_no_value() {
        let result = date_decoder()
            .convenience_decode(&[0x1F, 0x02, 0x11], "DPST-11-1", None)
            .unwrap();
        assert!(result.is_ok());
        assert!(result.value.is_none());
        assert!(result.date.is_none());
        assert_eq!(result.field_value(DATE_FIELD_YEAR), &FieldValue::Number(2017.0));
    }

    #[test]
    fn test_no_composition_after_error() {
        let result = date_decoder()
            .convenience_decode(&[0x19, 0x02], "DPST-11-1", None)
            .unwrap();
        assert!(result.err.is_some());
        assert!(result.value.is_none());
    }

    #[test]
    fn test_time_layout_without_time_fields() {
        let time = SubType::new("DPST-10-1", "time of day").with_format(FieldFormat::unsigned(24));
        let decoder = Decoder::new(Catalog::new().with(MainType::new("DPT-10", "time", 24).with_subtype(time)));
        let result = decoder
            .convenience_decode(&[0xD1, 0x37, 0x28], "DPST-10-1", None)
            .unwrap();
        assert!(result.is_ok());
        assert_eq!(result.fields.len(), 1);
        assert!(result.value.is_none());
    }

    #[test]
    fn test_absent_identifier() {
        assert!(date_decoder().convenience_decode(&[0x19, 0x02, 0x11], "", None).is_none());
    }
}
