//! Row-level parsing and validation.
//!
//! One raw delimited record in, one tagged outcome out: a valid
//! [`WeatherObservation`] or a [`RowError`] naming the line and the fault.
//! Every failure mode is recovered into the error value; nothing here can
//! fail the batch.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::StringRecord;

use crate::errors::{RowError, RowErrorKind};
use crate::models::{Location, WeatherObservation};
use crate::normalize::normalize_numeric;

pub const EXPECTED_FIELDS: usize = 4;
pub const TEMPERATURE_RANGE_C: (f64, f64) = (-50.0, 50.0);
pub const HUMIDITY_RANGE_PERCENT: (f64, f64) = (0.0, 100.0);

/// Accepted timestamp layouts: 24-hour clock, optional seconds, and either
/// ISO or day-before-month date ordering. No timezone shift is applied.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Date-only layouts; time-of-day defaults to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"];

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

fn parse_measurement(raw: &str, field: &'static str, line: usize) -> Result<f64, RowError> {
    let trimmed = raw.trim();
    let normalized = normalize_numeric(trimmed);
    match normalized.parse::<f64>() {
        Ok(value) => Ok(value),
        Err(_) => Err(RowError::new(
            line,
            RowErrorKind::InvalidNumericField {
                field,
                original: trimmed.to_string(),
                normalized,
            },
        )),
    }
}

fn check_range(
    value: f64,
    (min, max): (f64, f64),
    field: &'static str,
    line: usize,
) -> Result<(), RowError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(RowError::new(
            line,
            RowErrorKind::OutOfRangeValue {
                field,
                value,
                min,
                max,
            },
        ))
    }
}

/// Validates one data record (`line` is the 1-based line number including
/// the header). Fields beyond the fourth are ignored.
pub fn parse_record(record: &StringRecord, line: usize) -> Result<WeatherObservation, RowError> {
    if record.len() < EXPECTED_FIELDS {
        return Err(RowError::new(
            line,
            RowErrorKind::MalformedRow {
                expected: EXPECTED_FIELDS,
                found: record.len(),
            },
        ));
    }

    let raw_timestamp = record.get(0).unwrap_or("").trim();
    let taken_at = parse_timestamp(raw_timestamp).ok_or_else(|| {
        RowError::new(
            line,
            RowErrorKind::InvalidTimestamp {
                value: raw_timestamp.to_string(),
            },
        )
    })?;

    let location = Location::from_code(record.get(1).unwrap_or(""));

    let temperature = parse_measurement(record.get(2).unwrap_or(""), "temperature", line)?;
    let humidity = parse_measurement(record.get(3).unwrap_or(""), "humidity", line)?;
    check_range(temperature, TEMPERATURE_RANGE_C, "temperature", line)?;
    check_range(humidity, HUMIDITY_RANGE_PERCENT, "humidity", line)?;

    Ok(WeatherObservation {
        taken_at,
        location,
        temperature_c: Some(temperature),
        humidity_percent: Some(humidity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn valid_row_with_period_separator() {
        let obs = parse_record(&record(&["2024-01-15 10:30", "ute", "20.5", "75"]), 2).unwrap();
        assert_eq!(obs.location, Location::Outdoor);
        assert_eq!(obs.temperature_c, Some(20.5));
        assert_eq!(obs.humidity_percent, Some(75.0));
        assert_eq!(
            obs.taken_at.date(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn valid_row_with_comma_separator_and_unicode_minus() {
        let obs = parse_record(&record(&["15/01/2024 08:00", "inne", "20,5", "75,5"]), 3).unwrap();
        assert_eq!(obs.location, Location::Indoor);
        assert_eq!(obs.temperature_c, Some(20.5));
        assert_eq!(obs.humidity_percent, Some(75.5));

        let obs = parse_record(&record(&["2024-01-15", "ute", "−7,5", "60"]), 4).unwrap();
        assert_eq!(obs.temperature_c, Some(-7.5));
    }

    #[test]
    fn date_only_timestamp_defaults_to_midnight() {
        let obs = parse_record(&record(&["2024-01-15", "ute", "20", "75"]), 2).unwrap();
        assert_eq!(obs.taken_at.time(), NaiveTime::MIN);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let obs = parse_record(&record(&["2024-01-15", "ute", "20", "5", "75"]), 2).unwrap();
        assert_eq!(obs.temperature_c, Some(20.0));
        assert_eq!(obs.humidity_percent, Some(5.0));
    }

    #[test]
    fn too_few_fields_is_malformed() {
        let err = parse_record(&record(&["2024-01-15", "ute", "20"]), 7).unwrap_err();
        assert_eq!(err.line, 7);
        assert_eq!(
            err.kind,
            RowErrorKind::MalformedRow {
                expected: 4,
                found: 3
            }
        );
    }

    #[test]
    fn unparseable_timestamp_is_rejected() {
        let err = parse_record(&record(&["15th of March", "ute", "20", "75"]), 2).unwrap_err();
        assert!(matches!(
            err.kind,
            RowErrorKind::InvalidTimestamp { ref value } if value == "15th of March"
        ));
    }

    #[test]
    fn non_numeric_measurement_is_rejected_with_both_texts() {
        let err = parse_record(&record(&["2024-01-15", "inne", "abc", "60"]), 2).unwrap_err();
        match err.kind {
            RowErrorKind::InvalidNumericField {
                field,
                original,
                normalized,
            } => {
                assert_eq!(field, "temperature");
                assert_eq!(original, "abc");
                assert_eq!(normalized, "abc");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let err = parse_record(&record(&["2024-01-15", "ute", "-60", "50"]), 2).unwrap_err();
        assert!(matches!(
            err.kind,
            RowErrorKind::OutOfRangeValue { field: "temperature", value, .. } if value == -60.0
        ));
    }

    #[test]
    fn out_of_range_humidity_is_rejected() {
        let err = parse_record(&record(&["2024-01-15", "ute", "20", "101"]), 2).unwrap_err();
        assert!(matches!(
            err.kind,
            RowErrorKind::OutOfRangeValue { field: "humidity", .. }
        ));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(parse_record(&record(&["2024-01-15", "ute", "-50", "0"]), 2).is_ok());
        assert!(parse_record(&record(&["2024-01-15", "ute", "50", "100"]), 2).is_ok());
    }

    #[test]
    fn unknown_location_code_passes_through() {
        let obs = parse_record(&record(&["2024-01-15", "Garage", "20", "75"]), 2).unwrap();
        assert_eq!(obs.location, Location::Other("garage".to_string()));
    }
}
