//! Core value objects shared by the pipeline stages.
//!
//! All three derived entities are produced by pure transformations and none
//! retains a reference to its sources.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// Canonical place category a raw location code maps onto.
///
/// Only `ute` and `inne` have a special mapping; any other code passes
/// through lowercased as [`Location::Other`] and participates in grouping
/// and reports like the canonical ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Outdoor,
    Indoor,
    Other(String),
}

impl Location {
    /// Maps a raw location code from the input file (`ute`/`inne`,
    /// case-insensitive) onto its canonical category.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_lowercase();
        match code.as_str() {
            "ute" => Location::Outdoor,
            "inne" => Location::Indoor,
            _ => Location::Other(code),
        }
    }

    /// Maps a stored canonical label back onto a `Location`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "outdoor" => Location::Outdoor,
            "indoor" => Location::Indoor,
            _ => Location::Other(label),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Location::Outdoor => "outdoor",
            Location::Indoor => "indoor",
            Location::Other(code) => code,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One validated sensor reading. Only valid observations are constructed;
/// rejected rows become `RowError`s instead.
///
/// Measurements stay optional so that downstream averaging can skip a
/// missing field without discarding the whole row.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub taken_at: NaiveDateTime,
    pub location: Location,
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
}

/// Per-date, per-location means over valid observations, with the mold risk
/// attached when both means are present.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub location: Location,
    pub avg_temperature_c: Option<f64>,
    pub avg_humidity_percent: Option<f64>,
    pub mold_risk: Option<f64>,
}

/// Season-transition report for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonResult {
    pub location: Location,
    pub autumn_start: Option<NaiveDate>,
    pub winter_start: Option<NaiveDate>,
    pub message: String,
}
