//! Season-transition detection over chronologically ordered daily aggregates.
//!
//! Strict sliding-window policy: the detector reports the first date of the
//! earliest uninterrupted run of cold-enough days, or nothing at all. The
//! input must already be sorted ascending by date; `aggregate_daily`
//! guarantees that ordering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DailyAggregate, Location, SeasonResult};

/// Threshold/run-length pair for one season boundary.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct SeasonRule {
    pub threshold_c: f64,
    pub run_days: usize,
}

impl SeasonRule {
    pub fn autumn_default() -> Self {
        Self {
            threshold_c: 10.0,
            run_days: 5,
        }
    }

    pub fn winter_default() -> Self {
        Self {
            threshold_c: 0.0,
            run_days: 5,
        }
    }
}

/// Finds the first date of the earliest window of `run_days` consecutive
/// aggregates whose mean temperature is present and strictly below the
/// threshold.
///
/// A missing or warm day disqualifies the current start index only; the
/// scan resumes at the very next index, so overlapping candidate windows
/// are all examined. Returns `None` when no qualifying run exists.
pub fn detect_transition(aggregates: &[DailyAggregate], rule: &SeasonRule) -> Option<NaiveDate> {
    if rule.run_days == 0 || aggregates.len() < rule.run_days {
        return None;
    }
    for start in 0..=aggregates.len() - rule.run_days {
        let window = &aggregates[start..start + rule.run_days];
        let qualifies = window
            .iter()
            .all(|agg| matches!(agg.avg_temperature_c, Some(t) if t < rule.threshold_c));
        if qualifies {
            return Some(aggregates[start].date);
        }
    }
    None
}

/// Runs the detector once per season rule and summarizes the date coverage
/// of the input. The two results are independent; winter is not required to
/// follow autumn.
pub fn season_report(
    location: &Location,
    aggregates: &[DailyAggregate],
    autumn: &SeasonRule,
    winter: &SeasonRule,
) -> SeasonResult {
    let message = match (aggregates.first(), aggregates.last()) {
        (Some(first), Some(last)) => format!(
            "{}: {} daily aggregates from {} to {}",
            location,
            aggregates.len(),
            first.date,
            last.date
        ),
        _ => format!("{location}: no daily aggregates available"),
    };
    SeasonResult {
        location: location.clone(),
        autumn_start: detect_transition(aggregates, autumn),
        winter_start: detect_transition(aggregates, winter),
        message,
    }
}
