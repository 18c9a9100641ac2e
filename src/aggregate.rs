//! Daily aggregation of stored observations.
//!
//! Grouping key is (calendar date, location); an aggregate never mixes
//! locations. Each mean skips observations where that particular field is
//! missing instead of discarding the whole row, and a group with zero
//! contributing values yields a null mean rather than zero.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::errors::PipelineError;
use crate::models::{DailyAggregate, Location, WeatherObservation};
use crate::mold;
use crate::store::ObservationStore;

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Groups observations by (date, location) and averages temperature and
/// humidity independently. Mold risk is attached immediately after
/// averaging, only when both means are present. Output is sorted ascending
/// by date (then location label), as the season detector requires.
pub fn aggregate_daily(observations: &[WeatherObservation]) -> Vec<DailyAggregate> {
    let mut groups: BTreeMap<(NaiveDate, String), (Location, Vec<f64>, Vec<f64>)> = BTreeMap::new();

    for obs in observations {
        let key = (obs.taken_at.date(), obs.location.label().to_string());
        let entry = groups
            .entry(key)
            .or_insert_with(|| (obs.location.clone(), Vec::new(), Vec::new()));
        if let Some(t) = obs.temperature_c {
            entry.1.push(t);
        }
        if let Some(h) = obs.humidity_percent {
            entry.2.push(h);
        }
    }

    groups
        .into_iter()
        .map(|((date, _), (location, temps, humidities))| {
            let avg_temperature_c = mean(&temps);
            let avg_humidity_percent = mean(&humidities);
            let mold_risk = match (avg_temperature_c, avg_humidity_percent) {
                (Some(t), Some(h)) => Some(mold::risk(t, h)),
                _ => None,
            };
            DailyAggregate {
                date,
                location,
                avg_temperature_c,
                avg_humidity_percent,
                mold_risk,
            }
        })
        .collect()
}

/// Daily aggregates for one location over an optional inclusive date range,
/// read back from the store.
pub async fn daily_aggregates<S: ObservationStore>(
    store: &S,
    location: &Location,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<DailyAggregate>, PipelineError> {
    let observations = store.query(location, range).await?;
    Ok(aggregate_daily(&observations))
}

/// The aggregate for a single target date, if any valid observation exists.
pub async fn aggregate_for_date<S: ObservationStore>(
    store: &S,
    location: &Location,
    date: NaiveDate,
) -> Result<Option<DailyAggregate>, PipelineError> {
    let aggregates = daily_aggregates(store, location, Some((date, date))).await?;
    Ok(aggregates.into_iter().next())
}
