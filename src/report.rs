//! Ordered top-N views of daily aggregates for the display collaborator.

use crate::models::DailyAggregate;

/// Each report is capped at this many entries.
pub const TOP_N: usize = 10;

fn top_by<F>(aggregates: &[DailyAggregate], key: F) -> Vec<DailyAggregate>
where
    F: Fn(&DailyAggregate) -> Option<f64>,
{
    let mut ranked: Vec<(f64, DailyAggregate)> = aggregates
        .iter()
        .filter_map(|agg| key(agg).map(|value| (value, agg.clone())))
        .collect();
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(TOP_N);
    ranked.into_iter().map(|(_, agg)| agg).collect()
}

/// Aggregates ordered by mean temperature, warmest first.
pub fn warmest_days(aggregates: &[DailyAggregate]) -> Vec<DailyAggregate> {
    top_by(aggregates, |agg| agg.avg_temperature_c)
}

/// Aggregates ordered by mean humidity, most humid first.
pub fn most_humid_days(aggregates: &[DailyAggregate]) -> Vec<DailyAggregate> {
    top_by(aggregates, |agg| agg.avg_humidity_percent)
}

/// Aggregates ordered by mold risk, highest first.
pub fn highest_mold_risk_days(aggregates: &[DailyAggregate]) -> Vec<DailyAggregate> {
    top_by(aggregates, |agg| agg.mold_risk)
}
