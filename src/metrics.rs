//! Per-sprint arithmetic: completion lookup, days available, efficiency,
//! historical average and forecast.

use crate::models::{CompletionRecord, SprintRecord, POINTS_NOT_FOUND};

/// Ratio recorded for a sprint whose completion was never recorded.
pub const UNCALCULATED_RATIO: f64 = 0.5;

/// Points completed for `sprint_number`, taken from the first calculable
/// record in input order. `None` means no such record exists, which is not
/// the same as a recorded zero. A recorded `-1` reads as not found, since
/// that value is reserved in the store.
pub fn find_points_completed(sprint_number: i64, records: &[CompletionRecord]) -> Option<i64> {
    records
        .iter()
        .find(|record| record.calculate && record.sprint_number == sprint_number)
        .map(|record| record.completed)
        .filter(|completed| *completed != POINTS_NOT_FOUND)
}

/// Days available are not clamped; heavy days off can drive this negative.
pub fn days_available(capacity_per_day_total: f64, days_off_total: i64, days_in_sprint: f64) -> f64 {
    capacity_per_day_total * days_in_sprint - days_off_total as f64
}

/// Efficiency of a sprint against its truncated days available.
///
/// Zero truncated days wins over a missing completion value.
pub fn efficiency_ratio(points_completed: Option<i64>, days_available: f64) -> f64 {
    let whole_days = days_available.trunc() as i64;
    if whole_days == 0 {
        return 0.0;
    }
    match points_completed {
        None => UNCALCULATED_RATIO,
        Some(points) => points as f64 / whole_days as f64,
    }
}

/// Mean efficiency over every row whose points completed is not a literal
/// zero. Rows with no recorded completion take part with their placeholder
/// ratio. Returns `None` when no row qualifies.
pub fn historical_average(rows: &[SprintRecord]) -> Option<f64> {
    let (sum, count) = rows
        .iter()
        .filter(|row| row.points_completed != Some(0))
        .fold((0.0_f64, 0usize), |(sum, count), row| {
            (sum + row.efficiency_ratio, count + 1)
        });
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Forecast for a sprint that recorded zero completed points and has
/// positive days available. Rounds half away from zero.
pub fn forecast(days_available: f64, points_completed: Option<i64>, avg_efficiency_ratio: Option<f64>) -> Option<i64> {
    if points_completed != Some(0) || days_available <= 0.0 {
        return None;
    }
    let average = avg_efficiency_ratio?;
    Some((days_available * average).round() as i64)
}
