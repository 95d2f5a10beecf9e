//! Ingestion, aggregation and forecasting over one fresh store.
//!
//! Ingestion fetches capacity one iteration at a time and inserts a row per
//! labelled sprint. Fetch and label failures skip the iteration; store
//! failures abort the run. Once ingestion is done, the average pass commits
//! before the forecast pass reads a single row.

use crate::db::SprintStore;
use crate::errors::AppResult;
use crate::metrics::{days_available, efficiency_ratio, find_points_completed, forecast, historical_average};
use crate::models::{CapacitySnapshot, CompletionRecord, NewSprintRecord, PipelineSettings, RunSummary};
use crate::sprint::extract_sprint_number;
use crate::tracker::IterationSource;

pub async fn run_pipeline<S>(
    source: &S,
    store: &SprintStore,
    settings: &PipelineSettings,
    completions: &[CompletionRecord],
) -> AppResult<RunSummary>
where
    S: IterationSource + ?Sized,
{
    let mut summary = RunSummary::default();
    let iterations = source.list_iterations().await?;
    summary.iterations_seen = iterations.len();

    for iteration in iterations {
        let sprint_number = match extract_sprint_number(iteration.name.as_deref()) {
            Ok(number) => number,
            Err(error) => {
                tracing::warn!(
                    iteration_id = %iteration.id,
                    iteration_name = iteration.name.as_deref().unwrap_or_default(),
                    error = %error,
                    "skipping iteration without sprint number"
                );
                summary.skipped_unlabeled += 1;
                continue;
            }
        };

        if sprint_number < settings.sprint_start {
            tracing::debug!(sprint_number, sprint_start = settings.sprint_start, "sprint before start, skipping");
            summary.skipped_before_start += 1;
            continue;
        }

        tracing::info!(sprint_number, "working on sprint");
        let capacity = match source.fetch_capacity(&iteration.id).await {
            Ok(capacity) => capacity,
            Err(error) => {
                tracing::warn!(
                    iteration_id = %iteration.id,
                    sprint_number,
                    error = %error,
                    "capacity fetch failed, skipping iteration"
                );
                summary.capacity_failures += 1;
                continue;
            }
        };

        let name = iteration.name.unwrap_or_default();
        let record = build_record(name, sprint_number, capacity, settings.days_in_sprint, completions);
        let id = store.insert(&record)?;
        tracing::debug!(id, sprint_number, efficiency_ratio = record.efficiency_ratio, "sprint row stored");
        summary.rows_inserted += 1;
    }

    let rows = store.read_all()?;
    let average = historical_average(&rows);
    store.update_average(average)?;
    tracing::info!(avg_efficiency_ratio = ?average, rows = rows.len(), "average efficiency written");
    summary.avg_efficiency_ratio = average;

    summary.rows_forecasted = store.apply_forecasts(|row| {
        let forecasted = forecast(row.days_available, row.points_completed, row.avg_efficiency_ratio);
        tracing::debug!(id = row.id, forecasted = ?forecasted, "forecast computed");
        forecasted
    })?;
    tracing::info!(rows_forecasted = summary.rows_forecasted, "forecast pass committed");

    Ok(summary)
}

pub fn build_record(
    name: String,
    sprint_number: i64,
    capacity: CapacitySnapshot,
    days_in_sprint: f64,
    completions: &[CompletionRecord],
) -> NewSprintRecord {
    let days_available = days_available(capacity.capacity_per_day_total, capacity.days_off_total, days_in_sprint);
    let points_completed = find_points_completed(sprint_number, completions);
    NewSprintRecord {
        name,
        sprint_number,
        days_available,
        capacity_per_day: capacity.capacity_per_day_total,
        days_off: capacity.days_off_total,
        points_completed,
        efficiency_ratio: efficiency_ratio(points_completed, days_available),
    }
}

#[cfg(test)]
mod tests {
    use super::build_record;
    use crate::models::{CapacitySnapshot, CompletionRecord};

    #[test]
    fn build_record_combines_capacity_and_completion() {
        let capacity = CapacitySnapshot {
            capacity_per_day_total: 5.0,
            days_off_total: 2,
        };
        let completions = vec![CompletionRecord {
            sprint_number: 67,
            completed: 34,
            calculate: true,
        }];

        let record = build_record("Sprint 67".to_string(), 67, capacity, 14.0, &completions);
        assert_eq!(record.days_available, 68.0);
        assert_eq!(record.capacity_per_day, 5.0);
        assert_eq!(record.days_off, 2);
        assert_eq!(record.points_completed, Some(34));
        assert_eq!(record.efficiency_ratio, 0.5);
    }
}
