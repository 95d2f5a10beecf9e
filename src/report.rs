use crate::errors::{AppError, AppResult};
use crate::models::{ReportFormat, SprintRecord, POINTS_NOT_FOUND};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write as _;

const NULL_MARKER: &str = "NULL";

pub fn render(format: ReportFormat, rows: &[SprintRecord], generated_at: DateTime<Utc>) -> AppResult<String> {
    match format {
        ReportFormat::Text => Ok(render_text(rows, generated_at)),
        ReportFormat::Json => serde_json::to_string_pretty(rows).map_err(|err| AppError::Internal(err.to_string())),
    }
}

pub fn render_text(rows: &[SprintRecord], generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Sprint capacity report ({} rows, generated {})",
        rows.len(),
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(out);

    for row in rows {
        let _ = writeln!(out, "ID: {}", row.id);
        let _ = writeln!(out, "Sprint: {}", row.sprint_number);
        let _ = writeln!(out, "Name: {}", row.name);
        let _ = writeln!(out, "Days Available: {:.6}", row.days_available);
        let _ = writeln!(out, "Capacity Per Day: {:.6}", row.capacity_per_day);
        let _ = writeln!(out, "Days Off: {}", row.days_off);
        let _ = writeln!(
            out,
            "Points Completed: {}",
            row.points_completed.unwrap_or(POINTS_NOT_FOUND)
        );
        let _ = writeln!(out, "Points Completed vs Days Available: {:.6}", row.efficiency_ratio);
        let _ = writeln!(
            out,
            "Avg Completed vs Capacity: {}",
            row.avg_efficiency_ratio
                .map(|value| format!("{value:.6}"))
                .unwrap_or_else(|| NULL_MARKER.to_string())
        );
        let _ = writeln!(
            out,
            "Forecasted: {}",
            row.forecasted_completed
                .map(|value| value.to_string())
                .unwrap_or_else(|| NULL_MARKER.to_string())
        );
        let _ = writeln!(out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{render, render_text};
    use crate::models::{ReportFormat, SprintRecord};
    use chrono::{TimeZone, Utc};

    fn row(points_completed: Option<i64>, forecasted_completed: Option<i64>) -> SprintRecord {
        SprintRecord {
            id: 3,
            name: "Sprint 67".to_string(),
            sprint_number: 67,
            days_available: 68.0,
            capacity_per_day: 5.0,
            days_off: 2,
            points_completed,
            efficiency_ratio: 0.5,
            avg_efficiency_ratio: Some(0.8),
            forecasted_completed,
        }
    }

    #[test]
    fn text_report_marks_missing_forecast() {
        let generated_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let text = render_text(&[row(None, None)], generated_at);
        assert!(text.starts_with("Sprint capacity report (1 rows, generated 2024-05-01T12:00:00Z)"));
        assert!(text.contains("ID: 3\nSprint: 67\nName: Sprint 67\n"));
        assert!(text.contains("Days Available: 68.000000"));
        assert!(text.contains("Points Completed: -1"));
        assert!(text.contains("Avg Completed vs Capacity: 0.800000"));
        assert!(text.contains("Forecasted: NULL"));
    }

    #[test]
    fn text_report_prints_forecast_value() {
        let text = render_text(&[row(Some(0), Some(54))], Utc::now());
        assert!(text.contains("Points Completed: 0"));
        assert!(text.contains("Forecasted: 54"));
    }

    #[test]
    fn json_report_uses_nulls_and_sentinel() {
        let json = render(ReportFormat::Json, &[row(None, None)], Utc::now()).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value[0]["pointsCompleted"], -1);
        assert!(value[0]["forecastedCompleted"].is_null());
        assert_eq!(value[0]["avgEfficiencyRatio"], 0.8);
    }
}
