use serde::{Deserialize, Serialize};

pub const DEFAULT_DAYS_IN_SPRINT: f64 = 14.0;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_API_VERSION: &str = "7.0";

/// Value persisted in `points_completed` when no calculable record exists.
pub const POINTS_NOT_FOUND: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSettings {
    #[serde(rename = "organizationURL", alias = "orgURL")]
    pub organization_url: String,
    #[serde(alias = "token")]
    pub access_token: String,
    pub project: String,
    pub team: String,
    pub sprint_start: i64,
    #[serde(default = "default_days_in_sprint")]
    pub days_in_sprint: f64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_days_in_sprint() -> f64 {
    DEFAULT_DAYS_IN_SPRINT
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

/// A manually maintained "points completed" entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    #[serde(rename = "sprint", alias = "sprintNumber")]
    pub sprint_number: i64,
    pub completed: i64,
    #[serde(default)]
    pub calculate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iteration {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacitySnapshot {
    pub capacity_per_day_total: f64,
    pub days_off_total: i64,
}

/// Row produced by ingestion, before the aggregation and forecast passes.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSprintRecord {
    pub name: String,
    pub sprint_number: i64,
    pub days_available: f64,
    pub capacity_per_day: f64,
    pub days_off: i64,
    pub points_completed: Option<i64>,
    pub efficiency_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintRecord {
    pub id: i64,
    pub name: String,
    pub sprint_number: i64,
    pub days_available: f64,
    pub capacity_per_day: f64,
    pub days_off: i64,
    #[serde(serialize_with = "serialize_points")]
    pub points_completed: Option<i64>,
    pub efficiency_ratio: f64,
    pub avg_efficiency_ratio: Option<f64>,
    pub forecasted_completed: Option<i64>,
}

fn serialize_points<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i64(value.unwrap_or(POINTS_NOT_FOUND))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub iterations_seen: usize,
    pub rows_inserted: usize,
    pub skipped_unlabeled: usize,
    pub skipped_before_start: usize,
    pub capacity_failures: usize,
    pub rows_forecasted: usize,
    pub avg_efficiency_ratio: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}
