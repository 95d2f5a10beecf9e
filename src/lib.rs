pub mod db;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod redaction;
pub mod report;
pub mod settings;
pub mod sprint;
pub mod tracker;

use crate::db::SprintStore;
use crate::errors::{AppError, AppResult};
use crate::models::{RunSummary, SprintRecord};
use crate::tracker::AzureDevOpsClient;
use std::path::{Path, PathBuf};
use tracing::Instrument;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: PathBuf,
    pub points_path: PathBuf,
    pub database_path: PathBuf,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub rows: Vec<SprintRecord>,
}

/// Loads inputs, rebuilds the store from scratch and runs every pass.
///
/// Any error returned here is a setup or persistence failure; per-iteration
/// problems are logged inside the pipeline and reflected in the summary.
pub async fn execute(options: &RunOptions) -> AppResult<RunOutcome> {
    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("run", run_id = %run_id);

    async {
        let completions = settings::load_completions(&options.points_path)?;
        let settings = settings::load_settings(&options.config_path)?;
        tracing::info!(
            project = %settings.project,
            team = %settings.team,
            sprint_start = settings.sprint_start,
            days_in_sprint = settings.days_in_sprint,
            completion_records = completions.len(),
            "configuration loaded"
        );

        let store = SprintStore::create_fresh(&options.database_path)?;
        tracing::info!(database = ?store.path(), "sprint store recreated");
        let client = AzureDevOpsClient::from_settings(&settings)?;

        let summary = pipeline::run_pipeline(&client, &store, &settings, &completions).await?;
        let rows = store.read_all()?;
        tracing::info!(
            iterations_seen = summary.iterations_seen,
            rows_inserted = summary.rows_inserted,
            skipped_unlabeled = summary.skipped_unlabeled,
            skipped_before_start = summary.skipped_before_start,
            capacity_failures = summary.capacity_failures,
            "run complete"
        );
        Ok::<_, AppError>(RunOutcome { summary, rows })
    }
    .instrument(span)
    .await
}

/// Sends logs to a daily rolling JSON file when `log_dir` is set, and to
/// stderr otherwise.
pub fn init_tracing(log_dir: Option<&Path>) -> AppResult<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let file_appender = tracing_appender::rolling::daily(log_dir, "sprint-capacity.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let _ = LOG_GUARD.set(guard);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .json()
                .with_writer(non_blocking)
                .try_init()
                .map_err(|error| AppError::Internal(error.to_string()))
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|error| AppError::Internal(error.to_string())),
    }
}
