use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use sprint_capacity_lib::models::ReportFormat;
use sprint_capacity_lib::{execute, init_tracing, report, RunOptions};

#[derive(Parser)]
#[command(name = "sprint-capacity", version, about = "Sprint capacity efficiency and forecast report")]
struct Cli {
    /// Run configuration (organization, token, project, team, sprint start)
    #[arg(long, default_value = "arguments.json")]
    config: PathBuf,
    /// Completed points per sprint
    #[arg(long, default_value = "points_completed.json")]
    points: PathBuf,
    /// SQLite file, recreated on every run
    #[arg(long, default_value = "data.sqlite")]
    database: PathBuf,
    /// Write JSON logs to a daily rolling file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = init_tracing(cli.log_dir.as_deref()) {
        eprintln!("failed to initialise logging: {error}");
        return ExitCode::FAILURE;
    }

    match try_main(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "run aborted");
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main(cli: Cli) -> anyhow::Result<()> {
    let options = RunOptions {
        config_path: cli.config,
        points_path: cli.points,
        database_path: cli.database,
    };
    let outcome = execute(&options).await.context("sprint capacity run failed")?;
    let rendered = report::render(cli.format, &outcome.rows, chrono::Utc::now()).context("failed to render report")?;
    print!("{rendered}");
    Ok(())
}
