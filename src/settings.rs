use crate::errors::{AppError, AppResult};
use crate::models::{CompletionRecord, PipelineSettings};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const TOKEN_ENV_VAR: &str = "SPRINT_CAPACITY_TOKEN";

pub fn load_settings(path: &Path) -> AppResult<PipelineSettings> {
    let mut settings: PipelineSettings = read_json(path)?;
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.trim().is_empty() {
            settings.access_token = token.trim().to_string();
        }
    }
    validate_settings(&settings)?;
    Ok(settings)
}

pub fn load_completions(path: &Path) -> AppResult<Vec<CompletionRecord>> {
    read_json(path)
}

pub fn validate_settings(settings: &PipelineSettings) -> AppResult<()> {
    let required = [
        ("organizationURL", settings.organization_url.as_str()),
        ("accessToken", settings.access_token.as_str()),
        ("project", settings.project.as_str()),
        ("team", settings.team.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Config(format!("{field} must not be empty")));
        }
    }
    if !settings.days_in_sprint.is_finite() || settings.days_in_sprint <= 0.0 {
        return Err(AppError::Config(format!(
            "daysInSprint must be a positive number, got {}",
            settings.days_in_sprint
        )));
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let raw = fs::read_to_string(path)
        .map_err(|err| AppError::Io(format!("failed to read {}: {}", path.display(), err)))?;
    serde_json::from_str(&raw).map_err(|err| AppError::Config(format!("failed to parse {}: {}", path.display(), err)))
}

#[cfg(test)]
mod tests {
    use super::{load_completions, load_settings, validate_settings};
    use crate::errors::AppError;
    use std::fs;

    #[test]
    fn loads_settings_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("arguments.json");
        fs::write(
            &path,
            r#"{"organizationURL": "https://dev.azure.com/acme", "accessToken": "pat",
                "project": "Platform", "team": "Core", "sprintStart": 60, "daysInSprint": 10}"#,
        )
        .expect("write");

        let settings = load_settings(&path).expect("settings");
        assert_eq!(settings.team, "Core");
        assert_eq!(settings.days_in_sprint, 10.0);
    }

    #[test]
    fn missing_file_is_io_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = load_completions(&dir.path().join("points_completed.json"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn malformed_completions_are_config_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("points_completed.json");
        fs::write(&path, r#"{"sprint": 1}"#).expect("write");
        assert!(matches!(load_completions(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn completions_keep_file_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("points_completed.json");
        fs::write(
            &path,
            r#"[{"sprint": 5, "completed": 30, "calculate": true},
                {"sprint": 5, "completed": 12, "calculate": true}]"#,
        )
        .expect("write");
        let records = load_completions(&path).expect("records");
        assert_eq!(records.iter().map(|r| r.completed).collect::<Vec<_>>(), vec![30, 12]);
    }

    #[test]
    fn rejects_blank_fields_and_bad_sprint_length() {
        let mut settings = serde_json::from_value::<crate::models::PipelineSettings>(serde_json::json!({
            "organizationURL": "https://dev.azure.com/acme",
            "accessToken": "pat",
            "project": "Platform",
            "team": " ",
            "sprintStart": 1
        }))
        .expect("settings");
        assert!(matches!(validate_settings(&settings), Err(AppError::Config(_))));

        settings.team = "Core".to_string();
        settings.days_in_sprint = 0.0;
        assert!(matches!(validate_settings(&settings), Err(AppError::Config(_))));

        settings.days_in_sprint = 14.0;
        assert!(validate_settings(&settings).is_ok());
    }
}
