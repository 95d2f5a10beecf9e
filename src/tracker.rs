//! Azure DevOps work-tracking client for team iterations and their capacity.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Url;
use serde::Deserialize;

use crate::errors::{AppError, AppResult};
use crate::models::{CapacitySnapshot, Iteration, PipelineSettings};
use crate::redaction::Redactor;

/// Maximum number of response body bytes kept in an error message.
const MAX_ERROR_BODY_LEN: usize = 2_048;

/// Source of iteration metadata and per-iteration capacity for one team.
#[async_trait]
pub trait IterationSource: Send + Sync {
    async fn list_iterations(&self) -> AppResult<Vec<Iteration>>;
    async fn fetch_capacity(&self, iteration_id: &str) -> AppResult<CapacitySnapshot>;
}

#[derive(Debug, Clone)]
pub struct AzureDevOpsClient {
    client: reqwest::Client,
    base_url: Url,
    project: String,
    team: String,
    api_version: String,
    redactor: Redactor,
}

impl AzureDevOpsClient {
    pub fn from_settings(settings: &PipelineSettings) -> AppResult<Self> {
        let base_url = Url::parse(settings.organization_url.trim_end_matches('/'))
            .map_err(|err| AppError::Config(format!("invalid organization URL: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "organization URL cannot be used as a base: {}",
                settings.organization_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut auth_value = HeaderValue::from_str(&auth_header(&settings.access_token))
            .map_err(|_| AppError::Config("invalid access token format".to_string()))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|err| AppError::Config(format!("failed to create HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url,
            project: settings.project.clone(),
            team: settings.team.clone(),
            api_version: settings.api_version.clone(),
            redactor: Redactor::new([settings.access_token.clone()]),
        })
    }

    fn iterations_url(&self) -> AppResult<Url> {
        self.api_url(&[
            self.project.as_str(),
            self.team.as_str(),
            "_apis",
            "work",
            "teamsettings",
            "iterations",
        ])
    }

    fn capacity_url(&self, iteration_id: &str) -> AppResult<Url> {
        self.api_url(&[
            self.project.as_str(),
            "_apis",
            "work",
            "iterations",
            iteration_id,
            "iterationcapacities",
        ])
    }

    fn api_url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("organization URL cannot be used as a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn get_json<T>(&self, url: Url) -> AppResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = truncate(&self.redactor.redact(&body), MAX_ERROR_BODY_LEN);
            return Err(AppError::Http(format!(
                "unexpected status {} from {}: {}",
                status.as_u16(),
                url.path(),
                body
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::Http(format!("invalid response from {}: {err}", url.path())))
    }
}

#[async_trait]
impl IterationSource for AzureDevOpsClient {
    async fn list_iterations(&self) -> AppResult<Vec<Iteration>> {
        let url = self.iterations_url()?;
        let payload: IterationsResponse = self.get_json(url).await?;
        Ok(payload
            .value
            .into_iter()
            .map(|item| Iteration {
                id: item.id,
                name: item.name,
            })
            .collect())
    }

    async fn fetch_capacity(&self, iteration_id: &str) -> AppResult<CapacitySnapshot> {
        let url = self.capacity_url(iteration_id)?;
        let payload: CapacityResponse = self.get_json(url).await?;
        Ok(CapacitySnapshot {
            capacity_per_day_total: payload.total_iteration_capacity_per_day,
            days_off_total: payload.total_iteration_days_off,
        })
    }
}

/// Personal access tokens travel as basic auth with an empty user name.
pub fn auth_header(access_token: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{access_token}"));
    format!("Basic {encoded}")
}

fn truncate(input: &str, max_len: usize) -> String {
    if input.len() <= max_len {
        return input.to_string();
    }
    let mut end = max_len;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &input[..end])
}

#[derive(Deserialize)]
struct IterationsResponse {
    #[serde(default)]
    value: Vec<IterationItem>,
}

#[derive(Deserialize)]
struct IterationItem {
    id: String,
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CapacityResponse {
    #[serde(default)]
    total_iteration_capacity_per_day: f64,
    #[serde(default)]
    total_iteration_days_off: i64,
}

#[cfg(test)]
mod tests {
    use super::{auth_header, truncate, AzureDevOpsClient};
    use crate::models::PipelineSettings;

    fn settings(org: &str) -> PipelineSettings {
        PipelineSettings {
            organization_url: org.to_string(),
            access_token: "pat".to_string(),
            project: "Platform".to_string(),
            team: "Platform Team".to_string(),
            sprint_start: 1,
            days_in_sprint: 14.0,
            request_timeout_secs: 5,
            api_version: "7.0".to_string(),
        }
    }

    #[test]
    fn auth_header_encodes_empty_user() {
        assert_eq!(auth_header("pat"), "Basic OnBhdA==");
    }

    #[test]
    fn builds_iteration_and_capacity_urls() {
        let client = AzureDevOpsClient::from_settings(&settings("https://dev.azure.com/acme/")).expect("client");
        assert_eq!(
            client.iterations_url().expect("url").as_str(),
            "https://dev.azure.com/acme/Platform/Platform%20Team/_apis/work/teamsettings/iterations?api-version=7.0"
        );
        assert_eq!(
            client.capacity_url("abc-123").expect("url").as_str(),
            "https://dev.azure.com/acme/Platform/_apis/work/iterations/abc-123/iterationcapacities?api-version=7.0"
        );
    }

    #[test]
    fn rejects_unparseable_organization_url() {
        let result = AzureDevOpsClient::from_settings(&settings("not a url"));
        assert!(result.is_err());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééé", 3), "é...");
    }
}
