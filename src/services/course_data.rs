use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::config::Settings;
use crate::schemas::department::{Department, DepartmentListResponse};
use crate::schemas::grades::{ProfessorSummary, RawGradeRecord};

#[derive(Debug, Error)]
pub(crate) enum UpstreamError {
    #[error("course data request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("course data service returned status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("could not decode course data response: {0}")]
    Decode(String),
}

/// HTTP client for the external department-list and grade-distribution
/// endpoints. A failed call surfaces immediately; the search path never
/// retries.
#[derive(Debug, Clone)]
pub(crate) struct CourseDataClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// A course entry from the raw upstream shape: one course with its
/// nested per-instructor, per-term grade records.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseEntry {
    pub(crate) course_number: String,
    #[serde(default, alias = "grades")]
    pub(crate) records: Vec<RawGradeRecord>,
}

/// The two payload shapes the integration boundary tolerates. Raw
/// entries go through the local aggregation pipeline; a source that
/// pre-aggregates hands back summaries directly.
#[derive(Debug)]
pub(crate) enum UpstreamSearch {
    Raw(Vec<CourseEntry>),
    Aggregated(Vec<ProfessorSummary>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchEnvelope {
    Raw { data: Vec<CourseEntry> },
    Aggregated { data: Vec<ProfessorSummary> },
}

impl CourseDataClient {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let course_data = settings.course_data();
        Self::new(
            &course_data.base_url,
            course_data.api_key.clone(),
            Duration::from_secs(course_data.timeout_seconds),
            Duration::from_secs(course_data.connect_timeout_seconds),
        )
    }

    pub(crate) fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .context("Failed to build course data HTTP client")?;

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string(), api_key })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn fetch_departments(&self) -> Result<Vec<Department>, UpstreamError> {
        let endpoint = format!("{}/departments", self.base_url);
        let payload = self.get_json(&endpoint, &[]).await?;
        let decoded: DepartmentListResponse = serde_json::from_value(payload)
            .map_err(|err| UpstreamError::Decode(err.to_string()))?;
        Ok(decoded.data)
    }

    pub(crate) async fn fetch_course_grades(
        &self,
        department: &str,
        course_number: &str,
    ) -> Result<UpstreamSearch, UpstreamError> {
        let endpoint = format!("{}/grades", self.base_url);
        let payload = self
            .get_json(&endpoint, &[("department", department), ("courseNumber", course_number)])
            .await?;
        let decoded: SearchEnvelope =
            serde_json::from_value(payload).map_err(|err| UpstreamError::Decode(err.to_string()))?;

        Ok(match decoded {
            SearchEnvelope::Raw { data } => UpstreamSearch::Raw(data),
            SearchEnvelope::Aggregated { data } => UpstreamSearch::Aggregated(data),
        })
    }

    async fn get_json(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, UpstreamError> {
        let mut request = self.client.get(endpoint);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let raw_body = response.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                detail: extract_error_message(&raw_body),
            });
        }

        serde_json::from_str(&raw_body)
            .map_err(|err| UpstreamError::Decode(format!("non-JSON body: {err}")))
    }
}

fn extract_error_message(raw_body: &str) -> String {
    let Ok(payload) = serde_json::from_str::<Value>(raw_body) else {
        let trimmed = raw_body.trim();
        return if trimmed.is_empty() { "unknown_error".to_string() } else { trimmed.to_string() };
    };

    payload
        .get("detail")
        .and_then(Value::as_str)
        .or_else(|| payload.get("message").and_then(Value::as_str))
        .or_else(|| payload.get("error").and_then(Value::as_str))
        .unwrap_or("unknown_error")
        .to_string()
}
