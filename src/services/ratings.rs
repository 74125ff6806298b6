use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::core::config::Settings;
use crate::services::course_data::UpstreamError;

/// Optional client for a professor-ratings source supplying `difficulty`
/// and `wouldTakeAgain`. When the source is not configured the service
/// is absent and those fields never appear in summaries.
#[derive(Debug, Clone)]
pub(crate) struct RatingsService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfessorRating {
    #[serde(default)]
    pub(crate) difficulty: Option<f64>,
    #[serde(default)]
    pub(crate) would_take_again: Option<f64>,
}

#[derive(Deserialize)]
struct RatingsEnvelope {
    data: Vec<ProfessorRating>,
}

impl RatingsService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        let ratings = settings.ratings();
        if !ratings.is_enabled() {
            return Ok(None);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(ratings.timeout_seconds))
            .build()
            .context("Failed to build ratings HTTP client")?;

        Ok(Some(Self {
            client,
            base_url: ratings.base_url.trim_end_matches('/').to_string(),
            api_key: ratings.api_key.clone(),
        }))
    }

    /// Looks up one instructor by the display name the course-data
    /// source uses. An unknown instructor is `Ok(None)`, not an error.
    pub(crate) async fn lookup(
        &self,
        instructor: &str,
    ) -> Result<Option<ProfessorRating>, UpstreamError> {
        let endpoint = format!("{}/ratings", self.base_url);
        let mut request = self.client.get(&endpoint).query(&[("name", instructor)]);
        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                detail: "ratings lookup failed".to_string(),
            });
        }

        let envelope: RatingsEnvelope = response
            .json()
            .await
            .map_err(|err| UpstreamError::Decode(err.to_string()))?;
        Ok(envelope.data.into_iter().next())
    }
}
