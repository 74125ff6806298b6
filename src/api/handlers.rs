use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::collections::HashMap;

use crate::core::metrics;
use crate::core::state::AppState;
use crate::schemas::{HealthResponse, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let response = RootResponse {
        message: state.settings().api().project_name.clone(),
        version: state.settings().api().version.clone(),
    };

    Json(response)
}

pub(crate) async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut status = "healthy".to_string();
    let mut components = HashMap::new();

    match state.departments().await {
        Some(departments) => {
            components
                .insert("departments".to_string(), format!("loaded ({})", departments.len()));
        }
        None => {
            components.insert("departments".to_string(), "unavailable".to_string());
            status = "degraded".to_string();
        }
    }

    components.insert(
        "course_data".to_string(),
        state.course_data().base_url().to_string(),
    );
    components.insert(
        "ratings".to_string(),
        if state.ratings().is_some() { "enabled" } else { "disabled" }.to_string(),
    );

    Json(HealthResponse { service: "profmatch-api".to_string(), status, components })
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
