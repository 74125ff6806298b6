use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::schemas::department::DepartmentListResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_departments))
}

/// Serves the directory loaded at startup. When that load failed, each
/// call re-attempts the upstream fetch so a recovered upstream re-enables
/// search without a restart.
async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<DepartmentListResponse>, ApiError> {
    if let Some(departments) = state.departments().await {
        return Ok(Json(DepartmentListResponse { data: departments }));
    }

    match state.course_data().fetch_departments().await {
        Ok(departments) => {
            tracing::info!(count = departments.len(), "Department directory refreshed");
            state.replace_departments(departments.clone()).await;
            Ok(Json(DepartmentListResponse { data: departments }))
        }
        Err(err) => {
            tracing::warn!(error = %err, "Department directory refresh failed");
            Err(ApiError::BadGateway("Department directory is unavailable".to_string()))
        }
    }
}
