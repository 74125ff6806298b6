use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::core::time::current_year;
use crate::schemas::grades::ProfessorSummary;
use crate::schemas::search::SearchQuery;
use crate::services::ranking::{self, Filters, SortKey, SortOrder};
use crate::services::resolver::{self, SearchError};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(search))
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<ProfessorSummary>>, ApiError> {
    params.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let result = run_search(&state, &params).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(SearchError::Validation(_)) => "validation",
        Err(SearchError::NoResults { .. }) => "no_results",
        Err(SearchError::Upstream(_)) | Err(SearchError::DepartmentsUnavailable) => "upstream",
    };
    metrics::counter!("search_requests_total", "outcome" => outcome).increment(1);

    let summaries = result?;
    Ok(Json(summaries))
}

async fn run_search(
    state: &AppState,
    params: &SearchQuery,
) -> Result<Vec<ProfessorSummary>, SearchError> {
    let departments =
        state.departments().await.ok_or(SearchError::DepartmentsUnavailable)?;

    let summaries = resolver::resolve(
        state.course_data(),
        state.ratings(),
        &departments,
        &params.department,
        &params.course_number,
    )
    .await?;

    let filters = Filters::from_query(params);
    let sort_key = SortKey::parse(params.sort_by.as_deref());
    let sort_order = SortOrder::parse(params.sort_order.as_deref());

    Ok(ranking::filter_and_sort(summaries, &filters, sort_key, sort_order, current_year()))
}
