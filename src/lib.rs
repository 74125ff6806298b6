pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::services::course_data::CourseDataClient;
use crate::services::ratings::RatingsService;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let course_data = CourseDataClient::from_settings(&settings)?;
    let ratings = RatingsService::from_settings(&settings)?;
    let state = AppState::new(settings, course_data, ratings);

    match state.course_data().fetch_departments().await {
        Ok(departments) => {
            tracing::info!(count = departments.len(), "Department directory loaded");
            state.replace_departments(departments).await;
        }
        Err(err) => {
            tracing::error!(
                error = %err,
                "Failed to load department directory; search stays unavailable until a refresh succeeds"
            );
        }
    }

    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "ProfMatch API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    Ok(())
}
