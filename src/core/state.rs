use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::config::Settings;
use crate::schemas::department::Department;
use crate::services::course_data::CourseDataClient;
use crate::services::ratings::RatingsService;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    course_data: CourseDataClient,
    ratings: Option<RatingsService>,
    // Loaded once at startup; `None` until the first successful fetch.
    departments: RwLock<Option<Vec<Department>>>,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        course_data: CourseDataClient,
        ratings: Option<RatingsService>,
    ) -> Self {
        Self {
            inner: Arc::new(InnerState {
                settings,
                course_data,
                ratings,
                departments: RwLock::new(None),
            }),
        }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn course_data(&self) -> &CourseDataClient {
        &self.inner.course_data
    }

    pub(crate) fn ratings(&self) -> Option<&RatingsService> {
        self.inner.ratings.as_ref()
    }

    pub(crate) async fn departments(&self) -> Option<Vec<Department>> {
        self.inner.departments.read().await.clone()
    }

    pub(crate) async fn replace_departments(&self, departments: Vec<Department>) {
        *self.inner.departments.write().await = Some(departments);
    }
}
