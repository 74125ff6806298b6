use serde::Deserialize;
use validator::Validate;

/// Query parameters for the course search endpoint. The two required
/// inputs are validated before any upstream call; the filter and sort
/// parameters are parsed leniently by the ranking layer (an unparseable
/// value disables that filter rather than failing the request).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchQuery {
    #[serde(default)]
    #[validate(length(min = 1, message = "department is required"))]
    pub(crate) department: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "course number is required"))]
    pub(crate) course_number: String,
    #[serde(default)]
    pub(crate) sort_by: Option<String>,
    #[serde(default)]
    pub(crate) sort_order: Option<String>,
    #[serde(default)]
    pub(crate) year_filter: Option<String>,
    #[serde(default, alias = "minGPA")]
    pub(crate) min_gpa: Option<String>,
    #[serde(default)]
    pub(crate) max_difficulty: Option<String>,
    #[serde(default)]
    pub(crate) min_would_take_again: Option<String>,
}
