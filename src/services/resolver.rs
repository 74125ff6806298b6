use thiserror::Error;

use crate::schemas::department::Department;
use crate::schemas::grades::ProfessorSummary;
use crate::services::aggregation;
use crate::services::course_data::{CourseDataClient, UpstreamError, UpstreamSearch};
use crate::services::ratings::RatingsService;

#[derive(Debug, Error)]
pub(crate) enum SearchError {
    #[error("{0}")]
    Validation(String),
    #[error("No results found for {department} {course_number}")]
    NoResults { department: String, course_number: String },
    #[error("Course data service is unavailable")]
    Upstream(#[source] UpstreamError),
    #[error("Department directory is unavailable")]
    DepartmentsUnavailable,
}

/// Resolves one search: validates the inputs against the loaded
/// department directory, issues the single upstream lookup, and hands
/// raw records to the aggregation engine. Pre-aggregated payloads skip
/// the fold but share the response type.
pub(crate) async fn resolve(
    client: &CourseDataClient,
    ratings: Option<&RatingsService>,
    departments: &[Department],
    department: &str,
    course_number: &str,
) -> Result<Vec<ProfessorSummary>, SearchError> {
    let department = department.trim();
    let course_number = course_number.trim().to_ascii_uppercase();

    if department.is_empty() || course_number.is_empty() {
        return Err(SearchError::Validation(
            "Department and course number are required".to_string(),
        ));
    }

    if !departments.iter().any(|entry| entry.code == department) {
        return Err(SearchError::Validation(format!("Unknown department code: {department}")));
    }

    let payload = client
        .fetch_course_grades(department, &course_number)
        .await
        .map_err(SearchError::Upstream)?;

    let mut summaries = match payload {
        UpstreamSearch::Raw(entries) => {
            // Cross-listed offerings can repeat a course number; every
            // matching entry contributes its records to one fold.
            let records: Vec<_> = entries
                .into_iter()
                .filter(|entry| entry.course_number.eq_ignore_ascii_case(&course_number))
                .flat_map(|entry| entry.records)
                .collect();

            if records.is_empty() {
                return Err(SearchError::NoResults {
                    department: department.to_string(),
                    course_number,
                });
            }

            aggregation::aggregate(&records)
        }
        UpstreamSearch::Aggregated(mut summaries) => {
            if summaries.is_empty() {
                return Err(SearchError::NoResults {
                    department: department.to_string(),
                    course_number,
                });
            }

            for summary in &mut summaries {
                summary.ensure_grade_percentages();
            }
            summaries
        }
    };

    if let Some(ratings) = ratings {
        enrich_with_ratings(ratings, &mut summaries).await;
    }

    Ok(summaries)
}

/// Ratings are best-effort decoration: a failed lookup is logged and the
/// summary keeps its fields absent.
async fn enrich_with_ratings(ratings: &RatingsService, summaries: &mut [ProfessorSummary]) {
    for summary in summaries.iter_mut() {
        if summary.difficulty.is_some() && summary.would_take_again.is_some() {
            continue;
        }

        match ratings.lookup(&summary.shortened_name).await {
            Ok(Some(rating)) => {
                if summary.difficulty.is_none() {
                    summary.difficulty = rating.difficulty;
                }
                if summary.would_take_again.is_none() {
                    summary.would_take_again = rating.would_take_again;
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    instructor = %summary.shortened_name,
                    "Ratings lookup failed; returning the summary without ratings"
                );
            }
        }
    }
}
