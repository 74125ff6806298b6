use crate::schemas::grades::ProfessorSummary;
use crate::schemas::search::SearchQuery;
use crate::services::terms::Term;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortKey {
    AverageGpa,
    PassRate,
    Difficulty,
    WouldTakeAgain,
    StudentsTaught,
    LastTaught,
}

impl SortKey {
    /// Unrecognized or absent keys fall back to the GPA default.
    pub(crate) fn parse(value: Option<&str>) -> Self {
        match value.map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
            Some("passrate") => Self::PassRate,
            Some("difficulty") => Self::Difficulty,
            Some("wouldtakeagain") => Self::WouldTakeAgain,
            Some("studentstaught") => Self::StudentsTaught,
            Some("lasttaught") => Self::LastTaught,
            _ => Self::AverageGpa,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub(crate) fn parse(value: Option<&str>) -> Self {
        match value.map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

/// Parsed filter thresholds. `None` means the filter is off, which is
/// also what an unparseable parameter value degrades to.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Filters {
    pub(crate) year_limit: Option<u32>,
    pub(crate) min_gpa: Option<f64>,
    pub(crate) max_difficulty: Option<f64>,
    pub(crate) min_would_take_again: Option<f64>,
}

impl Filters {
    pub(crate) fn from_query(query: &SearchQuery) -> Self {
        Self {
            year_limit: parse_year_limit(query.year_filter.as_deref()),
            min_gpa: parse_threshold(query.min_gpa.as_deref()),
            max_difficulty: parse_threshold(query.max_difficulty.as_deref()),
            min_would_take_again: parse_threshold(query.min_would_take_again.as_deref()),
        }
    }
}

fn parse_threshold(value: Option<&str>) -> Option<f64> {
    value.and_then(|raw| raw.trim().parse::<f64>().ok())
}

fn parse_year_limit(value: Option<&str>) -> Option<u32> {
    let raw = value?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return None;
    }
    raw.parse::<u32>().ok()
}

/// Applies the filters, then a stable sort. Summaries comparing equal on
/// the sort key keep their original relative order for either direction.
pub(crate) fn filter_and_sort(
    mut summaries: Vec<ProfessorSummary>,
    filters: &Filters,
    sort_key: SortKey,
    sort_order: SortOrder,
    current_year: i32,
) -> Vec<ProfessorSummary> {
    // The difficulty and would-take-again filters only engage when the
    // field exists somewhere in the current result set; a data source
    // that never supplies them leaves these filters inert.
    let has_difficulty = summaries.iter().any(|summary| summary.difficulty.is_some());
    let has_would_take_again = summaries.iter().any(|summary| summary.would_take_again.is_some());

    summaries.retain(|summary| {
        if let Some(limit) = filters.year_limit {
            match last_taught_year(summary) {
                Some(year) if current_year - year <= limit as i32 => {}
                _ => return false,
            }
        }

        if let Some(min) = filters.min_gpa {
            match summary.average_gpa {
                Some(gpa) if gpa >= min => {}
                _ => return false,
            }
        }

        if has_difficulty {
            if let Some(max) = filters.max_difficulty {
                if summary.difficulty.unwrap_or(0.0) > max {
                    return false;
                }
            }
        }

        if has_would_take_again {
            if let Some(min) = filters.min_would_take_again {
                if summary.would_take_again.unwrap_or(0.0) < min {
                    return false;
                }
            }
        }

        true
    });

    summaries.sort_by(|left, right| {
        let left_value = sort_value(left, sort_key);
        let right_value = sort_value(right, sort_key);
        match sort_order {
            SortOrder::Asc => left_value.total_cmp(&right_value),
            SortOrder::Desc => right_value.total_cmp(&left_value),
        }
    });

    summaries
}

/// Missing optional values sort as 0; `lastTaught` compares by derived
/// year rather than the label string.
fn sort_value(summary: &ProfessorSummary, key: SortKey) -> f64 {
    match key {
        SortKey::AverageGpa => summary.average_gpa.unwrap_or(0.0),
        SortKey::PassRate => summary.pass_rate.unwrap_or(0.0),
        SortKey::Difficulty => summary.difficulty.unwrap_or(0.0),
        SortKey::WouldTakeAgain => summary.would_take_again.unwrap_or(0.0),
        SortKey::StudentsTaught => f64::from(summary.students_taught),
        SortKey::LastTaught => last_taught_year(summary).map(f64::from).unwrap_or(0.0),
    }
}

fn last_taught_year(summary: &ProfessorSummary) -> Option<i32> {
    Term::parse(&summary.last_taught).map(|term| term.year)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::schemas::grades::GradeCounts;

    fn summary(name: &str, gpa: Option<f64>, last_taught: &str, students: u32) -> ProfessorSummary {
        ProfessorSummary {
            shortened_name: name.to_string(),
            average_gpa: gpa,
            last_taught: last_taught.to_string(),
            students_taught: students,
            students_taught_no_pnp: students,
            stats: GradeCounts::default(),
            courses: BTreeMap::new(),
            pass_rate: None,
            difficulty: None,
            would_take_again: None,
            grade_percentages: None,
        }
    }

    fn names(summaries: &[ProfessorSummary]) -> Vec<&str> {
        summaries.iter().map(|summary| summary.shortened_name.as_str()).collect()
    }

    #[test]
    fn defaults_sort_by_gpa_descending() {
        let input = vec![
            summary("LOW", Some(2.1), "Fall 2025", 10),
            summary("HIGH", Some(3.9), "Fall 2025", 10),
            summary("MID", Some(3.0), "Fall 2025", 10),
        ];

        let sorted = filter_and_sort(
            input,
            &Filters::default(),
            SortKey::parse(None),
            SortOrder::parse(None),
            2026,
        );
        assert_eq!(names(&sorted), vec!["HIGH", "MID", "LOW"]);
    }

    #[test]
    fn noop_filters_are_idempotent_and_resort_is_a_fixed_point() {
        let input = vec![
            summary("A", Some(3.5), "Fall 2025", 10),
            summary("B", Some(2.5), "Spring 2024", 20),
            summary("C", None, "Winter 2023", 30),
        ];

        let filters = Filters::from_query(&crate::schemas::search::SearchQuery {
            department: "COMPSCI".to_string(),
            course_number: "161".to_string(),
            sort_by: None,
            sort_order: None,
            year_filter: Some("all".to_string()),
            min_gpa: Some("".to_string()),
            max_difficulty: None,
            min_would_take_again: None,
        });
        assert!(filters.year_limit.is_none());
        assert!(filters.min_gpa.is_none());

        let once =
            filter_and_sort(input, &filters, SortKey::AverageGpa, SortOrder::Desc, 2026);
        let twice = filter_and_sort(
            once.clone(),
            &filters,
            SortKey::AverageGpa,
            SortOrder::Desc,
            2026,
        );
        assert_eq!(names(&once), names(&twice));
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn sorting_is_stable_for_equal_keys_in_both_orders() {
        let input = vec![
            summary("FIRST", Some(3.0), "Fall 2025", 10),
            summary("SECOND", Some(3.0), "Fall 2025", 20),
            summary("THIRD", Some(3.0), "Fall 2025", 30),
        ];

        let descending = filter_and_sort(
            input.clone(),
            &Filters::default(),
            SortKey::AverageGpa,
            SortOrder::Desc,
            2026,
        );
        assert_eq!(names(&descending), vec!["FIRST", "SECOND", "THIRD"]);

        let ascending = filter_and_sort(
            input,
            &Filters::default(),
            SortKey::AverageGpa,
            SortOrder::Asc,
            2026,
        );
        assert_eq!(names(&ascending), vec!["FIRST", "SECOND", "THIRD"]);
    }

    #[test]
    fn min_gpa_drops_low_and_missing_gpas() {
        let input = vec![
            summary("KEEP", Some(3.5), "Fall 2025", 10),
            summary("LOW", Some(2.0), "Fall 2025", 10),
            summary("NOGPA", None, "Fall 2025", 10),
        ];

        let filters = Filters { min_gpa: Some(3.0), ..Filters::default() };
        let filtered =
            filter_and_sort(input, &filters, SortKey::AverageGpa, SortOrder::Desc, 2026);
        assert_eq!(names(&filtered), vec!["KEEP"]);
    }

    #[test]
    fn unparseable_min_gpa_means_no_filter() {
        let query = crate::schemas::search::SearchQuery {
            department: "COMPSCI".to_string(),
            course_number: "161".to_string(),
            sort_by: None,
            sort_order: None,
            year_filter: None,
            min_gpa: Some("not-a-number".to_string()),
            max_difficulty: None,
            min_would_take_again: None,
        };
        assert!(Filters::from_query(&query).min_gpa.is_none());
    }

    #[test]
    fn year_filter_limits_by_years_since_last_taught() {
        let input = vec![
            summary("RECENT", Some(3.0), "Fall 2025", 10),
            summary("OLD", Some(4.0), "Fall 2019", 10),
        ];

        let filters = Filters { year_limit: Some(3), ..Filters::default() };
        let filtered =
            filter_and_sort(input, &filters, SortKey::AverageGpa, SortOrder::Desc, 2026);
        assert_eq!(names(&filtered), vec!["RECENT"]);
    }

    #[test]
    fn difficulty_filter_is_inert_when_no_summary_has_the_field() {
        let input = vec![
            summary("A", Some(3.0), "Fall 2025", 10),
            summary("B", Some(2.0), "Fall 2025", 10),
        ];

        let filters = Filters { max_difficulty: Some(1.0), ..Filters::default() };
        let filtered =
            filter_and_sort(input, &filters, SortKey::AverageGpa, SortOrder::Desc, 2026);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn difficulty_filter_engages_once_any_summary_has_the_field() {
        let mut hard = summary("HARD", Some(3.0), "Fall 2025", 10);
        hard.difficulty = Some(4.5);
        let easy = summary("EASY", Some(2.0), "Fall 2025", 10);

        let filters = Filters { max_difficulty: Some(3.0), ..Filters::default() };
        let filtered = filter_and_sort(
            vec![hard, easy],
            &filters,
            SortKey::AverageGpa,
            SortOrder::Desc,
            2026,
        );
        // The summary without the field sorts as 0 and survives a max
        // filter; the rated-too-hard one is dropped.
        assert_eq!(names(&filtered), vec!["EASY"]);
    }

    #[test]
    fn missing_optional_fields_sort_as_zero() {
        let mut rated = summary("RATED", Some(3.0), "Fall 2025", 10);
        rated.difficulty = Some(2.5);
        let unrated = summary("UNRATED", Some(4.0), "Fall 2025", 10);

        let sorted = filter_and_sort(
            vec![unrated, rated],
            &Filters::default(),
            SortKey::Difficulty,
            SortOrder::Desc,
            2026,
        );
        assert_eq!(names(&sorted), vec!["RATED", "UNRATED"]);
    }

    #[test]
    fn last_taught_sorts_by_derived_year_not_label() {
        let input = vec![
            summary("OLDER", Some(4.0), "Winter 2020", 10),
            // Lexicographically "Fall 2024" < "Winter 2020"; the derived
            // year must win.
            summary("NEWER", Some(2.0), "Fall 2024", 10),
        ];

        let sorted = filter_and_sort(
            input,
            &Filters::default(),
            SortKey::LastTaught,
            SortOrder::Desc,
            2026,
        );
        assert_eq!(names(&sorted), vec!["NEWER", "OLDER"]);
    }

    #[test]
    fn students_taught_sort_key() {
        let input = vec![
            summary("SMALL", Some(4.0), "Fall 2025", 15),
            summary("BIG", Some(2.0), "Fall 2025", 300),
        ];

        let sorted = filter_and_sort(
            input,
            &Filters::default(),
            SortKey::StudentsTaught,
            SortOrder::Desc,
            2026,
        );
        assert_eq!(names(&sorted), vec!["BIG", "SMALL"]);
    }
}
