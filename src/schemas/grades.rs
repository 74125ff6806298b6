use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One course offering as reported by the grade-distribution source: a
/// single instructor and term with its letter-grade and P/NP counts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawGradeRecord {
    pub(crate) instructor: String,
    pub(crate) term: String,
    #[serde(default)]
    pub(crate) grade_a_count: u32,
    #[serde(default)]
    pub(crate) grade_b_count: u32,
    #[serde(default)]
    pub(crate) grade_c_count: u32,
    #[serde(default)]
    pub(crate) grade_d_count: u32,
    #[serde(default)]
    pub(crate) grade_f_count: u32,
    #[serde(default)]
    pub(crate) grade_p_count: u32,
    #[serde(default, rename = "gradeNPCount")]
    pub(crate) grade_np_count: u32,
    #[serde(default, rename = "averageGPA")]
    pub(crate) average_gpa: Option<f64>,
}

impl RawGradeRecord {
    /// Every enrollment in the offering, P/NP included.
    pub(crate) fn total_students(&self) -> u32 {
        self.letter_counts().letter_total() + self.grade_p_count + self.grade_np_count
    }

    /// Enrollments receiving a passing grade (A, B, C or P).
    pub(crate) fn passing_students(&self) -> u32 {
        self.grade_a_count + self.grade_b_count + self.grade_c_count + self.grade_p_count
    }

    pub(crate) fn letter_counts(&self) -> GradeCounts {
        GradeCounts {
            grade_a_count: self.grade_a_count,
            grade_b_count: self.grade_b_count,
            grade_c_count: self.grade_c_count,
            grade_d_count: self.grade_d_count,
            grade_f_count: self.grade_f_count,
        }
    }
}

/// Letter-grade totals (P/NP tracked separately).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GradeCounts {
    #[serde(default)]
    pub(crate) grade_a_count: u32,
    #[serde(default)]
    pub(crate) grade_b_count: u32,
    #[serde(default)]
    pub(crate) grade_c_count: u32,
    #[serde(default)]
    pub(crate) grade_d_count: u32,
    #[serde(default)]
    pub(crate) grade_f_count: u32,
}

impl GradeCounts {
    pub(crate) fn letter_total(&self) -> u32 {
        self.grade_a_count
            + self.grade_b_count
            + self.grade_c_count
            + self.grade_d_count
            + self.grade_f_count
    }

    pub(crate) fn add(&mut self, other: &GradeCounts) {
        self.grade_a_count += other.grade_a_count;
        self.grade_b_count += other.grade_b_count;
        self.grade_c_count += other.grade_c_count;
        self.grade_d_count += other.grade_d_count;
        self.grade_f_count += other.grade_f_count;
    }
}

/// Per-term statistics for one professor, derived from a single
/// [`RawGradeRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseStats {
    #[serde(default, rename = "averageGPA", skip_serializing_if = "Option::is_none")]
    pub(crate) average_gpa: Option<f64>,
    pub(crate) pass_rate: f64,
    pub(crate) total_students: u32,
    #[serde(flatten)]
    pub(crate) counts: GradeCounts,
}

/// Letter-grade shares of the non-P/NP enrollment, rounded to whole
/// percent. Only present when that enrollment is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GradePercentages {
    pub(crate) grade_a_percent: f64,
    pub(crate) grade_b_percent: f64,
    pub(crate) grade_c_percent: f64,
    pub(crate) grade_d_percent: f64,
    pub(crate) grade_f_percent: f64,
}

/// Aggregated view of one professor's history for the searched course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfessorSummary {
    pub(crate) shortened_name: String,
    /// Enrollment-weighted mean over GPA-bearing terms; `null` when no
    /// term carries a GPA (distinct from 0.00).
    #[serde(default, rename = "averageGPA", with = "gpa_string")]
    pub(crate) average_gpa: Option<f64>,
    pub(crate) last_taught: String,
    pub(crate) students_taught: u32,
    #[serde(default, rename = "studentsTaughtNoPNP")]
    pub(crate) students_taught_no_pnp: u32,
    #[serde(default)]
    pub(crate) stats: GradeCounts,
    #[serde(default)]
    pub(crate) courses: BTreeMap<String, CourseStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) pass_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) difficulty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) would_take_again: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) grade_percentages: Option<GradePercentages>,
}

impl ProfessorSummary {
    /// Fills in the percentage block when the non-P/NP enrollment allows
    /// it. A professor with only P/NP enrollments keeps `None`, which the
    /// display layer renders as an explicit no-data state.
    pub(crate) fn ensure_grade_percentages(&mut self) {
        if self.grade_percentages.is_some() || self.students_taught_no_pnp == 0 {
            return;
        }

        let denominator = f64::from(self.students_taught_no_pnp);
        let percent = |count: u32| (f64::from(count) / denominator * 100.0).round();

        self.grade_percentages = Some(GradePercentages {
            grade_a_percent: percent(self.stats.grade_a_count),
            grade_b_percent: percent(self.stats.grade_b_count),
            grade_c_percent: percent(self.stats.grade_c_count),
            grade_d_percent: percent(self.stats.grade_d_count),
            grade_f_percent: percent(self.stats.grade_f_count),
        });
    }
}

/// The summary GPA travels as a two-decimal string on the wire but is
/// folded as a float; `null` must survive both directions.
mod gpa_string {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(gpa) => serializer.serialize_some(&format!("{gpa:.2}")),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        match raw {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::Number(number)) => Ok(number.as_f64()),
            Some(serde_json::Value::String(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("invalid GPA value: {text}")))
            }
            Some(other) => Err(D::Error::custom(format!("invalid GPA value: {other}"))),
        }
    }
}
