use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::schemas::grades::{CourseStats, GradeCounts, ProfessorSummary, RawGradeRecord};
use crate::services::terms::Term;

/// Derives the per-term statistics for a single offering. Grade counts
/// pass through verbatim; the pass rate counts A, B, C and P as passing
/// over the full enrollment (D, F and NP are non-passing).
pub(crate) fn course_stats(record: &RawGradeRecord) -> CourseStats {
    let total_students = record.total_students();
    let pass_rate = if total_students == 0 {
        0.0
    } else {
        f64::from(record.passing_students()) / f64::from(total_students)
    };

    CourseStats {
        average_gpa: record.average_gpa,
        pass_rate,
        total_students,
        counts: record.letter_counts(),
    }
}

/// Folds raw per-offering records into one summary per instructor.
///
/// Grouping is by exact instructor string (name variants are not
/// normalized). The fold is the same for a single-record group as for a
/// large one; summaries come out in first-seen instructor order and are
/// re-ordered later by the ranking layer.
pub(crate) fn aggregate(records: &[RawGradeRecord]) -> Vec<ProfessorSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&RawGradeRecord>> = HashMap::new();

    for record in records {
        let group = groups.entry(record.instructor.as_str()).or_default();
        if group.is_empty() {
            order.push(record.instructor.as_str());
        }
        group.push(record);
    }

    order.into_iter().map(|instructor| fold_group(instructor, &groups[instructor])).collect()
}

fn fold_group(instructor: &str, records: &[&RawGradeRecord]) -> ProfessorSummary {
    let mut stats = GradeCounts::default();
    let mut students_taught = 0u32;
    let mut students_taught_no_pnp = 0u32;
    let mut passing_students = 0u32;
    // Weighted by each GPA-bearing term's full enrollment; terms without
    // a GPA still contribute their counts but drop out of both sides of
    // the division.
    let mut gpa_numerator = 0.0f64;
    let mut gpa_weight = 0u32;
    let mut courses: BTreeMap<String, CourseStats> = BTreeMap::new();
    let mut last_taught: Option<Term> = None;

    for record in records {
        let term_stats = course_stats(record);

        stats.add(&term_stats.counts);
        students_taught += term_stats.total_students;
        students_taught_no_pnp += term_stats.counts.letter_total();
        passing_students += record.passing_students();

        if let Some(gpa) = record.average_gpa {
            gpa_numerator += gpa * f64::from(term_stats.total_students);
            gpa_weight += term_stats.total_students;
        }

        let key = match Term::parse(&record.term) {
            Some(term) => {
                if last_taught.map_or(true, |current| term > current) {
                    last_taught = Some(term);
                }
                term.key()
            }
            // Unrecognized labels keep their raw form as the map key and
            // never win `lastTaught` over a parsed term.
            None => record.term.clone(),
        };

        match courses.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(term_stats);
            }
            Entry::Occupied(mut slot) => {
                let combined = combine_term_stats(slot.get(), &term_stats);
                *slot.get_mut() = combined;
            }
        }
    }

    let average_gpa =
        (gpa_weight > 0).then(|| gpa_numerator / f64::from(gpa_weight));
    let pass_rate =
        (students_taught > 0).then(|| f64::from(passing_students) / f64::from(students_taught));
    let last_taught = last_taught
        .map(|term| term.to_string())
        .or_else(|| records.last().map(|record| record.term.clone()))
        .unwrap_or_default();

    let mut summary = ProfessorSummary {
        shortened_name: instructor.to_string(),
        average_gpa,
        last_taught,
        students_taught,
        students_taught_no_pnp,
        stats,
        courses,
        pass_rate,
        difficulty: None,
        would_take_again: None,
        grade_percentages: None,
    };
    summary.ensure_grade_percentages();
    summary
}

/// Two offerings of the same course in the same term (multiple sections)
/// collapse into one entry, enrollment-weighted.
fn combine_term_stats(left: &CourseStats, right: &CourseStats) -> CourseStats {
    let total_students = left.total_students + right.total_students;
    let mut counts = left.counts;
    counts.add(&right.counts);

    let pass_rate = if total_students == 0 {
        0.0
    } else {
        (left.pass_rate * f64::from(left.total_students)
            + right.pass_rate * f64::from(right.total_students))
            / f64::from(total_students)
    };

    let average_gpa = match (left.average_gpa, right.average_gpa) {
        (Some(a), Some(b)) => {
            let weight_a = f64::from(left.total_students);
            let weight_b = f64::from(right.total_students);
            if weight_a + weight_b == 0.0 {
                Some((a + b) / 2.0)
            } else {
                Some((a * weight_a + b * weight_b) / (weight_a + weight_b))
            }
        }
        (Some(a), None) => Some(a),
        (None, b) => b,
    };

    CourseStats { average_gpa, pass_rate, total_students, counts }
}
