//! crates/student_records_core/src/analytics.rs
//!
//! Aggregate analytics over the student and course lists.
//!
//! Everything here is recomputed from scratch on each call. "Now" and the
//! local time zone come in as an explicit `DateTime<Tz>`, so identical
//! inputs always produce identical output.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::domain::{Course, Student};

const RECENT_WINDOW_DAYS: i64 = 30;
const WEEK_DAYS: i64 = 7;
const DAILY_SERIES_DAYS: i64 = 7;
const TOP_DOMAINS: usize = 5;

//=========================================================================================
// Output Types
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseShare {
    pub course: String,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainCount {
    pub domain: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// The analytics panel: distribution, domains and registration activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_students: usize,
    pub total_courses: usize,
    pub active_courses: usize,
    pub course_distribution: Vec<CourseShare>,
    pub top_domains: Vec<DomainCount>,
    pub recent_registrations: usize,
    pub daily_registrations: Vec<DailyCount>,
    pub average_students_per_course: u32,
}

/// The summary cards at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    /// Distinct course names in use among students.
    pub active_courses: usize,
    pub total_courses: usize,
    pub new_this_week: usize,
    pub filtered_count: usize,
    pub course_coverage: u32,
}

//=========================================================================================
// Aggregation
//=========================================================================================

/// `round(numerator / denominator)` with halves rounded up; 0 for an empty denominator.
pub fn round_ratio(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let rounded = (2 * numerator + denominator) / (2 * denominator);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// `round(part / whole * 100)`.
pub fn round_percentage(part: usize, whole: usize) -> u32 {
    round_ratio(part * 100, whole)
}

fn created_or(student: &Student, now: DateTime<Utc>) -> DateTime<Utc> {
    student.created_at.unwrap_or(now)
}

/// Per-course enrolment, most popular first. Ties keep course-list order.
pub fn course_distribution(students: &[Student], courses: &[Course]) -> Vec<CourseShare> {
    let mut shares: Vec<CourseShare> = courses
        .iter()
        .map(|course| {
            let count = students.iter().filter(|s| s.course == course.name).count();
            CourseShare {
                course: course.name.clone(),
                count,
                percentage: round_percentage(count, students.len()),
            }
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

/// The five most common email domains. Ties keep first-appearance order.
pub fn top_email_domains(students: &[Student]) -> Vec<DomainCount> {
    let mut counts: Vec<DomainCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for domain in students.iter().filter_map(Student::email_domain) {
        match index.get(domain) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(domain, counts.len());
                counts.push(DomainCount {
                    domain: domain.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_DOMAINS);
    counts
}

/// Students created strictly after `now - days`. A missing `createdAt` counts as now.
fn created_within(students: &[Student], now: DateTime<Utc>, days: i64) -> usize {
    let cutoff = now - Duration::days(days);
    students
        .iter()
        .filter(|s| created_or(s, now) > cutoff)
        .count()
}

/// Registrations per local calendar day for the last seven days, oldest first.
pub fn daily_registrations<Tz: TimeZone>(
    students: &[Student],
    now: &DateTime<Tz>,
) -> Vec<DailyCount> {
    let tz = now.timezone();
    let now_utc = now.with_timezone(&Utc);
    let today = now.date_naive();

    let local_days: Vec<NaiveDate> = students
        .iter()
        .map(|s| created_or(s, now_utc).with_timezone(&tz).date_naive())
        .collect();

    (0..DAILY_SERIES_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            DailyCount {
                date,
                count: local_days.iter().filter(|d| **d == date).count(),
            }
        })
        .collect()
}

/// Computes the full analytics panel.
pub fn compute<Tz: TimeZone>(
    students: &[Student],
    courses: &[Course],
    now: &DateTime<Tz>,
) -> Analytics {
    let now_utc = now.with_timezone(&Utc);
    let distribution = course_distribution(students, courses);

    Analytics {
        total_students: students.len(),
        total_courses: courses.len(),
        active_courses: distribution.iter().filter(|c| c.count > 0).count(),
        top_domains: top_email_domains(students),
        recent_registrations: created_within(students, now_utc, RECENT_WINDOW_DAYS),
        daily_registrations: daily_registrations(students, now),
        average_students_per_course: round_ratio(students.len(), courses.len()),
        course_distribution: distribution,
    }
}

/// Computes the dashboard summary cards. `filtered_count` is the size of the
/// currently visible list.
pub fn dashboard_stats<Tz: TimeZone>(
    students: &[Student],
    courses: &[Course],
    filtered_count: usize,
    now: &DateTime<Tz>,
) -> DashboardStats {
    let active_courses = students
        .iter()
        .map(|s| s.course.as_str())
        .collect::<HashSet<_>>()
        .len();

    DashboardStats {
        total_students: students.len(),
        active_courses,
        total_courses: courses.len(),
        new_this_week: created_within(students, now.with_timezone(&Utc), WEEK_DAYS),
        filtered_count,
        course_coverage: round_percentage(active_courses, courses.len()),
    }
}
