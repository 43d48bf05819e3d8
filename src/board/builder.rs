// src/board/builder.rs
//! Pure transformation of application rows into board columns

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use graflog::app_log;
use crate::types::{ApplicationStatus, JobApplication};

const SECONDS_PER_DAY: i64 = 86_400;
const HIGH_PRIORITY_BEFORE_DAYS: i64 = 7;
const LOW_PRIORITY_AFTER_DAYS: i64 = 21;

/// Location keywords in scan order; the first one present wins.
pub const LABEL_KEYWORDS: [&str; 3] = ["Remote", "Hybrid", "On-site"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub company: String,
    pub deadline: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub id: ApplicationStatus,
    pub title: &'static str,
    pub color: &'static str,
    pub tasks: Vec<Task>,
}

/// Whole days elapsed, floored (a future date yields a negative count).
pub fn days_since_applied(applied_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - applied_date)
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY)
}

/// `< 7` days is high, `> 21` days is low; 7 through 21 inclusive is medium.
pub fn priority_for_days(days: i64) -> Priority {
    if days < HIGH_PRIORITY_BEFORE_DAYS {
        Priority::High
    } else if days > LOW_PRIORITY_AFTER_DAYS {
        Priority::Low
    } else {
        Priority::Medium
    }
}

/// Case-sensitive scan of the notes in [`LABEL_KEYWORDS`] order.
pub fn label_for_notes(notes: Option<&str>) -> Option<&'static str> {
    let notes = notes?;
    LABEL_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| notes.contains(keyword))
}

pub fn build_task(application: &JobApplication, now: DateTime<Utc>) -> Task {
    let days = days_since_applied(application.applied_date, now);
    Task {
        id: application.id.clone(),
        title: application.position.clone(),
        company: application.company.clone(),
        deadline: application.applied_date.format("%b %d, %Y").to_string(),
        priority: priority_for_days(days),
        label: label_for_notes(application.notes.as_deref()),
    }
}

/// Group applications into the four fixed columns. Columns are always
/// present, in pipeline order; rows with an unknown status are left out.
pub fn build_board(applications: &[JobApplication], now: DateTime<Utc>) -> Vec<Column> {
    let mut grouped: HashMap<ApplicationStatus, Vec<Task>> = HashMap::new();

    for application in applications {
        match application.known_status() {
            Some(status) => grouped
                .entry(status)
                .or_default()
                .push(build_task(application, now)),
            None => app_log!(
                debug,
                "Dropping application {} with unknown status '{}'",
                application.id,
                application.status
            ),
        }
    }

    ApplicationStatus::ALL
        .iter()
        .map(|status| Column {
            id: *status,
            title: status.title(),
            color: status.color(),
            tasks: grouped.remove(status).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn app(id: &str, status: &str, days_ago: i64, notes: Option<&str>) -> JobApplication {
        let applied = now() - Duration::days(days_ago);
        JobApplication {
            id: id.to_string(),
            user_id: "u".to_string(),
            company: format!("Company {}", id),
            position: format!("Role {}", id),
            status: status.to_string(),
            applied_date: applied,
            notes: notes.map(str::to_string),
            url: None,
            created_at: applied,
            updated_at: applied,
        }
    }

    #[test]
    fn test_priority_boundaries() {
        assert_eq!(priority_for_days(0), Priority::High);
        assert_eq!(priority_for_days(6), Priority::High);
        assert_eq!(priority_for_days(7), Priority::Medium);
        assert_eq!(priority_for_days(21), Priority::Medium);
        assert_eq!(priority_for_days(22), Priority::Low);
        assert_eq!(priority_for_days(-3), Priority::High);
    }

    #[test]
    fn test_exactly_seven_days_is_stable_medium() {
        let application = app("a", "applied", 7, None);
        let first = build_task(&application, now());
        for _ in 0..5 {
            assert_eq!(build_task(&application, now()).priority, first.priority);
        }
        assert_eq!(first.priority, Priority::Medium);
        assert_eq!(build_task(&app("b", "applied", 21, None), now()).priority, Priority::Medium);
    }

    #[test]
    fn test_days_are_floored() {
        let applied = now() - Duration::days(6) - Duration::hours(23);
        assert_eq!(days_since_applied(applied, now()), 6);
        let future = now() + Duration::hours(1);
        assert_eq!(days_since_applied(future, now()), -1);
    }

    #[test]
    fn test_label_scan_order() {
        assert_eq!(label_for_notes(Some("Hybrid, maybe Remote later")), Some("Remote"));
        assert_eq!(label_for_notes(Some("On-site and Hybrid")), Some("Hybrid"));
        assert_eq!(label_for_notes(Some("on-site only")), None);
        assert_eq!(label_for_notes(Some("")), None);
        assert_eq!(label_for_notes(None), None);
    }

    #[test]
    fn test_board_always_has_four_columns_in_order() {
        let columns = build_board(&[], now());
        let titles: Vec<&str> = columns.iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["Applied", "Interview", "Offer", "Rejected"]);
        assert!(columns.iter().all(|c| c.tasks.is_empty()));
    }

    #[test]
    fn test_each_record_in_exactly_one_column() {
        let apps = vec![
            app("1", "applied", 1, None),
            app("2", "Interview", 10, Some("Remote")),
            app("3", "OFFER", 30, None),
            app("4", "rejected", 2, None),
            app("5", "applied", 3, None),
        ];
        let columns = build_board(&apps, now());

        for application in &apps {
            let hits = columns
                .iter()
                .filter(|c| c.tasks.iter().any(|t| t.id == application.id))
                .count();
            assert_eq!(hits, 1, "application {} placed {} times", application.id, hits);
        }
        assert_eq!(columns[0].tasks.len(), 2);
        assert_eq!(columns[1].tasks[0].label, Some("Remote"));
        assert_eq!(columns[2].tasks[0].priority, Priority::Low);
    }

    #[test]
    fn test_unknown_status_is_dropped() {
        let apps = vec![app("1", "ghosted", 1, None), app("2", "applied", 1, None)];
        let columns = build_board(&apps, now());
        let all_ids: Vec<&str> = columns
            .iter()
            .flat_map(|c| c.tasks.iter().map(|t| t.id.as_str()))
            .collect();
        assert_eq!(all_ids, vec!["2"]);
    }

    #[test]
    fn test_task_fields() {
        let task = build_task(&app("9", "applied", 0, Some("On-site in Paris")), now());
        assert_eq!(task.title, "Role 9");
        assert_eq!(task.company, "Company 9");
        assert_eq!(task.deadline, "Jun 30, 2024");
        assert_eq!(task.label, Some("On-site"));
    }
}
