// src/stats.rs
//! Aggregate numbers for the statistics page.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::board::builder::days_since_applied;
use crate::types::{ApplicationStatus, JobApplication};

pub const MONTHS_SHOWN: u32 = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub applied: usize,
    pub interview: usize,
    pub offer: usize,
    pub rejected: usize,
}

impl StatusCounts {
    fn bump(&mut self, status: ApplicationStatus) {
        match status {
            ApplicationStatus::Applied => self.applied += 1,
            ApplicationStatus::Interview => self.interview += 1,
            ApplicationStatus::Offer => self.offer += 1,
            ApplicationStatus::Rejected => self.rejected += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub by_status: StatusCounts,
    /// Share of applications that got any answer, in percent.
    pub response_rate: f64,
    /// Share that reached an interview (offers included), in percent.
    pub interview_rate: f64,
    pub offer_rate: f64,
    /// Oldest month first.
    pub monthly: Vec<MonthlyCount>,
    pub average_days_active: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(part as f64 * 100.0 / total as f64)
    }
}

/// `(year, month)` pairs for the last `count` months ending at `now`.
fn recent_months(now: DateTime<Utc>, count: u32) -> Vec<(i32, u32)> {
    let current = now.year() * 12 + now.month0() as i32;
    (0..count as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
        })
        .collect()
}

pub fn compute_stats(applications: &[JobApplication], now: DateTime<Utc>) -> ApplicationStats {
    let mut by_status = StatusCounts::default();
    for status in applications.iter().filter_map(JobApplication::known_status) {
        by_status.bump(status);
    }

    let total = applications.len();
    let responded = by_status.interview + by_status.offer + by_status.rejected;

    let monthly = recent_months(now, MONTHS_SHOWN)
        .into_iter()
        .map(|(year, month)| MonthlyCount {
            month: format!("{:04}-{:02}", year, month),
            count: applications
                .iter()
                .filter(|a| a.applied_date.year() == year && a.applied_date.month() == month)
                .count(),
        })
        .collect();

    let average_days_active = if total == 0 {
        0.0
    } else {
        let days: i64 = applications
            .iter()
            .map(|a| days_since_applied(a.applied_date, now).max(0))
            .sum();
        round1(days as f64 / total as f64)
    };

    ApplicationStats {
        total,
        response_rate: percent(responded, total),
        interview_rate: percent(by_status.interview + by_status.offer, total),
        offer_rate: percent(by_status.offer, total),
        by_status,
        monthly,
        average_days_active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn application(status: &str, applied_date: DateTime<Utc>) -> JobApplication {
        JobApplication {
            id: format!("{}-{}", status, applied_date.timestamp()),
            user_id: "alice".to_string(),
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            status: status.to_string(),
            applied_date,
            notes: None,
            url: None,
            created_at: applied_date,
            updated_at: applied_date,
        }
    }

    #[test]
    fn test_empty_store() {
        let stats = compute_stats(&[], Utc::now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.response_rate, 0.0);
        assert_eq!(stats.average_days_active, 0.0);
        assert_eq!(stats.monthly.len(), MONTHS_SHOWN as usize);
        assert!(stats.monthly.iter().all(|m| m.count == 0));
    }

    #[test]
    fn test_rates_and_counts() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let apps = vec![
            application("applied", now - Duration::days(2)),
            application("interview", now - Duration::days(4)),
            application("offer", now - Duration::days(6)),
            application("rejected", now - Duration::days(8)),
            application("REJECTED", now - Duration::days(10)),
            application("ghosted", now - Duration::days(12)),
        ];

        let stats = compute_stats(&apps, now);
        assert_eq!(stats.total, 6);
        assert_eq!(
            stats.by_status,
            StatusCounts {
                applied: 1,
                interview: 1,
                offer: 1,
                rejected: 2
            }
        );
        // 4 of 6 answered
        assert_eq!(stats.response_rate, 66.7);
        assert_eq!(stats.interview_rate, 33.3);
        assert_eq!(stats.offer_rate, 16.7);
        assert_eq!(stats.average_days_active, 7.0);
    }

    #[test]
    fn test_monthly_window_crosses_year_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
        let apps = vec![
            application("applied", Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap()),
            application("applied", Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            application("applied", Utc.with_ymd_and_hms(2023, 1, 5, 0, 0, 0).unwrap()),
        ];

        let stats = compute_stats(&apps, now);
        let months: Vec<&str> = stats.monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(
            months,
            vec!["2023-09", "2023-10", "2023-11", "2023-12", "2024-01", "2024-02"]
        );
        assert_eq!(stats.monthly[3].count, 1);
        assert_eq!(stats.monthly[5].count, 1);
        assert_eq!(stats.monthly.iter().map(|m| m.count).sum::<usize>(), 2);
    }
}
