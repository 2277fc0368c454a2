use chrono::NaiveDate;

use crate::domain::issue::{Issue, IssueType};

pub fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A finished historical issue with a measured cycle time.
pub fn done_issue(
    key: &str,
    issue_type: IssueType,
    points: Option<f64>,
    cycle_time_days: u32,
) -> Issue {
    let started = on_date(2026, 1, 5);
    let mut issue = Issue::new(key, issue_type);
    issue.story_points = points;
    issue.created_date = Some(started);
    issue.in_progress_date = Some(started);
    issue.resolved_date = Some(started + chrono::Days::new(u64::from(cycle_time_days)));
    issue.cycle_time_days = Some(cycle_time_days);
    issue
}

pub fn sized_issue(key: &str, issue_type: IssueType, points: Option<f64>, size: f64) -> Issue {
    let mut issue = done_issue(key, issue_type, points, size.round() as u32);
    issue.size = Some(size);
    issue
}

pub fn resolved_issue(key: &str, issue_type: IssueType, resolved: NaiveDate, size: f64) -> Issue {
    let mut issue = Issue::new(key, issue_type);
    issue.resolved_date = Some(resolved);
    issue.size = Some(size);
    issue
}

pub fn backlog_issue(key: &str, issue_type: IssueType, points: Option<f64>) -> Issue {
    let mut issue = Issue::new(key, issue_type);
    issue.story_points = points;
    issue
}

pub fn sized_backlog_issue(
    key: &str,
    issue_type: IssueType,
    points: Option<f64>,
    size: f64,
) -> Issue {
    let mut issue = backlog_issue(key, issue_type, points);
    issue.size = Some(size);
    issue
}
