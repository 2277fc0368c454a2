use chrono::NaiveDate;

/// Completed stories in one historical period starting at `period_start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Throughput {
    pub period_start: NaiveDate,
    pub completed_issues: u32,
}
