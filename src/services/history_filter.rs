use crate::domain::issue::Issue;

/// Selects the historical issues that can inform the size model: worked on,
/// measured, and not from an excluded project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    pub excluded_projects: Vec<String>,
}

impl HistoryFilter {
    pub fn new(excluded_projects: Vec<String>) -> Self {
        Self { excluded_projects }
    }

    pub fn select(&self, issues: Vec<Issue>) -> Vec<Issue> {
        issues
            .into_iter()
            .filter(|issue| issue.in_progress_date.is_some())
            .filter(|issue| issue.cycle_time_days.is_some())
            .filter(|issue| !self.is_excluded(issue))
            .collect()
    }

    fn is_excluded(&self, issue: &Issue) -> bool {
        let project = match issue.project.as_deref() {
            Some(project) => project,
            None => return false,
        };
        self.excluded_projects
            .iter()
            .any(|marker| !marker.is_empty() && project.contains(marker.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::issue::IssueType;
    use crate::test_support::{done_issue, on_date};

    #[test]
    fn drops_issues_that_never_started() {
        let mut never_started = done_issue("A-2", IssueType::Story, Some(1.0), 3);
        never_started.in_progress_date = None;
        let issues = vec![
            done_issue("A-1", IssueType::Story, Some(1.0), 3),
            never_started,
        ];

        let selected = HistoryFilter::default().select(issues);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].key, "A-1");
    }

    #[test]
    fn drops_issues_without_cycle_time() {
        let mut unmeasured = done_issue("A-2", IssueType::Bug, None, 3);
        unmeasured.cycle_time_days = None;
        unmeasured.in_progress_date = Some(on_date(2026, 1, 5));

        let selected = HistoryFilter::default().select(vec![unmeasured]);
        assert!(selected.is_empty());
    }

    #[test]
    fn drops_issues_from_excluded_projects() {
        let mut live = done_issue("LIVE-1", IssueType::Bug, None, 2);
        live.project = Some("Platform Live Support".to_string());
        let mut core = done_issue("CORE-1", IssueType::Bug, None, 2);
        core.project = Some("Platform".to_string());
        let unassigned = done_issue("X-1", IssueType::Bug, None, 2);

        let filter = HistoryFilter::new(vec!["Live".to_string()]);
        let selected = filter.select(vec![live, core, unassigned]);
        let keys: Vec<&str> = selected.iter().map(|issue| issue.key.as_str()).collect();
        assert_eq!(keys, vec!["CORE-1", "X-1"]);
    }
}
