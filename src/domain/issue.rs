use chrono::NaiveDate;

/// Story point values closer than this are treated as the same estimate.
pub const POINT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueType {
    Story,
    Bug,
    Other,
}

impl IssueType {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "story" => IssueType::Story,
            "bug" => IssueType::Bug,
            _ => IssueType::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub key: String,
    pub project: Option<String>,
    pub issue_type: IssueType,
    pub story_points: Option<f64>,
    pub created_date: Option<NaiveDate>,
    pub in_progress_date: Option<NaiveDate>,
    pub resolved_date: Option<NaiveDate>,
    pub cycle_time_days: Option<u32>,
    /// Units of work, derived from history or assigned per simulation run.
    pub size: Option<f64>,
}

impl Issue {
    pub fn new(key: &str, issue_type: IssueType) -> Self {
        Self {
            key: key.to_string(),
            project: None,
            issue_type,
            story_points: None,
            created_date: None,
            in_progress_date: None,
            resolved_date: None,
            cycle_time_days: None,
            size: None,
        }
    }

    pub fn is_story(&self) -> bool {
        self.issue_type == IssueType::Story
    }

    pub fn is_bug(&self) -> bool {
        self.issue_type == IssueType::Bug
    }

    pub fn has_points(&self, points: f64) -> bool {
        self.story_points
            .is_some_and(|value| points_match(value, points))
    }
}

pub fn points_match(left: f64, right: f64) -> bool {
    let scale = left.abs().max(right.abs()).max(1.0);
    (left - right).abs() <= POINT_TOLERANCE * scale
}
