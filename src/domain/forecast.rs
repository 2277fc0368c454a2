use serde::Serialize;

/// What one simulation run completed in a single period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodOutcome {
    pub completed_keys: Vec<String>,
    pub items: u32,
    pub stories: u32,
    pub story_points: f64,
    /// Backlog items still pending or in progress after the period.
    pub remaining: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResult {
    pub periods: Vec<PeriodOutcome>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Stories,
    StoryPoints,
    Items,
}

impl Statistic {
    pub fn label(&self) -> &'static str {
        match self {
            Statistic::Stories => "Stories",
            Statistic::StoryPoints => "Story Points",
            Statistic::Items => "Items",
        }
    }

    pub fn value(&self, period: &PeriodOutcome) -> f64 {
        match self {
            Statistic::Stories => period.stories as f64,
            Statistic::StoryPoints => period.story_points,
            Statistic::Items => period.items as f64,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForecastTable {
    pub statistic: Statistic,
    pub p10: Vec<f64>,
    pub p50: Vec<f64>,
    pub p90: Vec<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CompletionChance {
    pub key: String,
    pub chances: Vec<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Forecast {
    pub runs: usize,
    pub periods: usize,
    pub completion_chance: Vec<CompletionChance>,
    pub stories: ForecastTable,
    pub story_points: ForecastTable,
    pub items: ForecastTable,
}

impl Forecast {
    pub fn tables(&self) -> [&ForecastTable; 3] {
        [&self.stories, &self.story_points, &self.items]
    }
}
