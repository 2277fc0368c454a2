use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::domain::forecast::Forecast;

#[derive(Error, Debug)]
pub enum ForecastReportError {
    #[error("failed to serialize forecast report: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("failed to write forecast report: {0}")]
    Write(#[from] std::io::Error),
}

/// How the forecast was produced, so a report can be reproduced.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    pub history_source: String,
    pub backlog_source: String,
    pub history_issues: usize,
    pub sized_history_issues: usize,
    pub backlog_items: usize,
    pub unit_size: f64,
    pub unit_source: String,
    pub history_start: String,
    pub history_periods: u32,
    pub period_days: u32,
    pub throughput: String,
    pub consumption: String,
    pub base_seed: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForecastReport {
    pub summary: ForecastSummary,
    pub forecast: Forecast,
}

pub fn serialize_report_to_yaml<W: Write>(
    writer: &mut W,
    report: &ForecastReport,
) -> Result<(), ForecastReportError> {
    let yaml = serde_yaml::to_string(report)?;
    writer.write_all(yaml.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::{CompletionChance, ForecastTable, Statistic};

    fn table(statistic: Statistic) -> ForecastTable {
        ForecastTable {
            statistic,
            p10: vec![1.0],
            p50: vec![2.0],
            p90: vec![3.0],
        }
    }

    #[test]
    fn report_serializes_summary_and_tables() {
        let report = ForecastReport {
            summary: ForecastSummary {
                history_source: "history.psv".to_string(),
                backlog_source: "backlog.psv".to_string(),
                history_issues: 10,
                sized_history_issues: 8,
                backlog_items: 1,
                unit_size: 4.0,
                unit_source: "one-point stories".to_string(),
                history_start: "2026-01-05".to_string(),
                history_periods: 6,
                period_days: 7,
                throughput: "fixed 2 per period".to_string(),
                consumption: "fifo".to_string(),
                base_seed: 42,
            },
            forecast: Forecast {
                runs: 4,
                periods: 1,
                completion_chance: vec![CompletionChance {
                    key: "A-1".to_string(),
                    chances: vec![0.75],
                }],
                stories: table(Statistic::Stories),
                story_points: table(Statistic::StoryPoints),
                items: table(Statistic::Items),
            },
        };

        let mut buffer = Vec::new();
        serialize_report_to_yaml(&mut buffer, &report).unwrap();
        let yaml = String::from_utf8(buffer).unwrap();

        assert!(yaml.contains("base_seed: 42"));
        assert!(yaml.contains("unit_source: one-point stories"));
        assert!(yaml.contains("key: A-1"));
        assert!(yaml.contains("statistic: story_points"));
        assert!(yaml.contains("- 0.75"));
    }
}
