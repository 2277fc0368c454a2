use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::domain::forecast::{CompletionChance, Forecast, ForecastTable, RunResult, Statistic};
use crate::domain::issue::Issue;
use crate::services::percentiles::percentiles_of;

pub const FORECAST_PERCENTILES: [f64; 3] = [10.0, 50.0, 90.0];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("cannot aggregate an ensemble of zero runs")]
    NoRuns,
    #[error("run {run} covers {found} periods, expected {expected}")]
    PeriodMismatch {
        run: usize,
        found: usize,
        expected: usize,
    },
}

/// Reduces an ensemble of runs into completion chances and percentile
/// forecasts. The result depends only on the set of runs, not their order.
pub fn aggregate(
    backlog: &[Issue],
    runs: &[RunResult],
    periods: usize,
) -> Result<Forecast, StatsError> {
    if runs.is_empty() {
        return Err(StatsError::NoRuns);
    }
    for (run, result) in runs.iter().enumerate() {
        if result.periods.len() != periods {
            return Err(StatsError::PeriodMismatch {
                run,
                found: result.periods.len(),
                expected: periods,
            });
        }
    }

    Ok(Forecast {
        runs: runs.len(),
        periods,
        completion_chance: completion_chances(backlog, runs, periods),
        stories: forecast_table(Statistic::Stories, runs, periods),
        story_points: forecast_table(Statistic::StoryPoints, runs, periods),
        items: forecast_table(Statistic::Items, runs, periods),
    })
}

/// Fraction of runs in which each backlog item finished by each period.
/// Built from cumulative counts, so each row is non-decreasing.
pub fn completion_chances(
    backlog: &[Issue],
    runs: &[RunResult],
    periods: usize,
) -> Vec<CompletionChance> {
    let mut finished_in: HashMap<&str, Vec<usize>> = backlog
        .iter()
        .map(|issue| (issue.key.as_str(), vec![0; periods]))
        .collect();
    for run in runs {
        let mut seen: HashSet<&str> = HashSet::new();
        for (period, outcome) in run.periods.iter().enumerate().take(periods) {
            for key in &outcome.completed_keys {
                if !seen.insert(key.as_str()) {
                    continue;
                }
                if let Some(counts) = finished_in.get_mut(key.as_str()) {
                    counts[period] += 1;
                }
            }
        }
    }

    let total = runs.len() as f64;
    backlog
        .iter()
        .map(|issue| {
            let mut cumulative = 0;
            let chances = finished_in
                .get(issue.key.as_str())
                .map(|counts| {
                    counts
                        .iter()
                        .map(|count| {
                            cumulative += count;
                            cumulative as f64 / total
                        })
                        .collect()
                })
                .unwrap_or_default();
            CompletionChance {
                key: issue.key.clone(),
                chances,
            }
        })
        .collect()
}

pub fn forecast_table(statistic: Statistic, runs: &[RunResult], periods: usize) -> ForecastTable {
    let mut table = ForecastTable {
        statistic,
        p10: Vec::with_capacity(periods),
        p50: Vec::with_capacity(periods),
        p90: Vec::with_capacity(periods),
    };
    for period in 0..periods {
        let values: Vec<f64> = runs
            .iter()
            .filter_map(|run| run.periods.get(period))
            .map(|outcome| statistic.value(outcome))
            .collect();
        let [p10, p50, p90] = match percentiles_of(&values, &FORECAST_PERCENTILES).as_deref() {
            Some(&[p10, p50, p90]) => [p10, p50, p90],
            _ => [0.0; 3],
        };
        table.p10.push(p10);
        table.p50.push(p50);
        table.p90.push(p90);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::PeriodOutcome;
    use crate::domain::issue::IssueType;
    use crate::test_support::backlog_issue;
    use proptest::prelude::*;

    fn outcome(keys: &[&str], stories: u32, points: f64) -> PeriodOutcome {
        PeriodOutcome {
            completed_keys: keys.iter().map(|key| key.to_string()).collect(),
            items: keys.len() as u32,
            stories,
            story_points: points,
            remaining: 0,
        }
    }

    fn backlog() -> Vec<Issue> {
        vec![
            backlog_issue("A", IssueType::Story, Some(1.0)),
            backlog_issue("B", IssueType::Story, Some(2.0)),
            backlog_issue("C", IssueType::Bug, None),
        ]
    }

    fn ensemble() -> Vec<RunResult> {
        vec![
            RunResult {
                periods: vec![outcome(&["A", "B"], 2, 3.0), outcome(&["C"], 0, 0.0)],
            },
            RunResult {
                periods: vec![outcome(&["A"], 1, 1.0), outcome(&["B"], 1, 2.0)],
            },
            RunResult {
                periods: vec![outcome(&[], 0, 0.0), outcome(&["A"], 1, 1.0)],
            },
            RunResult {
                periods: vec![outcome(&["A", "B", "C"], 2, 3.0), outcome(&[], 0, 0.0)],
            },
        ]
    }

    #[test]
    fn completion_chance_is_cumulative_fraction_of_runs() {
        let forecast = aggregate(&backlog(), &ensemble(), 2).unwrap();
        let chances: Vec<(&str, &[f64])> = forecast
            .completion_chance
            .iter()
            .map(|row| (row.key.as_str(), row.chances.as_slice()))
            .collect();

        assert_eq!(
            chances,
            vec![
                ("A", &[0.75, 1.0][..]),
                ("B", &[0.5, 0.75][..]),
                ("C", &[0.25, 0.5][..]),
            ]
        );
    }

    #[test]
    fn items_never_completed_have_zero_chance() {
        let mut backlog = backlog();
        backlog.push(backlog_issue("Z", IssueType::Story, None));

        let forecast = aggregate(&backlog, &ensemble(), 2).unwrap();
        assert_eq!(forecast.completion_chance[3].chances, vec![0.0, 0.0]);
    }

    #[test]
    fn percentiles_interpolate_across_runs() {
        let forecast = aggregate(&backlog(), &ensemble(), 2).unwrap();

        // Items in period 1 across runs: [2, 1, 0, 3] -> sorted [0, 1, 2, 3].
        assert!((forecast.items.p10[0] - 0.3).abs() < 1e-12);
        assert!((forecast.items.p50[0] - 1.5).abs() < 1e-12);
        assert!((forecast.items.p90[0] - 2.7).abs() < 1e-12);
        // Story points in period 2: [0, 2, 1, 0] -> sorted [0, 0, 1, 2].
        assert!((forecast.story_points.p50[1] - 0.5).abs() < 1e-12);
        assert_eq!(forecast.stories.statistic, Statistic::Stories);
    }

    #[test]
    fn zero_runs_is_a_configuration_error() {
        assert_eq!(aggregate(&backlog(), &[], 3), Err(StatsError::NoRuns));
    }

    #[test]
    fn runs_must_cover_every_period() {
        let err = aggregate(&backlog(), &ensemble(), 3).unwrap_err();
        assert!(matches!(err, StatsError::PeriodMismatch { run: 0, found: 2, expected: 3 }));
    }

    #[test]
    fn aggregation_is_idempotent_and_order_independent() {
        let runs = ensemble();
        let first = aggregate(&backlog(), &runs, 2).unwrap();
        let second = aggregate(&backlog(), &runs, 2).unwrap();
        assert_eq!(first, second);

        let mut reversed = runs.clone();
        reversed.reverse();
        assert_eq!(aggregate(&backlog(), &reversed, 2).unwrap(), first);
    }

    fn arbitrary_run(periods: usize) -> impl Strategy<Value = RunResult> {
        prop::collection::vec(
            (prop::collection::vec(0usize..5, 0..3), 0u32..4, 0.0f64..13.0),
            periods,
        )
        .prop_map(|raw| RunResult {
            periods: raw
                .into_iter()
                .map(|(keys, stories, points)| PeriodOutcome {
                    items: keys.len() as u32,
                    completed_keys: keys.iter().map(|idx| format!("K-{idx}")).collect(),
                    stories,
                    story_points: points,
                    remaining: 0,
                })
                .collect(),
        })
    }

    proptest! {
        #[test]
        fn forecasts_are_ordered_and_chances_monotonic(
            runs in prop::collection::vec(arbitrary_run(4), 1..30)
        ) {
            let backlog: Vec<Issue> = (0..5)
                .map(|idx| backlog_issue(&format!("K-{idx}"), IssueType::Story, Some(1.0)))
                .collect();
            let forecast = aggregate(&backlog, &runs, 4).unwrap();

            for table in forecast.tables() {
                for period in 0..4 {
                    prop_assert!(table.p10[period] <= table.p50[period]);
                    prop_assert!(table.p50[period] <= table.p90[period]);
                }
            }
            for row in &forecast.completion_chance {
                for pair in row.chances.windows(2) {
                    prop_assert!(pair[0] <= pair[1]);
                }
                prop_assert!(row.chances.iter().all(|chance| (0.0..=1.0).contains(chance)));
            }
        }
    }
}
