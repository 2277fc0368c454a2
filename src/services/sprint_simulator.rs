use rand::Rng;

use crate::domain::forecast::{PeriodOutcome, RunResult};
use crate::domain::issue::{Issue, IssueType};
use crate::services::backlog_sizer::{BacklogSizer, SizingError};
use crate::services::consumption::{ConsumptionPolicy, RunBacklog};
use crate::services::throughput_model::ThroughputMetadata;

/// Simulates one team working through the backlog for a fixed number of
/// periods. Shared inputs are borrowed read-only, so one simulator serves
/// every run of an ensemble.
pub struct SprintSimulator<'a> {
    sizer: BacklogSizer<'a>,
    throughput: &'a ThroughputMetadata,
    policy: &'a dyn ConsumptionPolicy,
    periods: usize,
}

impl<'a> SprintSimulator<'a> {
    pub fn new(
        sizer: BacklogSizer<'a>,
        throughput: &'a ThroughputMetadata,
        policy: &'a dyn ConsumptionPolicy,
        periods: usize,
    ) -> Self {
        Self {
            sizer,
            throughput,
            policy,
            periods,
        }
    }

    /// Runs every period, even after the backlog is exhausted; such periods
    /// simply complete nothing.
    pub fn run<R: Rng>(&self, backlog: &[Issue], rng: &mut R) -> Result<RunResult, SizingError> {
        let sized = self.sizer.size_backlog(backlog, rng)?;
        let mut run_backlog = RunBacklog::new(sized);

        let mut periods = Vec::with_capacity(self.periods);
        for _ in 0..self.periods {
            let throughput = self.throughput.draw(rng);
            let completed = self.policy.consume(&mut run_backlog, throughput, rng);
            periods.push(tally_period(completed, run_backlog.remaining()));
        }

        Ok(RunResult { periods })
    }
}

fn tally_period(completed: Vec<Issue>, remaining: usize) -> PeriodOutcome {
    let mut outcome = PeriodOutcome {
        remaining,
        ..PeriodOutcome::default()
    };
    for issue in completed {
        if let (IssueType::Story, Some(points)) = (issue.issue_type, issue.story_points) {
            outcome.stories += 1;
            outcome.story_points += points;
        }
        outcome.items += 1;
        outcome.completed_keys.push(issue.key);
    }
    outcome
}
