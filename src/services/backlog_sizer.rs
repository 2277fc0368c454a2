use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::domain::issue::{Issue, IssueType};
use crate::services::size_distribution::{BucketPlacement, SizeDistributionTable};

/// Size of an unestimated story: the smallest unit, for lack of any signal.
pub const UNESTIMATED_STORY_SIZE: f64 = 1.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SizingError {
    #[error("cannot size bug {0}: history contains no completed bugs")]
    NoBugHistory(String),
    #[error("cannot size story {0}: history contains no completed stories with story points")]
    NoStoryHistory(String),
}

/// Draws a size for each backlog item from the historical distributions.
#[derive(Debug, Clone, Copy)]
pub struct BacklogSizer<'a> {
    table: &'a SizeDistributionTable,
}

impl<'a> BacklogSizer<'a> {
    pub fn new(table: &'a SizeDistributionTable) -> Self {
        Self { table }
    }

    /// Checks that every backlog item can be sized, without drawing.
    pub fn validate(&self, backlog: &[Issue]) -> Result<(), SizingError> {
        for issue in backlog {
            match issue.issue_type {
                IssueType::Bug if self.table.bug_sizes().is_empty() => {
                    return Err(SizingError::NoBugHistory(issue.key.clone()));
                }
                IssueType::Story | IssueType::Other
                    if issue.story_points.is_some() && self.table.story_buckets().is_empty() =>
                {
                    return Err(SizingError::NoStoryHistory(issue.key.clone()));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns a sized copy of `backlog`, preserving its order.
    pub fn size_backlog<R: Rng + ?Sized>(
        &self,
        backlog: &[Issue],
        rng: &mut R,
    ) -> Result<Vec<Issue>, SizingError> {
        backlog
            .iter()
            .map(|issue| {
                let mut sized = issue.clone();
                sized.size = Some(self.sample_size(issue, rng)?);
                Ok(sized)
            })
            .collect()
    }

    pub fn sample_size<R: Rng + ?Sized>(
        &self,
        issue: &Issue,
        rng: &mut R,
    ) -> Result<f64, SizingError> {
        if issue.issue_type == IssueType::Bug {
            return self
                .table
                .bug_sizes()
                .choose(rng)
                .copied()
                .ok_or_else(|| SizingError::NoBugHistory(issue.key.clone()));
        }

        let points = match issue.story_points {
            Some(points) => points,
            None => return Ok(UNESTIMATED_STORY_SIZE),
        };
        let candidates = match self.table.placement(points) {
            BucketPlacement::Exact(bucket) => bucket.sizes.clone(),
            BucketPlacement::BelowSmallest(bucket) | BucketPlacement::AboveLargest(bucket) => {
                bucket.scaled_to(points)
            }
            BucketPlacement::Between(lower, upper) => {
                let mut union = lower.scaled_to(points);
                union.extend(upper.scaled_to(points));
                union
            }
            BucketPlacement::NoBuckets => Vec::new(),
        };

        candidates
            .choose(rng)
            .copied()
            .ok_or_else(|| SizingError::NoStoryHistory(issue.key.clone()))
    }
}
