use crate::domain::issue::{Issue, IssueType, points_match};

/// Observed sizes of historical stories sharing one story point value.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryBucket {
    pub points: f64,
    pub sizes: Vec<f64>,
}

impl StoryBucket {
    /// Sizes rescaled to `target` points. A zero-point bucket has no ratio
    /// to scale by and keeps its observations.
    pub fn scaled_to(&self, target: f64) -> Vec<f64> {
        if self.points <= 0.0 {
            return self.sizes.clone();
        }
        let ratio = target / self.points;
        self.sizes.iter().map(|size| size * ratio).collect()
    }
}

/// Where a story point value falls among the observed buckets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BucketPlacement<'a> {
    Exact(&'a StoryBucket),
    BelowSmallest(&'a StoryBucket),
    AboveLargest(&'a StoryBucket),
    Between(&'a StoryBucket, &'a StoryBucket),
    NoBuckets,
}

/// Empirical size distributions of completed work, by bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeDistributionTable {
    bug_sizes: Vec<f64>,
    /// Sorted by ascending points, never empty.
    story_buckets: Vec<StoryBucket>,
}

impl SizeDistributionTable {
    /// Builds the table from sized history. Issues without a size, stories
    /// without points and other issue types are left out.
    pub fn from_sized_history(history: &[Issue]) -> Self {
        let mut table = Self::default();
        for issue in history {
            let size = match issue.size {
                Some(size) => size,
                None => continue,
            };
            match (issue.issue_type, issue.story_points) {
                (IssueType::Bug, _) => table.bug_sizes.push(size),
                (IssueType::Story, Some(points)) => table.push_story(points, size),
                _ => {}
            }
        }
        table
    }

    fn push_story(&mut self, points: f64, size: f64) {
        if let Some(bucket) = self
            .story_buckets
            .iter_mut()
            .find(|bucket| points_match(bucket.points, points))
        {
            bucket.sizes.push(size);
            return;
        }

        let index = self
            .story_buckets
            .partition_point(|bucket| bucket.points < points);
        self.story_buckets.insert(
            index,
            StoryBucket {
                points,
                sizes: vec![size],
            },
        );
    }

    pub fn bug_sizes(&self) -> &[f64] {
        &self.bug_sizes
    }

    pub fn story_buckets(&self) -> &[StoryBucket] {
        &self.story_buckets
    }

    pub fn story_bucket(&self, points: f64) -> Option<&StoryBucket> {
        self.story_buckets
            .iter()
            .find(|bucket| points_match(bucket.points, points))
    }

    pub fn placement(&self, points: f64) -> BucketPlacement<'_> {
        if let Some(bucket) = self.story_bucket(points) {
            return BucketPlacement::Exact(bucket);
        }
        let (first, last) = match (self.story_buckets.first(), self.story_buckets.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return BucketPlacement::NoBuckets,
        };
        if points < first.points {
            return BucketPlacement::BelowSmallest(first);
        }
        if points > last.points {
            return BucketPlacement::AboveLargest(last);
        }

        let upper = self
            .story_buckets
            .partition_point(|bucket| bucket.points < points);
        BucketPlacement::Between(&self.story_buckets[upper - 1], &self.story_buckets[upper])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sized_issue;

    fn table() -> SizeDistributionTable {
        SizeDistributionTable::from_sized_history(&[
            sized_issue("B-1", IssueType::Bug, None, 1.0),
            sized_issue("B-2", IssueType::Bug, None, 2.0),
            sized_issue("S-1", IssueType::Story, Some(3.0), 3.0),
            sized_issue("S-2", IssueType::Story, Some(1.0), 1.0),
            sized_issue("S-3", IssueType::Story, Some(3.0 + 1e-9), 4.0),
            sized_issue("S-4", IssueType::Story, Some(8.0), 9.0),
            sized_issue("S-5", IssueType::Story, None, 2.0),
            sized_issue("T-1", IssueType::Other, Some(3.0), 7.0),
        ])
    }

    #[test]
    fn groups_bugs_and_story_points() {
        let table = table();

        assert_eq!(table.bug_sizes(), &[1.0, 2.0]);
        let keys: Vec<f64> = table.story_buckets().iter().map(|b| b.points).collect();
        assert_eq!(keys, vec![1.0, 3.0, 8.0]);
        assert_eq!(table.story_bucket(3.0).unwrap().sizes, vec![3.0, 4.0]);
    }

    #[test]
    fn empty_buckets_are_absent() {
        let table = SizeDistributionTable::from_sized_history(&[sized_issue(
            "S-1",
            IssueType::Story,
            Some(2.0),
            2.0,
        )]);

        assert!(table.bug_sizes().is_empty());
        assert_eq!(table.story_buckets().len(), 1);
        assert!(table.story_bucket(5.0).is_none());
    }

    #[test]
    fn placement_finds_neighbours() {
        let table = table();

        assert!(matches!(table.placement(3.0), BucketPlacement::Exact(b) if b.points == 3.0));
        assert!(matches!(table.placement(0.5), BucketPlacement::BelowSmallest(b) if b.points == 1.0));
        assert!(matches!(table.placement(13.0), BucketPlacement::AboveLargest(b) if b.points == 8.0));
        assert!(matches!(
            table.placement(5.0),
            BucketPlacement::Between(lo, hi) if lo.points == 3.0 && hi.points == 8.0
        ));
        assert!(matches!(
            table.placement(2.0),
            BucketPlacement::Between(lo, hi) if lo.points == 1.0 && hi.points == 3.0
        ));
        assert!(matches!(
            SizeDistributionTable::default().placement(2.0),
            BucketPlacement::NoBuckets
        ));
    }

    #[test]
    fn scaled_to_applies_point_ratio() {
        let bucket = StoryBucket {
            points: 2.0,
            sizes: vec![2.0, 4.0],
        };
        assert_eq!(bucket.scaled_to(5.0), vec![5.0, 10.0]);

        let zero = StoryBucket {
            points: 0.0,
            sizes: vec![1.0],
        };
        assert_eq!(zero.scaled_to(1.0), vec![1.0]);
    }
}
