use std::fmt;

use crate::domain::issue::Issue;

/// Cycle time that counts as one unit of work when history has nothing
/// better to offer.
pub const DEFAULT_UNIT_SIZE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSource {
    OnePointStories,
    Bugs,
    Default,
}

impl fmt::Display for UnitSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UnitSource::OnePointStories => "one-point stories",
            UnitSource::Bugs => "bugs",
            UnitSource::Default => "default",
        };
        f.write_str(label)
    }
}

/// Converts cycle time into units of work.
///
/// The unit is the median cycle time of one-point stories, falling back to
/// the median bug, then to a single business day. Sizing work by how long it
/// took is an approximation: it conflates estimate and measurement, which is
/// accepted here because history carries no independent size signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeModel {
    unit_size: f64,
    source: UnitSource,
}

impl SizeModel {
    pub fn from_history(history: &[Issue]) -> Self {
        let one_point_stories: Vec<f64> = history
            .iter()
            .filter(|issue| issue.is_story() && issue.has_points(1.0))
            .filter_map(|issue| issue.cycle_time_days)
            .map(f64::from)
            .collect();
        if let Some(unit_size) = positive_median(one_point_stories) {
            return Self::new(unit_size, UnitSource::OnePointStories);
        }

        let bugs: Vec<f64> = history
            .iter()
            .filter(|issue| issue.is_bug())
            .filter_map(|issue| issue.cycle_time_days)
            .map(f64::from)
            .collect();
        if let Some(unit_size) = positive_median(bugs) {
            return Self::new(unit_size, UnitSource::Bugs);
        }

        Self::new(DEFAULT_UNIT_SIZE, UnitSource::Default)
    }

    fn new(unit_size: f64, source: UnitSource) -> Self {
        Self { unit_size, source }
    }

    pub fn unit_size(&self) -> f64 {
        self.unit_size
    }

    pub fn source(&self) -> UnitSource {
        self.source
    }

    /// Every finished issue took at least one unit of work.
    pub fn size_for(&self, cycle_time_days: u32) -> u32 {
        let units = (f64::from(cycle_time_days) / self.unit_size).round() as u32;
        units.max(1)
    }

    /// Sets `size` on every issue with a known cycle time.
    pub fn assign_sizes(&self, history: &mut [Issue]) {
        for issue in history.iter_mut() {
            if let Some(cycle_time) = issue.cycle_time_days {
                issue.size = Some(f64::from(self.size_for(cycle_time)));
            }
        }
    }
}

pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn positive_median(values: Vec<f64>) -> Option<f64> {
    median(values).filter(|value| *value > 0.0)
}
