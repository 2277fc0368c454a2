use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::issue::Issue;
use crate::domain::throughput::Throughput;

pub const DEFAULT_PERIOD_DAYS: u32 = 7;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThroughputError {
    #[error("insufficient history: {found} period(s) available, at least {required} required")]
    InsufficientHistory { found: usize, required: usize },
    #[error("period length must be at least one day")]
    InvalidPeriodLength,
    #[error("invalid throughput distribution: {0}")]
    InvalidDistribution(String),
    #[error("history window of {periods} period(s) of {period_days} day(s) from {start} runs past the supported date range")]
    WindowOutOfRange {
        start: NaiveDate,
        period_days: u32,
        periods: u32,
    },
}

/// How per-period throughput is drawn during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThroughputPolicy {
    /// Average historical size units per period, the same every period.
    Scalar,
    /// Normal distribution fitted to completed stories per period.
    Normal,
    /// Completed stories of a randomly chosen historical period.
    Sampled,
}

/// Consecutive fixed-length periods of history used to fit throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    pub start: NaiveDate,
    pub period_days: u32,
    pub periods: u32,
}

impl HistoryWindow {
    /// Fills in what the configuration left open: the start defaults to the
    /// earliest resolution date and the period count to however many
    /// periods reach the latest one.
    pub fn resolve(
        history: &[Issue],
        start: Option<NaiveDate>,
        period_days: u32,
        periods: Option<u32>,
    ) -> Result<Self, ThroughputError> {
        if period_days == 0 {
            return Err(ThroughputError::InvalidPeriodLength);
        }
        let resolved = history.iter().filter_map(|issue| issue.resolved_date);
        let start = match start.or_else(|| resolved.clone().min()) {
            Some(start) => start,
            None => {
                return Err(ThroughputError::InsufficientHistory {
                    found: 0,
                    required: 1,
                });
            }
        };
        let periods = periods.unwrap_or_else(|| match resolved.max() {
            Some(latest) if latest >= start => {
                let days = latest.signed_duration_since(start).num_days();
                (days / i64::from(period_days)) as u32 + 1
            }
            _ => 0,
        });

        let window = Self {
            start,
            period_days,
            periods,
        };
        if window.period_start(periods as usize).is_none() {
            return Err(ThroughputError::WindowOutOfRange {
                start,
                period_days,
                periods,
            });
        }
        Ok(window)
    }

    pub fn period_index(&self, date: NaiveDate) -> Option<usize> {
        if date < self.start {
            return None;
        }
        let days = date.signed_duration_since(self.start).num_days();
        let index = (days / i64::from(self.period_days)) as usize;
        (index < self.periods as usize).then_some(index)
    }

    /// `None` once the period would start past the last representable date.
    pub fn period_start(&self, index: usize) -> Option<NaiveDate> {
        let offset = (index as u64).checked_mul(u64::from(self.period_days))?;
        self.start.checked_add_days(chrono::Days::new(offset))
    }
}

/// Completed stories per period of the window, including empty periods.
pub fn completed_stories_per_period(history: &[Issue], window: &HistoryWindow) -> Vec<Throughput> {
    let mut counts = vec![0u32; window.periods as usize];
    for issue in history.iter().filter(|issue| issue.is_story()) {
        if let Some(index) = issue.resolved_date.and_then(|date| window.period_index(date)) {
            counts[index] += 1;
        }
    }

    counts
        .into_iter()
        .enumerate()
        .filter_map(|(index, completed_issues)| {
            window.period_start(index).map(|period_start| Throughput {
                period_start,
                completed_issues,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct NormalThroughput {
    pub mean: f64,
    pub std_dev: f64,
    distribution: Normal<f64>,
}

impl PartialEq for NormalThroughput {
    fn eq(&self, other: &Self) -> bool {
        self.mean == other.mean && self.std_dev == other.std_dev
    }
}

/// Fitted once per forecast, then shared read-only by every run.
#[derive(Debug, Clone, PartialEq)]
pub enum ThroughputMetadata {
    Fixed(u32),
    Normal(NormalThroughput),
    Sampled(Vec<u32>),
}

impl ThroughputMetadata {
    pub fn fit(
        policy: ThroughputPolicy,
        sized_history: &[Issue],
        window: &HistoryWindow,
    ) -> Result<Self, ThroughputError> {
        match policy {
            ThroughputPolicy::Scalar => Self::scalar(sized_history, window),
            ThroughputPolicy::Normal => {
                Self::normal_from_counts(&story_counts(sized_history, window))
            }
            ThroughputPolicy::Sampled => {
                Self::sampled_from_counts(story_counts(sized_history, window))
            }
        }
    }

    /// Rounded average of size units resolved per period of the window.
    pub fn scalar(sized_history: &[Issue], window: &HistoryWindow) -> Result<Self, ThroughputError> {
        if window.periods == 0 {
            return Err(ThroughputError::InsufficientHistory {
                found: 0,
                required: 1,
            });
        }
        let total_size: f64 = sized_history
            .iter()
            .filter(|issue| {
                issue
                    .resolved_date
                    .is_some_and(|date| window.period_index(date).is_some())
            })
            .filter_map(|issue| issue.size)
            .sum();
        let throughput = (total_size / f64::from(window.periods)).round() as u32;
        Ok(Self::Fixed(throughput))
    }

    pub fn normal_from_counts(counts: &[u32]) -> Result<Self, ThroughputError> {
        require_periods(counts.len())?;
        let n = counts.len() as f64;
        let mean = counts.iter().map(|count| f64::from(*count)).sum::<f64>() / n;
        let variance = counts
            .iter()
            .map(|count| (f64::from(*count) - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        let std_dev = variance.sqrt();
        let distribution = Normal::new(mean, std_dev)
            .map_err(|e| ThroughputError::InvalidDistribution(e.to_string()))?;

        Ok(Self::Normal(NormalThroughput {
            mean,
            std_dev,
            distribution,
        }))
    }

    pub fn sampled_from_counts(counts: Vec<u32>) -> Result<Self, ThroughputError> {
        require_periods(counts.len())?;
        Ok(Self::Sampled(counts))
    }

    /// Throughput for one simulated period. Normal draws are rounded and
    /// never negative.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match self {
            Self::Fixed(throughput) => *throughput,
            Self::Normal(normal) => normal.distribution.sample(rng).round().max(0.0) as u32,
            Self::Sampled(counts) => counts.choose(rng).copied().unwrap_or(0),
        }
    }
}

impl fmt::Display for ThroughputMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(throughput) => write!(f, "fixed {throughput} per period"),
            Self::Normal(normal) => {
                write!(f, "normal mean {:.2} sd {:.2}", normal.mean, normal.std_dev)
            }
            Self::Sampled(counts) => write!(f, "sampled from {} periods", counts.len()),
        }
    }
}

fn story_counts(history: &[Issue], window: &HistoryWindow) -> Vec<u32> {
    completed_stories_per_period(history, window)
        .into_iter()
        .map(|throughput| throughput.completed_issues)
        .collect()
}

fn require_periods(found: usize) -> Result<(), ThroughputError> {
    const REQUIRED: usize = 2;
    if found < REQUIRED {
        return Err(ThroughputError::InsufficientHistory {
            found,
            required: REQUIRED,
        });
    }
    Ok(())
}
