use std::collections::VecDeque;

use clap::ValueEnum;
use rand::{Rng, RngCore};
use serde::Deserialize;

use crate::domain::issue::Issue;

/// One run's private copy of the backlog. Nothing in it is shared between
/// runs.
#[derive(Debug, Clone, Default)]
pub struct RunBacklog {
    pending: VecDeque<Issue>,
    in_progress: Vec<InProgress>,
}

#[derive(Debug, Clone)]
struct InProgress {
    issue: Issue,
    remaining: f64,
}

impl RunBacklog {
    /// `sized` must be in priority order.
    pub fn new(sized: Vec<Issue>) -> Self {
        Self {
            pending: sized.into(),
            in_progress: Vec::new(),
        }
    }

    /// Items not yet completed, started or not.
    pub fn remaining(&self) -> usize {
        self.pending.len() + self.in_progress.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[cfg(test)]
    fn in_progress_keys(&self) -> Vec<&str> {
        self.in_progress
            .iter()
            .map(|item| item.issue.key.as_str())
            .collect()
    }
}

/// How a run turns one period's throughput into completed backlog items.
pub trait ConsumptionPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Completes work for one period and returns the finished items in
    /// completion order.
    fn consume(&self, backlog: &mut RunBacklog, throughput: u32, rng: &mut dyn RngCore)
    -> Vec<Issue>;
}

/// Whole items leave the head of the backlog, `throughput` per period.
#[derive(Debug, Clone, Copy, Default)]
pub struct FifoThroughput;

impl ConsumptionPolicy for FifoThroughput {
    fn name(&self) -> &'static str {
        "fifo"
    }

    fn consume(
        &self,
        backlog: &mut RunBacklog,
        throughput: u32,
        _rng: &mut dyn RngCore,
    ) -> Vec<Issue> {
        let count = (throughput as usize).min(backlog.pending.len());
        backlog.pending.drain(..count).collect()
    }
}

/// At most `limit` items are worked on at once. Every unit of throughput
/// removes one unit of remaining size from a randomly chosen item in
/// progress, and freed slots are refilled from the head of the backlog.
#[derive(Debug, Clone, Copy)]
pub struct WipLimited {
    limit: usize,
}

impl WipLimited {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    fn refill(&self, backlog: &mut RunBacklog) {
        while backlog.in_progress.len() < self.limit {
            let issue = match backlog.pending.pop_front() {
                Some(issue) => issue,
                None => break,
            };
            let remaining = issue.size.unwrap_or(1.0);
            backlog.in_progress.push(InProgress { issue, remaining });
        }
    }
}

impl ConsumptionPolicy for WipLimited {
    fn name(&self) -> &'static str {
        "wip"
    }

    fn consume(
        &self,
        backlog: &mut RunBacklog,
        throughput: u32,
        rng: &mut dyn RngCore,
    ) -> Vec<Issue> {
        let mut completed = Vec::new();
        for _ in 0..throughput {
            self.refill(backlog);
            if backlog.in_progress.is_empty() {
                break;
            }
            let index = rng.gen_range(0..backlog.in_progress.len());
            let item = &mut backlog.in_progress[index];
            item.remaining -= 1.0;
            if item.remaining <= 0.0 {
                completed.push(backlog.in_progress.remove(index).issue);
            }
        }
        self.refill(backlog);
        completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionKind {
    /// Whole items per unit of throughput, in priority order.
    Fifo,
    /// Work-in-progress limited, partial completion of sized items.
    Wip,
}

/// The consumption policy a forecast was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionStrategy {
    Fifo,
    WipLimited { limit: usize },
}

impl ConsumptionStrategy {
    pub fn into_policy(self) -> Box<dyn ConsumptionPolicy> {
        match self {
            ConsumptionStrategy::Fifo => Box::new(FifoThroughput),
            ConsumptionStrategy::WipLimited { limit } => Box::new(WipLimited::new(limit)),
        }
    }
}
