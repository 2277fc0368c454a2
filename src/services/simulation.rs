use std::path::Path;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::forecast::{Forecast, RunResult};
use crate::domain::issue::Issue;
use crate::services::backlog_sizer::{BacklogSizer, SizingError};
use crate::services::forecast_config::{ConfigError, ForecastConfig};
use crate::services::forecast_plot::ForecastPlotError;
use crate::services::forecast_report::{ForecastReport, ForecastReportError, ForecastSummary};
use crate::services::history_filter::HistoryFilter;
use crate::services::issue_table::{IssueTableError, load_issues_from_psv_file};
use crate::services::size_distribution::SizeDistributionTable;
use crate::services::size_model::SizeModel;
use crate::services::sprint_simulator::SprintSimulator;
use crate::services::stats_aggregator::{StatsError, aggregate};
use crate::services::throughput_model::{HistoryWindow, ThroughputError, ThroughputMetadata};

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error(transparent)]
    IssueTable(#[from] IssueTableError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Throughput(#[from] ThroughputError),
    #[error(transparent)]
    Sizing(#[from] SizingError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Report(#[from] ForecastReportError),
    #[error(transparent)]
    Plot(#[from] ForecastPlotError),
}

/// Loads both issue tables named by `config` and forecasts the backlog.
pub fn forecast_from_files(config: &ForecastConfig) -> Result<ForecastReport, ForecastError> {
    let history = load_issues_from_psv_file(&config.history_path, &config.calendar)?;
    let backlog = load_issues_from_psv_file(&config.backlog_path, &config.calendar)?;
    info!(
        history = history.len(),
        backlog = backlog.len(),
        "loaded issue tables"
    );

    let mut report = run_forecast(config, history, &backlog)?;
    report.summary.history_source = source_name(&config.history_path);
    report.summary.backlog_source = source_name(&config.backlog_path);
    Ok(report)
}

/// Fits the size and throughput models to `history`, then simulates
/// `config.runs` independent runs over `backlog` and aggregates them.
pub fn run_forecast(
    config: &ForecastConfig,
    history: Vec<Issue>,
    backlog: &[Issue],
) -> Result<ForecastReport, ForecastError> {
    let history_issues = history.len();
    let mut history = HistoryFilter::new(config.exclude_projects.clone()).select(history);
    debug!(
        kept = history.len(),
        dropped = history_issues - history.len(),
        "filtered history"
    );

    let size_model = SizeModel::from_history(&history);
    size_model.assign_sizes(&mut history);
    info!(
        unit_size = size_model.unit_size(),
        source = %size_model.source(),
        "derived unit size"
    );

    let table = SizeDistributionTable::from_sized_history(&history);
    debug!(
        bugs = table.bug_sizes().len(),
        story_buckets = table.story_buckets().len(),
        "built size distribution table"
    );

    let window = HistoryWindow::resolve(
        &history,
        config.start_date,
        config.period_days,
        config.history_periods,
    )?;
    let throughput = ThroughputMetadata::fit(config.throughput_policy, &history, &window)?;
    info!(
        start = %window.start,
        periods = window.periods,
        model = %throughput,
        "fitted throughput"
    );

    let sizer = BacklogSizer::new(&table);
    sizer.validate(backlog)?;

    let policy = config.consumption.into_policy();
    let simulator = SprintSimulator::new(sizer, &throughput, policy.as_ref(), config.periods);
    let base_seed = config.seed.unwrap_or_else(rand::random);

    let started = Instant::now();
    let runs = run_ensemble(&simulator, backlog, config.runs, base_seed)?;
    info!(
        runs = runs.len(),
        base_seed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "simulated ensemble"
    );

    let forecast: Forecast = aggregate(backlog, &runs, config.periods)?;

    Ok(ForecastReport {
        summary: ForecastSummary {
            history_source: String::new(),
            backlog_source: String::new(),
            history_issues,
            sized_history_issues: history.len(),
            backlog_items: backlog.len(),
            unit_size: size_model.unit_size(),
            unit_source: size_model.source().to_string(),
            history_start: window.start.format("%Y-%m-%d").to_string(),
            history_periods: window.periods,
            period_days: window.period_days,
            throughput: throughput.to_string(),
            consumption: policy.name().to_string(),
            base_seed,
        },
        forecast,
    })
}

/// Runs are independent: run `i` draws from its own generator seeded with
/// `base_seed + i`, so the ensemble does not depend on thread scheduling.
pub fn run_ensemble(
    simulator: &SprintSimulator<'_>,
    backlog: &[Issue],
    runs: usize,
    base_seed: u64,
) -> Result<Vec<RunResult>, SizingError> {
    (0..runs)
        .into_par_iter()
        .map(|run| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(run as u64));
            simulator.run(backlog, &mut rng)
        })
        .collect()
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}
