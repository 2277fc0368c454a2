use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::services::consumption::ConsumptionKind;
use crate::services::forecast_config::ForecastSettings;
use crate::services::throughput_model::ThroughputPolicy;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forecast backlog completion with a Monte Carlo simulation over history
    Forecast(ForecastArgs),
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ForecastArgs {
    /// YAML file with forecast settings; command-line values take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// `|`-delimited table of completed issues
    #[arg(long)]
    pub history: Option<PathBuf>,
    /// `|`-delimited backlog table in priority order
    #[arg(short, long)]
    pub backlog: Option<PathBuf>,
    /// Number of simulation runs [default: 1000]
    #[arg(short = 'n', long)]
    pub runs: Option<usize>,
    /// Number of future periods to simulate
    #[arg(short, long)]
    pub periods: Option<usize>,
    /// Number of historical periods used to fit throughput
    #[arg(long)]
    pub history_periods: Option<u32>,
    /// Length of one period in days [default: 7]
    #[arg(long)]
    pub period_days: Option<u32>,
    /// First day of the historical window (YYYY-MM-DD)
    #[arg(short, long)]
    pub start_date: Option<String>,
    /// How per-period throughput is drawn [default: normal]
    #[arg(long, value_enum)]
    pub throughput_policy: Option<ThroughputPolicy>,
    /// How throughput turns into completed items [default: fifo]
    #[arg(long, value_enum)]
    pub consumption: Option<ConsumptionKind>,
    /// Items worked on at once under the wip consumption policy
    #[arg(long)]
    pub wip_limit: Option<usize>,
    /// Base seed for reproducible forecasts
    #[arg(long)]
    pub seed: Option<u64>,
    /// Drop history from projects whose name contains this marker
    #[arg(long = "exclude-project")]
    pub exclude_projects: Vec<String>,
    /// Write the forecast tables to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Write a YAML report with the forecast and its inputs
    #[arg(short, long)]
    pub report: Option<PathBuf>,
    /// Write a PNG chart of the item forecast
    #[arg(long)]
    pub plot: Option<PathBuf>,
}

impl ForecastArgs {
    /// The settings given on the command line, for merging over a config file.
    pub fn settings(&self) -> ForecastSettings {
        ForecastSettings {
            history: self.history.clone(),
            backlog: self.backlog.clone(),
            runs: self.runs,
            periods: self.periods,
            history_periods: self.history_periods,
            period_days: self.period_days,
            start_date: self.start_date.clone(),
            throughput_policy: self.throughput_policy,
            consumption: self.consumption,
            wip_limit: self.wip_limit,
            seed: self.seed,
            exclude_projects: (!self.exclude_projects.is_empty())
                .then(|| self.exclude_projects.clone()),
            free_weekdays: None,
            free_date_ranges: None,
        }
    }
}
