use std::io;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Weekday};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::calendar::{FreeDateRange, WorkCalendar};
use crate::services::consumption::{ConsumptionKind, ConsumptionStrategy};
use crate::services::throughput_model::{DEFAULT_PERIOD_DAYS, ThroughputPolicy};

pub const DEFAULT_RUNS: usize = 1000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("missing required setting '{0}'")]
    Missing(&'static str),
    #[error("run count must be greater than zero")]
    InvalidRunCount,
    #[error("period count must be greater than zero")]
    InvalidPeriodCount,
    #[error("history period count must be greater than zero")]
    InvalidHistoryPeriodCount,
    #[error("period length must be at least one day")]
    InvalidPeriodLength,
    #[error("the wip consumption policy needs a work-in-progress limit greater than zero")]
    InvalidWipLimit,
    #[error("invalid weekday value: {0}")]
    InvalidWeekday(String),
    #[error("invalid date format: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid date range: start_date {start_date} is after end_date {end_date}")]
    InvalidDateRange {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

/// Settings as written in a YAML config file or given on the command line.
/// Every field is optional; command-line values win.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastSettings {
    pub history: Option<PathBuf>,
    pub backlog: Option<PathBuf>,
    pub runs: Option<usize>,
    pub periods: Option<usize>,
    pub history_periods: Option<u32>,
    pub period_days: Option<u32>,
    pub start_date: Option<String>,
    pub throughput_policy: Option<ThroughputPolicy>,
    pub consumption: Option<ConsumptionKind>,
    pub wip_limit: Option<usize>,
    pub seed: Option<u64>,
    pub exclude_projects: Option<Vec<String>>,
    pub free_weekdays: Option<Vec<String>>,
    pub free_date_ranges: Option<Vec<FreeDateRangeRecord>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FreeDateRangeRecord {
    pub start_date: String,
    pub end_date: String,
}

impl ForecastSettings {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fields set in `overrides` replace the ones in `self`.
    pub fn merged_with(self, overrides: ForecastSettings) -> Self {
        Self {
            history: overrides.history.or(self.history),
            backlog: overrides.backlog.or(self.backlog),
            runs: overrides.runs.or(self.runs),
            periods: overrides.periods.or(self.periods),
            history_periods: overrides.history_periods.or(self.history_periods),
            period_days: overrides.period_days.or(self.period_days),
            start_date: overrides.start_date.or(self.start_date),
            throughput_policy: overrides.throughput_policy.or(self.throughput_policy),
            consumption: overrides.consumption.or(self.consumption),
            wip_limit: overrides.wip_limit.or(self.wip_limit),
            seed: overrides.seed.or(self.seed),
            exclude_projects: overrides.exclude_projects.or(self.exclude_projects),
            free_weekdays: overrides.free_weekdays.or(self.free_weekdays),
            free_date_ranges: overrides.free_date_ranges.or(self.free_date_ranges),
        }
    }
}

/// Validated, immutable configuration for one forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub history_path: PathBuf,
    pub backlog_path: PathBuf,
    pub runs: usize,
    pub periods: usize,
    pub history_periods: Option<u32>,
    pub period_days: u32,
    pub start_date: Option<NaiveDate>,
    pub throughput_policy: ThroughputPolicy,
    pub consumption: ConsumptionStrategy,
    pub seed: Option<u64>,
    pub exclude_projects: Vec<String>,
    pub calendar: WorkCalendar,
}

impl ForecastConfig {
    pub fn from_settings(settings: ForecastSettings) -> Result<Self, ConfigError> {
        let runs = settings.runs.unwrap_or(DEFAULT_RUNS);
        if runs == 0 {
            return Err(ConfigError::InvalidRunCount);
        }
        let periods = settings.periods.ok_or(ConfigError::Missing("periods"))?;
        if periods == 0 {
            return Err(ConfigError::InvalidPeriodCount);
        }
        if settings.history_periods == Some(0) {
            return Err(ConfigError::InvalidHistoryPeriodCount);
        }
        let period_days = settings.period_days.unwrap_or(DEFAULT_PERIOD_DAYS);
        if period_days == 0 {
            return Err(ConfigError::InvalidPeriodLength);
        }

        let consumption = match settings.consumption.unwrap_or(ConsumptionKind::Fifo) {
            ConsumptionKind::Fifo => ConsumptionStrategy::Fifo,
            ConsumptionKind::Wip => match settings.wip_limit {
                Some(limit) if limit > 0 => ConsumptionStrategy::WipLimited { limit },
                _ => return Err(ConfigError::InvalidWipLimit),
            },
        };

        Ok(Self {
            history_path: settings.history.ok_or(ConfigError::Missing("history"))?,
            backlog_path: settings.backlog.ok_or(ConfigError::Missing("backlog"))?,
            runs,
            periods,
            history_periods: settings.history_periods,
            period_days,
            start_date: settings.start_date.as_deref().map(parse_date).transpose()?,
            throughput_policy: settings.throughput_policy.unwrap_or(ThroughputPolicy::Normal),
            consumption,
            seed: settings.seed,
            exclude_projects: settings.exclude_projects.unwrap_or_default(),
            calendar: calendar_from_settings(
                settings.free_weekdays,
                settings.free_date_ranges,
            )?,
        })
    }
}

fn calendar_from_settings(
    free_weekdays: Option<Vec<String>>,
    free_date_ranges: Option<Vec<FreeDateRangeRecord>>,
) -> Result<WorkCalendar, ConfigError> {
    let mut calendar = WorkCalendar::new();
    if let Some(weekdays) = free_weekdays {
        calendar.free_weekdays = weekdays
            .into_iter()
            .map(|value| parse_weekday(&value).ok_or(ConfigError::InvalidWeekday(value)))
            .collect::<Result<Vec<_>, _>>()?;
    }
    calendar.free_date_ranges = free_date_ranges
        .unwrap_or_default()
        .into_iter()
        .map(free_date_range_from_record)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(calendar)
}

fn free_date_range_from_record(value: FreeDateRangeRecord) -> Result<FreeDateRange, ConfigError> {
    let start_date = parse_date(&value.start_date)?;
    let end_date = parse_date(&value.end_date)?;
    if start_date > end_date {
        return Err(ConfigError::InvalidDateRange {
            start_date,
            end_date,
        });
    }
    Ok(FreeDateRange {
        start_date,
        end_date,
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ConfigError::InvalidDate(value.to_string()))
}

fn parse_weekday(value: &str) -> Option<Weekday> {
    match value.trim().to_ascii_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::on_date;
    use assert_fs::prelude::*;

    fn minimal() -> ForecastSettings {
        ForecastSettings {
            history: Some(PathBuf::from("history.psv")),
            backlog: Some(PathBuf::from("backlog.psv")),
            periods: Some(6),
            ..ForecastSettings::default()
        }
    }

    #[test]
    fn defaults_fill_unset_values() {
        let config = ForecastConfig::from_settings(minimal()).unwrap();

        assert_eq!(config.runs, DEFAULT_RUNS);
        assert_eq!(config.periods, 6);
        assert_eq!(config.period_days, 7);
        assert_eq!(config.throughput_policy, ThroughputPolicy::Normal);
        assert_eq!(config.consumption, ConsumptionStrategy::Fifo);
        assert_eq!(config.calendar, WorkCalendar::new());
        assert_eq!(config.start_date, None);
    }

    #[test]
    fn zero_counts_are_configuration_errors() {
        let mut settings = minimal();
        settings.runs = Some(0);
        assert!(matches!(
            ForecastConfig::from_settings(settings),
            Err(ConfigError::InvalidRunCount)
        ));

        let mut settings = minimal();
        settings.periods = Some(0);
        assert!(matches!(
            ForecastConfig::from_settings(settings),
            Err(ConfigError::InvalidPeriodCount)
        ));

        let mut settings = minimal();
        settings.history_periods = Some(0);
        assert!(matches!(
            ForecastConfig::from_settings(settings),
            Err(ConfigError::InvalidHistoryPeriodCount)
        ));
    }

    #[test]
    fn wip_policy_requires_a_limit() {
        let mut settings = minimal();
        settings.consumption = Some(ConsumptionKind::Wip);
        assert!(matches!(
            ForecastConfig::from_settings(settings.clone()),
            Err(ConfigError::InvalidWipLimit)
        ));

        settings.wip_limit = Some(3);
        let config = ForecastConfig::from_settings(settings).unwrap();
        assert_eq!(config.consumption, ConsumptionStrategy::WipLimited { limit: 3 });
    }

    #[test]
    fn missing_paths_are_reported() {
        let mut settings = minimal();
        settings.backlog = None;
        assert!(matches!(
            ForecastConfig::from_settings(settings),
            Err(ConfigError::Missing("backlog"))
        ));
    }

    #[test]
    fn command_line_overrides_file_settings() {
        let file = ForecastSettings {
            runs: Some(50),
            periods: Some(4),
            seed: Some(1),
            ..minimal()
        };
        let cli = ForecastSettings {
            runs: Some(200),
            ..ForecastSettings::default()
        };

        let merged = file.merged_with(cli);
        assert_eq!(merged.runs, Some(200));
        assert_eq!(merged.periods, Some(4));
        assert_eq!(merged.seed, Some(1));
    }

    #[test]
    fn loads_yaml_config_with_calendar() {
        let file = assert_fs::NamedTempFile::new("forecast.yaml").unwrap();
        file.write_str(
            r#"history: history.psv
backlog: backlog.psv
runs: 500
periods: 8
start_date: 2026-01-05
throughput_policy: sampled
consumption: wip
wip_limit: 4
exclude_projects: [Live]
free_weekdays: [Fri, Sat, Sun]
free_date_ranges:
  - start_date: 2026-12-24
    end_date: 2026-12-31
"#,
        )
        .unwrap();

        let settings = ForecastSettings::from_yaml_file(file.path()).unwrap();
        let config = ForecastConfig::from_settings(settings).unwrap();

        assert_eq!(config.runs, 500);
        assert_eq!(config.start_date, Some(on_date(2026, 1, 5)));
        assert_eq!(config.throughput_policy, ThroughputPolicy::Sampled);
        assert_eq!(config.consumption, ConsumptionStrategy::WipLimited { limit: 4 });
        assert_eq!(config.exclude_projects, vec!["Live".to_string()]);
        assert_eq!(
            config.calendar.free_weekdays,
            vec![Weekday::Fri, Weekday::Sat, Weekday::Sun]
        );
        assert!(!config.calendar.is_workday(on_date(2026, 12, 28)));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        let file = assert_fs::NamedTempFile::new("forecast.yaml").unwrap();
        file.write_str("sprints: 4\n").unwrap();
        assert!(matches!(
            ForecastSettings::from_yaml_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));

        let mut settings = minimal();
        settings.free_weekdays = Some(vec!["Funday".to_string()]);
        assert!(matches!(
            ForecastConfig::from_settings(settings),
            Err(ConfigError::InvalidWeekday(value)) if value == "Funday"
        ));

        let mut settings = minimal();
        settings.free_date_ranges = Some(vec![FreeDateRangeRecord {
            start_date: "2026-02-21".to_string(),
            end_date: "2026-02-20".to_string(),
        }]);
        assert!(matches!(
            ForecastConfig::from_settings(settings),
            Err(ConfigError::InvalidDateRange { .. })
        ));

        let mut settings = minimal();
        settings.start_date = Some("05/01/2026".to_string());
        assert!(matches!(
            ForecastConfig::from_settings(settings),
            Err(ConfigError::InvalidDate(_))
        ));
    }

    #[test]
    fn missing_config_file_is_a_read_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let missing = temp.path().join("nope.yaml");
        assert!(matches!(
            ForecastSettings::from_yaml_file(&missing),
            Err(ConfigError::Read { path, .. }) if path == missing
        ));
    }
}
