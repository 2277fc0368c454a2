use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::domain::calendar::WorkCalendar;
use crate::domain::issue::{Issue, IssueType};

const DELIMITER: char = '|';

const KEY: &str = "Key";
const PROJECT: &str = "Project";
const ISSUE_TYPE: &str = "Issue Type";
const STORY_POINTS: &[&str] = &["Story Points", "Story Point"];
const CREATED_DATE: &str = "Created Date";
const IN_PROGRESS_DATE: &str = "In Progress Date";
const RESOLVED_DATE: &str = "Resolved Date";
const CYCLE_TIME: &str = "Cycle Time(Days)";

#[derive(Error, Debug)]
pub enum IssueTableError {
    #[error("failed to read issue table {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("issue table is empty, a header row is required")]
    MissingHeader,
    #[error("issue table is missing required column '{0}'")]
    MissingColumn(String),
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: empty issue key")]
    EmptyKey { line: usize },
    #[error("line {line}: duplicate issue key '{key}'")]
    DuplicateKey { line: usize, key: String },
    #[error("line {line}: invalid number in column '{column}': {value}")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },
    #[error("line {line}: invalid date in column '{column}': {value}")]
    InvalidDate {
        line: usize,
        column: String,
        value: String,
    },
}

/// Column positions resolved from the header row.
struct Columns {
    width: usize,
    key: usize,
    issue_type: usize,
    project: Option<usize>,
    story_points: Option<(usize, &'static str)>,
    created_date: Option<usize>,
    in_progress_date: Option<usize>,
    resolved_date: Option<usize>,
    cycle_time: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> Result<Self, IssueTableError> {
        let positions: HashMap<&str, usize> = header
            .split(DELIMITER)
            .enumerate()
            .map(|(idx, name)| (name.trim(), idx))
            .collect();
        let required = |name: &str| {
            positions
                .get(name)
                .copied()
                .ok_or_else(|| IssueTableError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            width: header.split(DELIMITER).count(),
            key: required(KEY)?,
            issue_type: required(ISSUE_TYPE)?,
            project: positions.get(PROJECT).copied(),
            story_points: STORY_POINTS
                .iter()
                .find_map(|name| positions.get(name).map(|idx| (*idx, *name))),
            created_date: positions.get(CREATED_DATE).copied(),
            in_progress_date: positions.get(IN_PROGRESS_DATE).copied(),
            resolved_date: positions.get(RESOLVED_DATE).copied(),
            cycle_time: positions.get(CYCLE_TIME).copied(),
        })
    }
}

pub fn load_issues_from_psv_file<P: AsRef<Path>>(
    path: P,
    calendar: &WorkCalendar,
) -> Result<Vec<Issue>, IssueTableError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| IssueTableError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_issues_from_psv_str(&contents, calendar)
}

/// Parses a `|`-delimited issue table. Row order is preserved, so a backlog
/// keeps its priority order. Keys must be unique within the table.
///
/// When the cycle time column is blank but both the in-progress and resolved
/// dates are known, cycle time is counted in business days of `calendar`.
pub fn parse_issues_from_psv_str(
    input: &str,
    calendar: &WorkCalendar,
) -> Result<Vec<Issue>, IssueTableError> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines.next().ok_or(IssueTableError::MissingHeader)?;
    let columns = Columns::from_header(header)?;

    let mut keys = HashSet::new();
    let mut issues = Vec::new();
    for (line, row) in lines {
        let issue = parse_row(line, row, &columns, calendar)?;
        if !keys.insert(issue.key.clone()) {
            return Err(IssueTableError::DuplicateKey {
                line,
                key: issue.key,
            });
        }
        issues.push(issue);
    }
    Ok(issues)
}

fn parse_row(
    line: usize,
    row: &str,
    columns: &Columns,
    calendar: &WorkCalendar,
) -> Result<Issue, IssueTableError> {
    let fields: Vec<&str> = row.split(DELIMITER).map(str::trim).collect();
    if fields.len() != columns.width {
        return Err(IssueTableError::FieldCount {
            line,
            expected: columns.width,
            found: fields.len(),
        });
    }
    let field = |idx: Option<usize>| idx.map(|idx| fields[idx]).filter(|text| !text.is_empty());

    let key = fields[columns.key];
    if key.is_empty() {
        return Err(IssueTableError::EmptyKey { line });
    }

    let mut issue = Issue::new(key, IssueType::from_name(fields[columns.issue_type]));
    issue.project = field(columns.project).map(str::to_string);
    issue.story_points = match columns.story_points {
        Some((idx, name)) => parse_points(line, name, field(Some(idx)))?,
        None => None,
    };
    issue.created_date = parse_date_opt(line, CREATED_DATE, field(columns.created_date))?;
    issue.in_progress_date =
        parse_date_opt(line, IN_PROGRESS_DATE, field(columns.in_progress_date))?;
    issue.resolved_date = parse_date_opt(line, RESOLVED_DATE, field(columns.resolved_date))?;
    issue.cycle_time_days = match field(columns.cycle_time) {
        Some(text) => Some(text.parse::<u32>().map_err(|_| IssueTableError::InvalidNumber {
            line,
            column: CYCLE_TIME.to_string(),
            value: text.to_string(),
        })?),
        None => match (issue.in_progress_date, issue.resolved_date) {
            (Some(start), Some(end)) => Some(calendar.business_days_between(start, end)),
            _ => None,
        },
    };

    Ok(issue)
}

fn parse_points(
    line: usize,
    column: &str,
    value: Option<&str>,
) -> Result<Option<f64>, IssueTableError> {
    let text = match value {
        Some(text) => text,
        None => return Ok(None),
    };
    let invalid = || IssueTableError::InvalidNumber {
        line,
        column: column.to_string(),
        value: text.to_string(),
    };
    let points = text.parse::<f64>().map_err(|_| invalid())?;
    if !points.is_finite() || points < 0.0 {
        return Err(invalid());
    }
    Ok(Some(points))
}

fn parse_date_opt(
    line: usize,
    column: &str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, IssueTableError> {
    let text = match value {
        Some(text) => text,
        None => return Ok(None),
    };
    parse_date(text)
        .map(Some)
        .ok_or_else(|| IssueTableError::InvalidDate {
            line,
            column: column.to_string(),
            value: text.to_string(),
        })
}

/// Accepts plain dates and the timestamp shapes an issue tracker exports,
/// e.g. `2017-03-02T10:11:12.000-0500`. The offset's local date is kept.
fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.date_naive());
    }
    if let Ok(timestamp) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(timestamp.date_naive());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .map(|timestamp| timestamp.date())
        .ok()
}
