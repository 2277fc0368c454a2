use chrono::Datelike;
use chrono::NaiveDate;
use chrono::Weekday;

#[derive(Debug, Clone, PartialEq)]
pub struct FreeDateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Working days of the team, used to measure cycle time in business days.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkCalendar {
    pub free_weekdays: Vec<Weekday>,
    pub free_date_ranges: Vec<FreeDateRange>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            free_weekdays: vec![Weekday::Sat, Weekday::Sun],
            free_date_ranges: Vec::new(),
        }
    }
}

impl WorkCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_workday(&self, date: NaiveDate) -> bool {
        if self.free_weekdays.contains(&date.weekday()) {
            return false;
        }

        !self
            .free_date_ranges
            .iter()
            .any(|range| date >= range.start_date && date <= range.end_date)
    }

    /// Counts workdays in `[start, end)`. Returns 0 when `end <= start`.
    pub fn business_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        start
            .iter_days()
            .take_while(|date| *date < end)
            .filter(|date| self.is_workday(*date))
            .count() as u32
    }
}
