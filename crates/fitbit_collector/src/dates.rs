use chrono::{Days, NaiveDate};
use fitbit_client::utils::parse_date;

use crate::error::{CollectorError, CollectorResult};

/// Inclusive, ascending range of calendar dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> CollectorResult<Self> {
        if start > end {
            return Err(CollectorError::Validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> CollectorResult<Self> {
        let parse = |s: &str| {
            parse_date(s).ok_or_else(|| CollectorError::Validation(format!("invalid date: {s:?}")))
        };
        Self::new(parse(start)?, parse(end)?)
    }

    /// The `days` dates ending with the day before `today`.
    pub fn ending_yesterday(today: NaiveDate, days: u32) -> CollectorResult<Self> {
        if days == 0 {
            return Err(CollectorError::Validation("day count must be at least 1".into()));
        }
        let out_of_range = || CollectorError::Validation(format!("{days} days before {today}"));
        let end = today.checked_sub_days(Days::new(1)).ok_or_else(out_of_range)?;
        let start = end
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .ok_or_else(out_of_range)?;
        Self::new(start, end)
    }

    /// Explicit bounds when both are given, otherwise the `last_days`
    /// ending yesterday. A lone bound is an error.
    pub fn from_bounds_or_last_days(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
        last_days: u32,
    ) -> CollectorResult<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Self::parse(start, end),
            (None, None) => Self::ending_yesterday(today, last_days),
            _ => Err(CollectorError::Validation(
                "start and end dates must be given together".into(),
            )),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// A range always holds at least one date.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// `start_end`, used in output file names.
    pub fn label(&self) -> String {
        format!(
            "{}_{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}
