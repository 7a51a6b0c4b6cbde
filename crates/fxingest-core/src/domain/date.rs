use std::fmt::{Display, Formatter};

use time::macros::format_description;
use time::Date;

use crate::ValidationError;

/// Calendar date used in time-series queries, always `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RateDate(Date);

impl RateDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let format = format_description!("[year]-[month]-[day]");
        Date::parse(input.trim(), format)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }
}

impl Display for RateDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

/// Inclusive date range for a time-series fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: RateDate,
    end: RateDate,
}

impl DateRange {
    pub fn new(start: RateDate, end: RateDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub const fn start(self) -> RateDate {
        self.start
    }

    pub const fn end(self) -> RateDate {
        self.end
    }

    /// Endpoint path segment, e.g. `/v1/2026-02-01..2026-02-10`.
    pub fn endpoint(self) -> String {
        format!("/v1/{}..{}", self.start, self.end)
    }
}
