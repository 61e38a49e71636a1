use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// An inclusive range of production dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ServiceError> {
        if start > end {
            return Err(ServiceError::ValidationError(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Fills in missing bounds: `end` defaults to `today`, `start` to
    /// `end - (days - 1)`.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        days: Option<i64>,
        default_days: i64,
        today: NaiveDate,
    ) -> Result<Self, ServiceError> {
        let days = days.unwrap_or(default_days);
        if !(1..=3660).contains(&days) {
            return Err(ServiceError::ValidationError(
                "days must be between 1 and 3660".to_string(),
            ));
        }

        let end = end.unwrap_or(today);
        let start = start.unwrap_or(end - Duration::days(days - 1));
        Self::new(start, end)
    }

    /// Same as [`resolve`](Self::resolve) with today's UTC date
    pub fn resolve_today(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        days: Option<i64>,
        default_days: i64,
    ) -> Result<Self, ServiceError> {
        Self::resolve(start, end, days, default_days, Utc::now().date_naive())
    }

    /// Number of calendar days covered, counting both ends
    pub fn length_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The equally long window ending the day before this one starts
    pub fn previous(&self) -> DateWindow {
        let length = Duration::days(self.length_days());
        DateWindow {
            start: self.start - length,
            end: self.start - Duration::days(1),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Zero-based day index of `date` relative to the window start
    pub fn day_index(&self, date: NaiveDate) -> i64 {
        (date - self.start).num_days()
    }
}
