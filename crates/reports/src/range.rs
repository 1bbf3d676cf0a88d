use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ReportError, Result};

/// Inclusive window of unix millisecond timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: i64,
    pub end_date: i64,
}

impl DateRange {
    pub fn new(start_date: i64, end_date: i64) -> Result<Self> {
        if start_date > end_date {
            return Err(ReportError::InvalidRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Parses raw query parameters. Both bounds are required.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(ReportError::MissingBound);
        };
        Self::new(parse_millis(start)?, parse_millis(end)?)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        (self.start_date..=self.end_date).contains(&at.timestamp_millis())
    }
}

fn parse_millis(value: &str) -> Result<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ReportError::MissingBound);
    }
    trimmed.parse().map_err(|_| ReportError::InvalidBound {
        value: value.to_string(),
    })
}
