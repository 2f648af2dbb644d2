//! Request shapes accepted from callers, and their conversion to engine types.
//!
//! Optional fields are `Option`s and get their defaults here, at the boundary,
//! never inside the engine. A field that is present with a zero or empty value
//! is kept as given.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::interval::{
    parse_instant, parse_timezone, resolve_local, start_of_day, SearchWindow, SlotRequest,
};

/// A free-slot search as sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotQuery {
    /// Window start, wall-clock in `timezone` (an RFC 3339 offset is also accepted).
    pub start_time: String,
    pub end_time: String,
    pub timezone: String,
    pub meeting_duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice_time: Option<i64>,
}

impl SlotQuery {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve the query into a validated [`SlotRequest`]. Buffer and notice
    /// default to zero when absent.
    ///
    /// # Errors
    /// `SlotError::UnknownTimezone` for a bad zone id, `SlotError::InvalidArgument`
    /// for unparseable times, an inverted window, or invalid minute values.
    pub fn to_request(&self) -> Result<SlotRequest> {
        let window = SearchWindow::parse(&self.start_time, &self.end_time, &self.timezone)?;
        let request = SlotRequest::new(window, self.meeting_duration)
            .with_buffer(self.buffer_time.unwrap_or(0))
            .with_notice(self.notice_time.unwrap_or(0));
        request.validate()?;
        Ok(request)
    }
}

/// A listing of scheduled events across whole days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl ScheduleQuery {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The window from the start of `start_date` to the last millisecond of
    /// `end_date`, in `timezone` (UTC when absent).
    pub fn window(&self) -> Result<SearchWindow> {
        let tz = parse_timezone(self.timezone.as_deref().unwrap_or("UTC"))?;
        let first = parse_instant(&self.start_date, tz)?.date_naive();
        let last = parse_instant(&self.end_date, tz)?.date_naive();
        let start = start_of_day(first, tz)?;
        let end = resolve_local(end_of_day(last)?, tz)?;
        SearchWindow::new(start, end, tz)
    }
}

fn end_of_day(date: NaiveDate) -> Result<chrono::NaiveDateTime> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| SlotError::invalid(format!("no end of day for {}", date)))
}
