//! Provider event JSON and its conversion into busy intervals.
//!
//! Only the fields the engine reads are typed; everything else the provider
//! sends is kept in `extra` so events can be echoed back unchanged.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SlotError};
use crate::interval::{parse_instant, parse_timezone, start_of_day, TimeInterval};

/// One side of an event: a timed `dateTime` or an all-day `date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn timed(date_time: impl Into<String>, time_zone: Option<&str>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            date: None,
            time_zone: time_zone.map(str::to_string),
        }
    }

    pub fn all_day(date: impl Into<String>) -> Self {
        Self {
            date_time: None,
            date: Some(date.into()),
            time_zone: None,
        }
    }

    /// The zone this side is reported in, falling back to `default_tz`.
    pub fn timezone(&self, default_tz: Tz) -> Result<Tz> {
        match self.time_zone.as_deref() {
            Some(tz) => parse_timezone(tz),
            None => Ok(default_tz),
        }
    }

    /// Resolve to an instant expressed in the event's own zone.
    ///
    /// An all-day `date` resolves to local midnight of that date.
    ///
    /// # Errors
    /// `SlotError::UnknownTimezone` for a bad `timeZone`; `SlotError::InvalidArgument`
    /// when neither `dateTime` nor `date` is usable.
    pub fn resolve(&self, default_tz: Tz) -> Result<DateTime<Tz>> {
        let tz = self.timezone(default_tz)?;
        if let Some(date_time) = self.date_time.as_deref() {
            return parse_instant(date_time, tz);
        }
        if let Some(date) = self.date.as_deref() {
            let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| SlotError::invalid(format!("bad all-day date '{}': {}", date, e)))?;
            return start_of_day(day, tz);
        }
        Err(SlotError::invalid("event time has neither dateTime nor date"))
    }
}

/// An event as listed by the calendar provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderEvent {
    pub fn new(start: EventTime, end: EventTime) -> Self {
        Self {
            id: None,
            summary: None,
            status: None,
            start,
            end,
            extra: Map::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }

    /// The busy period this event occupies. Sides without a `timeZone` are
    /// read in `default_tz`.
    pub fn interval(&self, default_tz: Tz) -> Result<TimeInterval> {
        let start = self.start.resolve(default_tz)?;
        let end = self.end.resolve(default_tz)?;
        TimeInterval::new(start, end).map_err(|e| match (&self.id, e) {
            (Some(id), SlotError::InvalidArgument(msg)) => {
                SlotError::InvalidArgument(format!("event {}: {}", id, msg))
            }
            (_, other) => other,
        })
    }
}

/// Convert provider events to busy intervals, dropping cancelled events.
pub fn busy_intervals(events: &[ProviderEvent], default_tz: Tz) -> Result<Vec<TimeInterval>> {
    events
        .iter()
        .filter(|e| !e.is_cancelled())
        .map(|e| e.interval(default_tz))
        .collect()
}
