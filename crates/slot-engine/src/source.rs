//! Collaborator seams: where busy time and "now" come from.
//!
//! The engine itself never reads the clock or talks to a provider. Callers pass
//! these in, so tests can pin time and serve events from memory.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::events::ProviderEvent;
use crate::interval::{SearchWindow, TimeInterval};

/// Conventional id of the account owner's main calendar.
pub const PRIMARY_CALENDAR: &str = "primary";

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Lists the busy periods of a calendar that intersect a window.
pub trait BusySource {
    fn busy_intervals(&self, calendar_id: &str, window: &SearchWindow)
        -> Result<Vec<TimeInterval>>;
}

/// In-memory calendars of provider events, keyed by calendar id.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    calendars: HashMap<String, Vec<ProviderEvent>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source holding a single `"primary"` calendar.
    pub fn primary(events: Vec<ProviderEvent>) -> Self {
        Self::new().with_calendar(PRIMARY_CALENDAR, events)
    }

    #[must_use]
    pub fn with_calendar(mut self, calendar_id: impl Into<String>, events: Vec<ProviderEvent>) -> Self {
        self.calendars.insert(calendar_id.into(), events);
        self
    }

    /// Events of `calendar_id` that intersect the window, ordered by start.
    ///
    /// Mirrors a provider listing with `timeMin`/`timeMax` and `orderBy=startTime`.
    /// Cancelled events are left out. An unknown calendar id has no events.
    pub fn events_in(&self, calendar_id: &str, window: &SearchWindow) -> Result<Vec<ProviderEvent>> {
        let Some(events) = self.calendars.get(calendar_id) else {
            return Ok(Vec::new());
        };
        let tz = window.timezone();
        let mut matched = Vec::new();
        for event in events.iter().filter(|e| !e.is_cancelled()) {
            let interval = event.interval(tz)?;
            if window.overlaps(interval.start.with_timezone(&tz), interval.end.with_timezone(&tz)) {
                matched.push((interval.start, event.clone()));
            }
        }
        matched.sort_by_key(|(start, _)| *start);
        Ok(matched.into_iter().map(|(_, event)| event).collect())
    }
}

impl BusySource for StaticSource {
    fn busy_intervals(
        &self,
        calendar_id: &str,
        window: &SearchWindow,
    ) -> Result<Vec<TimeInterval>> {
        let tz = window.timezone();
        self.events_in(calendar_id, window)?
            .iter()
            .map(|event| event.interval(tz))
            .collect()
    }
}
