//! Time ranges, search windows, and the slot request/response types.
//!
//! Every instant carries its IANA zone (`DateTime<Tz>`) so that busy intervals
//! reported in one zone compare correctly against a window requested in another.
//! Free slots are rendered as local wall-clock time in the window's zone.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// Wall-clock format used for free slots: no offset, no zone suffix.
pub const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse an IANA timezone identifier (e.g. "America/New_York").
///
/// # Errors
/// Returns `SlotError::UnknownTimezone` if the identifier is not in the tz database.
pub fn parse_timezone(timezone: &str) -> Result<Tz> {
    timezone
        .parse()
        .map_err(|_| SlotError::UnknownTimezone(timezone.to_string()))
}

/// Resolve a naive wall-clock time in `tz`.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that
/// do not exist (DST spring-forward gap) are rejected.
pub fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(SlotError::invalid(format!(
            "{} does not exist in {}",
            naive.format(LOCAL_FORMAT),
            tz.name()
        ))),
    }
}

/// The first instant of `date` in `tz`.
///
/// Usually local midnight. Where a DST change skips midnight (America/Havana,
/// America/Santiago) the day starts at the first wall-clock minute that exists,
/// i.e. the end of the gap.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> Result<DateTime<Tz>> {
    let mut local = date.and_time(NaiveTime::MIN);
    while local.date() == date {
        match tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => return Ok(dt),
            LocalResult::Ambiguous(earliest, _) => return Ok(earliest),
            LocalResult::None => match local.checked_add_signed(Duration::minutes(1)) {
                Some(next) => local = next,
                None => break,
            },
        }
    }
    Err(SlotError::invalid(format!(
        "{} has no start of day in {}",
        date,
        tz.name()
    )))
}

/// Parse a timestamp supplied at the caller boundary and express it in `tz`.
///
/// Accepts RFC 3339 with an explicit offset (the instant is kept and converted),
/// or a bare local datetime / date which is read as wall-clock time in `tz`.
pub fn parse_instant(value: &str, tz: Tz) -> Result<DateTime<Tz>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&tz));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return resolve_local(naive, tz);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return start_of_day(date, tz);
    }
    Err(SlotError::invalid(format!("unrecognised timestamp '{}'", value)))
}

/// A busy period. Both ends are timezone-aware; `start <= end`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeInterval {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TimeInterval {
    /// # Errors
    /// Returns `SlotError::InvalidArgument` if `end` is before `start`.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self> {
        let interval = Self { start, end };
        interval.validate()?;
        Ok(interval)
    }

    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(SlotError::invalid(format!(
                "interval ends ({}) before it starts ({})",
                self.end.to_rfc3339(),
                self.start.to_rfc3339()
            )));
        }
        Ok(())
    }

    /// The same instants expressed in another zone.
    pub fn in_timezone(&self, tz: Tz) -> Self {
        Self {
            start: self.start.with_timezone(&tz),
            end: self.end.with_timezone(&tz),
        }
    }
}

/// The range to search for slots, in a single zone. `start < end` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    timezone: Tz,
}

impl SearchWindow {
    /// Build a window; both bounds are re-expressed in `timezone`.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidArgument` unless `start < end`.
    pub fn new<A: TimeZone, B: TimeZone>(
        start: DateTime<A>,
        end: DateTime<B>,
        timezone: Tz,
    ) -> Result<Self> {
        let start = start.with_timezone(&timezone);
        let end = end.with_timezone(&timezone);
        if start >= end {
            return Err(SlotError::invalid(format!(
                "window start ({}) must be before its end ({})",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self {
            start,
            end,
            timezone,
        })
    }

    /// Build a window from boundary strings (see [`parse_instant`]) and a zone id.
    pub fn parse(start: &str, end: &str, timezone: &str) -> Result<Self> {
        let tz = parse_timezone(timezone)?;
        Self::new(parse_instant(start, tz)?, parse_instant(end, tz)?, tz)
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// True when `[start, end)` intersects the window.
    pub fn overlaps(&self, start: DateTime<Tz>, end: DateTime<Tz>) -> bool {
        start < self.end && end > self.start
    }
}

/// Upper bound for duration, buffer, and notice: one hundred years.
pub const MAX_SPAN_MINUTES: i64 = 100 * 366 * 24 * 60;

/// A slot search: window plus meeting length, spacing, and minimum lead time.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRequest {
    pub window: SearchWindow,
    /// Length of each proposed slot. Must be positive.
    pub duration_minutes: i64,
    /// Spacing kept around busy time and between consecutive slots.
    pub buffer_minutes: i64,
    /// No slot may start sooner than this many minutes from now.
    pub notice_minutes: i64,
}

impl SlotRequest {
    pub fn new(window: SearchWindow, duration_minutes: i64) -> Self {
        Self {
            window,
            duration_minutes,
            buffer_minutes: 0,
            notice_minutes: 0,
        }
    }

    #[must_use]
    pub fn with_buffer(mut self, buffer_minutes: i64) -> Self {
        self.buffer_minutes = buffer_minutes;
        self
    }

    #[must_use]
    pub fn with_notice(mut self, notice_minutes: i64) -> Self {
        self.notice_minutes = notice_minutes;
        self
    }

    /// # Errors
    /// `SlotError::InvalidArgument` for a non-positive duration, a negative
    /// buffer or notice, or any of them above [`MAX_SPAN_MINUTES`].
    pub fn validate(&self) -> Result<()> {
        if self.duration_minutes <= 0 {
            return Err(SlotError::invalid(format!(
                "duration must be positive, got {} minutes",
                self.duration_minutes
            )));
        }
        if self.buffer_minutes < 0 {
            return Err(SlotError::invalid(format!(
                "buffer must not be negative, got {} minutes",
                self.buffer_minutes
            )));
        }
        if self.notice_minutes < 0 {
            return Err(SlotError::invalid(format!(
                "notice must not be negative, got {} minutes",
                self.notice_minutes
            )));
        }
        for (name, minutes) in [
            ("duration", self.duration_minutes),
            ("buffer", self.buffer_minutes),
            ("notice", self.notice_minutes),
        ] {
            if minutes > MAX_SPAN_MINUTES {
                return Err(SlotError::invalid(format!(
                    "{} of {} minutes exceeds the supported maximum of {}",
                    name, minutes, MAX_SPAN_MINUTES
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }

    pub(crate) fn buffer(&self) -> Duration {
        Duration::minutes(self.buffer_minutes)
    }

    pub(crate) fn notice(&self) -> Duration {
        Duration::minutes(self.notice_minutes)
    }
}

/// A bookable slot in the window's local wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    #[serde(with = "local_format")]
    pub start: NaiveDateTime,
    #[serde(with = "local_format")]
    pub end: NaiveDateTime,
}

impl FreeSlot {
    pub(crate) fn from_instants(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self {
            start: start.naive_local(),
            end: end.naive_local(),
        }
    }
}

mod local_format {
    use super::LOCAL_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&value.format(LOCAL_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, LOCAL_FORMAT).map_err(serde::de::Error::custom)
    }
}
