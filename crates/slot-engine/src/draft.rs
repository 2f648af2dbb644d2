//! Shape create/update requests into provider event bodies.
//!
//! A create request ([`EventDraft`]) requires summary, start, and end; an update
//! ([`EventPatch`]) replaces exactly the fields that are present. Presence is
//! what counts: an empty description or `useDefault: false` in a patch is
//! applied, not skipped.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SlotError};
use crate::interval::{parse_instant, parse_timezone};

/// Zone used when a create request names none.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Provider `dateTime` format: wall-clock plus numeric offset.
pub const EVENT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: i64,
}

impl ReminderOverride {
    pub fn new(method: impl Into<String>, minutes: i64) -> Self {
        Self {
            method: method.into(),
            minutes,
        }
    }
}

/// An e-mail a day ahead and a popup ten minutes before.
pub fn default_overrides() -> Vec<ReminderOverride> {
    vec![
        ReminderOverride::new("email", 24 * 60),
        ReminderOverride::new("popup", 10),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    #[serde(default)]
    pub overrides: Vec<ReminderOverride>,
}

impl Default for Reminders {
    fn default() -> Self {
        Self {
            use_default: false,
            overrides: default_overrides(),
        }
    }
}

/// Reminder fields as sent by a client; each may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<ReminderOverride>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    /// Provider fields such as `responseStatus`, carried through updates.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// The event body sent to the provider on insert or patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResource {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub reminders: Reminders,
}

/// A create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub summary: String,
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attendee e-mail addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<ReminderSettings>,
}

impl EventDraft {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the provider body.
    ///
    /// # Errors
    /// `SlotError::InvalidArgument` for a blank summary, unparseable times, or
    /// an end not after the start; `SlotError::UnknownTimezone` for a bad zone.
    pub fn into_resource(&self) -> Result<EventResource> {
        if self.summary.trim().is_empty() {
            return Err(SlotError::invalid("event summary must not be blank"));
        }
        let tz_name = self.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE);
        let (start, end) = event_times(&self.start, &self.end, tz_name)?;

        let reminders = self.reminders.clone().unwrap_or_default();
        Ok(EventResource {
            summary: self.summary.clone(),
            location: self.location.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            start,
            end,
            attendees: attendees_from(self.attendees.as_deref().unwrap_or_default()),
            reminders: Reminders {
                use_default: reminders.use_default.unwrap_or(false),
                overrides: reminders.overrides.unwrap_or_else(default_overrides),
            },
        })
    }
}

/// An update request; absent fields keep the existing event's values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<ReminderSettings>,
}

impl EventPatch {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Merge this patch onto `existing`.
    ///
    /// The zone is the patch's, else the existing start's, else UTC. Start and
    /// end not given in the patch are the existing instants re-rendered in
    /// that zone.
    pub fn apply(&self, existing: &EventResource) -> Result<EventResource> {
        let tz_name = self
            .timezone
            .as_deref()
            .or(existing.start.time_zone.as_deref())
            .unwrap_or(DEFAULT_TIMEZONE);
        let start = self.start.as_deref().unwrap_or(&existing.start.date_time);
        let end = self.end.as_deref().unwrap_or(&existing.end.date_time);
        let (start, end) = event_times(start, end, tz_name)?;

        let attendees = match &self.attendees {
            Some(emails) => attendees_from(emails),
            None => existing.attendees.clone(),
        };

        let settings = self.reminders.clone().unwrap_or_default();
        let reminders = Reminders {
            use_default: settings
                .use_default
                .unwrap_or(existing.reminders.use_default),
            overrides: settings
                .overrides
                .unwrap_or_else(|| existing.reminders.overrides.clone()),
        };

        Ok(EventResource {
            summary: self.summary.clone().unwrap_or_else(|| existing.summary.clone()),
            location: self
                .location
                .clone()
                .unwrap_or_else(|| existing.location.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| existing.description.clone()),
            start,
            end,
            attendees,
            reminders,
        })
    }
}

fn attendees_from(emails: &[String]) -> Vec<Attendee> {
    emails.iter().map(Attendee::new).collect()
}

fn event_times(start: &str, end: &str, tz_name: &str) -> Result<(EventDateTime, EventDateTime)> {
    let tz = parse_timezone(tz_name)?;
    let start = parse_instant(start, tz)?;
    let end = parse_instant(end, tz)?;
    if end <= start {
        return Err(SlotError::invalid(format!(
            "event end ({}) must be after its start ({})",
            end.format(EVENT_FORMAT),
            start.format(EVENT_FORMAT)
        )));
    }
    Ok((event_date_time(start, tz_name), event_date_time(end, tz_name)))
}

fn event_date_time(at: DateTime<Tz>, tz_name: &str) -> EventDateTime {
    EventDateTime {
        date_time: at.format(EVENT_FORMAT).to_string(),
        time_zone: Some(tz_name.to_string()),
    }
}
