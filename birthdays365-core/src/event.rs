//! Provider-neutral calendar types.
//!
//! Adapters convert their API responses into these types; nothing in the
//! reconciliation path looks at a vendor schema.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar available to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarInfo {
    pub id: String,
    pub name: String,
}

/// Month and day of a yearly event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDate {
    pub month: u32,
    pub day: u32,
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    Yearly { month: u32, day: u32 },
}

/// An event that already exists in the birthday calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub event_id: String,
    pub subject: String,
    /// Taken from the recurrence pattern when there is one, since the start
    /// date moves to the first occurrence.
    pub date: EventDate,
    /// Birth year written by a previous sync, if any.
    pub birth_year: Option<i32>,
    pub is_all_day: bool,
    pub recurrence: Option<Recurrence>,
    pub reminder: bool,
    /// The contact this event was created for. `None` means the event was
    /// not created by a sync and is ignored.
    pub contact_id: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.subject, self.date)
    }
}
