//! Event payload sent when creating or updating a birthday event.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::context::ReminderOptions;
use crate::record::BirthdayRecord;

pub const BIRTHDAY_CATEGORY: &str = "Birthday";

const SUBJECT_PREFIX: &str = "🎂 ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRecurrence {
    pub month: u32,
    pub day: u32,
    /// First occurrence of the series.
    pub start: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub subject: String,
    pub body: String,
    /// All-day event: `end` is the day after `start`.
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub recurrence: YearlyRecurrence,
    /// `None` when reminders are disabled.
    pub reminder_minutes_before_start: Option<i32>,
    pub categories: Vec<String>,
    pub contact_id: String,
    pub birth_year: Option<i32>,
}

impl EventPayload {
    pub fn for_record(
        record: &BirthdayRecord,
        today: NaiveDate,
        reminder: &ReminderOptions,
    ) -> Self {
        let start = record.next_occurrence(today);
        let end = start.checked_add_days(Days::new(1)).unwrap_or(start);

        let body = match record.age(start.year()) {
            Some(age) => format!("Age: {age}"),
            None => String::new(),
        };

        EventPayload {
            subject: subject_for(&record.display_name),
            body,
            start,
            end,
            recurrence: YearlyRecurrence {
                month: record.month,
                day: record.day,
                start,
            },
            reminder_minutes_before_start: reminder.enabled.then_some(reminder.minutes_before_start),
            categories: vec![BIRTHDAY_CATEGORY.to_string()],
            contact_id: record.contact_id.clone(),
            birth_year: record.year,
        }
    }
}

pub fn subject_for(display_name: &str) -> String {
    format!("{SUBJECT_PREFIX}{display_name}")
}

/// Recover the contact name from an event subject. Subjects written before
/// the cake prefix was introduced are taken as-is.
pub fn display_name_from_subject(subject: &str) -> &str {
    subject.strip_prefix(SUBJECT_PREFIX).unwrap_or(subject)
}
