//! Per-run context handed to every component of a sync.

use chrono::{NaiveDate, Utc};

pub const DEFAULT_CALENDAR_NAME: &str = "Birthdays";

/// Noon on the day of an all-day event.
pub const DEFAULT_REMINDER_MINUTES_BEFORE_START: i32 = -60 * 12;

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderOptions {
    pub enabled: bool,
    pub minutes_before_start: i32,
}

impl Default for ReminderOptions {
    fn default() -> Self {
        ReminderOptions {
            enabled: true,
            minutes_before_start: DEFAULT_REMINDER_MINUTES_BEFORE_START,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    pub calendar_name: String,
    pub reminder: ReminderOptions,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            calendar_name: DEFAULT_CALENDAR_NAME.to_string(),
            reminder: ReminderOptions::default(),
        }
    }
}

/// Built once per run. `today` anchors the first occurrence and the age
/// written into new events.
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub options: SyncOptions,
    pub today: NaiveDate,
}

impl SyncContext {
    pub fn new(options: SyncOptions) -> Self {
        SyncContext {
            options,
            today: Utc::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}
