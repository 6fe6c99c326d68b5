//! Contact record extraction.
//!
//! Adapters hand over contacts as `RawContact`s with the birthday split into
//! unvalidated numeric parts. `extract_records` keeps the ones that describe
//! a real calendar date and drops the rest without treating them as errors.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Year used to validate birthdays without a year. A leap year, so Feb 29
/// birthdays are kept.
const LEAP_REFERENCE_YEAR: i32 = 2000;

const UNNAMED_CONTACT: &str = "(unnamed)";

/// A contact as returned by the contact source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawContact {
    pub id: String,
    pub display_name: Option<String>,
    pub birthday: Option<RawBirthday>,
}

/// Birthday parts as found on the contact, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBirthday {
    pub year: Option<i32>,
    pub month: u32,
    pub day: u32,
}

/// A validated birthday belonging to one contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdayRecord {
    pub contact_id: String,
    pub display_name: String,
    pub month: u32,
    pub day: u32,
    pub year: Option<i32>,
}

impl BirthdayRecord {
    /// Age reached in `current_year`, when the birth year is known.
    pub fn age(&self, current_year: i32) -> Option<i32> {
        self.year.map(|year| current_year - year)
    }

    /// First date on or after `today` on which the birthday falls.
    ///
    /// A Feb 29 birthday is celebrated on Feb 28 in non-leap years.
    pub fn next_occurrence(&self, today: NaiveDate) -> NaiveDate {
        let this_year = self.occurrence_in(today.year());
        if this_year >= today {
            this_year
        } else {
            self.occurrence_in(today.year() + 1)
        }
    }

    fn occurrence_in(&self, year: i32) -> NaiveDate {
        // Feb 29 falls back to Feb 28. Records built by `extract_records`
        // always resolve; anything else lands on `NaiveDate::MIN`.
        NaiveDate::from_ymd_opt(year, self.month, self.day)
            .or_else(|| {
                let previous_day = self.day.checked_sub(1)?;
                NaiveDate::from_ymd_opt(year, self.month, previous_day)
            })
            .unwrap_or(NaiveDate::MIN)
    }
}

impl RawBirthday {
    fn is_valid(&self) -> bool {
        NaiveDate::from_ymd_opt(self.year.unwrap_or(LEAP_REFERENCE_YEAR), self.month, self.day)
            .is_some()
    }
}

/// Keep the contacts with a resolvable birthday, in input order.
pub fn extract_records(contacts: &[RawContact]) -> Vec<BirthdayRecord> {
    contacts.iter().filter_map(extract_record).collect()
}

fn extract_record(contact: &RawContact) -> Option<BirthdayRecord> {
    let Some(birthday) = contact.birthday else {
        tracing::debug!(contact_id = %contact.id, "Contact has no birthday");
        return None;
    };

    if !birthday.is_valid() {
        tracing::debug!(
            contact_id = %contact.id,
            year = ?birthday.year,
            month = birthday.month,
            day = birthday.day,
            "Dropping contact with an invalid birthday"
        );
        return None;
    }

    let display_name = contact
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNNAMED_CONTACT)
        .to_string();

    Some(BirthdayRecord {
        contact_id: contact.id.clone(),
        display_name,
        month: birthday.month,
        day: birthday.day,
        year: birthday.year,
    })
}
